//! Taiwan national holidays and long weekends
//!
//! Only one calendar year is covered. Dates in any other year are never
//! treated as holidays; the table has to be extended by hand each year.

use chrono::{Datelike, NaiveDate};

/// Year the static table describes
pub const CALENDAR_YEAR: i32 = 2026;

/// (month, day) pairs in [`CALENDAR_YEAR`]
const HOLIDAYS: &[(u32, u32)] = &[
    // New Year's Day
    (1, 1),
    // Lunar New Year
    (2, 27),
    (2, 28),
    (3, 1),
    (3, 2),
    // Tomb Sweeping long weekend
    (4, 3),
    (4, 4),
    (4, 5),
    (4, 6),
    // Dragon Boat long weekend
    (6, 19),
    (6, 20),
    (6, 21),
    // Mid-Autumn long weekend
    (9, 25),
    (9, 26),
    (9, 27),
    (9, 28),
    // National Day long weekend
    (10, 9),
    (10, 10),
    (10, 11),
];

/// Exact-date holiday lookup
#[derive(Debug, Clone, Copy)]
pub struct HolidayCalendar {
    year: i32,
    days: &'static [(u32, u32)],
}

impl HolidayCalendar {
    /// The built-in Taiwan calendar
    pub fn taiwan() -> Self {
        Self {
            year: CALENDAR_YEAR,
            days: HOLIDAYS,
        }
    }

    /// A calendar with no holidays at all
    pub fn empty() -> Self {
        Self {
            year: CALENDAR_YEAR,
            days: &[],
        }
    }

    /// Whether `date` is a listed holiday
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        date.year() == self.year && self.days.contains(&(date.month(), date.day()))
    }

    /// Whether lookups for `year` mean anything
    pub fn covers(&self, year: i32) -> bool {
        year == self.year
    }

    /// Number of listed days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::taiwan()
    }
}
