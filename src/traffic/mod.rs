//! Traffic weighting model
//!
//! Maps the time of day, day of week and trip length to a multiplicative
//! factor applied to a raw route duration. The factor models live traffic at
//! query time, not at the planned departure time.
//!
//! ## Algorithm
//! 1. Start from a base factor.
//! 2. Weekdays that are not holidays get commuter rush-hour bands.
//! 3. Weekend camping bands (Friday evening, Saturday morning, Sunday
//!    afternoon) are overlaid with `max`, so they never lower a weekday value.
//! 4. 23:00-05:59 overrides everything with a low factor.
//! 5. Holidays multiply by a fixed factor.
//! 6. Short trips (under 10 km) multiply by a stop-and-go factor.
//! 7. The result is clamped to [0.90, 1.40].

pub mod holidays;

use crate::clock::Clock;
use crate::constants::traffic::*;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
pub use holidays::HolidayCalendar;

/// Traffic weight at a fixed point in time
///
/// Pure function of its inputs: the same `at`, `distance_km` and calendar
/// always produce the same factor.
pub fn traffic_weight_at(
    at: NaiveDateTime,
    distance_km: Option<f64>,
    calendar: &HolidayCalendar,
) -> f64 {
    let hour = at.hour();
    let minute = at.minute();
    let day = at.weekday();
    let holiday = calendar.is_holiday(at.date());

    let mut weight = BASE_WEIGHT;

    let is_weekday = !matches!(day, Weekday::Sat | Weekday::Sun);
    if is_weekday && !holiday {
        weight = commuter_weight(hour, minute).unwrap_or(weight);
    }

    if let Some(rush) = camping_rush_weight(day, hour) {
        weight = weight.max(rush);
    }

    if !(6..23).contains(&hour) {
        weight = LATE_NIGHT;
    }

    if holiday {
        weight *= HOLIDAY_MULTIPLIER;
    }

    // Zero means "unknown" here, not "same spot".
    if matches!(distance_km, Some(d) if d > 0.0 && d < SHORT_TRIP_KM) {
        weight *= SHORT_TRIP_MULTIPLIER;
    }

    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// Traffic weight right now according to `clock`, using the Taiwan calendar
pub fn smart_traffic_weight(clock: &dyn Clock, distance_km: Option<f64>) -> f64 {
    traffic_weight_at(clock.now_local(), distance_km, &HolidayCalendar::taiwan())
}

fn commuter_weight(hour: u32, minute: u32) -> Option<f64> {
    match (hour, minute) {
        (7, _) | (8, 0..=29) => Some(MORNING_RUSH_EARLY),
        (8, _) | (9, _) => Some(MORNING_RUSH_LATE),
        (17..=18, _) => Some(EVENING_RUSH),
        (19, _) => Some(EVENING_TAIL),
        (10..=15, _) => Some(MIDDAY),
        _ => None,
    }
}

fn camping_rush_weight(day: Weekday, hour: u32) -> Option<f64> {
    match (day, hour) {
        (Weekday::Fri, 16..=19) => Some(FRIDAY_EVENING_RUSH),
        (Weekday::Sat, 7..=10) => Some(SATURDAY_MORNING_RUSH),
        (Weekday::Sun, 14..=19) => Some(SUNDAY_RETURN_RUSH),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    const FAR: Option<f64> = Some(120.0);

    /// 2026-03-09 is a Monday with no holidays that week
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn weight(at: NaiveDateTime, distance: Option<f64>) -> f64 {
        traffic_weight_at(at, distance, &HolidayCalendar::taiwan())
    }

    #[test]
    fn test_weekday_bands() {
        assert_eq!(weight(monday_at(6, 30), FAR), BASE_WEIGHT);
        assert_eq!(weight(monday_at(7, 0), FAR), 1.25);
        assert_eq!(weight(monday_at(8, 29), FAR), 1.25);
        assert_eq!(weight(monday_at(8, 30), FAR), 1.15);
        assert_eq!(weight(monday_at(9, 59), FAR), 1.15);
        assert_eq!(weight(monday_at(12, 0), FAR), 1.05);
        assert_eq!(weight(monday_at(16, 30), FAR), BASE_WEIGHT);
        assert_eq!(weight(monday_at(17, 0), FAR), 1.30);
        assert_eq!(weight(monday_at(19, 15), FAR), 1.10);
        assert_eq!(weight(monday_at(21, 0), FAR), BASE_WEIGHT);
    }

    #[test]
    fn test_friday_evening_overlays_with_max() {
        // Friday 2026-03-13: weekday evening rush 1.30 beats the 1.25 camping band
        assert_eq!(weight(at(2026, 3, 13, 17, 0), FAR), 1.30);
        // 16:00 has no commuter band, so the camping band applies
        assert_eq!(weight(at(2026, 3, 13, 16, 0), FAR), 1.25);
        // 19:00 commuter tail 1.10 is raised to 1.25
        assert_eq!(weight(at(2026, 3, 13, 19, 30), FAR), 1.25);
    }

    #[test]
    fn test_weekend_bands() {
        // Saturday 2026-03-14
        assert_eq!(weight(at(2026, 3, 14, 8, 0), FAR), 1.20);
        assert_eq!(weight(at(2026, 3, 14, 12, 0), FAR), BASE_WEIGHT);
        // Sunday 2026-03-15
        assert_eq!(weight(at(2026, 3, 15, 15, 0), FAR), 1.35);
        assert_eq!(weight(at(2026, 3, 15, 9, 0), FAR), BASE_WEIGHT);
    }

    #[test]
    fn test_late_night_overrides() {
        assert_eq!(weight(monday_at(23, 0), FAR), LATE_NIGHT);
        assert_eq!(weight(monday_at(3, 0), FAR), LATE_NIGHT);
        assert_eq!(weight(monday_at(5, 59), FAR), LATE_NIGHT);
        assert_eq!(weight(monday_at(6, 0), FAR), BASE_WEIGHT);
    }

    #[test]
    fn test_holiday_skips_commuter_bands_and_multiplies() {
        // 2026-04-06 is a Monday inside the Tomb Sweeping long weekend
        let w = weight(at(2026, 4, 6, 8, 0), FAR);
        assert_relative_eq!(w, BASE_WEIGHT * HOLIDAY_MULTIPLIER, epsilon = 1e-12);
    }

    #[test]
    fn test_holiday_sunday_return_is_clamped() {
        // 2026-06-21 is a Sunday holiday: 1.35 * 1.05 * 1.05 exceeds the ceiling
        assert_eq!(weight(at(2026, 6, 21, 15, 0), Some(5.0)), MAX_WEIGHT);
    }

    #[test]
    fn test_short_trip_bump() {
        let noon = monday_at(12, 0);
        assert_relative_eq!(weight(noon, Some(5.0)), 1.05 * 1.05, epsilon = 1e-12);
        assert_eq!(weight(noon, Some(10.0)), 1.05);
        assert_eq!(weight(noon, Some(0.0)), 1.05);
        assert_eq!(weight(noon, None), 1.05);
    }

    #[test]
    fn test_outside_calendar_year_is_never_holiday() {
        // 2027-01-01 is a Friday; treated as a plain weekday
        assert_eq!(weight(at(2027, 1, 1, 12, 0), FAR), 1.05);
    }

    #[test]
    fn test_weight_always_within_bounds() {
        let distances = [None, Some(0.0), Some(0.5), Some(9.99), Some(10.0), Some(49.0), Some(800.0)];
        // Two weeks that include long weekends
        let starts = [at(2026, 4, 1, 0, 0), at(2026, 9, 21, 0, 0)];

        for start in starts {
            let mut t = start;
            let end = start + Duration::days(7);
            while t < end {
                for distance in distances {
                    let w = weight(t, distance);
                    assert!(
                        (MIN_WEIGHT..=MAX_WEIGHT).contains(&w),
                        "weight {} out of bounds at {} for {:?}",
                        w,
                        t,
                        distance
                    );
                }
                t += Duration::minutes(15);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let t = at(2026, 10, 9, 17, 45);
        assert_eq!(
            weight(t, Some(3.2)).to_bits(),
            weight(t, Some(3.2)).to_bits()
        );
    }

    #[test]
    fn test_smart_weight_reads_clock() {
        let clock = ManualClock::new(monday_at(17, 30));
        assert_eq!(smart_traffic_weight(&clock, FAR), 1.30);

        clock.set(monday_at(23, 30));
        assert_eq!(smart_traffic_weight(&clock, FAR), LATE_NIGHT);
    }
}
