//! Time sources
//!
//! The traffic model reads local wall-clock time and the route cache stamps
//! entries with epoch milliseconds. Both go through [`Clock`] so tests can pin
//! the time instead of depending on when they run.

use chrono::{Duration, Local, NaiveDateTime, Utc};
use std::sync::Mutex;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now_local(&self) -> NaiveDateTime;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
///
/// The local time is treated as UTC when deriving epoch milliseconds, so
/// its stamps must not reach a cache shared with real-clock runs.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Create a clock frozen at `at`
    pub fn new(at: NaiveDateTime) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Jump to a new point in time
    pub fn set(&self, at: NaiveDateTime) {
        *self.lock() = at;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now_local(&self) -> NaiveDateTime {
        *self.lock()
    }

    fn now_millis(&self) -> i64 {
        self.lock().and_utc().timestamp_millis()
    }
}

/// Local time pinned to one instant, epoch time from the system
///
/// Backs `--at`: traffic is weighted as if it were `at`, while cache entries
/// are still stamped with the real time.
#[derive(Debug, Clone, Copy)]
pub struct PinnedLocalClock {
    at: NaiveDateTime,
}

impl PinnedLocalClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }
}

impl Clock for PinnedLocalClock {
    fn now_local(&self) -> NaiveDateTime {
        self.at
    }

    fn now_millis(&self) -> i64 {
        SystemClock.now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 11)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::new(noon());
        assert_eq!(clock.now_local(), noon());
        assert_eq!(clock.now_millis(), clock.now_millis());
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(noon());
        let before = clock.now_millis();

        clock.advance(Duration::minutes(31));

        assert_eq!(clock.now_millis() - before, 31 * 60 * 1000);
        assert_eq!(clock.now_local(), noon() + Duration::minutes(31));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn test_pinned_clock_stamps_real_time() {
        let clock = PinnedLocalClock::new(
            NaiveDate::from_ymd_opt(2030, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        );

        let before = Utc::now().timestamp_millis();
        let stamp = clock.now_millis();
        let after = Utc::now().timestamp_millis();

        assert_eq!(clock.now_local().hour(), 8);
        assert!(before <= stamp && stamp <= after);
    }
}
