//! Centralized constants for the trip-eta crate
//!
//! Tunable engine parameters live in `config::defaults`; the values here are
//! fixed properties of the model or the outside world.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Decimal places kept when building cache and dedup keys.
    ///
    /// Four places (~11 m) buckets nearby queries onto the same key.
    pub const KEY_PRECISION: usize = 4;
}

/// External API endpoints
pub mod api {
    /// Public OSRM demo server
    pub const OSRM_URL: &str = "https://router.project-osrm.org";

    /// User agent sent to the routing service
    pub const USER_AGENT: &str = concat!("trip-eta/", env!("CARGO_PKG_VERSION"));
}

/// Traffic weighting model
pub mod traffic {
    /// Starting factor before any time band applies
    pub const BASE_WEIGHT: f64 = 1.02;

    /// Weekday 07:00-08:29
    pub const MORNING_RUSH_EARLY: f64 = 1.25;
    /// Weekday 08:30-09:59
    pub const MORNING_RUSH_LATE: f64 = 1.15;
    /// Weekday 17:00-18:59
    pub const EVENING_RUSH: f64 = 1.30;
    /// Weekday 19:00-19:59
    pub const EVENING_TAIL: f64 = 1.10;
    /// Weekday 10:00-15:59
    pub const MIDDAY: f64 = 1.05;

    /// Friday 16:00-19:59 outbound camping traffic
    pub const FRIDAY_EVENING_RUSH: f64 = 1.25;
    /// Saturday 07:00-10:59 outbound camping traffic
    pub const SATURDAY_MORNING_RUSH: f64 = 1.20;
    /// Sunday 14:00-19:59 return traffic
    pub const SUNDAY_RETURN_RUSH: f64 = 1.35;

    /// 23:00-05:59, empty roads
    pub const LATE_NIGHT: f64 = 0.95;

    pub const HOLIDAY_MULTIPLIER: f64 = 1.05;

    /// Trips shorter than this get the urban stop-and-go bump
    pub const SHORT_TRIP_KM: f64 = 10.0;
    pub const SHORT_TRIP_MULTIPLIER: f64 = 1.05;

    pub const MIN_WEIGHT: f64 = 0.90;
    pub const MAX_WEIGHT: f64 = 1.40;
}

/// Fixed buffers added on top of the weighted duration
pub mod buffer {
    /// Trips below this distance get the short buffer
    pub const LONG_TRIP_KM: f64 = 50.0;

    /// Parking, loading the car, a wrong turn
    pub const SHORT_TRIP_SECS: f64 = 5.0 * 60.0;

    pub const LONG_TRIP_SECS: f64 = 10.0 * 60.0;
}

/// Cache settings
pub mod cache {
    /// Route cache file name
    pub const ROUTE_CACHE_FILE: &str = "route_cache.json";
}
