//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::OSRM_URL;

/// Default routing service base URL
pub const DEFAULT_ROUTING_URL: &str = OSRM_URL;

/// Abort a routing request after this many milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Pause between successful routing requests in milliseconds
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1_500;

/// Cooldown after an HTTP 429 in seconds
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// Route cache time-to-live in seconds (30 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Entry count above which the cache is pruned
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;

/// Number of oldest entries evicted per prune
pub const DEFAULT_CACHE_PRUNE_BATCH: usize = 100;

/// Default trip origin latitude (Dayuan, Taoyuan)
pub const DEFAULT_ORIGIN_LAT: f64 = 25.0621;

/// Default trip origin longitude (Dayuan, Taoyuan)
pub const DEFAULT_ORIGIN_LNG: f64 = 121.1963;

/// Ratio of road distance to straight-line distance (mountain roads)
pub const DEFAULT_WINDING_FACTOR: f64 = 1.4;

/// Assumed average speed for the fallback estimate in km/h
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "trip-eta";
