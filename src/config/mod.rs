//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/trip-eta/config.toml

pub mod defaults;

use crate::constants::cache::ROUTE_CACHE_FILE;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Routing service and request pacing
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Route cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Estimation model settings
    #[serde(default)]
    pub estimate: EstimateConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Routing service and request pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the OSRM-compatible routing service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Delay between successful requests in milliseconds
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Cooldown after an HTTP 429 in seconds
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

/// Route cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Entry count above which the cache is pruned
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Oldest entries evicted per prune
    #[serde(default = "default_prune_batch")]
    pub prune_batch: usize,

    /// Cache file path (empty means the XDG cache directory)
    #[serde(default)]
    pub path: String,
}

/// Estimation model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Origin latitude used when none is given
    #[serde(default = "default_origin_lat")]
    pub origin_lat: f64,

    /// Origin longitude used when none is given
    #[serde(default = "default_origin_lng")]
    pub origin_lng: f64,

    /// Road distance / straight-line distance ratio for the fallback
    #[serde(default = "default_winding_factor")]
    pub winding_factor: f64,

    /// Average speed in km/h for the fallback
    #[serde(default = "default_average_speed")]
    pub average_speed_kmh: f64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_ROUTING_URL.to_string()
}
fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}
fn default_request_delay() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}
fn default_cooldown() -> u64 {
    DEFAULT_COOLDOWN_SECS
}
fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}
fn default_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}
fn default_prune_batch() -> usize {
    DEFAULT_CACHE_PRUNE_BATCH
}
fn default_origin_lat() -> f64 {
    DEFAULT_ORIGIN_LAT
}
fn default_origin_lng() -> f64 {
    DEFAULT_ORIGIN_LNG
}
fn default_winding_factor() -> f64 {
    DEFAULT_WINDING_FACTOR
}
fn default_average_speed() -> f64 {
    DEFAULT_AVERAGE_SPEED_KMH
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
            request_delay_ms: default_request_delay(),
            cooldown_secs: default_cooldown(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
            prune_batch: default_prune_batch(),
            path: String::new(),
        }
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            origin_lat: default_origin_lat(),
            origin_lng: default_origin_lng(),
            winding_factor: default_winding_factor(),
            average_speed_kmh: default_average_speed(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            let config: Config = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Resolve the route cache file path
    ///
    /// Uses `cache.path` when set, otherwise ~/.cache/trip-eta/route_cache.json
    pub fn cache_path(&self) -> Result<PathBuf> {
        if !self.cache.path.is_empty() {
            return Ok(PathBuf::from(&self.cache.path));
        }

        dirs::cache_dir()
            .map(|p| p.join(APP_DIR_NAME).join(ROUTE_CACHE_FILE))
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["routing", "base_url"] => Some(self.routing.base_url.clone()),
            ["routing", "request_timeout_ms"] => Some(self.routing.request_timeout_ms.to_string()),
            ["routing", "request_delay_ms"] => Some(self.routing.request_delay_ms.to_string()),
            ["routing", "cooldown_secs"] => Some(self.routing.cooldown_secs.to_string()),

            ["cache", "ttl_secs"] => Some(self.cache.ttl_secs.to_string()),
            ["cache", "max_entries"] => Some(self.cache.max_entries.to_string()),
            ["cache", "prune_batch"] => Some(self.cache.prune_batch.to_string()),
            ["cache", "path"] => Some(self.cache.path.clone()),

            ["estimate", "origin_lat"] => Some(self.estimate.origin_lat.to_string()),
            ["estimate", "origin_lng"] => Some(self.estimate.origin_lng.to_string()),
            ["estimate", "winding_factor"] => Some(self.estimate.winding_factor.to_string()),
            ["estimate", "average_speed_kmh"] => {
                Some(self.estimate.average_speed_kmh.to_string())
            }

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong. On error the
    /// config is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values the estimator cannot work with
    ///
    /// The fallback estimate divides by the speed and scales by the winding
    /// factor, so both must be finite and in range.
    pub fn validate(&self) -> Result<()> {
        let estimate = &self.estimate;

        let factor = estimate.winding_factor;
        if !(factor.is_finite() && factor >= 1.0) {
            return Err(Error::Config(format!(
                "estimate.winding_factor must be a number of at least 1.0: {}",
                factor
            )));
        }

        let speed = estimate.average_speed_kmh;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::Config(format!(
                "estimate.average_speed_kmh must be a positive number: {}",
                speed
            )));
        }

        Coordinates::new(estimate.origin_lat, estimate.origin_lng)
            .validate()
            .map_err(|e| Error::Config(format!("estimate origin: {}", e)))?;

        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["routing", "base_url"] => {
                self.routing.base_url = value.trim_end_matches('/').to_string();
            }
            ["routing", "request_timeout_ms"] => {
                self.routing.request_timeout_ms = parse_value(value, "timeout")?;
            }
            ["routing", "request_delay_ms"] => {
                self.routing.request_delay_ms = parse_value(value, "delay")?;
            }
            ["routing", "cooldown_secs"] => {
                self.routing.cooldown_secs = parse_value(value, "cooldown")?;
            }

            ["cache", "ttl_secs"] => {
                self.cache.ttl_secs = parse_value(value, "ttl")?;
            }
            ["cache", "max_entries"] => {
                self.cache.max_entries = parse_value(value, "max entries")?;
            }
            ["cache", "prune_batch"] => {
                self.cache.prune_batch = parse_value(value, "prune batch")?;
            }
            ["cache", "path"] => {
                self.cache.path = value.to_string();
            }

            ["estimate", "origin_lat"] => {
                self.estimate.origin_lat = parse_value(value, "latitude")?;
            }
            ["estimate", "origin_lng"] => {
                self.estimate.origin_lng = parse_value(value, "longitude")?;
            }
            ["estimate", "winding_factor"] => {
                self.estimate.winding_factor = parse_value(value, "winding factor")?;
            }
            ["estimate", "average_speed_kmh"] => {
                self.estimate.average_speed_kmh = parse_value(value, "speed")?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(value, "port")?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "routing.base_url",
            "routing.request_timeout_ms",
            "routing.request_delay_ms",
            "routing.cooldown_secs",
            "cache.ttl_secs",
            "cache.max_entries",
            "cache.prune_batch",
            "cache.path",
            "estimate.origin_lat",
            "estimate.origin_lng",
            "estimate.winding_factor",
            "estimate.average_speed_kmh",
            "server.host",
            "server.port",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}
