//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod cache;
pub mod config;
pub mod estimate;
pub mod serve;
pub mod weight;

use crate::cache::RouteCache;
use crate::clock::{Clock, PinnedLocalClock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::estimator::{EstimatorSettings, TravelEstimator};
use crate::routing::OsrmBackend;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Drive-time estimates with traffic weighting and a rate-limit-aware route cache
#[derive(Parser)]
#[command(name = "trip-eta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate travel time to a destination
    Estimate(estimate::EstimateArgs),

    /// Show the traffic weight for a point in time
    Weight(weight::WeightArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Inspect and manage the route cache
    Cache(cache::CacheArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate(args) => estimate::run(args).await,
        Commands::Weight(args) => weight::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Cache(args) => cache::run(args),
    }
}

/// Initialize logging, honoring RUST_LOG when set
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a local date-time given as "YYYY-MM-DD HH:MM" or "YYYY-MM-DDTHH:MM[:SS]"
pub fn parse_local_time(value: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| {
            Error::Config(format!(
                "Invalid time '{}', expected YYYY-MM-DD HH:MM",
                value
            ))
        })
}

/// Clock for a command: local time pinned when `--at` is given, otherwise
/// the system clock. Cache stamps always use the real time.
pub fn clock_for(at: Option<&str>) -> Result<Arc<dyn Clock>> {
    Ok(match at {
        Some(value) => Arc::new(PinnedLocalClock::new(parse_local_time(value)?)),
        None => Arc::new(SystemClock),
    })
}

/// Build the estimation engine described by `config`
pub fn build_estimator(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<TravelEstimator<OsrmBackend>> {
    let settings = EstimatorSettings::from_config(config);
    let backend = OsrmBackend::new(&config.routing.base_url)?;
    let cache = RouteCache::load_from(config.cache_path()?, settings.cache);

    Ok(TravelEstimator::new(backend, cache, clock, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_local_time_formats() {
        for value in ["2026-03-11 08:15", "2026-03-11T08:15", "2026-03-11T08:15:00"] {
            let at = parse_local_time(value).unwrap();
            assert_eq!(at.day(), 11);
            assert_eq!(at.hour(), 8);
            assert_eq!(at.minute(), 15);
        }
    }

    #[test]
    fn test_parse_local_time_rejects_garbage() {
        assert!(parse_local_time("next friday").is_err());
        assert!(parse_local_time("2026-13-01 08:00").is_err());
    }

    #[test]
    fn test_clock_for_pins_time() {
        let clock = clock_for(Some("2026-03-13 17:30")).unwrap();
        assert_eq!(clock.now_local(), parse_local_time("2026-03-13 17:30").unwrap());
    }

    #[test]
    fn test_clock_for_keeps_real_cache_stamps() {
        let clock = clock_for(Some("2030-01-01 08:00")).unwrap();
        let real = SystemClock.now_millis();

        assert!((clock.now_millis() - real).abs() < 60_000);
    }

    #[test]
    fn test_cli_parses_estimate() {
        let cli = Cli::try_parse_from([
            "trip-eta", "estimate", "--dest-lat", "24.0", "--dest-lng", "121.5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Estimate(_)));
    }
}
