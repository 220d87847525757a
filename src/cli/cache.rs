//! Cache command handler
//!
//! View and manage the persistent route cache.

use crate::cache::{RouteCache, RouteCacheEntry};
use crate::cli::init_logging;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::estimator::EstimatorSettings;
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};

/// Cache command arguments
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheCommand>,
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached routes, newest first
    Show {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Remove expired entries, then trim to the size limit
    Prune,
    /// Remove all entries
    Clear,
    /// Print the cache file path
    Path,
}

/// Run the cache command
pub fn run(args: CacheArgs) -> Result<()> {
    init_logging("warn");

    let config = Config::load()?;
    let command = args.command.unwrap_or(CacheCommand::Show { count: 10 });

    if let CacheCommand::Path = command {
        println!("{}", config.cache_path()?.display());
        return Ok(());
    }

    let limits = EstimatorSettings::from_config(&config).cache;
    let mut cache = RouteCache::load_from(config.cache_path()?, limits);
    let now = SystemClock.now_millis();

    match command {
        CacheCommand::Show { count } => show_entries(&cache, count, now),
        CacheCommand::Prune => {
            let expired = cache.prune_expired(now);
            let evicted = cache.prune();
            println!(
                "Removed {} expired and {} excess entries ({} left).",
                expired,
                evicted,
                cache.len()
            );
        }
        CacheCommand::Clear => {
            let count = cache.len();
            cache.clear();
            println!("Cleared {} cached routes.", count);
        }
        CacheCommand::Path => {}
    }

    Ok(())
}

/// List the newest `count` entries
fn show_entries(cache: &RouteCache, count: usize, now_ms: i64) {
    if cache.is_empty() {
        println!("Route cache is empty.");
        return;
    }

    println!(
        "Cached routes ({} of {}):\n",
        count.min(cache.len()),
        cache.len()
    );

    let ttl = cache.limits().ttl;
    for entry in cache.entries().into_iter().take(count) {
        let state = if entry.is_fresh(now_ms, ttl) {
            "fresh"
        } else {
            "expired"
        };
        println!("  {}\n    {} | {}\n", entry.key, describe(entry), state);
    }
}

fn describe(entry: &RouteCacheEntry) -> String {
    let written = DateTime::from_timestamp_millis(entry.timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| entry.timestamp.to_string());

    let distance = entry
        .distance
        .map(|d| format!("{:.1} km", d))
        .unwrap_or_else(|| "? km".to_string());

    format!(
        "{:.0} min, {} | written {}",
        entry.duration / 60.0,
        distance,
        written
    )
}
