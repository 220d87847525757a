//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "routing.cooldown_secs")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    #[arg(requires = "key")]
    pub value: Option<String>,

    /// Show config file path
    #[arg(long, conflicts_with_all = ["key", "reset", "keys"])]
    pub path: bool,

    /// List the settable keys
    #[arg(long, conflicts_with_all = ["key", "reset"])]
    pub keys: bool,

    /// Reset config to defaults
    #[arg(long, conflicts_with = "key")]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    let Some(key) = args.key else {
        show_all_config(&config);
        return Ok(());
    };

    match args.value {
        Some(value) => {
            config.set(&key, &value)?;
            config.save()?;
            // Echo the stored form (e.g. base_url without its trailing slash)
            println!("{} = {}", key, config.get(&key).unwrap_or(value));
        }
        None => {
            let value = config.get(&key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {} (available: {})",
                    key,
                    Config::available_keys().join(", ")
                ))
            })?;
            println!("{}", value);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[routing]");
    println!("base_url = \"{}\"", config.routing.base_url);
    println!("request_timeout_ms = {}", config.routing.request_timeout_ms);
    println!("request_delay_ms = {}", config.routing.request_delay_ms);
    println!("cooldown_secs = {}", config.routing.cooldown_secs);
    println!();

    println!("[cache]");
    println!("ttl_secs = {}", config.cache.ttl_secs);
    println!("max_entries = {}", config.cache.max_entries);
    println!("prune_batch = {}", config.cache.prune_batch);
    if config.cache.path.is_empty() {
        println!("path = \"\" # default cache directory");
    } else {
        println!("path = \"{}\"", config.cache.path);
    }
    println!();

    println!("[estimate]");
    println!("origin_lat = {}", config.estimate.origin_lat);
    println!("origin_lng = {}", config.estimate.origin_lng);
    println!("winding_factor = {}", config.estimate.winding_factor);
    println!("average_speed_kmh = {}", config.estimate.average_speed_kmh);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
}
