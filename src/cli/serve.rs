//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::cli::{build_estimator, init_logging};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::server::{self, state::AppState};
use clap::Args;
use std::sync::Arc;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    init_logging("info");

    // Load and optionally override config
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let estimator = build_estimator(&config, Arc::new(SystemClock))?;

    info!(
        "Starting trip-eta server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );

    server::run(AppState::new(config, estimator)).await
}
