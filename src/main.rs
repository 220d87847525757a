//! trip-eta CLI entry point
//!
//! Travel-time estimates - CLI + HTTP API

use trip_eta::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
