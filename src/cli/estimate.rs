//! Estimate command handler
//!
//! Prints the travel time to a destination.

use crate::cli::{build_estimator, clock_for, init_logging};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::estimator::TravelEstimate;
use crate::geo::Coordinates;
use crate::routing::RouteSource;
use clap::Args;

/// Estimate command arguments
#[derive(Args)]
pub struct EstimateArgs {
    /// Destination latitude
    #[arg(long, allow_hyphen_values = true)]
    pub dest_lat: f64,

    /// Destination longitude
    #[arg(long, allow_hyphen_values = true)]
    pub dest_lng: f64,

    /// Origin latitude (default: estimate.origin_lat)
    #[arg(long, requires = "origin_lng", allow_hyphen_values = true)]
    pub origin_lat: Option<f64>,

    /// Origin longitude (default: estimate.origin_lng)
    #[arg(long, requires = "origin_lat", allow_hyphen_values = true)]
    pub origin_lng: Option<f64>,

    /// Evaluate traffic at this local time ("YYYY-MM-DD HH:MM") instead of now
    #[arg(long)]
    pub at: Option<String>,

    /// Print the full breakdown as JSON
    #[arg(long)]
    pub json: bool,

    /// Show how the estimate was built
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Run the estimate command
pub async fn run(args: EstimateArgs) -> Result<()> {
    init_logging("warn");

    let destination = Coordinates::new(args.dest_lat, args.dest_lng);
    destination.validate()?;

    let origin = match (args.origin_lat, args.origin_lng) {
        (Some(lat), Some(lng)) => {
            let origin = Coordinates::new(lat, lng);
            origin.validate()?;
            Some(origin)
        }
        _ => None,
    };

    let config = Config::load()?;
    let estimator = build_estimator(&config, clock_for(args.at.as_deref())?)?;

    let estimate = estimator
        .estimate_detailed(Some(destination), origin)
        .await
        .ok_or_else(|| {
            Error::InvalidEstimate(format!(
                "No estimate for destination {:.4}, {:.4}",
                destination.lat, destination.lng
            ))
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else if args.verbose {
        print_breakdown(&estimate);
    } else {
        println!("{}", estimate.formatted);
    }

    Ok(())
}

fn print_breakdown(estimate: &TravelEstimate) {
    let source = match (estimate.cached, estimate.source) {
        (true, _) => "cache",
        (false, Some(RouteSource::Remote)) => "routing service",
        (false, Some(RouteSource::Fallback)) | (false, None) => "straight-line fallback",
    };

    println!("Travel time: {}", estimate.formatted);
    println!();
    println!(
        "  From:     {:.4}, {:.4}",
        estimate.origin.lat, estimate.origin.lng
    );
    println!(
        "  To:       {:.4}, {:.4}",
        estimate.destination.lat, estimate.destination.lng
    );
    println!("  Distance: {:.1} km", estimate.distance_km);
    println!(
        "  Driving:  {:.0} min ({})",
        estimate.duration_secs / 60.0,
        source
    );
    println!("  Traffic:  x{:.3}", estimate.weight);
    println!("  Buffer:   {:.0} min", estimate.buffer_secs / 60.0);
    println!("  Total:    {} s", estimate.total_secs);
}
