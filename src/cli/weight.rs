//! Weight command handler
//!
//! Shows the traffic multiplier the estimator would apply.

use crate::cli::{clock_for, init_logging};
use crate::error::{Error, Result};
use crate::traffic::{traffic_weight_at, HolidayCalendar};
use chrono::Datelike;
use clap::Args;

/// Weight command arguments
#[derive(Args)]
pub struct WeightArgs {
    /// Trip distance in kilometers (short trips get a small bump)
    #[arg(long, short = 'd')]
    pub distance_km: Option<f64>,

    /// Local time to evaluate ("YYYY-MM-DD HH:MM", default: now)
    #[arg(long)]
    pub at: Option<String>,
}

/// Run the weight command
pub fn run(args: WeightArgs) -> Result<()> {
    init_logging("warn");

    if let Some(d) = args.distance_km {
        if !d.is_finite() || d < 0.0 {
            return Err(Error::Config(format!(
                "Distance must be a non-negative number: {}",
                d
            )));
        }
    }

    let at = clock_for(args.at.as_deref())?.now_local();
    let calendar = HolidayCalendar::taiwan();
    let weight = traffic_weight_at(at, args.distance_km, &calendar);

    println!("{:.3}", weight);

    if !calendar.covers(at.year()) {
        eprintln!(
            "Note: holiday calendar has no data for {}, holidays are not applied",
            at.year()
        );
    } else if calendar.is_holiday(at.date()) {
        eprintln!("Note: {} is a public holiday", at.date());
    }

    Ok(())
}
