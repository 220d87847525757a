//! trip-eta: Travel-Time Estimation Engine
//!
//! A library and CLI tool for estimating drive times to a destination on top
//! of a free, rate-limited routing service.
//!
//! ## Features
//!
//! - Single-worker request queue with pacing, timeouts and an HTTP 429 cooldown
//! - Persistent, time-boxed route cache
//! - Deduplication of identical in-flight lookups
//! - Straight-line fallback when the routing service is unavailable
//! - Time-of-day, weekend and holiday traffic weighting
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trip_eta::cache::{CacheLimits, RouteCache};
//! use trip_eta::clock::SystemClock;
//! use trip_eta::estimator::{EstimatorSettings, TravelEstimator};
//! use trip_eta::geo::Coordinates;
//! use trip_eta::routing::OsrmBackend;
//!
//! # async fn run() -> trip_eta::Result<()> {
//! let estimator = TravelEstimator::new(
//!     OsrmBackend::new("https://router.project-osrm.org")?,
//!     RouteCache::in_memory(CacheLimits::default()),
//!     Arc::new(SystemClock),
//!     EstimatorSettings::default(),
//! );
//!
//! let campsite = Coordinates::new(24.0, 121.5);
//! if let Some(text) = estimator.estimate(Some(campsite), None).await {
//!     println!("Travel time: {}", text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod error;
pub mod estimator;
pub mod geo;
pub mod queue;
pub mod routing;
pub mod server;
pub mod traffic;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use estimator::{TravelEstimate, TravelEstimator, TravelTime};
pub use geo::Coordinates;
pub use traffic::smart_traffic_weight;
