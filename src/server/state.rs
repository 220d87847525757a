//! Server shared state
//!
//! Holds configuration and the estimation engine shared by all handlers.

use crate::config::Config;
use crate::estimator::TravelEstimator;
use crate::routing::RoutingBackend;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<B: RoutingBackend> {
    /// Configuration
    pub config: Config,

    /// Estimation engine
    pub estimator: TravelEstimator<B>,

    started: Instant,
}

impl<B: RoutingBackend> AppState<B> {
    /// Create new application state
    pub fn new(config: Config, estimator: TravelEstimator<B>) -> Self {
        Self {
            config,
            estimator,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
