//! Straight-line fallback estimate
//!
//! Used whenever the routing service is rate limited, slow or unreachable.

use crate::config::defaults::{DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_WINDING_FACTOR};
use crate::geo::{distance_km, Coordinates};
use crate::routing::RouteEstimate;

/// Haversine distance stretched by a winding factor, driven at a fixed speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackEstimator {
    /// Road distance / straight-line distance
    pub winding_factor: f64,
    pub average_speed_kmh: f64,
}

impl FallbackEstimator {
    pub fn new(winding_factor: f64, average_speed_kmh: f64) -> Self {
        Self {
            winding_factor,
            average_speed_kmh,
        }
    }

    /// Estimate a drive between two points. Never fails.
    pub fn estimate(&self, origin: Coordinates, destination: Coordinates) -> RouteEstimate {
        let distance = distance_km(origin, destination) * self.winding_factor;
        let duration = distance / self.average_speed_kmh * 3600.0;

        RouteEstimate::fallback(duration, distance)
    }
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDING_FACTOR, DEFAULT_AVERAGE_SPEED_KMH)
    }
}
