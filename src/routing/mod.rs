//! Route lookup backends
//!
//! This module defines the `RoutingBackend` trait and the result type shared by
//! the remote routing service and the local fallback estimate.
//!
//! ## Flex Point
//! Adding a new routing service requires:
//! 1. Create `src/routing/{service}.rs` implementing `RoutingBackend`
//! 2. Add `pub mod {service};` below
//! 3. Construct it in `cli::build_estimator`

pub mod fallback;
pub mod osrm;
#[cfg(test)]
pub mod scripted;

use crate::error::Result;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

pub use fallback::FallbackEstimator;
pub use osrm::OsrmBackend;
#[cfg(test)]
pub use scripted::{ScriptedBackend, ScriptedReply};

/// Where a route estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// Answered by the routing service
    Remote,
    /// Straight-line estimate
    Fallback,
}

/// Raw driving duration and distance for one origin/destination pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    /// Driving time in seconds, before traffic weighting
    pub duration_secs: f64,

    /// Driving distance in kilometers, if known
    pub distance_km: Option<f64>,

    pub source: RouteSource,
}

impl RouteEstimate {
    /// Estimate returned by the routing service
    pub fn remote(duration_secs: f64, distance_km: Option<f64>) -> Self {
        Self {
            duration_secs,
            distance_km,
            source: RouteSource::Remote,
        }
    }

    /// Estimate computed locally
    pub fn fallback(duration_secs: f64, distance_km: f64) -> Self {
        Self {
            duration_secs,
            distance_km: Some(distance_km),
            source: RouteSource::Fallback,
        }
    }
}

/// Trait for remote routing services
///
/// Implementations must be thread-safe (Send + Sync) so the request queue can
/// drive them from its worker task.
pub trait RoutingBackend: Send + Sync + 'static {
    /// Returns the backend name (e.g., "osrm")
    fn name(&self) -> &'static str;

    /// Look up a driving route
    ///
    /// Must return `Error::RateLimited` when the service answers HTTP 429 so
    /// the queue can enter its cooldown.
    fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> impl Future<Output = Result<RouteEstimate>> + Send;
}

impl<B: RoutingBackend> RoutingBackend for Arc<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> impl Future<Output = Result<RouteEstimate>> + Send {
        (**self).route(origin, destination)
    }
}
