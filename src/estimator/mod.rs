//! Travel-time estimation
//!
//! [`TravelEstimator`] ties the engine together: it owns the route cache, the
//! deduplicator and the request queue, and turns a raw route duration into a
//! traffic-weighted, buffered, formatted estimate.
//!
//! ```text
//!  estimate(dest, origin?)
//!     │
//!     ├─ dest unusable ─────────────────────────────► None
//!     ├─ cache hit (fresh) ──────────┐
//!     ├─ cooling down ──► fallback ──┤
//!     └─ dedupe ──► queue.submit ────┤
//!                                    ▼
//!                 duration × traffic weight + buffer ──► "4 小時 39 分"
//! ```
//!
//! Lookups never fail from the caller's point of view: network problems
//! resolve through the fallback estimate and internal errors are logged and
//! reported as `None`.

pub mod format;
pub mod tracker;

use crate::cache::{CacheLimits, RouteCache, RouteCacheEntry};
use crate::clock::Clock;
use crate::config::Config;
use crate::constants::buffer::{LONG_TRIP_KM, LONG_TRIP_SECS, SHORT_TRIP_SECS};
use crate::dedup::Deduplicator;
use crate::error::{Error, Result};
use crate::geo::{distance_km, route_key, Coordinates};
use crate::queue::{QueueSettings, QueueState, RequestQueue};
use crate::routing::{FallbackEstimator, RouteEstimate, RouteSource, RoutingBackend};
use crate::traffic::smart_traffic_weight;
use format::format_duration;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, warn};

pub use tracker::TravelTime;

/// Engine settings derived from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorSettings {
    /// Origin used when the caller gives none
    pub default_origin: Coordinates,
    pub fallback: FallbackEstimator,
    pub queue: QueueSettings,
    pub cache: CacheLimits,
}

impl EstimatorSettings {
    pub fn from_config(config: &Config) -> Self {
        let routing = &config.routing;
        let estimate = &config.estimate;

        Self {
            default_origin: Coordinates::new(estimate.origin_lat, estimate.origin_lng),
            fallback: FallbackEstimator::new(estimate.winding_factor, estimate.average_speed_kmh),
            queue: QueueSettings {
                request_timeout: Duration::from_millis(routing.request_timeout_ms),
                request_delay: Duration::from_millis(routing.request_delay_ms),
                cooldown: Duration::from_secs(routing.cooldown_secs),
            },
            cache: CacheLimits {
                ttl: Duration::from_secs(config.cache.ttl_secs),
                max_entries: config.cache.max_entries,
                prune_batch: config.cache.prune_batch,
            },
        }
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Full breakdown of one estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub origin: Coordinates,
    pub destination: Coordinates,

    /// Raw driving duration in seconds
    pub duration_secs: f64,

    /// Driving distance in kilometers (straight-line based when unknown)
    pub distance_km: f64,

    /// Traffic multiplier applied to the duration
    pub weight: f64,

    /// Fixed allowance added after weighting
    pub buffer_secs: f64,

    /// Final estimate in whole seconds
    pub total_secs: u64,

    /// `total_secs` as display text
    pub formatted: String,

    /// Where the raw duration came from; `None` when served from the cache
    pub source: Option<RouteSource>,

    /// Whether the raw duration came from the cache
    pub cached: bool,
}

/// Snapshot of the engine's moving parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorStatus {
    pub rate_limited: bool,
    pub queue_state: QueueState,
    pub queue_len: usize,
    pub in_flight: usize,
    pub cache_entries: usize,
}

/// Travel-time estimation engine
///
/// Each instance has its own cache, queue and cooldown state.
pub struct TravelEstimator<B: RoutingBackend> {
    cache: Arc<Mutex<RouteCache>>,
    dedup: Deduplicator<RouteEstimate>,
    queue: RequestQueue<B>,
    clock: Arc<dyn Clock>,
    default_origin: Coordinates,
}

impl<B: RoutingBackend> TravelEstimator<B> {
    pub fn new(
        backend: B,
        cache: RouteCache,
        clock: Arc<dyn Clock>,
        settings: EstimatorSettings,
    ) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            dedup: Deduplicator::new(),
            queue: RequestQueue::new(backend, settings.fallback, settings.queue),
            clock,
            default_origin: settings.default_origin,
        }
    }

    /// Estimated travel time as display text
    ///
    /// Returns `None` when the destination is missing or unusable. A missing
    /// or unusable origin is replaced by the default origin.
    pub async fn estimate(
        &self,
        destination: Option<Coordinates>,
        origin: Option<Coordinates>,
    ) -> Option<String> {
        self.estimate_detailed(destination, origin)
            .await
            .map(|estimate| estimate.formatted)
    }

    /// Same as [`estimate`](Self::estimate) from loose coordinate parts
    pub async fn estimate_travel_time(
        &self,
        dest_lat: Option<f64>,
        dest_lng: Option<f64>,
        origin_lat: Option<f64>,
        origin_lng: Option<f64>,
    ) -> Option<String> {
        self.estimate(
            Coordinates::from_parts(dest_lat, dest_lng),
            Coordinates::from_parts(origin_lat, origin_lng),
        )
        .await
    }

    /// Estimate with the full breakdown
    pub async fn estimate_detailed(
        &self,
        destination: Option<Coordinates>,
        origin: Option<Coordinates>,
    ) -> Option<TravelEstimate> {
        let destination = destination.filter(Coordinates::is_usable)?;
        let origin = origin
            .filter(Coordinates::is_usable)
            .unwrap_or(self.default_origin);

        match self.compute(origin, destination).await {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                error!(error = %e, "Travel time estimation failed");
                None
            }
        }
    }

    async fn compute(&self, origin: Coordinates, destination: Coordinates) -> Result<TravelEstimate> {
        let key = route_key(origin, destination);

        let (route, cached) = match self.cached_route(&key) {
            Some(route) => (route, true),
            None => (self.fetch_route(&key, origin, destination).await, false),
        };

        if !route.duration_secs.is_finite() || route.duration_secs < 0.0 {
            return Err(Error::InvalidEstimate(format!(
                "route duration {} for {}",
                route.duration_secs, key
            )));
        }

        let distance = route
            .distance_km
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or_else(|| distance_km(origin, destination));
        let weight = smart_traffic_weight(self.clock.as_ref(), Some(distance));
        let buffer = buffer_secs(distance);
        let total = (route.duration_secs * weight + buffer).round();

        Ok(TravelEstimate {
            origin,
            destination,
            duration_secs: route.duration_secs,
            distance_km: distance,
            weight,
            buffer_secs: buffer,
            total_secs: total as u64,
            formatted: format_duration(total as u64),
            source: (!cached).then_some(route.source),
            cached,
        })
    }

    fn cached_route(&self, key: &str) -> Option<RouteEstimate> {
        let now = self.clock.now_millis();
        let cache = self.lock_cache();
        let entry = cache.get_fresh(key, now)?;

        debug!(key, "Route cache hit");
        Some(RouteEstimate {
            duration_secs: entry.duration,
            distance_km: entry.distance,
            source: RouteSource::Remote,
        })
    }

    async fn fetch_route(
        &self,
        key: &str,
        origin: Coordinates,
        destination: Coordinates,
    ) -> RouteEstimate {
        if self.queue.is_rate_limited() {
            debug!(key, "Routing cooling down, using fallback estimate");
            let route = self.queue.fallback().estimate(origin, destination);
            self.store(key, &route).await;
            return route;
        }

        self.dedup
            .dedupe(key, move || async move {
                let route = self.queue.submit(origin, destination).await;
                self.store(key, &route).await;
                route
            })
            .await
    }

    /// Record a route; the cache file is written on the blocking pool
    async fn store(&self, key: &str, route: &RouteEstimate) {
        if !route.duration_secs.is_finite() {
            return;
        }

        let entry = RouteCacheEntry::new(
            key,
            route.duration_secs,
            route.distance_km.filter(|d| d.is_finite() && *d > 0.0),
            self.clock.now_millis(),
        );

        let cache = Arc::clone(&self.cache);
        let write = tokio::task::spawn_blocking(move || lock(&cache).put(entry));
        if let Err(e) = write.await {
            warn!(key, error = %e, "Route cache write did not complete");
        }
    }

    pub fn status(&self) -> EstimatorStatus {
        EstimatorStatus {
            rate_limited: self.queue.is_rate_limited(),
            queue_state: self.queue.state(),
            queue_len: self.queue.len(),
            in_flight: self.dedup.in_flight(),
            cache_entries: self.lock_cache().len(),
        }
    }

    pub fn default_origin(&self) -> Coordinates {
        self.default_origin
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn backend(&self) -> &B {
        self.queue.backend()
    }

    fn lock_cache(&self) -> MutexGuard<'_, RouteCache> {
        lock(&self.cache)
    }
}

fn lock(cache: &Mutex<RouteCache>) -> MutexGuard<'_, RouteCache> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fixed allowance for parking and the last stretch
pub fn buffer_secs(distance_km: f64) -> f64 {
    if distance_km < LONG_TRIP_KM {
        SHORT_TRIP_SECS
    } else {
        LONG_TRIP_SECS
    }
}
