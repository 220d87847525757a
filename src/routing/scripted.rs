//! Scripted routing backend
//!
//! Answers from a fixed script instead of the network, for deterministic
//! tests of the queue and the estimator.

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::routing::{RouteEstimate, RoutingBackend};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted answer
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    /// A successful route
    Route {
        duration_secs: f64,
        distance_km: Option<f64>,
    },
    /// HTTP 429
    RateLimited,
    /// Any other failure
    Fail(String),
    /// Never answers
    Stall,
    /// Panics inside the call
    Panic,
}

/// Routing backend that replays a script
#[derive(Debug)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedReply>>,
    /// Answer once the script runs out
    default: ScriptedReply,
    latency: Duration,
    requests: Mutex<Vec<(Coordinates, Coordinates)>>,
}

impl ScriptedBackend {
    /// Backend that always gives `reply`
    pub fn new(reply: ScriptedReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: reply,
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend with no network at all
    pub fn offline() -> Self {
        Self::new(ScriptedReply::Fail("offline".to_string()))
    }

    /// Backend that always finds a route
    pub fn route(duration_secs: f64, distance_km: Option<f64>) -> Self {
        Self::new(ScriptedReply::Route {
            duration_secs,
            distance_km,
        })
    }

    /// Play `replies` in order before falling back to the default answer
    pub fn with_script(self, replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        *lock(&self.script) = replies.into_iter().collect();
        self
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<(Coordinates, Coordinates)> {
        lock(&self.requests).clone()
    }
}

impl RoutingBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteEstimate> {
        lock(&self.requests).push((origin, destination));
        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            ScriptedReply::Route {
                duration_secs,
                distance_km,
            } => Ok(RouteEstimate::remote(duration_secs, distance_km)),
            ScriptedReply::RateLimited => Err(Error::RateLimited),
            ScriptedReply::Fail(message) => Err(Error::Routing(message)),
            ScriptedReply::Stall => {
                std::future::pending::<()>().await;
                Err(Error::Routing("stalled".to_string()))
            }
            ScriptedReply::Panic => panic!("scripted backend panic"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Coordinates {
        Coordinates::new(25.0, 121.0)
    }

    fn b() -> Coordinates {
        Coordinates::new(24.0, 121.5)
    }

    #[tokio::test]
    async fn test_script_then_default() {
        let backend = ScriptedBackend::route(600.0, Some(10.0))
            .with_script([ScriptedReply::RateLimited, ScriptedReply::Fail("boom".to_string())]);

        assert!(matches!(backend.route(a(), b()).await, Err(Error::RateLimited)));
        assert!(matches!(backend.route(a(), b()).await, Err(Error::Routing(_))));
        let estimate = backend.route(a(), b()).await.unwrap();

        assert_eq!(estimate.duration_secs, 600.0);
        assert_eq!(backend.calls(), 3);
        assert_eq!(backend.requests()[0], (a(), b()));
    }

    #[tokio::test]
    async fn test_offline_always_fails() {
        let backend = ScriptedBackend::offline();
        assert!(backend.route(a(), b()).await.is_err());
        assert!(backend.route(a(), b()).await.is_err());
    }
}
