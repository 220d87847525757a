//! Rate-limited routing request queue
//!
//! Serializes every call to the routing service through one worker task so
//! requests are paced below the service's rate limit.
//!
//! ```text
//!  submit() ──► [ tail ... head ] ──► worker ──► backend.route()  (timeout)
//!                                        │            │
//!                                        │      ok ───┴──► reply remote, pause
//!                                        │     429 ──────► trip gate, reply fallback
//!                                        │   error ──────► reply fallback
//!                                        │
//!                                        └── gate closed ──► pop, reply fallback
//! ```
//!
//! The worker is spawned on demand by `submit` and exits when the queue runs
//! empty. The running flag is checked and set under the same lock as the
//! push, so there is never more than one worker. Every item gets exactly one
//! reply: failures resolve through the fallback estimate rather than an error.

pub mod rate_limit;

use crate::config::defaults::{
    DEFAULT_COOLDOWN_SECS, DEFAULT_REQUEST_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::routing::{FallbackEstimator, RouteEstimate, RoutingBackend};
use rate_limit::RateLimitGate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Timing parameters for the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Abort a routing call after this long
    pub request_timeout: Duration,

    /// Pause after each successful call
    pub request_delay: Duration,

    /// Network pause after an HTTP 429
    pub cooldown: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
        }
    }
}

/// Whether a worker is currently draining the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Idle,
    Processing,
}

struct QueueItem {
    origin: Coordinates,
    destination: Coordinates,
    reply: oneshot::Sender<RouteEstimate>,
}

struct Slots {
    items: VecDeque<QueueItem>,
    processing: bool,
}

struct Shared<B> {
    backend: B,
    fallback: FallbackEstimator,
    settings: QueueSettings,
    gate: RateLimitGate,
    slots: Mutex<Slots>,
}

/// What the worker does next
enum Step {
    /// Queue empty; worker has marked itself idle
    Exit,
    /// Gate closed; answer this item locally
    Drain(QueueItem),
    /// Try the network for the head item (still queued)
    Attempt(Coordinates, Coordinates),
}

/// FIFO queue in front of a routing backend
pub struct RequestQueue<B: RoutingBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: RoutingBackend> RequestQueue<B> {
    pub fn new(backend: B, fallback: FallbackEstimator, settings: QueueSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                fallback,
                settings,
                gate: RateLimitGate::new(),
                slots: Mutex::new(Slots {
                    items: VecDeque::new(),
                    processing: false,
                }),
            }),
        }
    }

    /// Queue a route lookup and wait for its answer
    ///
    /// Never fails: rate limiting, timeouts and service errors all resolve to
    /// the fallback estimate. Must be called from within a tokio runtime.
    pub async fn submit(&self, origin: Coordinates, destination: Coordinates) -> RouteEstimate {
        let (reply, rx) = oneshot::channel();
        self.enqueue(QueueItem {
            origin,
            destination,
            reply,
        });

        match rx.await {
            Ok(estimate) => estimate,
            // Worker vanished (runtime shutting down); answer locally.
            Err(_) => self.shared.fallback.estimate(origin, destination),
        }
    }

    fn enqueue(&self, item: QueueItem) {
        let start_worker = {
            let mut slots = self.shared.lock_slots();
            slots.items.push_back(item);
            !std::mem::replace(&mut slots.processing, true)
        };

        if start_worker {
            debug!("Starting routing queue worker");
            tokio::spawn(run_worker(Arc::clone(&self.shared)));
        }
    }

    /// Items waiting or in progress
    pub fn len(&self) -> usize {
        self.shared.lock_slots().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> QueueState {
        if self.shared.lock_slots().processing {
            QueueState::Processing
        } else {
            QueueState::Idle
        }
    }

    /// Whether the cooldown after an HTTP 429 is active
    pub fn is_rate_limited(&self) -> bool {
        self.shared.gate.is_limited()
    }

    /// Time left in the current cooldown
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        self.shared.gate.remaining()
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    pub fn fallback(&self) -> &FallbackEstimator {
        &self.shared.fallback
    }

    pub fn settings(&self) -> QueueSettings {
        self.shared.settings
    }
}

impl<B> Shared<B> {
    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_step(&self) -> Step {
        let mut slots = self.lock_slots();

        let head = slots.items.front().map(|h| (h.origin, h.destination));
        let Some((origin, destination)) = head else {
            slots.processing = false;
            return Step::Exit;
        };

        if self.gate.is_limited() {
            match slots.items.pop_front() {
                Some(item) => Step::Drain(item),
                None => Step::Exit,
            }
        } else {
            Step::Attempt(origin, destination)
        }
    }

    /// Remove the head item and send it `estimate`
    fn resolve_head(&self, estimate: RouteEstimate) {
        let head = self.lock_slots().items.pop_front();
        if let Some(item) = head {
            // The caller may have given up; the answer is simply dropped.
            let _ = item.reply.send(estimate);
        }
    }
}

/// Answers whatever is left if the worker stops before the queue is empty
///
/// Covers a panicking backend and a task aborted at runtime shutdown. Without
/// it the running flag would stay set and later submits would never be served.
struct WorkerGuard<'a, B> {
    shared: &'a Shared<B>,
    finished: bool,
}

impl<B> Drop for WorkerGuard<'_, B> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let stranded: Vec<QueueItem> = {
            let mut slots = self.shared.lock_slots();
            slots.processing = false;
            slots.items.drain(..).collect()
        };

        warn!(
            stranded = stranded.len(),
            "Routing queue worker stopped unexpectedly, answering with fallback estimates"
        );
        for item in stranded {
            let estimate = self.shared.fallback.estimate(item.origin, item.destination);
            let _ = item.reply.send(estimate);
        }
    }
}

async fn run_worker<B: RoutingBackend>(shared: Arc<Shared<B>>) {
    let mut guard = WorkerGuard {
        shared: &shared,
        finished: false,
    };

    loop {
        match shared.next_step() {
            Step::Exit => {
                guard.finished = true;
                debug!("Routing queue empty, worker exiting");
                return;
            }
            Step::Drain(item) => {
                let estimate = shared.fallback.estimate(item.origin, item.destination);
                let _ = item.reply.send(estimate);
            }
            Step::Attempt(origin, destination) => {
                match attempt(&shared, origin, destination).await {
                    Ok(estimate) => {
                        shared.resolve_head(estimate);
                        tokio::time::sleep(shared.settings.request_delay).await;
                    }
                    Err(e) => {
                        if matches!(e, Error::RateLimited) {
                            warn!(
                                cooldown_secs = shared.settings.cooldown.as_secs(),
                                "Routing service rate limit hit, entering cooldown"
                            );
                            shared.gate.trip(shared.settings.cooldown);
                        }
                        warn!(error = %e, "Routing request failed, using fallback estimate");
                        shared.resolve_head(shared.fallback.estimate(origin, destination));
                    }
                }
            }
        }
    }
}

async fn attempt<B: RoutingBackend>(
    shared: &Shared<B>,
    origin: Coordinates,
    destination: Coordinates,
) -> Result<RouteEstimate> {
    let timeout = shared.settings.request_timeout;

    tokio::time::timeout(timeout, shared.backend.route(origin, destination))
        .await
        .map_err(|_| Error::Timeout(timeout))?
}
