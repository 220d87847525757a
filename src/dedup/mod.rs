//! In-flight request deduplication
//!
//! Concurrent lookups for the same key share one underlying request. The first
//! caller registers the key and runs the work; later callers subscribe to a
//! broadcast channel and receive a copy of the result.
//!
//! ```text
//!   dedupe(key) ──► registered? ──yes──► subscribe ──► wait for result
//!                        │
//!                        no
//!                        ▼
//!                 register key ──► run factory ──► deregister ──► broadcast
//! ```
//!
//! The registration is removed as soon as the work settles, so callers that
//! arrive afterwards start a fresh request. If the owning future is dropped
//! mid-flight the registration is removed by a guard and waiting callers
//! retry, one of them becoming the new owner.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;

struct Pending<T> {
    /// Distinguishes successive registrations of the same key
    id: u64,
    tx: broadcast::Sender<T>,
}

enum Registration<'a, T: Clone + Send + 'static> {
    Owner(OwnerGuard<'a, T>),
    Waiter(broadcast::Receiver<T>),
}

/// Registry of in-flight requests keyed by dedup key
pub struct Deduplicator<T: Clone> {
    pending: Mutex<HashMap<String, Pending<T>>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + 'static> Deduplicator<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Run `factory` for `key` unless an identical request is already running
    ///
    /// All callers for the same key get the same value; `factory` runs once per
    /// in-flight period.
    pub async fn dedupe<F, Fut>(&self, key: &str, factory: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let mut rx = match self.register(key) {
                Registration::Owner(guard) => {
                    let value = factory().await;
                    guard.complete(value.clone());
                    return value;
                }
                Registration::Waiter(rx) => rx,
            };

            debug!(key, "Joining in-flight request");
            match rx.recv().await {
                Ok(value) => return value,
                Err(_) => {
                    debug!(key, "In-flight request abandoned, retrying");
                    continue;
                }
            }
        }
    }

    /// Number of keys with a request in flight
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Whether `key` has a request in flight
    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn register(&self, key: &str) -> Registration<'_, T> {
        let mut pending = self.lock();

        if let Some(existing) = pending.get(key) {
            return Registration::Waiter(existing.tx.subscribe());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Exactly one value is ever sent per registration.
        let (tx, _) = broadcast::channel(1);
        pending.insert(key.to_string(), Pending { id, tx: tx.clone() });

        Registration::Owner(OwnerGuard {
            registry: self,
            key: key.to_string(),
            id,
            tx,
        })
    }

    /// Remove `key` if it still belongs to registration `id`
    fn deregister(&self, key: &str, id: u64) {
        let mut pending = self.lock();
        if pending.get(key).is_some_and(|p| p.id == id) {
            pending.remove(key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Pending<T>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone + Send + 'static> Default for Deduplicator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by the caller that runs the work for a key
struct OwnerGuard<'a, T: Clone + Send + 'static> {
    registry: &'a Deduplicator<T>,
    key: String,
    id: u64,
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> OwnerGuard<'_, T> {
    /// Deregister, then hand the value to everyone waiting
    fn complete(self, value: T) {
        self.registry.deregister(&self.key, self.id);
        // No receivers just means nobody joined.
        let _ = self.tx.send(value);
    }
}

impl<T: Clone + Send + 'static> Drop for OwnerGuard<'_, T> {
    fn drop(&mut self) {
        self.registry.deregister(&self.key, self.id);
    }
}
