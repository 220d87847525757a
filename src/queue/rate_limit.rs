//! Cooldown gate for the routing service
//!
//! Tripped when the service answers HTTP 429. While closed, no network
//! requests are attempted. The gate reopens on its own once the cooldown
//! deadline passes.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

#[derive(Debug, Default)]
pub struct RateLimitGate {
    until: Mutex<Option<Instant>>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the gate for `cooldown`, starting now
    ///
    /// A later trip replaces the deadline.
    pub fn trip(&self, cooldown: Duration) {
        *self.lock() = Some(Instant::now() + cooldown);
    }

    /// Whether requests are currently blocked
    pub fn is_limited(&self) -> bool {
        self.remaining().is_some()
    }

    /// Time left until the gate reopens, if closed
    pub fn remaining(&self) -> Option<Duration> {
        let mut until = self.lock();
        let deadline = (*until)?;

        let now = Instant::now();
        if now < deadline {
            Some(deadline - now)
        } else {
            *until = None;
            info!("Routing cooldown elapsed, resuming network requests");
            None
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.until.lock().unwrap_or_else(|e| e.into_inner())
    }
}
