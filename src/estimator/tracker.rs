//! Observable travel-time state
//!
//! [`TravelTime`] holds the latest estimate text and a loading flag for one
//! consumer (a page, a widget, a terminal line). Both are published through
//! `tokio::sync::watch` so any number of readers can follow them.

use crate::estimator::TravelEstimator;
use crate::geo::Coordinates;
use crate::routing::RoutingBackend;
use tokio::sync::watch;

/// Latest travel-time text and whether a lookup is running
#[derive(Debug)]
pub struct TravelTime {
    travel_time: watch::Sender<Option<String>>,
    loading: watch::Sender<bool>,
}

impl TravelTime {
    pub fn new() -> Self {
        let (travel_time, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);

        Self {
            travel_time,
            loading,
        }
    }

    /// Follow the estimate text
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.travel_time.subscribe()
    }

    /// Follow the loading flag
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn current(&self) -> Option<String> {
        self.travel_time.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Run an estimate and publish the result
    ///
    /// `loading` is true for the duration of the call, including when the
    /// call is abandoned part way.
    pub async fn fetch<B: RoutingBackend>(
        &self,
        estimator: &TravelEstimator<B>,
        destination: Option<Coordinates>,
        origin: Option<Coordinates>,
    ) -> Option<String> {
        self.loading.send_replace(true);
        let _loading = LoadingGuard(&self.loading);

        let text = estimator.estimate(destination, origin).await;
        self.travel_time.send_replace(text.clone());
        text
    }
}

impl Default for TravelTime {
    fn default() -> Self {
        Self::new()
    }
}

struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}
