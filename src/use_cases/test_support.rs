use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Observation, Policy, PolicyError, RawAction};

// Always answers with the same raw action.
pub(crate) struct FixedPolicy(pub(crate) RawAction);

#[async_trait]
impl Policy for FixedPolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        Ok(self.0)
    }
}

// Always fails with the configured error.
pub(crate) struct FailingPolicy(pub(crate) PolicyError);

#[async_trait]
impl Policy for FailingPolicy {
    fn name(&self) -> &str {
        "failing"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        Err(self.0.clone())
    }
}

// Never resolves; only a deadline can get a tick past it.
pub(crate) struct StalledPolicy;

#[async_trait]
impl Policy for StalledPolicy {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        std::future::pending().await
    }
}

// Sleeps for a fixed latency and records how many calls overlap.
pub(crate) struct TrackingPolicy {
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl TrackingPolicy {
    pub(crate) fn new(latency: Duration) -> Self {
        Self {
            latency,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

// Decrements the in-flight count even when the call is cancelled mid-await.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Policy for TrackingPolicy {
    fn name(&self) -> &str {
        "tracking"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        tokio::time::sleep(self.latency).await;
        Ok(RawAction {
            steer: 0.0,
            accel: 0.0,
        })
    }
}
