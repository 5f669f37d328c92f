//! Minimum-spacing governor for the catalog source.
//!
//! The catalog API publishes a minimum interval between requests; every
//! catalog call in the process goes through one shared governor. Governance
//! is purely delay-based: a call is never rejected, only held back.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a fixed minimum interval between grants.
///
/// Shared via `Arc`; one instance per rate-limited upstream. The lock is
/// held across the wait, so concurrent callers are serialized and granted
/// strictly in arrival order (the tokio mutex is FIFO-fair).
#[derive(Debug)]
pub struct RateGovernor {
    /// Minimum spacing between grants
    min_interval: Duration,
    /// Timestamp of the last grant
    last_grant: Mutex<Option<Instant>>,
}

impl RateGovernor {
    /// Create a new governor with the given minimum spacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Create a governor from an interval in milliseconds
    pub fn from_millis(min_interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_interval_ms))
    }

    /// Suspend until enough time has passed since the last grant, then
    /// record this grant.
    pub async fn acquire(&self) {
        let mut last = self.last_grant.lock().await;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait.as_millis() as u64,
                    "Rate governor: waiting for minimum request spacing"
                );
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }
}
