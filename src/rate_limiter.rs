//! Per-worker query pacing.
//!
//! Each worker owns one [`RateLimiter`]; nothing is shared between workers, so
//! the aggregate rate of a run is `queries_per_second * jobs`.

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum spacing between consecutive queries of one worker.
///
/// `wait()` returns immediately the first time. Afterwards it sleeps until at
/// least `1 / queries_per_second` has passed since the previous `wait()`
/// returned, then records the current instant as the new baseline.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_query: Option<Instant>,
}

impl RateLimiter {
    pub fn new(queries_per_second: NonZeroU32) -> Self {
        Self {
            interval: Duration::from_secs(1) / queries_per_second.get(),
            last_query: None,
        }
    }

    /// Minimum spacing between two queries.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn wait(&mut self) {
        if let Some(last) = self.last_query {
            // sleep_until returns immediately when the deadline is already past
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last_query = Some(Instant::now());
    }
}
