//! Query worker.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::dns::{Query, Resolver};
use crate::rate_limiter::RateLimiter;

use super::PipelineEvent;

/// Resolves the queries of one pipeline at its own pace.
pub struct Worker {
    id: usize,
    resolver: Resolver,
    limiter: RateLimiter,
}

impl Worker {
    pub fn new(id: usize, resolver: Resolver, queries_per_second: NonZeroU32) -> Self {
        Self {
            id,
            resolver,
            limiter: RateLimiter::new(queries_per_second),
        }
    }

    /// Drains `queries`, emitting one response per query, then one
    /// [`PipelineEvent::WorkerDone`].
    ///
    /// If `output` is closed the worker stops at once and sends nothing more.
    /// Returns the number of responses emitted.
    pub async fn run(
        mut self,
        mut queries: mpsc::Receiver<Query>,
        output: mpsc::Sender<PipelineEvent>,
        responses: Arc<AtomicUsize>,
    ) -> usize {
        let mut emitted = 0;
        while let Some(query) = queries.recv().await {
            self.limiter.wait().await;
            let response = self.resolver.resolve(query).await;
            if output.send(PipelineEvent::Response(response)).await.is_err() {
                warn!("Worker {}: output queue closed, stopping", self.id);
                return emitted;
            }
            emitted += 1;
            responses.fetch_add(1, Ordering::SeqCst);
        }

        debug!("Worker {} done after {} responses", self.id, emitted);
        if output
            .send(PipelineEvent::WorkerDone { worker_id: self.id })
            .await
            .is_err()
        {
            warn!("Worker {}: output queue closed before completion signal", self.id);
        }
        emitted
    }
}
