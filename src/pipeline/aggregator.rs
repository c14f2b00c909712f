//! Single consumer of the output queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::classify::classify_counted;
use crate::dns::Response;
use crate::error_handling::{DatabaseError, ErrorType, InfoType, ProcessingStats};
use crate::storage::{Store, StoreSummary};

use super::PipelineEvent;

/// Totals of one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSummary {
    pub responses: u64,
    pub completed_workers: usize,
    pub store: StoreSummary,
}

/// Classifies responses and writes them through the [`Store`].
///
/// Runs until it has seen one completion signal per worker. Every item,
/// completion signals included, counts towards the store's commit threshold.
pub struct Aggregator {
    store: Store,
    workers: usize,
    stats: Arc<ProcessingStats>,
    rows_appended: Arc<AtomicUsize>,
}

impl Aggregator {
    pub fn new(
        store: Store,
        workers: usize,
        stats: Arc<ProcessingStats>,
        rows_appended: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            store,
            workers,
            stats,
            rows_appended,
        }
    }

    /// Consumes `events` to completion, then commits and closes the store.
    ///
    /// Insert and intermediate commit failures are logged and counted; only a
    /// failure of the final commit is returned.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<PipelineEvent>,
    ) -> Result<AggregateSummary, DatabaseError> {
        let mut responses = 0u64;
        let mut completed_workers = 0usize;

        while completed_workers < self.workers {
            let Some(event) = events.recv().await else {
                warn!(
                    "Output queue closed after {} of {} workers completed",
                    completed_workers, self.workers
                );
                break;
            };

            match event {
                PipelineEvent::Response(response) => {
                    self.persist(&response).await;
                    responses += 1;
                }
                PipelineEvent::WorkerDone { worker_id } => {
                    completed_workers += 1;
                    debug!(
                        "Worker {} completed ({}/{})",
                        worker_id, completed_workers, self.workers
                    );
                }
            }

            self.store.mark_item();
            if let Err(e) = self.store.flush_if_due().await {
                warn!("Failed to commit batch: {e}");
                self.stats.increment_error(ErrorType::TransactionCommitError);
            }
        }

        let stats = Arc::clone(&self.stats);
        let store = self.store.close().await.map_err(|e| {
            stats.increment_error(ErrorType::TransactionCommitError);
            e
        })?;

        Ok(AggregateSummary {
            responses,
            completed_workers,
            store,
        })
    }

    async fn persist(&mut self, response: &Response) {
        let classification = classify_counted(response);
        for _ in 0..classification.rejected_txt {
            self.stats.increment_info(InfoType::TxtAnswerSkipped);
        }
        for record in &classification.records {
            match self.store.append(record).await {
                Ok(()) => {
                    self.rows_appended.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    warn!(
                        "Failed to insert {} record for {}: {e}",
                        record.kind, record.name
                    );
                    self.stats.increment_error(ErrorType::RecordInsertError);
                }
            }
        }
    }
}
