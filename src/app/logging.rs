//! Progress logging utilities.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::pipeline::Progress;

/// Logs how far the run has got.
///
/// # Arguments
///
/// * `start_time` - The start time of the run
/// * `progress` - Live counters shared with the pipelines and the aggregator
pub fn log_progress(start_time: Instant, progress: &Progress) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let domains = progress.domains_read.load(Ordering::SeqCst);
    let responses = progress.responses.load(Ordering::SeqCst);
    let rows = progress.rows_appended.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        responses as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Read {} domains, resolved {} queries, stored {} rows in {:.2} seconds (~{:.2} queries/sec)",
        domains, responses, rows, elapsed_secs, rate
    );
}

/// Logs progress every `every` until `cancel` fires.
pub fn spawn_progress_logger(
    start_time: Instant,
    progress: Progress,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, &progress);
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}
