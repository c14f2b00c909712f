//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Stops the background tasks of a run.
///
/// Cancels the progress logger, if any, and waits for it to finish. Storage is
/// already committed by the aggregator at this point.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
}
