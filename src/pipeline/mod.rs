//! Collection pipelines.
//!
//! One pipeline is a fan-out producer paired with one [`Worker`]: the producer
//! pulls domains from the shared domain feed, expands each into its four
//! queries and hands them to its worker through a small bounded queue. All
//! workers push into one shared output queue drained by the single
//! [`Aggregator`], which is the only writer to storage.

mod aggregator;
mod fanout;
mod worker;

use std::num::NonZeroU32;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::QUERY_QUEUE_DEPTH;
use crate::dns::{Resolver, Response};

pub use aggregator::{AggregateSummary, Aggregator};
pub use fanout::fan_out;
pub use worker::Worker;

/// Item carried on the shared output queue.
#[derive(Debug)]
pub enum PipelineEvent {
    /// Outcome of one query.
    Response(Response),
    /// Sent exactly once by each worker after its input queue is exhausted.
    WorkerDone { worker_id: usize },
}

/// Live counters, read by the progress logger.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub domains_read: Arc<AtomicUsize>,
    pub responses: Arc<AtomicUsize>,
    pub rows_appended: Arc<AtomicUsize>,
}

/// Domain feed shared by every fan-out producer.
pub type SharedDomains = Arc<Mutex<mpsc::Receiver<String>>>;

/// Starts one pipeline per resolver.
///
/// Returns the join handles of every producer and worker task. The output
/// sender is moved into the workers, so the output queue closes once all of
/// them have finished.
pub fn spawn_pipelines(
    resolvers: Vec<Resolver>,
    domains: mpsc::Receiver<String>,
    queries_per_second: NonZeroU32,
    output: mpsc::Sender<PipelineEvent>,
    progress: &Progress,
) -> Vec<JoinHandle<()>> {
    let domains: SharedDomains = Arc::new(Mutex::new(domains));
    let mut handles = Vec::with_capacity(resolvers.len() * 2);

    for (worker_id, resolver) in resolvers.into_iter().enumerate() {
        let (query_tx, query_rx) = mpsc::channel(QUERY_QUEUE_DEPTH);

        let feed = Arc::clone(&domains);
        handles.push(tokio::spawn(async move {
            fan_out(feed, query_tx).await;
        }));

        let worker = Worker::new(worker_id, resolver, queries_per_second);
        let output = output.clone();
        let responses = Arc::clone(&progress.responses);
        handles.push(tokio::spawn(async move {
            worker.run(query_rx, output, responses).await;
        }));
    }

    handles
}
