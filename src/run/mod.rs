//! Collection run orchestration.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::{
    print_error_statistics, print_simple_summary, shutdown_gracefully, spawn_progress_logger,
};
use crate::config::{Config, DOMAIN_FEED_CAPACITY, OUTPUT_QUEUE_CAPACITY, PROGRESS_INTERVAL};
use crate::error_handling::ProcessingStats;
use crate::initialization::{init_worker_resolver, resolve_server_address};
use crate::pipeline::{spawn_pipelines, Aggregator, Progress};
use crate::source::DomainSource;
use crate::storage::{checkpoint_wal, init_db_pool_with_path, run_migrations, BatchConfig, Store};

/// Results of a collection run.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    /// Domains read from the source
    pub domains: usize,
    /// Query outcomes received by the aggregator (four per domain)
    pub responses: u64,
    /// Rows committed to the `records` table
    pub rows_written: u64,
    /// Transactions committed
    pub commits: u64,
    /// Path to the SQLite database containing results
    pub db_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Runs a collection with the provided configuration.
///
/// This is the main entry point for the library. It reads domains from the
/// configured source, resolves DS, SPF, DKIM and DMARC for each of them and
/// stores the outcomes in a SQLite database.
///
/// # Errors
///
/// This function will return an error, before any query is sent, if:
/// - The domain source cannot be opened or is not a single-CSV archive
/// - The resolver address cannot be resolved
/// - Database initialization or migration fails
///
/// It also fails if the final transaction cannot be committed. Per-query
/// failures are never errors: they are stored as SERVFAIL outcomes.
///
/// # Example
///
/// ```no_run
/// use domain_signals::{Config, run_collection};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     file: PathBuf::from("opendata.zip"),
///     db: PathBuf::from("signals.db"),
///     ..Default::default()
/// };
/// let report = run_collection(config).await?;
/// println!("Checked {} domains", report.domains);
/// # Ok(())
/// # }
/// ```
pub async fn run_collection(config: Config) -> Result<CollectionReport> {
    let start_time = Instant::now();

    let source = DomainSource::open(&config.file)
        .with_context(|| format!("Failed to open domain source {}", config.file.display()))?;
    let server = resolve_server_address(&config.resolver)
        .await
        .context("Failed to resolve the resolver address")?;
    let queries_per_second =
        NonZeroU32::new(config.parsec).context("Queries per second must be at least 1")?;
    let jobs = usize::try_from(config.jobs).context("Job count does not fit in memory")?;
    anyhow::ensure!(jobs > 0, "Job count must be at least 1");

    let pool = init_db_pool_with_path(&config.db)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let store = Store::open(
        pool.clone(),
        BatchConfig {
            commit_every: config.commit_every,
        },
    )
    .await
    .context("Failed to open the record store")?;

    info!(
        "Collecting DS/SPF/DKIM/DMARC for domains from {} with {} workers at {} queries/s each via {}",
        config.file.display(),
        jobs,
        queries_per_second,
        server
    );

    let stats = Arc::new(ProcessingStats::new());
    let progress = Progress::default();

    let (domain_tx, domain_rx) = mpsc::channel(DOMAIN_FEED_CAPACITY);
    let feed = source.spawn_feed(
        domain_tx,
        Arc::clone(&progress.domains_read),
        config.verbose,
    );

    let resolvers = (0..jobs)
        .map(|_| init_worker_resolver(server, Arc::clone(&stats)))
        .collect();
    let (output_tx, output_rx) = mpsc::channel(OUTPUT_QUEUE_CAPACITY);
    let pipelines = spawn_pipelines(resolvers, domain_rx, queries_per_second, output_tx, &progress);

    let cancel = CancellationToken::new();
    let logging_task = config.verbose.then(|| {
        spawn_progress_logger(
            start_time,
            progress.clone(),
            PROGRESS_INTERVAL,
            cancel.clone(),
        )
    });

    let aggregator = Aggregator::new(
        store,
        jobs,
        Arc::clone(&stats),
        Arc::clone(&progress.rows_appended),
    );
    let aggregate = aggregator.run(output_rx).await;

    for result in join_all(pipelines).await {
        if let Err(join_error) = result {
            warn!("Pipeline task failed: {join_error}");
        }
    }
    match feed.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Domain source stopped early: {e}"),
        Err(join_error) => warn!("Domain feed task failed: {join_error}"),
    }
    shutdown_gracefully(cancel, logging_task).await;

    let aggregate = aggregate.context("Failed to commit the final batch")?;

    // Checkpoint WAL file for clean database state
    checkpoint_wal(&pool).await;
    pool.close().await;
    log::debug!("Database pool closed");

    print_error_statistics(&stats);

    let domains = progress.domains_read.load(Ordering::SeqCst);
    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    print_simple_summary(
        domains,
        aggregate.responses,
        aggregate.store.rows_written,
        elapsed_seconds,
    );

    Ok(CollectionReport {
        domains,
        responses: aggregate.responses,
        rows_written: aggregate.store.rows_written,
        commits: aggregate.store.commits,
        db_path: config.db,
        elapsed_seconds,
    })
}
