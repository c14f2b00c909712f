//! Configuration constants.
//!
//! This module defines the operational parameters of the collection pipeline:
//! queue capacities, DNS protocol options, batching and progress intervals.

use std::time::Duration;

/// Default recursive resolver queried by every worker.
pub const DEFAULT_RESOLVER: &str = "8.8.8.8:53";

/// Default number of independent pipelines (one fan-out producer + one worker each).
pub const DEFAULT_JOBS: u32 = 10;

/// Default per-worker query rate (queries per second).
pub const DEFAULT_QUERIES_PER_SECOND: u32 = 1;

/// Number of pipeline items (responses and completion signals) per committed transaction.
pub const DEFAULT_COMMIT_EVERY: u64 = 10_000;

// DNS protocol options
/// Per-exchange timeout, applied separately to the UDP attempt and the TCP escalation.
pub const DNS_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Advertised EDNS(0) UDP payload size.
pub const EDNS_MAX_PAYLOAD: u16 = 4096;
/// Receive buffer for UDP replies. Larger than the advertised payload so an
/// oversized datagram is decoded rather than silently cut.
pub const UDP_RECEIVE_BUFFER: usize = 65_535;

// Queue capacities
/// Depth of the query queue between a fan-out producer and its worker.
pub const QUERY_QUEUE_DEPTH: usize = 4;
/// Capacity of the output queue shared by all workers and drained by the aggregator.
pub const OUTPUT_QUEUE_CAPACITY: usize = 100_000;
/// Capacity of the domain feed shared by all fan-out producers.
pub const DOMAIN_FEED_CAPACITY: usize = 1_000;

// Domain source format (Afnic open data archive)
/// Field delimiter of the CSV file inside the archive.
pub const CSV_DELIMITER: u8 = b';';
/// Column holding the domain name.
pub const DOMAIN_COLUMN: usize = 0;
/// Column holding the "excluded" flag; a domain is only collected when it is empty.
pub const EXCLUDED_COLUMN: usize = 11;

// Progress reporting
/// Interval between progress lines when `--verbose` is set.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);
/// The domain feed logs a counter every time this many domains have been forwarded.
pub const DOMAIN_COUNTER_STEP: usize = 10_000;
