//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - Resolver socket address
//! - Per-worker DNS resolvers
//!
//! All initialization functions return proper error types for error handling.

mod logger;
mod resolver;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::DNS_QUERY_TIMEOUT;
use crate::dns::Resolver;
use crate::error_handling::ProcessingStats;

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::resolve_server_address;

/// Builds the resolver owned by one worker.
///
/// Each worker gets its own UDP and TCP transports bound to `server`, with the
/// fixed per-exchange timeout.
pub fn init_worker_resolver(server: SocketAddr, stats: Arc<ProcessingStats>) -> Resolver {
    Resolver::network(server, DNS_QUERY_TIMEOUT, stats)
}
