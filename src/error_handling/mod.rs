//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, database, domain source, transport)
//! - Processing statistics tracking (errors and info metrics)
//!
//! Counters are categorized into:
//! - **Errors**: Failed exchanges or writes (recovered or skipped, never fatal)
//! - **Info**: Expected events (TCP escalation, synthetic SERVFAIL, filtered TXT)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    DatabaseError, ErrorType, InfoType, InitializationError, SourceError, TransportError,
};
