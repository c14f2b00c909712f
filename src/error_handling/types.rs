//! Error type definitions.
//!
//! This module defines all error and info types used throughout the application.

use std::net::SocketAddr;
use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The resolver address could not be turned into a socket address.
    #[error("Invalid resolver address '{address}': {reason}")]
    ResolverAddressError { address: String, reason: String },
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// The store has no open transaction (a previous commit or begin failed).
    #[error("No open transaction")]
    TransactionClosed,
}

/// Error types for the domain source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source file could not be opened or read.
    #[error("Domain source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip archive is corrupt or unreadable.
    #[error("Domain source archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive does not contain exactly one file.
    #[error("Unexpected archive format: should contain only one CSV file, found {0}")]
    UnexpectedArchiveShape(usize),

    /// The CSV file inside the archive has no header row.
    #[error("Empty domain archive: missing CSV header")]
    EmptyArchive,

    /// The CSV file could not be read.
    #[error("Domain source CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of a single network exchange with the resolver.
///
/// These never leave the resolver: they are turned into a synthetic
/// SERVFAIL response and counted.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No reply within the timeout.
    #[error("{protocol} exchange with {server} timed out after {timeout:?}")]
    Timeout {
        protocol: &'static str,
        server: SocketAddr,
        timeout: Duration,
    },

    /// Socket-level failure (bind, connect, send, receive).
    #[error("{protocol} exchange with {server} failed: {source}")]
    Io {
        protocol: &'static str,
        server: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The reply could not be decoded as a DNS message.
    #[error("Malformed DNS reply: {0}")]
    Malformed(String),

    /// The query could not be encoded.
    #[error("Failed to encode DNS query: {0}")]
    Encode(String),
}

impl TransportError {
    /// Counter category for this failure.
    pub fn error_type(&self) -> ErrorType {
        match self {
            TransportError::Timeout { .. } => ErrorType::DnsQueryTimeout,
            TransportError::Io { .. } => ErrorType::DnsQueryIoError,
            TransportError::Malformed(_) => ErrorType::DnsMalformedReply,
            TransportError::Encode(_) => ErrorType::DnsQueryEncodeError,
        }
    }
}

/// Types of errors that can occur while collecting.
///
/// DNS errors are recovered locally (turned into synthetic SERVFAIL responses);
/// storage errors are logged and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // DNS errors
    DnsQueryTimeout,
    DnsQueryIoError,
    DnsMalformedReply,
    DnsQueryEncodeError,
    // Storage errors
    RecordInsertError,
    TransactionCommitError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DnsQueryTimeout => "DNS query timeout",
            ErrorType::DnsQueryIoError => "DNS query I/O error",
            ErrorType::DnsMalformedReply => "DNS malformed reply",
            ErrorType::DnsQueryEncodeError => "DNS query encode error",
            ErrorType::RecordInsertError => "Record insert error",
            ErrorType::TransactionCommitError => "Transaction commit error",
        }
    }
}

/// Notable events that are expected outcomes rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// A truncated UDP reply was re-queried over TCP.
    TruncatedRetry,
    /// A synthetic SERVFAIL response replaced a failed exchange.
    SyntheticServerFailure,
    /// A TXT answer was rejected by the SPF or DMARC prefix filter.
    TxtAnswerSkipped,
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::TruncatedRetry => "Truncated UDP reply retried over TCP",
            InfoType::SyntheticServerFailure => "Synthetic SERVFAIL response",
            InfoType::TxtAnswerSkipped => "TXT answer rejected by prefix filter",
        }
    }
}
