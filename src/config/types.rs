//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_COMMIT_EVERY, DEFAULT_JOBS, DEFAULT_QUERIES_PER_SECOND, DEFAULT_RESOLVER,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Collection run configuration.
///
/// Parsed from the command line by the binary, or built programmatically by
/// library users.
///
/// # Examples
///
/// ```no_run
/// use domain_signals::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("domains.zip"),
///     db: PathBuf::from("signals.db"),
///     jobs: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "domain_signals",
    version,
    about = "Collects DS, SPF, DKIM and DMARC records for a list of domains"
)]
pub struct Config {
    /// Domain source: an Afnic open data zip archive, or a text file with one domain per line
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// SQLite database file receiving the records (created if missing)
    #[arg(long, value_name = "FILE")]
    pub db: PathBuf,

    /// Number of concurrent jobs
    #[arg(long, default_value_t = DEFAULT_JOBS, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: u32,

    /// Number of queries per second sent by a worker
    #[arg(long, default_value_t = DEFAULT_QUERIES_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    pub parsec: u32,

    /// Resolver to query (host:port)
    #[arg(long, default_value = DEFAULT_RESOLVER)]
    pub resolver: String,

    /// Display a counter of the number of queried domains
    #[arg(long)]
    pub verbose: bool,

    /// Number of processed items between two transaction commits
    #[arg(long, default_value_t = DEFAULT_COMMIT_EVERY, value_parser = clap::value_parser!(u64).range(1..))]
    pub commit_every: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("domains.zip"),
            db: PathBuf::from("./domain_signals.db"),
            jobs: DEFAULT_JOBS,
            parsec: DEFAULT_QUERIES_PER_SECOND,
            resolver: DEFAULT_RESOLVER.to_string(),
            verbose: false,
            commit_every: DEFAULT_COMMIT_EVERY,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
