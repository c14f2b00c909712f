//! domain_signals library: batch collection of DNS security signals
//!
//! For every domain of a source (an Afnic open-data archive or a plain list),
//! this library asks a recursive resolver four questions and stores the
//! outcomes in SQLite:
//!
//! - `DS` at the apex (DNSSEC delegation)
//! - `TXT` at the apex, kept when it is an SPF policy (`v=spf1`)
//! - `TXT` at `_domainkey.<domain>` (DKIM presence, judged from the result code)
//! - `TXT` at `_dmarc.<domain>`, kept when it is a DMARC policy (`v=DMARC1;`)
//!
//! The database also carries one summary view per signal and a `summary` view
//! joining them.
//!
//! # Example
//!
//! ```no_run
//! use domain_signals::{Config, run_collection};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("domains.txt"),
//!     db: std::path::PathBuf::from("signals.db"),
//!     jobs: 20,
//!     parsec: 5,
//!     ..Default::default()
//! };
//!
//! let report = run_collection(config).await?;
//! println!("Checked {} domains, stored {} rows",
//!          report.domains, report.rows_written);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod classify;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod pipeline;
pub mod rate_limiter;
mod run;
pub mod source;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use run::{run_collection, CollectionReport};
pub use storage::run_migrations;
