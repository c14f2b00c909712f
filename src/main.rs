//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_signals` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use domain_signals::initialization::init_logger_with;
use domain_signals::{run_collection, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_collection(config).await {
        Ok(report) => {
            println!(
                "✅ Checked {} domain{} ({} queries, {} rows in {} commits) in {:.1}s",
                report.domains,
                if report.domains == 1 { "" } else { "s" },
                report.responses,
                report.rows_written,
                report.commits,
                report.elapsed_seconds
            );
            println!("Results saved in {}", report.db_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("domain_signals error: {:#}", e);
            process::exit(1);
        }
    }
}
