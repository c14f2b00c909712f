//! Batched, transactional record store.
//!
//! The store is the only writer to the database. It keeps one transaction
//! open at a time; rows appended to it become visible when the transaction is
//! committed, either by [`Store::flush_if_due`] once enough items have been
//! processed or by [`Store::close`].

use log::debug;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::config::DEFAULT_COMMIT_EVERY;
use crate::error_handling::DatabaseError;

use super::models::Record;

const INSERT_RECORD: &str = "INSERT INTO records (name, qtype, rcode, value) VALUES (?, ?, ?, ?)";

/// Configuration for batch writing
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Number of processed items after which the open transaction is committed
    pub commit_every: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            commit_every: DEFAULT_COMMIT_EVERY,
        }
    }
}

/// Totals reported when the store is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    /// Rows that were part of a successfully committed transaction
    pub rows_written: u64,
    pub commits: u64,
}

pub struct Store {
    pool: SqlitePool,
    config: BatchConfig,
    tx: Option<Transaction<'static, Sqlite>>,
    items_since_commit: u64,
    pending_rows: u64,
    summary: StoreSummary,
}

impl Store {
    /// Opens the store and its first transaction.
    pub async fn open(pool: SqlitePool, config: BatchConfig) -> Result<Self, DatabaseError> {
        let tx = pool.begin().await?;
        Ok(Self {
            pool,
            config,
            tx: Some(tx),
            items_since_commit: 0,
            pending_rows: 0,
            summary: StoreSummary::default(),
        })
    }

    /// Inserts `record` into the open transaction, beginning one if a
    /// previous reopen failed.
    pub async fn append(&mut self, record: &Record) -> Result<(), DatabaseError> {
        if self.tx.is_none() {
            let tx = self.pool.begin().await?;
            self.tx = Some(tx);
        }
        let tx = self.tx.as_mut().ok_or(DatabaseError::TransactionClosed)?;
        sqlx::query(INSERT_RECORD)
            .bind(&record.name)
            .bind(record.kind.as_str())
            .bind(i64::from(record.rcode))
            .bind(record.value.as_deref())
            .execute(&mut **tx)
            .await?;
        self.pending_rows += 1;
        Ok(())
    }

    /// Counts one processed item towards the commit threshold.
    pub fn mark_item(&mut self) {
        self.items_since_commit += 1;
    }

    /// Commits and reopens the transaction once the threshold is reached.
    ///
    /// Returns whether a commit was attempted. After a failed commit a new
    /// transaction is still opened so later items can be stored; if opening it
    /// fails, the next [`Store::append`] tries again.
    pub async fn flush_if_due(&mut self) -> Result<bool, DatabaseError> {
        if self.items_since_commit < self.config.commit_every {
            return Ok(false);
        }
        self.items_since_commit = 0;

        let committed = self.commit().await;
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        committed.map(|_| true)
    }

    /// Commits the open transaction, if any, and returns the totals.
    pub async fn close(mut self) -> Result<StoreSummary, DatabaseError> {
        if self.tx.is_some() {
            self.commit().await?;
        }
        Ok(self.summary)
    }

    pub fn summary(&self) -> StoreSummary {
        self.summary
    }

    async fn commit(&mut self) -> Result<(), DatabaseError> {
        let tx = self.tx.take().ok_or(DatabaseError::TransactionClosed)?;
        let pending = std::mem::take(&mut self.pending_rows);
        tx.commit().await?;
        self.summary.commits += 1;
        self.summary.rows_written += pending;
        debug!("Committed {} rows ({} commits so far)", pending, self.summary.commits);
        Ok(())
    }
}
