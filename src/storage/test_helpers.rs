//! Shared test helpers for storage module tests.
//!
//! This module provides database setup and row inspection helpers used across
//! the crate's unit tests.

use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

use crate::storage::{init_db_pool_with_path, run_migrations};

/// Creates a migrated test database in a fresh temporary directory.
///
/// The directory guard must be kept alive for as long as the pool is used.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_db_pool_with_path(&dir.path().join("test.db"))
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    (pool, dir)
}

/// Returns all stored rows as `(name, qtype, rcode, value)`, in insertion order.
pub async fn fetch_records(pool: &SqlitePool) -> Vec<(String, String, i64, Option<String>)> {
    sqlx::query("SELECT name, qtype, rcode, value FROM records ORDER BY rowid")
        .fetch_all(pool)
        .await
        .expect("Failed to read records")
        .into_iter()
        .map(|row| (row.get(0), row.get(1), row.get(2), row.get(3)))
        .collect()
}

/// Number of rows in the `records` table.
pub async fn count_records(pool: &SqlitePool) -> i64 {
    sqlx::query("SELECT COUNT(*) FROM records")
        .fetch_one(pool)
        .await
        .expect("Failed to count records")
        .get(0)
}
