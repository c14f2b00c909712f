// storage/migrations.rs
// Database migration management

use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Applies the migrations embedded from the `migrations/` directory.
///
/// The schema statements use `IF NOT EXISTS`, so a database whose table and
/// views were created beforehand is accepted as-is.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
