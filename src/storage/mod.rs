// storage/mod.rs
// Database operations module

mod migrations;
mod models;
mod pool;
mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use models::Record;
pub use pool::{checkpoint_wal, init_db_pool_with_path};
pub use store::{BatchConfig, Store, StoreSummary};
