/// Database abstraction layer
///
/// Sites are persisted in a local LibSQL database behind a deadpool pool.
/// The rest of the service talks to storage through the `SiteStore` trait.
pub mod error;
pub mod migrations;
pub mod repository;

#[cfg(test)]
pub mod test_helpers;

pub use error::StorageError;
pub use repository::{DatabaseImpl, SiteStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
