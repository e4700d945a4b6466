use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

use super::{DatabaseImpl, initialize_database};
use crate::pool::{LibsqlPool, open_pool};

/// Create a migrated database in a temporary directory.
///
/// The directory is returned so it outlives the pool.
pub async fn create_test_database() -> Result<(LibsqlPool, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = test_database_path(&temp_dir);

    let pool = open_pool(&db_path.to_string_lossy(), 4).await?;
    let conn = pool.get().await?;
    initialize_database(&conn).await?;

    Ok((pool, temp_dir))
}

/// Same as [`create_test_database`], wrapped as a store
pub async fn create_test_store() -> Result<(Arc<DatabaseImpl>, TempDir)> {
    let (pool, temp_dir) = create_test_database().await?;
    Ok((Arc::new(DatabaseImpl::new_from_pool(pool)), temp_dir))
}

/// Path of the database file inside a directory from [`create_test_database`]
pub fn test_database_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

/// Open a fresh pool and store over an existing test database file
pub async fn reopen_test_store(temp_dir: &TempDir) -> Result<Arc<DatabaseImpl>> {
    let pool = open_pool(&test_database_path(temp_dir).to_string_lossy(), 4).await?;
    let conn = pool.get().await?;
    initialize_database(&conn).await?;
    Ok(Arc::new(DatabaseImpl::new_from_pool(pool)))
}
