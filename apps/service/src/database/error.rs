use thiserror::Error;

use crate::models::status::UnknownStatus;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("Failed to get a database connection: {0}")]
    Pool(String),

    /// Unique constraint on the given URL rejected the write
    #[error("Unique constraint violation for url {0}")]
    UniqueViolation(String),

    #[error("No site with id {0}")]
    Missing(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<deadpool::managed::PoolError<libsql::Error>> for StorageError {
    fn from(error: deadpool::managed::PoolError<libsql::Error>) -> Self {
        StorageError::Pool(error.to_string())
    }
}

impl From<UnknownStatus> for StorageError {
    fn from(error: UnknownStatus) -> Self {
        StorageError::Corrupt(error.to_string())
    }
}

/// Whether a libsql error is a UNIQUE constraint failure
pub fn is_unique_violation(error: &libsql::Error) -> bool {
    error.to_string().contains("UNIQUE constraint failed")
}
