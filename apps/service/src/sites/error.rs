use thiserror::Error;

use crate::database::StorageError;

#[derive(Debug, Error)]
pub enum SiteError {
    /// Another site is already registered with this URL
    #[error("A site with url {0} already exists")]
    DuplicateSite(String),

    #[error("Invalid site url: {0}")]
    InvalidUrl(String),

    #[error("Site not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SiteError {
    /// A UNIQUE(url) rejection at commit is the same conflict the guard
    /// reports, just detected later.
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::UniqueViolation(url) => SiteError::DuplicateSite(url),
            other => SiteError::Storage(other),
        }
    }
}
