use tracing::warn;

use super::error::SiteError;
use crate::database::SiteStore;
use crate::models::Site;

/// Reject a write that would give two sites the same URL.
///
/// An already persisted candidate is excluded from the lookup so updating
/// it never collides with its own row.
pub async fn enforce(candidate: &Site, store: &dyn SiteStore) -> Result<(), SiteError> {
    if candidate.url.trim().is_empty() {
        return Err(SiteError::InvalidUrl("url cannot be empty".to_string()));
    }

    if store.exists_with_url(&candidate.url, candidate.id).await? {
        warn!(url = %candidate.url, id = ?candidate.id, "Rejected duplicate site");
        return Err(SiteError::DuplicateSite(candidate.url.clone()));
    }

    Ok(())
}
