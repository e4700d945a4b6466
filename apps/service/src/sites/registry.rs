use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::clock::Clock;
use super::error::SiteError;
use super::{guard, transition};
use crate::database::SiteStore;
use crate::models::{Site, SslCertificateStatus, UptimeStatus};
use crate::validation::{is_https, validate_site_url};

/// One writer's field group. Applying an update never touches fields owned
/// by another writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteUpdate {
    /// Written by the uptime prober
    Uptime { status: UptimeStatus, checked_at: DateTime<Utc> },
    /// Written by the certificate prober
    Certificate { status: SslCertificateStatus, expiration_date: Option<DateTime<Utc>> },
    /// Written by the alerting path
    DownEventFired(Option<DateTime<Utc>>),
    /// Written by operators
    Enabled(bool),
}

impl SiteUpdate {
    fn apply_to(self, site: &mut Site) {
        match self {
            SiteUpdate::Uptime { status, checked_at } => {
                site.uptime_status = status;
                site.uptime_last_check_date = Some(checked_at);
            }
            SiteUpdate::Certificate { status, expiration_date } => {
                site.ssl_certificate_status = status;
                site.ssl_certificate_expiration_date = expiration_date;
            }
            SiteUpdate::DownEventFired(date) => site.down_event_fired_on_date = date,
            SiteUpdate::Enabled(enabled) => site.enabled = enabled,
        }
    }
}

/// Snapshots on both sides of an applied update
#[derive(Debug, Clone)]
pub struct Applied {
    pub previous: Site,
    pub current: Site,
}

/// Single write entry point for sites.
///
/// Every write runs uniqueness check, transition stamping and commit while
/// holding the registry write lock, so the check and the commit cannot
/// interleave with another writer and the stamp is computed against the
/// latest committed row.
pub struct SiteRegistry {
    store: Arc<dyn SiteStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl SiteRegistry {
    pub fn new(store: Arc<dyn SiteStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, write_lock: Mutex::new(()) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Save a full record: guard, reconcile against the committed row, commit
    pub async fn save(&self, candidate: Site) -> Result<Site, SiteError> {
        let _lock = self.write_lock.lock().await;

        let previous = match candidate.id {
            Some(id) => Some(self.load(id).await?),
            None => None,
        };

        self.persist(candidate, previous.as_ref()).await
    }

    /// Register a new URL to monitor.
    ///
    /// SSL checks default to on for https URLs.
    pub async fn register(
        &self,
        url: &str,
        check_ssl_certificate: Option<bool>,
    ) -> Result<Site, SiteError> {
        let url = url.trim();
        validate_site_url(url)
            .to_result()
            .map_err(|e| SiteError::InvalidUrl(e.to_string()))?;

        let check_ssl = check_ssl_certificate.unwrap_or_else(|| is_https(url));
        let site = self.save(Site::new(url, check_ssl)).await?;
        info!(url = %site.url, id = ?site.id, check_ssl, "Registered site");
        Ok(site)
    }

    /// Apply one writer's update to the latest committed version of a site
    pub async fn apply(&self, id: i64, update: SiteUpdate) -> Result<Applied, SiteError> {
        let _lock = self.write_lock.lock().await;

        let previous = self.load(id).await?;
        let mut candidate = previous.clone();
        update.apply_to(&mut candidate);

        let current = self.persist(candidate, Some(&previous)).await?;
        Ok(Applied { previous, current })
    }

    /// Move `down_event_fired_on_date` from `expected` to `fired_on`.
    ///
    /// Returns `None` when the committed date no longer matches `expected`,
    /// meaning another check already claimed or released the alert.
    pub async fn swap_down_event(
        &self,
        id: i64,
        expected: Option<DateTime<Utc>>,
        fired_on: Option<DateTime<Utc>>,
    ) -> Result<Option<Site>, SiteError> {
        let _lock = self.write_lock.lock().await;

        let previous = self.load(id).await?;
        if previous.down_event_fired_on_date != expected {
            return Ok(None);
        }

        let mut candidate = previous.clone();
        SiteUpdate::DownEventFired(fired_on).apply_to(&mut candidate);
        Ok(Some(self.persist(candidate, Some(&previous)).await?))
    }

    pub async fn set_enabled(&self, url: &str, enabled: bool) -> Result<Site, SiteError> {
        let site = self.find_by_url(url).await?;
        let id = site.id.ok_or_else(|| SiteError::NotFound(url.to_string()))?;
        let applied = self.apply(id, SiteUpdate::Enabled(enabled)).await?;
        info!(url, enabled, "Updated site");
        Ok(applied.current)
    }

    /// Remove a site by URL
    pub async fn delete(&self, url: &str) -> Result<Site, SiteError> {
        let _lock = self.write_lock.lock().await;

        let site = self
            .store
            .find_by_url(url)
            .await?
            .ok_or_else(|| SiteError::NotFound(url.to_string()))?;
        if let Some(id) = site.id {
            self.store.delete_site(id).await?;
        }
        info!(url, "Deleted site");
        Ok(site)
    }

    pub async fn get(&self, id: i64) -> Result<Site, SiteError> {
        self.load(id).await
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Site, SiteError> {
        self.store
            .find_by_url(url)
            .await?
            .ok_or_else(|| SiteError::NotFound(url.to_string()))
    }

    pub async fn all(&self) -> Result<Vec<Site>, SiteError> {
        Ok(self.store.get_all_sites().await?)
    }

    pub async fn enabled(&self) -> Result<Vec<Site>, SiteError> {
        Ok(self.store.get_enabled_sites().await?)
    }

    async fn load(&self, id: i64) -> Result<Site, SiteError> {
        self.store
            .get_site(id)
            .await?
            .ok_or_else(|| SiteError::NotFound(format!("id {id}")))
    }

    async fn persist(&self, candidate: Site, previous: Option<&Site>) -> Result<Site, SiteError> {
        guard::enforce(&candidate, self.store.as_ref()).await?;
        let site = transition::reconcile(candidate, previous, self.clock.now());
        Ok(self.store.commit(&site).await?)
    }
}
