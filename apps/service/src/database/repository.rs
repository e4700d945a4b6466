use async_trait::async_trait;
use libsql::{Row, params};

use super::error::{StorageError, is_unique_violation};
use crate::models::{Site, SslCertificateStatus, UptimeStatus};
use crate::pool::LibsqlPool;

const SITE_COLUMNS: &str = "id, url, enabled, check_ssl_certificate, uptime_status, \
     uptime_last_check_date, uptime_status_last_change_date, down_event_fired_on_date, \
     ssl_certificate_status, ssl_certificate_expiration_date";

/// Storage operations the site write and read paths depend on
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Whether another site already uses `url`, ignoring `exclude_id`
    async fn exists_with_url(&self, url: &str, exclude_id: Option<i64>) -> Result<bool, StorageError>;

    /// Latest committed version of a site
    async fn get_site(&self, id: i64) -> Result<Option<Site>, StorageError>;

    /// Insert or update a site, returning it with its id assigned
    async fn commit(&self, site: &Site) -> Result<Site, StorageError>;

    async fn find_by_url(&self, url: &str) -> Result<Option<Site>, StorageError>;

    async fn get_all_sites(&self) -> Result<Vec<Site>, StorageError>;

    async fn get_enabled_sites(&self) -> Result<Vec<Site>, StorageError>;

    /// Delete a site, returning whether a row was removed
    async fn delete_site(&self, id: i64) -> Result<bool, StorageError>;
}

/// LibSQL database implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    /// Create a new database instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<crate::pool::LibsqlManager>, StorageError> {
        Ok(self.pool.get().await?)
    }

    async fn query_sites(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Site>, StorageError> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query(sql, params).await?;
        let mut sites = Vec::new();

        while let Some(row) = rows.next().await? {
            sites.push(site_from_row(&row)?);
        }

        Ok(sites)
    }
}

fn site_from_row(row: &Row) -> Result<Site, StorageError> {
    let timestamp = |index: i32| -> Result<_, StorageError> {
        Ok(row.get::<Option<i64>>(index)?.and_then(Site::i64_to_timestamp))
    };

    Ok(Site {
        id: Some(row.get(0)?),
        url: row.get(1)?,
        enabled: row.get::<i64>(2)? != 0,
        check_ssl_certificate: row.get::<i64>(3)? != 0,
        uptime_status: row.get::<String>(4)?.parse::<UptimeStatus>()?,
        uptime_last_check_date: timestamp(5)?,
        uptime_status_last_change_date: timestamp(6)?,
        down_event_fired_on_date: timestamp(7)?,
        ssl_certificate_status: row.get::<String>(8)?.parse::<SslCertificateStatus>()?,
        ssl_certificate_expiration_date: timestamp(9)?,
    })
}

#[async_trait]
impl SiteStore for DatabaseImpl {
    async fn exists_with_url(&self, url: &str, exclude_id: Option<i64>) -> Result<bool, StorageError> {
        let conn = self.get_conn().await?;

        let mut rows = match exclude_id {
            Some(id) => {
                conn.query(
                    "SELECT 1 FROM sites WHERE url = ? AND id <> ? LIMIT 1",
                    params![url, id],
                )
                .await?
            }
            None => conn.query("SELECT 1 FROM sites WHERE url = ? LIMIT 1", params![url]).await?,
        };

        Ok(rows.next().await?.is_some())
    }

    async fn get_site(&self, id: i64) -> Result<Option<Site>, StorageError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?");
        Ok(self.query_sites(&sql, params![id]).await?.into_iter().next())
    }

    async fn commit(&self, site: &Site) -> Result<Site, StorageError> {
        let conn = self.get_conn().await?;
        let to_millis = |time: Option<chrono::DateTime<chrono::Utc>>| time.map(Site::timestamp_to_i64);

        let outcome = if let Some(id) = site.id {
            conn.execute(
                "UPDATE sites SET url = ?, enabled = ?, check_ssl_certificate = ?, uptime_status = ?, \
                 uptime_last_check_date = ?, uptime_status_last_change_date = ?, \
                 down_event_fired_on_date = ?, ssl_certificate_status = ?, \
                 ssl_certificate_expiration_date = ? WHERE id = ?",
                params![
                    site.url.clone(),
                    if site.enabled { 1 } else { 0 },
                    if site.check_ssl_certificate { 1 } else { 0 },
                    site.uptime_status.as_str(),
                    to_millis(site.uptime_last_check_date),
                    to_millis(site.uptime_status_last_change_date),
                    to_millis(site.down_event_fired_on_date),
                    site.ssl_certificate_status.as_str(),
                    to_millis(site.ssl_certificate_expiration_date),
                    id
                ],
            )
            .await
            .map(|affected| (id, affected))
        } else {
            conn.execute(
                "INSERT INTO sites (url, enabled, check_ssl_certificate, uptime_status, \
                 uptime_last_check_date, uptime_status_last_change_date, down_event_fired_on_date, \
                 ssl_certificate_status, ssl_certificate_expiration_date) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    site.url.clone(),
                    if site.enabled { 1 } else { 0 },
                    if site.check_ssl_certificate { 1 } else { 0 },
                    site.uptime_status.as_str(),
                    to_millis(site.uptime_last_check_date),
                    to_millis(site.uptime_status_last_change_date),
                    to_millis(site.down_event_fired_on_date),
                    site.ssl_certificate_status.as_str(),
                    to_millis(site.ssl_certificate_expiration_date)
                ],
            )
            .await
            .map(|affected| (conn.last_insert_rowid(), affected))
        };

        let (id, affected) = outcome.map_err(|error| {
            if is_unique_violation(&error) {
                StorageError::UniqueViolation(site.url.clone())
            } else {
                StorageError::Query(error)
            }
        })?;

        if affected == 0 {
            return Err(StorageError::Missing(id));
        }

        Ok(Site { id: Some(id), ..site.clone() })
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Site>, StorageError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE url = ?");
        Ok(self.query_sites(&sql, params![url]).await?.into_iter().next())
    }

    async fn get_all_sites(&self) -> Result<Vec<Site>, StorageError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites ORDER BY url");
        self.query_sites(&sql, ()).await
    }

    async fn get_enabled_sites(&self) -> Result<Vec<Site>, StorageError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE enabled = 1 ORDER BY url");
        self.query_sites(&sql, ()).await
    }

    async fn delete_site(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.get_conn().await?;
        let affected = conn.execute("DELETE FROM sites WHERE id = ?", params![id]).await?;
        Ok(affected > 0)
    }
}
