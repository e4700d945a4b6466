use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::site::Site;
use super::status::{SslCertificateStatus, UptimeStatus};

/// Read-only view of a site for listings
#[derive(Debug, Clone, Serialize)]
pub struct SiteSummary {
    pub id: Option<i64>,
    pub url: String,
    pub enabled: bool,
    pub healthy: bool,
    pub uptime_status: UptimeStatus,
    /// How long the site has been in its current uptime status
    pub status_for: Option<String>,
    pub uptime_last_check_date: Option<DateTime<Utc>>,
    pub check_ssl_certificate: bool,
    pub ssl_certificate_status: SslCertificateStatus,
    pub ssl_certificate_expiration_date: Option<DateTime<Utc>>,
}

impl SiteSummary {
    pub fn from_site(site: &Site, now: DateTime<Utc>) -> Self {
        Self {
            id: site.id,
            url: site.url.clone(),
            enabled: site.enabled,
            healthy: site.is_healthy(),
            uptime_status: site.uptime_status,
            status_for: site
                .uptime_status_last_change_date
                .map(|since| format_duration(now - since)),
            uptime_last_check_date: site.uptime_last_check_date,
            check_ssl_certificate: site.check_ssl_certificate,
            ssl_certificate_status: site.ssl_certificate_status,
            ssl_certificate_expiration_date: site.ssl_certificate_expiration_date,
        }
    }

    /// Single table row used by the `list` command
    pub fn to_row(&self) -> String {
        let marker = if self.healthy { "ok " } else { "ERR" };
        let enabled = if self.enabled { "" } else { " (disabled)" };
        let since = self.status_for.as_deref().unwrap_or("-");
        let ssl = if self.check_ssl_certificate {
            match self.ssl_certificate_expiration_date {
                Some(expires) => format!(
                    "{} until {}",
                    self.ssl_certificate_status,
                    expires.format("%Y-%m-%d")
                ),
                None => self.ssl_certificate_status.to_string(),
            }
        } else {
            "not checked".to_string()
        };

        format!(
            "[{marker}] {}{enabled}  uptime: {} for {since}  ssl: {ssl}",
            self.url, self.uptime_status
        )
    }
}

/// Render a duration with its two most significant units
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
