use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{SslCertificateStatus, UptimeStatus};

/// Site model - a monitored endpoint and its current health state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Storage-assigned identifier, `None` until first committed
    pub id: Option<i64>,
    pub url: String,
    pub enabled: bool,
    pub check_ssl_certificate: bool,

    pub uptime_status: UptimeStatus,
    pub uptime_last_check_date: Option<DateTime<Utc>>,
    /// Last time `uptime_status` changed value, not the last probe
    pub uptime_status_last_change_date: Option<DateTime<Utc>>,
    /// Set once a down alert went out for the current down episode
    pub down_event_fired_on_date: Option<DateTime<Utc>>,

    pub ssl_certificate_status: SslCertificateStatus,
    pub ssl_certificate_expiration_date: Option<DateTime<Utc>>,
}

impl Site {
    /// Create an unsaved site with nothing checked yet
    pub fn new(url: impl Into<String>, check_ssl_certificate: bool) -> Self {
        Self {
            id: None,
            url: url.into(),
            enabled: true,
            check_ssl_certificate,
            uptime_status: UptimeStatus::NotYetChecked,
            uptime_last_check_date: None,
            uptime_status_last_change_date: None,
            down_event_fired_on_date: None,
            ssl_certificate_status: SslCertificateStatus::NotYetChecked,
            ssl_certificate_expiration_date: None,
        }
    }

    /// Convert a timestamp to Unix milliseconds
    pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
        time.timestamp_millis()
    }

    /// Convert Unix milliseconds to a timestamp
    pub fn i64_to_timestamp(millis: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_site_starts_unchecked() {
        let site = Site::new("https://a.example", true);

        assert_eq!(site.id, None);
        assert!(site.enabled);
        assert!(site.check_ssl_certificate);
        assert_eq!(site.uptime_status, UptimeStatus::NotYetChecked);
        assert_eq!(site.ssl_certificate_status, SslCertificateStatus::NotYetChecked);
        assert!(site.uptime_last_check_date.is_none());
        assert!(site.uptime_status_last_change_date.is_none());
        assert!(site.down_event_fired_on_date.is_none());
        assert!(site.ssl_certificate_expiration_date.is_none());
    }

    #[test]
    fn test_timestamp_millis_conversion() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
            + chrono::Duration::milliseconds(250);
        let millis = Site::timestamp_to_i64(time);

        assert_eq!(Site::i64_to_timestamp(millis), Some(time));
    }
}
