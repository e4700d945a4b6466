use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{SslCertificateStatus, UptimeStatus};

/// Result of one uptime probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UptimeProbe {
    pub status: UptimeStatus,
    pub checked_at: DateTime<Utc>,
    /// Response time in milliseconds
    pub latency_ms: Option<u64>,
    /// HTTP status code (if a response arrived)
    pub status_code: Option<u16>,
    pub failure_reason: Option<String>,
}

impl UptimeProbe {
    pub fn up(checked_at: DateTime<Utc>, latency_ms: u64, status_code: Option<u16>) -> Self {
        Self {
            status: UptimeStatus::Up,
            checked_at,
            latency_ms: Some(latency_ms),
            status_code,
            failure_reason: None,
        }
    }

    pub fn down(checked_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            status: UptimeStatus::Down,
            checked_at,
            latency_ms: None,
            status_code: None,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Result of one certificate probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateProbe {
    pub status: SslCertificateStatus,
    pub expiration_date: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub failure_reason: Option<String>,
}

impl CertificateProbe {
    pub fn valid(expiration_date: DateTime<Utc>, issuer: Option<String>) -> Self {
        Self {
            status: SslCertificateStatus::Valid,
            expiration_date: Some(expiration_date),
            issuer,
            failure_reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            status: SslCertificateStatus::Invalid,
            expiration_date: None,
            issuer: None,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Something operators should hear about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SiteEvent {
    SiteDown { url: String, since: DateTime<Utc>, reason: Option<String> },
    SiteRestored { url: String, downtime_seconds: i64 },
    CertificateInvalid { url: String, reason: Option<String> },
    CertificateExpiresSoon { url: String, expires_at: DateTime<Utc> },
    CertificateValid { url: String, expires_at: Option<DateTime<Utc>> },
}

impl SiteEvent {
    pub fn url(&self) -> &str {
        match self {
            SiteEvent::SiteDown { url, .. }
            | SiteEvent::SiteRestored { url, .. }
            | SiteEvent::CertificateInvalid { url, .. }
            | SiteEvent::CertificateExpiresSoon { url, .. }
            | SiteEvent::CertificateValid { url, .. } => url,
        }
    }
}

impl fmt::Display for SiteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteEvent::SiteDown { url, since, reason } => {
                write!(f, "{url} is down since {}", since.format("%Y-%m-%d %H:%M:%S UTC"))?;
                if let Some(reason) = reason {
                    write!(f, ": {reason}")?;
                }
                Ok(())
            }
            SiteEvent::SiteRestored { url, downtime_seconds } => write!(
                f,
                "{url} is back up after {}",
                crate::models::presenter::format_duration(Duration::seconds(*downtime_seconds))
            ),
            SiteEvent::CertificateInvalid { url, reason } => match reason {
                Some(reason) => write!(f, "{url} has an invalid certificate: {reason}"),
                None => write!(f, "{url} has an invalid certificate"),
            },
            SiteEvent::CertificateExpiresSoon { url, expires_at } => write!(
                f,
                "{url} certificate expires on {}",
                expires_at.format("%Y-%m-%d")
            ),
            SiteEvent::CertificateValid { url, .. } => write!(f, "{url} certificate is valid again"),
        }
    }
}
