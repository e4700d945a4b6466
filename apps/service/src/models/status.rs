use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified reachability of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UptimeStatus {
    #[default]
    NotYetChecked,
    Up,
    Down,
}

/// Classified validity of a site's TLS certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslCertificateStatus {
    #[default]
    NotYetChecked,
    Valid,
    Invalid,
}

impl UptimeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UptimeStatus::NotYetChecked => "not_yet_checked",
            UptimeStatus::Up => "up",
            UptimeStatus::Down => "down",
        }
    }
}

impl SslCertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslCertificateStatus::NotYetChecked => "not_yet_checked",
            SslCertificateStatus::Valid => "valid",
            SslCertificateStatus::Invalid => "invalid",
        }
    }
}

impl fmt::Display for UptimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SslCertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a persisted status column holds an unknown value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for UptimeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_yet_checked" => Ok(UptimeStatus::NotYetChecked),
            "up" => Ok(UptimeStatus::Up),
            "down" => Ok(UptimeStatus::Down),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for SslCertificateStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_yet_checked" => Ok(SslCertificateStatus::NotYetChecked),
            "valid" => Ok(SslCertificateStatus::Valid),
            "invalid" => Ok(SslCertificateStatus::Invalid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
