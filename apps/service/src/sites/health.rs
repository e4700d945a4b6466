use crate::models::{Site, SslCertificateStatus, UptimeStatus};

impl Site {
    /// Whether the site counts as healthy right now.
    ///
    /// Uptime always gates health and an unchecked site is unhealthy. The
    /// certificate only matters when the site opted into SSL checks, and
    /// only an explicit `Invalid` fails it.
    pub fn is_healthy(&self) -> bool {
        if matches!(self.uptime_status, UptimeStatus::Down | UptimeStatus::NotYetChecked) {
            return false;
        }

        if self.check_ssl_certificate
            && self.ssl_certificate_status == SslCertificateStatus::Invalid
        {
            return false;
        }

        true
    }
}
