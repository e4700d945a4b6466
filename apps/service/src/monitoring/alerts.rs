//! Alert decisions and dispatch.
//!
//! A down alert is sent once per down episode. An episode starts when the
//! status moves into down, or when a down site has no
//! `down_event_fired_on_date` yet. The date is claimed before the notifier
//! runs and released again if it fails, so restarts neither repeat nor lose
//! alerts.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::types::SiteEvent;
use crate::models::{SslCertificateStatus, UptimeStatus};
use crate::sites::Applied;

/// Delivers site events to operators
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &SiteEvent) -> Result<()>;
}

/// Notifier that writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &SiteEvent) -> Result<()> {
        match event {
            SiteEvent::SiteDown { .. }
            | SiteEvent::CertificateInvalid { .. }
            | SiteEvent::CertificateExpiresSoon { .. } => {
                warn!(url = event.url(), "{event}")
            }
            SiteEvent::SiteRestored { .. } | SiteEvent::CertificateValid { .. } => {
                info!(url = event.url(), "{event}")
            }
        }
        Ok(())
    }
}

/// An event to send plus the dedup date that goes with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UptimeAlert {
    pub event: SiteEvent,
    /// `down_event_fired_on_date` once the event is out
    pub fired_on: Option<DateTime<Utc>>,
}

/// Decide whether an applied uptime update needs an alert
pub fn uptime_alert(
    applied: &Applied,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Option<UptimeAlert> {
    let site = &applied.current;
    let went_down = applied.previous.uptime_status != UptimeStatus::Down;

    match site.uptime_status {
        // A stale date left by an undelivered restore does not cover a new episode.
        UptimeStatus::Down if went_down || site.down_event_fired_on_date.is_none() => Some(UptimeAlert {
            event: SiteEvent::SiteDown {
                url: site.url.clone(),
                since: site.uptime_status_last_change_date.unwrap_or(now),
                reason,
            },
            fired_on: Some(now),
        }),
        UptimeStatus::Up => {
            let fired_on = site.down_event_fired_on_date?;
            let down_since = if applied.previous.uptime_status == UptimeStatus::Down {
                applied.previous.uptime_status_last_change_date.unwrap_or(fired_on)
            } else {
                fired_on
            };

            Some(UptimeAlert {
                event: SiteEvent::SiteRestored {
                    url: site.url.clone(),
                    downtime_seconds: (now - down_since).num_seconds().max(0),
                },
                fired_on: None,
            })
        }
        _ => None,
    }
}

/// Decide which certificate events an applied certificate update raises
pub fn certificate_alerts(
    applied: &Applied,
    reason: Option<String>,
    expires_soon_days: i64,
    now: DateTime<Utc>,
) -> Vec<SiteEvent> {
    let site = &applied.current;
    let previous = applied.previous.ssl_certificate_status;
    let mut events = Vec::new();

    if !site.check_ssl_certificate {
        return events;
    }

    match site.ssl_certificate_status {
        SslCertificateStatus::Invalid if previous != SslCertificateStatus::Invalid => {
            events.push(SiteEvent::CertificateInvalid { url: site.url.clone(), reason });
        }
        SslCertificateStatus::Valid => {
            if previous == SslCertificateStatus::Invalid {
                events.push(SiteEvent::CertificateValid {
                    url: site.url.clone(),
                    expires_at: site.ssl_certificate_expiration_date,
                });
            }

            if let Some(expires_at) = site.ssl_certificate_expiration_date {
                if expires_at - now <= Duration::days(expires_soon_days) {
                    events.push(SiteEvent::CertificateExpiresSoon {
                        url: site.url.clone(),
                        expires_at,
                    });
                }
            }
        }
        _ => {}
    }

    events
}

#[cfg(test)]
pub use recording::RecordingNotifier;

#[cfg(test)]
mod recording {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Keeps every event it is handed; can be told to fail
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<SiteEvent>>,
        failing: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn events(&self) -> Vec<SiteEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, event: &SiteEvent) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("notification channel unavailable");
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Site;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn applied(previous: Site, current: Site) -> Applied {
        Applied { previous, current }
    }

    fn site(status: UptimeStatus, changed: DateTime<Utc>, fired: Option<DateTime<Utc>>) -> Site {
        let mut site = Site::new("https://a.example", true);
        site.id = Some(1);
        site.uptime_status = status;
        site.uptime_status_last_change_date = Some(changed);
        site.down_event_fired_on_date = fired;
        site
    }

    #[test]
    fn test_first_down_fires_once() {
        let now = t0() + Duration::minutes(1);
        let update = applied(site(UptimeStatus::Up, t0(), None), site(UptimeStatus::Down, now, None));

        let alert = uptime_alert(&update, Some("timeout".into()), now).expect("down alert");

        assert_eq!(
            alert.event,
            SiteEvent::SiteDown { url: "https://a.example".into(), since: now, reason: Some("timeout".into()) }
        );
        assert_eq!(alert.fired_on, Some(now));
    }

    #[test]
    fn test_repeated_down_is_deduplicated() {
        let fired = t0() + Duration::minutes(1);
        let update = applied(
            site(UptimeStatus::Down, fired, Some(fired)),
            site(UptimeStatus::Down, fired, Some(fired)),
        );

        assert_eq!(uptime_alert(&update, None, fired + Duration::minutes(5)), None);
    }

    #[test]
    fn test_new_episode_fires_despite_stale_date() {
        let stale = t0();
        let now = t0() + Duration::hours(1);
        let update = applied(
            site(UptimeStatus::Up, t0() + Duration::minutes(5), Some(stale)),
            site(UptimeStatus::Down, now, Some(stale)),
        );

        let alert = uptime_alert(&update, None, now).expect("down alert");

        assert!(matches!(alert.event, SiteEvent::SiteDown { since, .. } if since == now));
        assert_eq!(alert.fired_on, Some(now));
    }

    #[test]
    fn test_recovery_clears_dedup_date() {
        let down_at = t0();
        let now = t0() + Duration::minutes(30);
        let update = applied(
            site(UptimeStatus::Down, down_at, Some(down_at)),
            site(UptimeStatus::Up, now, Some(down_at)),
        );

        let alert = uptime_alert(&update, None, now).expect("restored alert");

        assert_eq!(
            alert.event,
            SiteEvent::SiteRestored { url: "https://a.example".into(), downtime_seconds: 1800 }
        );
        assert_eq!(alert.fired_on, None);
    }

    #[test]
    fn test_up_without_prior_alert_is_quiet() {
        let update = applied(site(UptimeStatus::Up, t0(), None), site(UptimeStatus::Up, t0(), None));

        assert_eq!(uptime_alert(&update, None, t0()), None);
    }

    fn cert_site(status: SslCertificateStatus, expires: Option<DateTime<Utc>>) -> Site {
        let mut site = Site::new("https://a.example", true);
        site.ssl_certificate_status = status;
        site.ssl_certificate_expiration_date = expires;
        site
    }

    #[test]
    fn test_certificate_becoming_invalid() {
        let update = applied(
            cert_site(SslCertificateStatus::Valid, Some(t0() + Duration::days(90))),
            cert_site(SslCertificateStatus::Invalid, None),
        );

        let events = certificate_alerts(&update, Some("expired".into()), 10, t0());

        assert_eq!(
            events,
            vec![SiteEvent::CertificateInvalid { url: "https://a.example".into(), reason: Some("expired".into()) }]
        );
    }

    #[test]
    fn test_invalid_certificate_reported_once() {
        let update = applied(
            cert_site(SslCertificateStatus::Invalid, None),
            cert_site(SslCertificateStatus::Invalid, None),
        );

        assert!(certificate_alerts(&update, None, 10, t0()).is_empty());
    }

    #[test]
    fn test_certificate_recovery_and_expiry_warning() {
        let expires = t0() + Duration::days(5);
        let update = applied(
            cert_site(SslCertificateStatus::Invalid, None),
            cert_site(SslCertificateStatus::Valid, Some(expires)),
        );

        let events = certificate_alerts(&update, None, 10, t0());

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SiteEvent::CertificateValid { .. }));
        assert!(matches!(events[1], SiteEvent::CertificateExpiresSoon { expires_at, .. } if expires_at == expires));
    }

    #[test]
    fn test_far_expiry_is_quiet() {
        let update = applied(
            cert_site(SslCertificateStatus::Valid, Some(t0() + Duration::days(90))),
            cert_site(SslCertificateStatus::Valid, Some(t0() + Duration::days(90))),
        );

        assert!(certificate_alerts(&update, None, 10, t0()).is_empty());
    }

    #[test]
    fn test_opted_out_site_raises_nothing() {
        let mut current = cert_site(SslCertificateStatus::Invalid, None);
        current.check_ssl_certificate = false;
        let update = applied(cert_site(SslCertificateStatus::Valid, None), current);

        assert!(certificate_alerts(&update, None, 10, t0()).is_empty());
    }
}
