use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::alerts::{self, Notifier};
use super::certificate::CertificateChecker;
use super::checker::Checker;
use super::types::{CertificateProbe, UptimeProbe};
use crate::models::Site;
use crate::sites::{SiteError, SiteRegistry, SiteUpdate};

/// Outcome counts of a full checking round
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub checked: usize,
    pub failed: usize,
}

/// Monitoring executor - probes sites and records the results
pub struct MonitoringExecutor {
    registry: Arc<SiteRegistry>,
    uptime_checker: Arc<dyn Checker>,
    certificate_checker: Arc<dyn CertificateChecker>,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
    expires_soon_days: i64,
}

impl MonitoringExecutor {
    pub fn new(
        registry: Arc<SiteRegistry>,
        uptime_checker: Arc<dyn Checker>,
        certificate_checker: Arc<dyn CertificateChecker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            uptime_checker,
            certificate_checker,
            notifier,
            concurrency: 10,
            expires_soon_days: 10,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_expires_soon_days(mut self, days: i64) -> Self {
        self.expires_soon_days = days;
        self
    }

    /// Probe a site's reachability and record it
    pub async fn check_uptime(&self, site: &Site) -> Result<Site, SiteError> {
        let id = site.id.ok_or_else(|| SiteError::NotFound(site.url.clone()))?;

        let probe = self.probe_uptime(&site.url).await;
        debug!(
            url = %site.url,
            status = %probe.status,
            latency_ms = ?probe.latency_ms,
            status_code = ?probe.status_code,
            "Uptime probe finished"
        );

        let applied = self
            .registry
            .apply(id, SiteUpdate::Uptime { status: probe.status, checked_at: probe.checked_at })
            .await?;

        let Some(alert) = alerts::uptime_alert(&applied, probe.failure_reason, self.registry.now())
        else {
            return Ok(applied.current);
        };

        let expected = applied.current.down_event_fired_on_date;
        let Some(claimed) = self.registry.swap_down_event(id, expected, alert.fired_on).await?
        else {
            debug!(url = %site.url, "Alert already handled by a concurrent check");
            return Ok(self.registry.get(id).await?);
        };

        match self.notifier.notify(&alert.event).await {
            Ok(()) => Ok(claimed),
            Err(e) => {
                // Put the previous date back so the next round tries again.
                error!(url = %site.url, "Failed to dispatch alert: {e:#}");
                let released = self.registry.swap_down_event(id, alert.fired_on, expected).await?;
                Ok(released.unwrap_or(applied.current))
            }
        }
    }

    /// Probe a site's certificate and record it
    pub async fn check_certificate(&self, site: &Site) -> Result<Site, SiteError> {
        let id = site.id.ok_or_else(|| SiteError::NotFound(site.url.clone()))?;

        if !site.check_ssl_certificate {
            debug!(url = %site.url, "Certificate check disabled for site");
            return Ok(site.clone());
        }

        let probe: CertificateProbe = self.certificate_checker.check(&site.url).await;
        debug!(url = %site.url, status = %probe.status, issuer = ?probe.issuer, "Certificate probe finished");

        let applied = self
            .registry
            .apply(
                id,
                SiteUpdate::Certificate {
                    status: probe.status,
                    expiration_date: probe.expiration_date,
                },
            )
            .await?;

        for event in alerts::certificate_alerts(
            &applied,
            probe.failure_reason,
            self.expires_soon_days,
            self.registry.now(),
        ) {
            if let Err(e) = self.notifier.notify(&event).await {
                error!(url = %site.url, "Failed to dispatch alert: {e:#}");
            }
        }

        Ok(applied.current)
    }

    /// Check uptime of every enabled site
    pub async fn check_all_uptime(&self) -> Result<RoundSummary, SiteError> {
        let sites = self.registry.enabled().await?;
        let results = stream::iter(sites)
            .map(|site| async move {
                let result = self.check_uptime(&site).await;
                (site.url, result)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let summary = summarize("uptime", results);
        info!(checked = summary.checked, failed = summary.failed, "Uptime round finished");
        Ok(summary)
    }

    /// Check certificates of every enabled site that opted in
    pub async fn check_all_certificates(&self) -> Result<RoundSummary, SiteError> {
        let sites = self.registry.enabled().await?;
        let results = stream::iter(sites.into_iter().filter(|site| site.check_ssl_certificate))
            .map(|site| async move {
                let result = self.check_certificate(&site).await;
                (site.url, result)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let summary = summarize("certificate", results);
        info!(checked = summary.checked, failed = summary.failed, "Certificate round finished");
        Ok(summary)
    }

    async fn probe_uptime(&self, url: &str) -> UptimeProbe {
        match self.uptime_checker.check(url).await {
            Ok((latency_ms, status_code)) => UptimeProbe::up(self.registry.now(), latency_ms, status_code),
            Err(e) => UptimeProbe::down(self.registry.now(), e.to_string()),
        }
    }
}

fn summarize(kind: &str, results: Vec<(String, Result<Site, SiteError>)>) -> RoundSummary {
    let mut summary = RoundSummary::default();

    for (url, result) in results {
        summary.checked += 1;
        if let Err(e) = result {
            summary.failed += 1;
            error!(%url, "Failed to record {kind} check: {e}");
        }
    }

    summary
}
