use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use super::executor::MonitoringExecutor;

/// Which kind of round a loop runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    Uptime,
    Certificate,
}

/// Monitoring scheduler - runs uptime and certificate rounds on intervals
pub struct MonitoringScheduler {
    executor: Arc<MonitoringExecutor>,
    shutdown_rx: watch::Receiver<bool>,
}

impl MonitoringScheduler {
    pub fn new(executor: Arc<MonitoringExecutor>, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self { executor, shutdown_rx }
    }

    /// Spawn a loop running `kind` rounds every `every` until shutdown
    pub fn schedule(&self, kind: RoundKind, every: Duration) -> JoinHandle<()> {
        let executor = self.executor.clone();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut timer = interval(every);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let result = match kind {
                    RoundKind::Uptime => executor.check_all_uptime().await,
                    RoundKind::Certificate => executor.check_all_certificates().await,
                };

                if let Err(e) = result {
                    error!(?kind, "Monitoring round failed: {e}");
                }
            }

            info!(?kind, "Monitoring loop stopped");
        })
    }

    /// Spawn both loops
    pub fn start(&self, uptime_every: Duration, certificate_every: Duration) -> Vec<JoinHandle<()>> {
        vec![
            self.schedule(RoundKind::Uptime, uptime_every),
            self.schedule(RoundKind::Certificate, certificate_every),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_helpers::create_test_store;
    use crate::models::UptimeStatus;
    use crate::monitoring::alerts::LogNotifier;
    use crate::monitoring::certificate::CertificateChecker;
    use crate::monitoring::checker::Checker;
    use crate::monitoring::types::CertificateProbe;
    use crate::sites::{SiteRegistry, SystemClock};
    use anyhow::Result;

    struct AlwaysUp;

    #[async_trait::async_trait]
    impl Checker for AlwaysUp {
        async fn check(&self, _target: &str) -> Result<(u64, Option<u16>)> {
            Ok((1, Some(200)))
        }
    }

    struct NeverCalled;

    #[async_trait::async_trait]
    impl CertificateChecker for NeverCalled {
        async fn check(&self, _url: &str) -> CertificateProbe {
            CertificateProbe::invalid("not expected in this test")
        }
    }

    #[tokio::test]
    async fn test_scheduler_runs_round_and_stops() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let registry = Arc::new(SiteRegistry::new(store, Arc::new(SystemClock)));
        registry.register("http://a.example", None).await?;

        let executor = Arc::new(MonitoringExecutor::new(
            registry.clone(),
            Arc::new(AlwaysUp),
            Arc::new(NeverCalled),
            Arc::new(LogNotifier),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = MonitoringScheduler::new(executor, shutdown_rx);

        let handle = scheduler.schedule(RoundKind::Uptime, Duration::from_secs(60));

        // The first tick fires immediately.
        let mut status = UptimeStatus::NotYetChecked;
        for _ in 0..50 {
            status = registry.find_by_url("http://a.example").await?.uptime_status;
            if status == UptimeStatus::Up {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(status, UptimeStatus::Up);

        shutdown_tx.send(true)?;
        tokio::time::timeout(Duration::from_secs(2), handle).await??;
        Ok(())
    }
}
