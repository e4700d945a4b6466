use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::cli::Command;
use crate::config::Config;
use crate::database::{DatabaseImpl, initialize_database};
use crate::models::SiteSummary;
use crate::monitoring::{
    HttpChecker, LogNotifier, MonitoringExecutor, MonitoringScheduler, TlsCertificateChecker,
};
use crate::pool::open_pool;
use crate::sites::{SiteRegistry, SystemClock};

/// Wired-up service: storage, registry and executor
pub struct App {
    registry: Arc<SiteRegistry>,
    executor: Arc<MonitoringExecutor>,
    config: Config,
}

impl App {
    pub async fn open(config: Config) -> Result<Self> {
        let pool = open_pool(&config.database.path, config.database.pool_size).await?;
        {
            let conn = pool.get().await?;
            initialize_database(&conn).await?;
        }

        let store = Arc::new(DatabaseImpl::new_from_pool(pool));
        let registry = Arc::new(SiteRegistry::new(store, Arc::new(SystemClock)));
        let executor = MonitoringExecutor::new(
            registry.clone(),
            Arc::new(HttpChecker::new(config.uptime.timeout_seconds)?),
            Arc::new(TlsCertificateChecker::new(config.certificate.timeout_seconds)),
            Arc::new(LogNotifier),
        )
        .with_concurrency(config.uptime.concurrency)
        .with_expires_soon_days(config.certificate.expires_soon_days);

        Ok(Self { registry, executor: Arc::new(executor), config })
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Run => self.run().await?,
            Command::Create { url, no_ssl } => {
                let check_ssl = if no_ssl { Some(false) } else { None };
                let site = self.registry.register(&url, check_ssl).await?;
                println!("Registered {} (ssl checks: {})", site.url, site.check_ssl_certificate);
            }
            Command::Delete { url } => {
                self.registry.delete(&url).await?;
                println!("Deleted {url}");
            }
            Command::Enable { url } => {
                self.registry.set_enabled(&url, true).await?;
                println!("Enabled {url}");
            }
            Command::Disable { url } => {
                self.registry.set_enabled(&url, false).await?;
                println!("Disabled {url}");
            }
            Command::List { json } => println!("{}", self.list_output(json).await?),
            Command::CheckUptime { url: Some(url) } => {
                let site = self.registry.find_by_url(&url).await?;
                let site = self.executor.check_uptime(&site).await?;
                println!("{}", SiteSummary::from_site(&site, self.registry.now()).to_row());
            }
            Command::CheckUptime { url: None } => {
                let summary = self.executor.check_all_uptime().await?;
                println!("Checked {} sites, {} failed to record", summary.checked, summary.failed);
            }
            Command::CheckCertificate { url: Some(url) } => {
                let site = self.registry.find_by_url(&url).await?;
                let site = self.executor.check_certificate(&site).await?;
                println!("{}", SiteSummary::from_site(&site, self.registry.now()).to_row());
            }
            Command::CheckCertificate { url: None } => {
                let summary = self.executor.check_all_certificates().await?;
                println!("Checked {} certificates, {} failed to record", summary.checked, summary.failed);
            }
            Command::Config => print!("{}", self.config),
        }

        Ok(())
    }

    /// Render every site as table rows or a JSON array
    pub async fn list_output(&self, json: bool) -> Result<String> {
        let now = self.registry.now();
        let summaries: Vec<SiteSummary> = self
            .registry
            .all()
            .await?
            .iter()
            .map(|site| SiteSummary::from_site(site, now))
            .collect();

        if json {
            return Ok(serde_json::to_string_pretty(&summaries)?);
        }
        if summaries.is_empty() {
            return Ok("No sites registered".to_string());
        }

        Ok(summaries.iter().map(SiteSummary::to_row).collect::<Vec<_>>().join("\n"))
    }

    /// Run both checking loops until Ctrl-C
    async fn run(&self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = MonitoringScheduler::new(self.executor.clone(), shutdown_rx);
        let handles = scheduler.start(
            Duration::from_secs(self.config.uptime.interval_seconds.max(1)),
            Duration::from_secs(self.config.certificate.interval_seconds.max(1)),
        );

        info!(
            uptime_every = self.config.uptime.interval_seconds,
            certificate_every = self.config.certificate.interval_seconds,
            "Monitoring started"
        );

        tokio::signal::ctrl_c().await?;
        info!("Shutting down");
        shutdown_tx.send(true)?;

        for handle in handles {
            handle.await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::SiteError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_list_disable_delete() -> Result<()> {
        let dir = tempdir()?;
        let mut config = Config::default();
        config.database.path = dir.path().join("sites.db").to_string_lossy().to_string();
        let app = App::open(config).await?;

        assert_eq!(app.list_output(false).await?, "No sites registered");

        app.execute(Command::Create { url: "https://a.example".into(), no_ssl: false }).await?;
        app.execute(Command::Create { url: "http://b.example".into(), no_ssl: false }).await?;
        app.execute(Command::Disable { url: "http://b.example".into() }).await?;

        let table = app.list_output(false).await?;
        assert!(table.contains("https://a.example"));
        assert!(table.contains("http://b.example (disabled)"));

        let json: serde_json::Value = serde_json::from_str(&app.list_output(true).await?)?;
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0]["uptime_status"], "not_yet_checked");
        assert_eq!(json[0]["healthy"], false);

        app.execute(Command::Delete { url: "http://b.example".into() }).await?;
        assert!(!app.list_output(false).await?.contains("b.example"));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut config = Config::default();
        config.database.path = dir.path().join("sites.db").to_string_lossy().to_string();
        let app = App::open(config).await?;

        app.execute(Command::Create { url: "https://a.example".into(), no_ssl: false }).await?;
        let error = app
            .execute(Command::Create { url: "https://a.example".into(), no_ssl: true })
            .await
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<SiteError>(),
            Some(SiteError::DuplicateSite(url)) if url == "https://a.example"
        ));
        Ok(())
    }
}
