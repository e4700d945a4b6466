use anyhow::{Result, anyhow};
use std::time::{Duration, Instant};

/// Checker trait for uptime probes
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Perform the check and return latency in milliseconds and optional status code
    async fn check(&self, target: &str) -> Result<(u64, Option<u16>)>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("uppe-sites/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> Result<(u64, Option<u16>)> {
        let start = Instant::now();

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let latency = start.elapsed().as_millis() as u64;
        let status = response.status();

        // 2xx and 3xx count as reachable
        if status.is_success() || status.is_redirection() {
            Ok((latency, Some(status.as_u16())))
        } else {
            Err(anyhow!("HTTP check failed with status code: {}", status.as_u16()))
        }
    }
}
