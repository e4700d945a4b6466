//! TLS certificate probing.
//!
//! Connects to the site's host with the webpki root store, so chain,
//! hostname and validity period are all verified by the handshake itself.
//! A completed handshake means the certificate is valid; the leaf's
//! `not_after` becomes the expiration date.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::debug;
use url::{Host, Url};

use super::types::CertificateProbe;

/// Checker trait for certificate probes
#[async_trait::async_trait]
pub trait CertificateChecker: Send + Sync {
    async fn check(&self, url: &str) -> CertificateProbe;
}

/// Leaf certificate details read after a successful handshake
#[derive(Debug, Clone)]
pub struct CertificateDetails {
    pub expiration_date: DateTime<Utc>,
    pub issuer: String,
}

pub struct TlsCertificateChecker {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsCertificateChecker {
    pub fn new(timeout_seconds: u64) -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// Handshake with the URL's host and read the leaf certificate
    pub async fn fetch(&self, url: &str) -> Result<CertificateDetails> {
        let (host, port) = tls_endpoint(url)?;
        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| anyhow!("Invalid server name {host}: {e}"))?;

        debug!(%host, port, "Fetching certificate");

        let sock = timeout(self.timeout, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| anyhow!("TCP connection timeout for {host}:{port}"))?
            .map_err(|e| anyhow!("Failed to connect to {host}:{port}: {e}"))?;

        let tls_stream = timeout(self.timeout, self.connector.connect(server_name, sock))
            .await
            .map_err(|_| anyhow!("TLS handshake timeout for {host}"))?
            .map_err(|e| anyhow!("TLS handshake failed for {host}: {e}"))?;

        let leaf = tls_stream
            .get_ref()
            .1
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| anyhow!("{host} presented no certificate"))?;

        let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
            .map_err(|e| anyhow!("Failed to parse certificate for {host}: {e}"))?;

        let not_after = cert.validity().not_after.timestamp();
        let expiration_date = DateTime::from_timestamp(not_after, 0)
            .ok_or_else(|| anyhow!("Certificate expiry out of range: {not_after}"))?;

        Ok(CertificateDetails { expiration_date, issuer: cert.issuer().to_string() })
    }
}

#[async_trait::async_trait]
impl CertificateChecker for TlsCertificateChecker {
    async fn check(&self, url: &str) -> CertificateProbe {
        match self.fetch(url).await {
            Ok(details) => CertificateProbe::valid(details.expiration_date, Some(details.issuer)),
            Err(e) => CertificateProbe::invalid(e.to_string()),
        }
    }
}

/// Host and port to open a TLS connection to
fn tls_endpoint(url: &str) -> Result<(String, u16)> {
    let url = Url::parse(url).map_err(|e| anyhow!("Invalid url: {e}"))?;

    if url.scheme() != "https" {
        return Err(anyhow!("Certificate checks need an https url, got {}", url.scheme()));
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => return Err(anyhow!("Url has no host")),
    };

    Ok((host, url.port_or_known_default().unwrap_or(443)))
}
