/// Monitoring engine module - probes sites and records what it finds
///
/// This module is responsible for:
/// - Executing uptime (HTTP) and certificate (TLS) probes
/// - Writing probe results through the site registry
/// - Deciding and dispatching alerts
/// - Scheduling periodic checking rounds
pub mod alerts;
pub mod certificate;
pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod types;

pub use alerts::{LogNotifier, Notifier};
pub use certificate::{CertificateChecker, TlsCertificateChecker};
pub use checker::{Checker, HttpChecker};
pub use executor::MonitoringExecutor;
pub use scheduler::MonitoringScheduler;
