/// Data model for monitored sites
///
/// The site record is a plain data type; behaviour around it (uniqueness,
/// transition stamping, health) lives in `crate::sites`.
pub mod presenter;
pub mod site;
pub mod status;

pub use presenter::SiteSummary;
pub use site::Site;
pub use status::{SslCertificateStatus, UptimeStatus};
