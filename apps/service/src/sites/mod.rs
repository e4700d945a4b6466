/// Site health tracking
///
/// - `guard`: no two sites share a URL
/// - `transition`: stamps `uptime_status_last_change_date` once per change
/// - `health`: composite healthy/unhealthy verdict
/// - `registry`: the write path composing guard → reconcile → commit
pub mod clock;
pub mod error;
pub mod guard;
pub mod health;
pub mod registry;
pub mod transition;


pub use clock::{Clock, SystemClock};
pub use error::SiteError;
pub use registry::{Applied, SiteRegistry, SiteUpdate};
