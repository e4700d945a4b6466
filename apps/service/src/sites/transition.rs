//! Uptime transition stamping.
//!
//! `uptime_status_last_change_date` answers "since when has this site been
//! in its current state", so it moves only when the status value changes
//! between two committed snapshots, or when there is no stamp yet.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::Site;

/// Produce the record to persist, given the last committed snapshot.
pub fn reconcile(mut candidate: Site, previous: Option<&Site>, now: DateTime<Utc>) -> Site {
    let Some(previous) = previous.filter(|p| p.uptime_status_last_change_date.is_some()) else {
        debug!(url = %candidate.url, status = %candidate.uptime_status, "First uptime classification");
        candidate.uptime_status_last_change_date = Some(now);
        return candidate;
    };

    if previous.uptime_status != candidate.uptime_status {
        info!(
            url = %candidate.url,
            from = %previous.uptime_status,
            to = %candidate.uptime_status,
            "Uptime status changed"
        );
        candidate.uptime_status_last_change_date = Some(now);
    } else {
        candidate.uptime_status_last_change_date = previous.uptime_status_last_change_date;
    }

    candidate
}
