//! Incremental sync filter
//!
//! Decides whether a record counts as "new since the last successful sync".
//! The watermark is fixed for the duration of one incremental sync and is
//! taken from the *previous* sync's start time, never the current one, so
//! records modified while the current run is in flight are picked up next
//! time instead of being missed.

use chrono::{DateTime, Utc};

/// Decide whether a record should be included in this sync
///
/// No watermark means a full sync: every record is included. With a
/// watermark, a record is included only when its last-modified timestamp is
/// strictly greater. A record with no last-modified timestamp is excluded
/// under a watermark: it cannot be verified as new, and treating it as
/// always-new would re-push it on every incremental run.
pub fn include_since(
    modified: Option<DateTime<Utc>>,
    watermark: Option<DateTime<Utc>>,
) -> bool {
    match (modified, watermark) {
        (_, None) => true,
        (Some(modified), Some(watermark)) => modified > watermark,
        (None, Some(_)) => false,
    }
}
