//! Record normalization
//!
//! Maps raw API records into the host's canonical record shape. Raw records
//! are trusted to exist but not to be complete: validation happens here, at
//! the boundary, and a record that cannot be normalized is skipped by the
//! caller rather than aborting the push.

mod records;
mod timestamp;

pub use records::{
    is_tracker_url, normalize_attachment, normalize_card, normalize_member,
    rewrite_attachment_url, rich_text,
};
pub use timestamp::{created_at_from_id, iso_from_id};

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

/// The canonical record shape expected downstream
///
/// `created_date` is derived deterministically from the record identifier
/// and never taken from the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// External record id
    pub id: String,
    /// ISO 8601 creation timestamp, derived from the id
    pub created_date: String,
    /// ISO 8601 last-modified timestamp
    pub modified_date: String,
    /// Canonical field map
    pub data: JsonObject,
}
