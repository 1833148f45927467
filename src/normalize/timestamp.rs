//! Creation-time derivation from record identifiers
//!
//! Every external identifier embeds its creation time: the first 8 hex
//! characters are a Unix-epoch seconds value. Parsing must never fail a
//! phase; a malformed id falls back to the current time.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Derive the creation time embedded in a record id
pub fn created_at_from_id(id: &str) -> DateTime<Utc> {
    id.get(..8)
        .and_then(|prefix| u32::from_str_radix(prefix, 16).ok())
        .and_then(|secs| Utc.timestamp_opt(i64::from(secs), 0).single())
        .unwrap_or_else(Utc::now)
}

/// Derive the creation time as an ISO 8601 string
pub fn iso_from_id(id: &str) -> String {
    created_at_from_id(id).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a timestamp the way the canonical schema expects
pub fn iso(when: DateTime<Utc>) -> String {
    when.to_rfc3339_opts(SecondsFormat::Millis, true)
}
