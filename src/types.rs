//! Common types used throughout the connector
//!
//! Shared type definitions, type aliases, and the item-type names used by
//! the host repository.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Sync Mode
// ============================================================================

/// Synchronization mode requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncMode {
    /// Full extraction of every record
    #[default]
    Initial,
    /// Only records changed since the last successful sync
    Incremental,
}

// ============================================================================
// Item Types
// ============================================================================

/// Repository item-type names, shared between the worker and the host's
/// storage collaborator.
pub mod item_types {
    /// Organization members
    pub const USERS: &str = "users";
    /// Cards, including their comments
    pub const CARDS: &str = "cards";
    /// Card attachments (metadata; binaries are streamed separately)
    pub const ATTACHMENTS: &str = "attachments";
}
