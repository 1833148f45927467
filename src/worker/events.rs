//! Lifecycle event contracts
//!
//! Inbound events arrive from the host, one per invocation, carrying the
//! event type, connection data, and the previously persisted state.
//! Outbound events report exactly one terminal outcome per invocation.

use crate::state::ExtractionState;
use crate::types::SyncMode;
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound
// ============================================================================

/// Lifecycle event types delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ExtractionExternalSyncUnitsStart,
    ExtractionMetadataStart,
    ExtractionDataStart,
    ExtractionDataContinue,
    ExtractionAttachmentsStart,
    ExtractionAttachmentsContinue,
}

/// Connection data carried on every event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionData {
    /// Opaque connection string: `key=<apiKey>&token=<token>`
    pub key: String,
    /// Organization to extract from
    #[serde(default)]
    pub org_id: Option<String>,
}

/// Per-event context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventContext {
    /// The external sync unit (board) selected for data extraction
    pub external_sync_unit_id: Option<String>,
    /// Requested sync mode
    pub mode: SyncMode,
}

/// One inbound lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionEvent {
    /// What the host wants done
    pub event_type: EventType,
    /// Credentials and organization
    pub connection_data: ConnectionData,
    /// Sync unit and mode
    #[serde(default)]
    pub event_context: EventContext,
    /// Previously persisted phase state; empty on the first invocation
    #[serde(default)]
    pub state: ExtractionState,
}

// ============================================================================
// Outbound
// ============================================================================

/// A board exposed to the host as a selectable unit of extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSyncUnit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: String,
}

/// Error payload attached to `*_ERROR` events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable failure description
    pub message: String,
}

/// The single outcome event emitted per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_data")]
pub enum ExtractorEvent {
    #[serde(rename = "EXTRACTION_EXTERNAL_SYNC_UNITS_DONE")]
    ExternalSyncUnitsDone {
        external_sync_units: Vec<ExternalSyncUnit>,
    },
    #[serde(rename = "EXTRACTION_EXTERNAL_SYNC_UNITS_DELAY")]
    ExternalSyncUnitsDelay { delay: u64 },
    #[serde(rename = "EXTRACTION_EXTERNAL_SYNC_UNITS_ERROR")]
    ExternalSyncUnitsError { error: ErrorPayload },

    #[serde(rename = "EXTRACTION_METADATA_DONE")]
    MetadataDone,
    #[serde(rename = "EXTRACTION_METADATA_DELAY")]
    MetadataDelay { delay: u64 },
    #[serde(rename = "EXTRACTION_METADATA_ERROR")]
    MetadataError { error: ErrorPayload },

    #[serde(rename = "EXTRACTION_DATA_DONE")]
    DataDone,
    #[serde(rename = "EXTRACTION_DATA_DELAY")]
    DataDelay { delay: u64 },
    #[serde(rename = "EXTRACTION_DATA_ERROR")]
    DataError { error: ErrorPayload },
    #[serde(rename = "EXTRACTION_DATA_PROGRESS")]
    DataProgress,

    #[serde(rename = "EXTRACTION_ATTACHMENTS_DONE")]
    AttachmentsDone,
    #[serde(rename = "EXTRACTION_ATTACHMENTS_DELAY")]
    AttachmentsDelay { delay: u64 },
    #[serde(rename = "EXTRACTION_ATTACHMENTS_ERROR")]
    AttachmentsError { error: ErrorPayload },
    #[serde(rename = "EXTRACTION_ATTACHMENTS_PROGRESS")]
    AttachmentsProgress { progress: u64 },
}

impl ExtractorEvent {
    /// The delay carried by a `*_DELAY` event
    pub fn delay(&self) -> Option<u64> {
        match self {
            Self::ExternalSyncUnitsDelay { delay }
            | Self::MetadataDelay { delay }
            | Self::DataDelay { delay }
            | Self::AttachmentsDelay { delay } => Some(*delay),
            _ => None,
        }
    }

    /// Whether this is a `*_ERROR` event
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ExternalSyncUnitsError { .. }
                | Self::MetadataError { .. }
                | Self::DataError { .. }
                | Self::AttachmentsError { .. }
        )
    }

    /// Whether this is a `*_DONE` event
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            Self::ExternalSyncUnitsDone { .. }
                | Self::MetadataDone
                | Self::DataDone
                | Self::AttachmentsDone
        )
    }
}
