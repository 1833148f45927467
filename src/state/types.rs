//! State types for tracking extraction progress
//!
//! These types are serialized to JSON and persisted between invocations by
//! the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion flag for a phase without pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseState {
    /// Whether the phase finished in a previous invocation
    pub completed: bool,
}

/// State of the paginated cards phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardsPhaseState {
    /// Whether pagination is exhausted
    pub completed: bool,
    /// Pagination cursor: id of the oldest card seen on the last page.
    /// Cleared when pagination completes.
    pub before: Option<String>,
    /// Fixed watermark for this incremental sync. Set once at sync start
    /// from the previous sync's start time; never mutated mid-sync.
    pub modified_since: Option<DateTime<Utc>>,
}

/// Complete state for one sync, persisted across invocations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionState {
    /// Users phase
    pub users: PhaseState,
    /// Cards phase (pagination cursor lives here)
    pub cards: CardsPhaseState,
    /// Attachments phase; completed only together with cards, since
    /// attachments are discovered as a side effect of card pages
    pub attachments: PhaseState,
    /// Start time of the last sync that finished successfully; watermark
    /// source for the next incremental sync
    pub last_successful_sync_started: Option<DateTime<Utc>>,
    /// Start time of the sync currently in flight
    pub sync_started: Option<DateTime<Utc>>,
}

impl ExtractionState {
    /// Create a fresh, empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new sync window
    ///
    /// In incremental mode the cards and attachments phases are reset and
    /// the watermark is pinned from the previous successful sync's start.
    /// Called only on a "data start" event; "data continue" never resets.
    pub fn start_incremental(&mut self, now: DateTime<Utc>) {
        let watermark = self.last_successful_sync_started;
        self.cards = CardsPhaseState {
            completed: false,
            before: None,
            modified_since: watermark,
        };
        self.attachments.completed = false;
        self.sync_started = Some(now);
    }

    /// Begin a new full sync window
    ///
    /// Clears the cards and attachments phases, including any watermark a
    /// previously aborted incremental sync left behind: a full sync must
    /// never filter by a stale `modified_since`.
    pub fn start_initial(&mut self, now: DateTime<Utc>) {
        self.cards = CardsPhaseState::default();
        self.attachments.completed = false;
        self.sync_started = Some(now);
    }

    /// Mark cards pagination exhausted
    ///
    /// Clears the cursor and completes the attachments phase atomically:
    /// there is no independent attachments pagination.
    pub fn complete_cards(&mut self) {
        self.cards.completed = true;
        self.cards.before = None;
        self.attachments.completed = true;
    }

    /// Whether every data phase has completed
    pub fn data_done(&self) -> bool {
        self.users.completed && self.cards.completed && self.attachments.completed
    }

    /// Promote the in-flight sync start to the incremental watermark source
    pub fn finish_sync(&mut self) {
        if let Some(started) = self.sync_started.take() {
            self.last_successful_sync_started = Some(started);
        }
    }
}
