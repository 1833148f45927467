//! Extraction worker
//!
//! Drives one lifecycle event to exactly one outbound event. The worker is
//! stateless between invocations; all progress lives in the event's state,
//! which the host persists and hands back on the next invocation.

mod events;


pub use events::{
    ConnectionData, ErrorPayload, EventContext, EventType, ExtractionEvent, ExternalSyncUnit,
    ExtractorEvent,
};

use crate::api::{TrelloApi, TrelloCard};
use crate::attachments::{AttachmentStreamer, StreamOutcome};
use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::include_since;
use crate::http::{ApiClient, ApiClientConfig};
use crate::normalize::{normalize_attachment, normalize_card, normalize_member};
use crate::pagination::{fetch_card_page, NextPage, PageOutcome};
use crate::repo::Repository;
use crate::state::ExtractionState;
use crate::types::{item_types, SyncMode};
use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Outcome of one phase's work within a single invocation
enum PhaseStep {
    /// The phase ran to completion
    Finished,
    /// The API throttled the phase; retry after this many seconds
    Throttled(u64),
    /// The soft deadline passed at a safe boundary; more work remains
    DeadlineReached,
}

/// Executes extraction phases against a repository
pub struct ExtractionWorker {
    config: Config,
    repo: Arc<dyn Repository>,
}

impl ExtractionWorker {
    /// Create a worker bound to a repository
    pub fn new(config: Config, repo: Arc<dyn Repository>) -> Self {
        Self { config, repo }
    }

    /// Process one lifecycle event
    ///
    /// Mutates `event.state` in place as phases progress and returns the
    /// single outbound event for this invocation. Errors never escape: every
    /// failure is logged and turned into the phase's `*_ERROR` event.
    ///
    /// The soft deadline is cooperative: it is checked between pages and
    /// between attachments, never by cancelling an in-flight call, so a
    /// deadline can interrupt only at a boundary where all completed work
    /// has already been pushed.
    pub async fn handle_event(&self, event: &mut ExtractionEvent) -> ExtractorEvent {
        info!(event_type = ?event.event_type, "handling extraction event");
        let deadline = Instant::now() + Duration::from_secs(self.config.soft_deadline_secs);

        match event.event_type {
            EventType::ExtractionExternalSyncUnitsStart => {
                match self.external_sync_units(event).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!("external sync unit enumeration failed: {err}");
                        ExtractorEvent::ExternalSyncUnitsError {
                            error: ErrorPayload {
                                message: err.to_string(),
                            },
                        }
                    }
                }
            }
            EventType::ExtractionMetadataStart => match self.metadata(event) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("metadata phase failed: {err}");
                    ExtractorEvent::MetadataError {
                        error: ErrorPayload {
                            message: err.to_string(),
                        },
                    }
                }
            },
            EventType::ExtractionDataStart | EventType::ExtractionDataContinue => {
                match self.data(event, deadline).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!("data extraction failed: {err}");
                        ExtractorEvent::DataError {
                            error: ErrorPayload {
                                message: err.to_string(),
                            },
                        }
                    }
                }
            }
            EventType::ExtractionAttachmentsStart | EventType::ExtractionAttachmentsContinue => {
                match self.attachments(event, deadline).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!("attachment streaming failed: {err}");
                        ExtractorEvent::AttachmentsError {
                            error: ErrorPayload {
                                message: err.to_string(),
                            },
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Enumerate the organization's open boards as selectable sync units
    async fn external_sync_units(&self, event: &ExtractionEvent) -> Result<ExtractorEvent> {
        let api = self.api(event)?;
        let org_id = Self::org_id(event)?;

        let response = api.boards(&org_id).await;
        if response.is_rate_limited() {
            return Ok(ExtractorEvent::ExternalSyncUnitsDelay {
                delay: response.api_delay,
            });
        }
        if response.status_code == 401 || response.status_code == 403 {
            return Err(Error::auth(response.message));
        }
        let Some(boards) = response.data else {
            return Err(Error::Other(format!(
                "board fetch failed ({}): {}",
                response.status_code, response.message
            )));
        };

        let external_sync_units: Vec<ExternalSyncUnit> = boards
            .iter()
            .filter(|board| !board.closed.unwrap_or(false))
            .filter_map(|board| {
                let id = board.id.clone()?;
                Some(ExternalSyncUnit {
                    id,
                    name: board.name.clone().unwrap_or_default(),
                    description: board.desc.clone().unwrap_or_default(),
                    item_type: item_types::CARDS.to_string(),
                })
            })
            .collect();

        info!("declaring {} external sync units", external_sync_units.len());
        Ok(ExtractorEvent::ExternalSyncUnitsDone {
            external_sync_units,
        })
    }

    /// Validate the connection and declare the static domain mapping ready
    fn metadata(&self, event: &ExtractionEvent) -> Result<ExtractorEvent> {
        Credentials::parse(&event.connection_data.key)?;
        info!("metadata phase complete");
        Ok(ExtractorEvent::MetadataDone)
    }

    /// Run the resumable data phases: users, then cards with attachments
    ///
    /// Resumes from whatever the state says is incomplete. Any 429 along the
    /// way stops the invocation with a delay event; the cursor stays on the
    /// page that was throttled so the next invocation retries it. A passed
    /// deadline stops the invocation between pages with a progress event.
    async fn data(&self, event: &mut ExtractionEvent, deadline: Instant) -> Result<ExtractorEvent> {
        let api = self.api(event)?;

        if event.event_type == EventType::ExtractionDataStart {
            match event.event_context.mode {
                SyncMode::Incremental => event.state.start_incremental(Utc::now()),
                SyncMode::Initial => event.state.start_initial(Utc::now()),
            }
        }

        if !event.state.users.completed {
            let org_id = Self::org_id(event)?;
            match self.extract_users(&api, &org_id, &mut event.state).await? {
                PhaseStep::Throttled(delay) => return Ok(ExtractorEvent::DataDelay { delay }),
                PhaseStep::Finished | PhaseStep::DeadlineReached => {}
            }
        }

        if !event.state.cards.completed {
            let board_id = event
                .event_context
                .external_sync_unit_id
                .clone()
                .ok_or_else(|| Error::missing_field("external_sync_unit_id"))?;
            match self
                .extract_cards(&api, &board_id, &mut event.state, deadline)
                .await?
            {
                PhaseStep::Throttled(delay) => return Ok(ExtractorEvent::DataDelay { delay }),
                PhaseStep::DeadlineReached => {
                    warn!("soft deadline reached between card pages, yielding to the host");
                    return Ok(ExtractorEvent::DataProgress);
                }
                PhaseStep::Finished => {}
            }
        }

        event.state.finish_sync();
        info!("data extraction complete");
        Ok(ExtractorEvent::DataDone)
    }

    /// Stream every discovered attachment binary into the repository
    ///
    /// Per-attachment failures are logged and skipped; only a 429 stops the
    /// pass, and the next invocation restarts it (uploads are idempotent).
    /// The deadline is checked between attachments, never mid-stream, and at
    /// least one attachment is processed per invocation.
    async fn attachments(
        &self,
        event: &ExtractionEvent,
        deadline: Instant,
    ) -> Result<ExtractorEvent> {
        let credentials = Credentials::parse(&event.connection_data.key)?;
        let streamer = AttachmentStreamer::new(credentials);

        let stored = self.repo.stored(item_types::ATTACHMENTS).await?;
        let total = stored.len();
        info!("streaming {total} attachments");

        for (index, record) in stored.iter().enumerate() {
            if let Some(url) = record.data.get("url").and_then(Value::as_str) {
                match streamer.stream(&record.id, url).await {
                    StreamOutcome::Stream(body) => {
                        if let Err(err) = self.repo.upload_attachment(record, body).await {
                            error!("upload failed for attachment {}: {err}", record.id);
                        }
                    }
                    StreamOutcome::Delay(delay) => {
                        warn!("attachment streaming throttled, retrying in {delay}s");
                        return Ok(ExtractorEvent::AttachmentsDelay { delay });
                    }
                    StreamOutcome::Error { message } => {
                        error!("attachment {} failed: {message}, skipping", record.id);
                    }
                }
            } else {
                warn!("attachment {} has no url, skipping", record.id);
            }

            let processed = index + 1;
            if processed < total && Instant::now() >= deadline {
                let progress = (processed * 100 / total) as u64;
                warn!("soft deadline reached after {processed}/{total} attachments, yielding");
                return Ok(ExtractorEvent::AttachmentsProgress { progress });
            }
        }

        Ok(ExtractorEvent::AttachmentsDone)
    }

    // ========================================================================
    // Data phase internals
    // ========================================================================

    /// Fetch and push all organization members in one call
    ///
    /// Returns `Throttled` when rate limited; nothing is pushed in that
    /// case.
    async fn extract_users(
        &self,
        api: &TrelloApi,
        org_id: &str,
        state: &mut ExtractionState,
    ) -> Result<PhaseStep> {
        let response = api.members(org_id).await;
        if response.is_rate_limited() {
            return Ok(PhaseStep::Throttled(response.api_delay));
        }
        if response.status_code == 401 || response.status_code == 403 {
            return Err(Error::auth(response.message));
        }
        let Some(members) = response.data else {
            return Err(Error::Other(format!(
                "member fetch failed ({}): {}",
                response.status_code, response.message
            )));
        };

        let records: Vec<_> = members
            .iter()
            .filter_map(|member| match normalize_member(member) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping member: {err}");
                    None
                }
            })
            .collect();

        info!("pushing {} users", records.len());
        self.repo.push(item_types::USERS, records).await?;
        state.users.completed = true;
        Ok(PhaseStep::Finished)
    }

    /// Walk the board's card pages from the persisted cursor
    ///
    /// Returns `Throttled` when any call in the page was rate limited; the
    /// cursor only advances after the page's records are pushed, so a
    /// throttled page is retried whole. The deadline is checked after each
    /// pushed page, never mid-page, and at least one page is processed per
    /// invocation so a short deadline cannot stall progress.
    async fn extract_cards(
        &self,
        api: &TrelloApi,
        board_id: &str,
        state: &mut ExtractionState,
        deadline: Instant,
    ) -> Result<PhaseStep> {
        loop {
            let before = state.cards.before.clone();
            match fetch_card_page(api, board_id, self.config.page_size, before.as_deref()).await? {
                PageOutcome::RateLimited { delay } => return Ok(PhaseStep::Throttled(delay)),
                PageOutcome::Page { cards, next } => {
                    let watermark = state.cards.modified_since;
                    let fresh: Vec<&TrelloCard> = cards
                        .iter()
                        .filter(|card| {
                            if card.id.is_none() {
                                warn!("skipping card with no id");
                                return false;
                            }
                            include_since(card.date_last_activity, watermark)
                        })
                        .collect();
                    let skipped = cards.len() - fresh.len();
                    if skipped > 0 {
                        debug!("skipped {skipped} cards on this page");
                    }

                    if let Some(delay) = self.enrich_and_push(api, &fresh).await? {
                        return Ok(PhaseStep::Throttled(delay));
                    }

                    match next {
                        NextPage::Continue { before } => {
                            state.cards.before = Some(before);
                            if Instant::now() >= deadline {
                                return Ok(PhaseStep::DeadlineReached);
                            }
                        }
                        NextPage::Done => {
                            state.complete_cards();
                            return Ok(PhaseStep::Finished);
                        }
                    }
                }
            }
        }
    }

    /// Fan out comment fetches for one page, then push cards and attachments
    ///
    /// A 429 on any comment fetch discards the whole page's results and
    /// returns the longest requested delay; nothing is pushed partially.
    async fn enrich_and_push(&self, api: &TrelloApi, cards: &[&TrelloCard]) -> Result<Option<u64>> {
        let responses = join_all(
            cards
                .iter()
                .map(|card| api.card_comments(card.id.as_deref().unwrap_or(""))),
        )
        .await;

        if let Some(delay) = responses
            .iter()
            .filter(|response| response.is_rate_limited())
            .map(|response| response.api_delay)
            .max()
        {
            warn!("comment fetch throttled, page will be retried");
            return Ok(Some(delay));
        }

        let mut card_records = Vec::with_capacity(cards.len());
        let mut attachment_records = Vec::new();

        for (card, response) in cards.iter().zip(responses) {
            let Some(comments) = response.data else {
                return Err(Error::Other(format!(
                    "comment fetch failed ({}): {}",
                    response.status_code, response.message
                )));
            };

            match normalize_card(card, &comments) {
                Ok(record) => card_records.push(record),
                Err(err) => {
                    warn!("skipping card: {err}");
                    continue;
                }
            }

            let card_id = card.id.as_deref().unwrap_or("");
            for attachment in &card.attachments {
                match normalize_attachment(attachment, card_id, &self.config.api_base) {
                    Ok(record) => attachment_records.push(record),
                    Err(err) => warn!("skipping attachment: {err}"),
                }
            }
        }

        if !card_records.is_empty() {
            info!("pushing {} cards", card_records.len());
            self.repo.push(item_types::CARDS, card_records).await?;
        }
        if !attachment_records.is_empty() {
            info!("pushing {} attachments", attachment_records.len());
            self.repo
                .push(item_types::ATTACHMENTS, attachment_records)
                .await?;
        }
        Ok(None)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn api(&self, event: &ExtractionEvent) -> Result<TrelloApi> {
        let credentials = Credentials::parse(&event.connection_data.key)?;
        let config = ApiClientConfig::new(&self.config.api_base);
        Ok(TrelloApi::new(ApiClient::new(config, credentials)))
    }

    fn org_id(event: &ExtractionEvent) -> Result<String> {
        event
            .connection_data
            .org_id
            .clone()
            .ok_or_else(|| Error::missing_field("org_id"))
    }
}
