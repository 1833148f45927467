//! Single-page fetch and continuation decision

use crate::api::{TrelloApi, TrelloCard};
use crate::error::{Error, Result};
use tracing::debug;

/// Continuation decision after one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages remain; resume with this cursor
    Continue {
        /// Id of the oldest card on the page just fetched
        before: String,
    },
    /// The collection is exhausted
    Done,
}

/// Outcome of one page fetch
#[derive(Debug)]
pub enum PageOutcome {
    /// A page of cards and the continuation decision
    Page {
        /// The fetched records, newest first
        cards: Vec<TrelloCard>,
        /// Whether and where to continue
        next: NextPage,
    },
    /// The API rejected the call; retry the same page after the delay
    RateLimited {
        /// Seconds to wait before retrying
        delay: u64,
    },
}

/// Fetch one page of a board's cards
///
/// A response shorter than `page_size` (including an empty first page) marks
/// the collection exhausted. On 429 the cursor is not advanced: the caller
/// must retry the same page after the delay. Any other failure is a phase
/// error.
pub async fn fetch_card_page(
    api: &TrelloApi,
    board_id: &str,
    page_size: u32,
    before: Option<&str>,
) -> Result<PageOutcome> {
    let response = api.cards_page(board_id, page_size, before).await;

    if response.is_rate_limited() {
        return Ok(PageOutcome::RateLimited {
            delay: response.api_delay,
        });
    }

    if response.status_code == 401 || response.status_code == 403 {
        return Err(Error::auth(response.message));
    }

    let Some(cards) = response.data else {
        return Err(Error::Other(format!(
            "card page fetch failed ({}): {}",
            response.status_code, response.message
        )));
    };

    debug!(
        "fetched {} cards for board {board_id} (before={before:?})",
        cards.len()
    );

    let next = if cards.len() < page_size as usize {
        NextPage::Done
    } else {
        // Pages are newest-first, so the first element is the oldest record
        // on this page and becomes the cursor for the next one.
        let oldest = cards
            .first()
            .and_then(|c| c.id.clone())
            .ok_or_else(|| Error::state("card page has no leading id to paginate from"))?;
        NextPage::Continue { before: oldest }
    };

    Ok(PageOutcome::Page { cards, next })
}
