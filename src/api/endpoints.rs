//! Endpoint wrappers
//!
//! Thin, typed calls over [`ApiClient`]. Every call inherits the client's
//! classification policy; nothing here branches on transport errors.

use super::types::{TrelloAction, TrelloBoard, TrelloCard, TrelloMember};
use crate::http::{ApiClient, ApiResponse};

/// Typed access to the endpoints the extraction phases use
#[derive(Debug)]
pub struct TrelloApi {
    client: ApiClient,
}

impl TrelloApi {
    /// Wrap an API client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch all members of an organization in one call
    pub async fn members(&self, org_id: &str) -> ApiResponse<Vec<TrelloMember>> {
        self.client
            .get_json(&format!("organizations/{org_id}/members"), &[])
            .await
    }

    /// Fetch the boards of an organization, open and closed
    pub async fn boards(&self, org_id: &str) -> ApiResponse<Vec<TrelloBoard>> {
        self.client
            .get_json(&format!("organizations/{org_id}/boards"), &[])
            .await
    }

    /// Fetch one page of a board's cards, newest first, with attachments
    /// inlined
    ///
    /// `before` is the pagination cursor: the id of the oldest card seen on
    /// the previous page.
    pub async fn cards_page(
        &self,
        board_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> ApiResponse<Vec<TrelloCard>> {
        let mut query = vec![
            ("limit", limit.to_string()),
            ("attachments", "true".to_string()),
        ];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }
        self.client
            .get_json(&format!("boards/{board_id}/cards"), &query)
            .await
    }

    /// Fetch the comment actions of a card
    pub async fn card_comments(&self, card_id: &str) -> ApiResponse<Vec<TrelloAction>> {
        self.client
            .get_json(
                &format!("cards/{card_id}/actions"),
                &[("filter", "commentCard".to_string())],
            )
            .await
    }
}
