//! Raw record types as returned by the external API
//!
//! Field names follow the API's camelCase convention. Everything beyond `id`
//! is optional or defaulted; a record missing its `id` is rejected later, at
//! the normalizer boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An organization member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloMember {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub initials: Option<String>,
}

/// A board, exposed to the host as an external sync unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloBoard {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub closed: Option<bool>,
    pub url: Option<String>,
}

/// A card, with attachments requested inline on every page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloCard {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub closed: Option<bool>,
    pub date_last_activity: Option<DateTime<Utc>>,
    pub id_board: Option<String>,
    pub id_list: Option<String>,
    pub id_members: Vec<String>,
    pub id_labels: Vec<String>,
    pub url: Option<String>,
    pub attachments: Vec<TrelloAttachment>,
}

/// A card attachment (metadata; the binary is streamed separately)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloAttachment {
    pub id: Option<String>,
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub id_member: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub bytes: Option<u64>,
}

/// A card action; only comment actions are requested
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloAction {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub action_type: Option<String>,
    pub id_member_creator: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub data: TrelloActionData,
}

/// Payload of a card action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrelloActionData {
    pub text: Option<String>,
}
