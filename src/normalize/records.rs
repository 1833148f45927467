//! Per-record-type normalizers

use super::timestamp::{created_at_from_id, iso, iso_from_id};
use super::NormalizedRecord;
use crate::api::{TrelloAction, TrelloAttachment, TrelloCard, TrelloMember};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::{json, Value};
use url::Url;

/// Domain whose attachment URLs require signed downloads
const TRACKER_DOMAIN: &str = "trello.com";

/// Split free text into an ordered list of non-empty lines
///
/// Empty or absent input produces an empty list, not null.
pub fn rich_text(text: Option<&str>) -> Vec<String> {
    text.map(|t| {
        t.split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Normalize an organization member into a `users` record
pub fn normalize_member(member: &TrelloMember) -> Result<NormalizedRecord> {
    let id = member
        .id
        .clone()
        .ok_or_else(|| Error::normalization("member record has no id"))?;

    let created = iso_from_id(&id);
    let mut data = JsonObject::new();
    data.insert("full_name".to_string(), json!(member.full_name));
    data.insert("username".to_string(), json!(member.username));

    Ok(NormalizedRecord {
        created_date: created.clone(),
        modified_date: created,
        id,
        data,
    })
}

/// Normalize a card, folding its comment actions into the record
pub fn normalize_card(card: &TrelloCard, comments: &[TrelloAction]) -> Result<NormalizedRecord> {
    let id = card
        .id
        .clone()
        .ok_or_else(|| Error::normalization("card record has no id"))?;

    let created_at = created_at_from_id(&id);
    let modified = card.date_last_activity.unwrap_or(created_at);

    let comment_values: Vec<Value> = comments
        .iter()
        .filter(|action| action.id.is_some())
        .map(|action| {
            json!({
                "id": action.id,
                "author_id": action.id_member_creator,
                "body": rich_text(action.data.text.as_deref()),
                "date": action.date.map(iso),
            })
        })
        .collect();

    let mut data = JsonObject::new();
    data.insert("name".to_string(), json!(card.name));
    data.insert(
        "description".to_string(),
        json!(rich_text(card.desc.as_deref())),
    );
    data.insert("board_id".to_string(), json!(card.id_board));
    data.insert("list_id".to_string(), json!(card.id_list));
    // Reference fields pass through as id lists; resolution is the host's job.
    data.insert("member_ids".to_string(), json!(card.id_members));
    data.insert("label_ids".to_string(), json!(card.id_labels));
    data.insert("url".to_string(), json!(card.url));
    data.insert("closed".to_string(), json!(card.closed.unwrap_or(false)));
    data.insert("comments".to_string(), Value::Array(comment_values));

    Ok(NormalizedRecord {
        created_date: iso(created_at),
        modified_date: iso(modified),
        id,
        data,
    })
}

/// Normalize an attachment discovered on a card page
///
/// URLs on the tracker's own domain are rewritten to the stable download
/// endpoint so they can later be fetched with signed authorization.
pub fn normalize_attachment(
    attachment: &TrelloAttachment,
    parent_id: &str,
    api_base: &str,
) -> Result<NormalizedRecord> {
    let id = attachment
        .id
        .clone()
        .ok_or_else(|| Error::normalization("attachment record has no id"))?;

    let file_name = attachment
        .file_name
        .clone()
        .or_else(|| attachment.name.clone())
        .unwrap_or_else(|| "attachment".to_string());

    let url = attachment
        .url
        .as_deref()
        .map(|u| rewrite_attachment_url(u, parent_id, &id, &file_name, api_base));

    let created_at = created_at_from_id(&id);
    let modified = attachment.date.unwrap_or(created_at);

    let mut data = JsonObject::new();
    data.insert("file_name".to_string(), json!(file_name));
    data.insert("url".to_string(), json!(url));
    data.insert("parent_id".to_string(), json!(parent_id));
    data.insert("author_id".to_string(), json!(attachment.id_member));
    data.insert("mime_type".to_string(), json!(attachment.mime_type));

    Ok(NormalizedRecord {
        created_date: iso(created_at),
        modified_date: iso(modified),
        id,
        data,
    })
}

/// Whether a URL is hosted on the tracker's own domain
///
/// Such URLs require the signed download endpoint; anything else is fetched
/// as-is.
pub fn is_tracker_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .is_some_and(|host| {
            host == TRACKER_DOMAIN || host.ends_with(&format!(".{TRACKER_DOMAIN}"))
        })
}

/// Rewrite a tracker-hosted attachment URL to the stable download endpoint;
/// URLs hosted elsewhere pass through unchanged
pub fn rewrite_attachment_url(
    url: &str,
    parent_id: &str,
    attachment_id: &str,
    file_name: &str,
    api_base: &str,
) -> String {
    if is_tracker_url(url) {
        format!(
            "{}/cards/{parent_id}/attachments/{attachment_id}/download/{file_name}",
            api_base.trim_end_matches('/')
        )
    } else {
        url.to_string()
    }
}
