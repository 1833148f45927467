//! Typed surface over the external API
//!
//! Raw records are permissive: the API is authoritative but loosely shaped,
//! so every enrichment field is optional and only validated at the
//! normalizer boundary.

mod endpoints;
mod types;

pub use endpoints::TrelloApi;
pub use types::{
    TrelloAction, TrelloActionData, TrelloAttachment, TrelloBoard, TrelloCard, TrelloMember,
};
