//! # Trello Connector
//!
//! An extraction connector that pulls project-management data out of Trello
//! and republishes it, normalized, to a host synchronization platform.
//!
//! The host drives the connector with discrete lifecycle events; each
//! invocation performs as much work as it can, persists its progress in the
//! event's state, and answers with exactly one outbound event (done, delay,
//! progress, or error).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trello_connector::config::Config;
//! use trello_connector::repo::{JsonlRepository, Repository};
//! use trello_connector::worker::{ExtractionEvent, ExtractionWorker};
//!
//! #[tokio::main]
//! async fn main() -> trello_connector::Result<()> {
//!     let repo = JsonlRepository::new("output")?;
//!     let worker = ExtractionWorker::new(Config::from_env()?, Arc::new(repo) as Arc<dyn Repository>);
//!
//!     let mut event: ExtractionEvent = serde_json::from_str(r#"{ ... }"#)?;
//!     let outcome = worker.handle_event(&mut event).await;
//!     println!("{}", serde_json::to_string(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! host event ──> worker ──┬── external sync units (boards)
//!                         ├── metadata
//!                         ├── data: users, then cards + attachments
//!                         │         (pagination + incremental filter)
//!                         └── attachment streaming (signed downloads)
//!                                      │
//!                                 repository
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document every event contract variant

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connector configuration
pub mod config;

/// Credential parsing and request signing
pub mod auth;

/// HTTP client with rate limiting and response classification
pub mod http;

/// Typed endpoint wrappers and raw API types
pub mod api;

/// Backward cursor pagination over card pages
pub mod pagination;

/// Incremental sync filtering
pub mod filter;

/// Record normalization
pub mod normalize;

/// Persisted extraction state
pub mod state;

/// Repository push interface and implementations
pub mod repo;

/// Attachment binary streaming
pub mod attachments;

/// The extraction worker and its event contracts
pub mod worker;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use worker::{ExtractionEvent, ExtractionWorker, ExtractorEvent};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
