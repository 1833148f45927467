//! Connector configuration
//!
//! The connector is configured entirely from the environment: the host sets
//! the external API base URL before delivering any lifecycle event. A missing
//! base URL is fatal for every phase that calls the API.

use crate::error::{Error, Result};

/// Environment variable holding the Trello API base URL
pub const API_BASE_ENV: &str = "TRELLO_API_BASE";

/// Production API base URL, used when the environment does not override it
pub const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

/// Page size for card pagination
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Soft deadline for data/attachments processing before the worker reports
/// progress instead of continuing
pub const DEFAULT_SOFT_DEADLINE_SECS: u64 = 600;

/// Connector configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external API, e.g. `https://api.trello.com/1`
    pub api_base: String,
    /// Number of cards requested per page
    pub page_size: u32,
    /// Soft deadline in seconds for a single data/attachments invocation
    pub soft_deadline_secs: u64,
}

impl Config {
    /// Create a config with an explicit base URL
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            page_size: DEFAULT_PAGE_SIZE,
            soft_deadline_secs: DEFAULT_SOFT_DEADLINE_SECS,
        }
    }

    /// Load configuration from the environment
    pub fn from_env() -> Result<Self> {
        let api_base = std::env::var(API_BASE_ENV)
            .map_err(|_| Error::missing_field(API_BASE_ENV))?;
        if api_base.trim().is_empty() {
            return Err(Error::config(format!("{API_BASE_ENV} is empty")));
        }
        Ok(Self::new(api_base))
    }

    /// Override the card page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the soft deadline
    #[must_use]
    pub fn with_soft_deadline(mut self, secs: u64) -> Self {
        self.soft_deadline_secs = secs;
        self
    }
}
