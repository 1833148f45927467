//! Connection-string parsing
//!
//! The host hands the connector an opaque, URL-query-encoded connection
//! string of the form `key=<apiKey>&token=<token>`.

use crate::error::{Error, Result};

/// API key/token pair for the external API
///
/// Derived once per invocation from the host's connection data. Never
/// persisted; owned exclusively by the invocation that parsed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key ("consumer key" for signed requests)
    pub api_key: String,
    /// User token
    pub token: String,
}

impl Credentials {
    /// Create credentials directly
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
        }
    }

    /// Parse credentials from a connection string
    ///
    /// Fails when either field is absent or empty.
    pub fn parse(connection: &str) -> Result<Self> {
        let mut api_key = None;
        let mut token = None;

        for (name, value) in url::form_urlencoded::parse(connection.as_bytes()) {
            match name.as_ref() {
                "key" => api_key = Some(value.into_owned()),
                "token" => token = Some(value.into_owned()),
                _ => {}
            }
        }

        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::invalid_credentials("connection string has no 'key'"))?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid_credentials("connection string has no 'token'"))?;

        Ok(Self { api_key, token })
    }

    /// Query parameters carrying these credentials
    pub fn query_params(&self) -> [(&'static str, &str); 2] {
        [("key", &self.api_key), ("token", &self.token)]
    }
}
