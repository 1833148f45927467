//! API client with centralized outcome classification
//!
//! The client wraps every call in one policy so rate-limit and error
//! semantics are identical for every phase:
//! - transport failure (no response) → `status_code: 0`, "network error"
//! - 401/403 → fixed authentication message, never retried
//! - 429 → `api_delay` computed from `Retry-After`
//! - ≥500 → generic server-error message
//! - 200 → decoded body in `data`
//! - other 4xx → upstream message verbatim when present

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::Credentials;
use crate::types::StringMap;
use chrono::Utc;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default `Retry-After` fallback for the extraction path, in seconds
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

const MSG_NETWORK: &str = "network error";
const MSG_AUTH: &str = "authentication failed: the API key or token was rejected";
const MSG_RATE_LIMITED: &str = "rate limited";
const MSG_SERVER: &str = "server error from upstream API";
const MSG_SUCCESS: &str = "success";
const MSG_FAILED: &str = "request failed";

/// Uniform envelope returned by every API call
///
/// `api_delay` is meaningful only when `status_code == 429`.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code; 0 when no response was received
    pub status_code: u16,
    /// Seconds to wait before retrying (429 only)
    pub api_delay: u64,
    /// Human-readable outcome message
    pub message: String,
    /// Decoded body for successful calls
    pub data: Option<T>,
    /// Response headers
    pub headers: StringMap,
}

impl<T> ApiResponse<T> {
    /// Whether the call succeeded and produced a body
    pub fn is_success(&self) -> bool {
        self.status_code == 200 && self.data.is_some()
    }

    /// Whether the call was rejected by the API's rate limiter
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            api_delay: 0,
            message: message.into(),
            data: None,
            headers: StringMap::new(),
        }
    }

    fn network_error() -> Self {
        Self::new(0, MSG_NETWORK)
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Seconds to report when a 429 carries no usable `Retry-After`
    pub default_retry_after: u64,
    /// Local throttle configuration; `None` disables the token bucket
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl ApiClientConfig {
    /// Create a config with the extraction-path defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            default_retry_after: DEFAULT_RETRY_AFTER_SECS,
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("trello-connector/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Disable the local throttle
    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    /// Override the `Retry-After` fallback
    #[must_use]
    pub fn with_default_retry_after(mut self, secs: u64) -> Self {
        self.default_retry_after = secs;
        self
    }
}

/// Authenticated, rate-limit-aware API client
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    credentials: Credentials,
    rate_limiter: Option<RateLimiter>,
}

impl ApiClient {
    /// Create a client for the given base URL and credentials
    pub fn new(config: ApiClientConfig, credentials: Credentials) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            credentials,
            rate_limiter,
        }
    }

    /// The configured `Retry-After` fallback
    pub fn default_retry_after(&self) -> u64 {
        self.config.default_retry_after
    }

    /// Make a GET request and classify the outcome
    ///
    /// Credentials ride along as query parameters on every call.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResponse<T> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let url = self.build_url(path);
        let mut req = self.client.get(&url).query(&self.credentials.query_params());
        for (key, value) in query {
            req = req.query(&[(key, value.as_str())]);
        }

        match req.send().await {
            Ok(response) => {
                debug!("GET {url} -> {}", response.status());
                self.classify(response).await
            }
            Err(e) => {
                warn!("GET {url} failed without a response: {e}");
                ApiResponse::network_error()
            }
        }
    }

    /// Apply the single classification policy to a raw response
    async fn classify<T: DeserializeOwned>(&self, response: Response) -> ApiResponse<T> {
        let status = response.status().as_u16();
        let headers = header_map(&response);

        let mut envelope = match status {
            401 | 403 => ApiResponse::new(status, MSG_AUTH),
            429 => {
                let delay = parse_retry_after(
                    headers.get("retry-after").map(String::as_str),
                    self.config.default_retry_after,
                );
                warn!("rate limited by upstream API, retry after {delay}s");
                let mut env = ApiResponse::new(status, MSG_RATE_LIMITED);
                env.api_delay = delay;
                env
            }
            s if s >= 500 => ApiResponse::new(status, MSG_SERVER),
            200 => {
                let body = response.text().await.unwrap_or_default();
                return match serde_json::from_str::<T>(&body) {
                    Ok(data) => ApiResponse {
                        status_code: 200,
                        api_delay: 0,
                        message: MSG_SUCCESS.to_string(),
                        data: Some(data),
                        headers,
                    },
                    Err(e) => {
                        warn!("failed to decode response body: {e}");
                        let mut env = ApiResponse::new(
                            200,
                            format!("failed to decode response body: {e}"),
                        );
                        env.headers = headers;
                        env
                    }
                };
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                let message = if body.trim().is_empty() {
                    MSG_FAILED.to_string()
                } else {
                    body
                };
                let mut env = ApiResponse::new(s, message);
                env.headers = headers;
                return env;
            }
        };

        envelope.headers = headers;
        envelope
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Collect response headers into a plain map
fn header_map(response: &Response) -> StringMap {
    response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

/// Compute the retry delay in seconds from a `Retry-After` header
///
/// An all-digits value is taken as seconds. Anything else is parsed as an
/// HTTP date and converted to `ceil((retry - now) / 1s)`, floored at 0.
/// A missing or unparsable header yields `default_secs`.
pub fn parse_retry_after(value: Option<&str>, default_secs: u64) -> u64 {
    let Some(raw) = value else {
        return default_secs;
    };
    let raw = raw.trim();

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().unwrap_or(default_secs);
    }

    match chrono::DateTime::parse_from_rfc2822(raw) {
        Ok(when) => {
            let millis = (when.with_timezone(&Utc) - Utc::now()).num_milliseconds();
            if millis <= 0 {
                0
            } else {
                ((millis + 999) / 1000) as u64
            }
        }
        Err(_) => default_secs,
    }
}
