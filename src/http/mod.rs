//! Rate-limit-aware API client
//!
//! Every outbound call to the external API goes through [`ApiClient`], which
//! owns the single error-classification policy for the whole connector:
//! callers receive an [`ApiResponse`] envelope and never a raw transport
//! error. A local token-bucket throttle runs in front of every request;
//! server-driven 429 handling is layered on top of it.

mod client;
mod rate_limit;

pub use client::{parse_retry_after, ApiClient, ApiClientConfig, ApiResponse};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
