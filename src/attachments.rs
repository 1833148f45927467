//! Attachment stream handler
//!
//! Resolves an attachment's binary content. URLs on the tracker's own domain
//! are fetched with a one-time signed Authorization header; anything else is
//! fetched unsigned. Every failure is converted into a per-attachment
//! outcome: one bad attachment must not abort the batch being streamed in
//! the same invocation.

use crate::auth::{Credentials, RequestSigner};
use crate::http::parse_retry_after;
use crate::normalize::is_tracker_url;
use crate::repo::ByteStream;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::warn;

/// Default `Retry-After` fallback for the attachment-stream path, in seconds
pub const DEFAULT_STREAM_RETRY_AFTER_SECS: u64 = 60;

/// Outcome of resolving one attachment
pub enum StreamOutcome {
    /// The attachment body, streamed
    Stream(ByteStream),
    /// Rate limited; retry the whole attachments pass after this many seconds
    Delay(u64),
    /// Per-attachment failure; log, skip, continue with the next one
    Error {
        /// What went wrong
        message: String,
    },
}

impl std::fmt::Debug for StreamOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Delay(secs) => write!(f, "Delay({secs})"),
            Self::Error { message } => write!(f, "Error({message})"),
        }
    }
}

/// Fetches attachment binaries with signed or unsigned authorization
pub struct AttachmentStreamer {
    client: Client,
    signer: RequestSigner,
    default_retry_after: u64,
}

impl AttachmentStreamer {
    /// Create a streamer for the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            signer: RequestSigner::new(credentials),
            default_retry_after: DEFAULT_STREAM_RETRY_AFTER_SECS,
        }
    }

    /// Override the `Retry-After` fallback
    #[must_use]
    pub fn with_default_retry_after(mut self, secs: u64) -> Self {
        self.default_retry_after = secs;
        self
    }

    /// Resolve one attachment's binary content
    pub async fn stream(&self, attachment_id: &str, url: &str) -> StreamOutcome {
        self.fetch(attachment_id, url, is_tracker_url(url)).await
    }

    async fn fetch(&self, attachment_id: &str, url: &str, signed: bool) -> StreamOutcome {
        let mut req = self.client.get(url);
        if signed {
            // One-time signature: recomputed per request.
            req = req.header(AUTHORIZATION, self.signer.authorization_header(url));
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("attachment {attachment_id}: fetch failed without a response: {e}");
                return StreamOutcome::Error {
                    message: format!("failed to fetch attachment {attachment_id}: {e}"),
                };
            }
        };

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let delay = parse_retry_after(retry_after.as_deref(), self.default_retry_after);
            return StreamOutcome::Delay(delay);
        }

        if !(200..300).contains(&status) {
            return StreamOutcome::Error {
                message: format!("attachment {attachment_id} fetch returned HTTP {status}"),
            };
        }

        StreamOutcome::Stream(Box::pin(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn streamer() -> AttachmentStreamer {
        AttachmentStreamer::new(Credentials::new("k", "t"))
    }

    async fn collect(mut body: ByteStream) -> Vec<u8> {
        let mut buf = Vec::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk.unwrap());
        }
        buf
    }

    #[tokio::test]
    async fn test_unsigned_fetch_has_no_authorization_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/spec.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
            .mount(&mock_server)
            .await;

        let url = format!("{}/files/spec.pdf", mock_server.uri());
        // A foreign host never gets the signed header.
        match streamer().stream("a1", &url).await {
            StreamOutcome::Stream(body) => assert_eq!(collect(body).await, b"pdf"),
            other => panic!("expected stream, got {other:?}"),
        }

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_signed_fetch_carries_oauth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download/f.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&mock_server)
            .await;

        let url = format!("{}/download/f.png", mock_server.uri());
        let outcome = streamer().fetch("a1", &url, true).await;
        assert!(matches!(outcome, StreamOutcome::Stream(_)));

        let requests = mock_server.received_requests().await.unwrap();
        let auth = requests[0].headers.get("authorization").unwrap();
        assert!(auth.to_str().unwrap().starts_with("OAuth "));
    }

    #[tokio::test]
    async fn test_rate_limited_maps_to_delay() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/big.bin"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "15"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/files/big.bin", mock_server.uri());
        match streamer().stream("a1", &url).await {
            StreamOutcome::Delay(delay) => assert_eq!(delay, 15),
            other => panic!("expected delay, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_without_header_uses_stream_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/big.bin"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let url = format!("{}/files/big.bin", mock_server.uri());
        match streamer().stream("a1", &url).await {
            StreamOutcome::Delay(delay) => assert_eq!(delay, DEFAULT_STREAM_RETRY_AFTER_SECS),
            other => panic!("expected delay, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_per_attachment_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/gone.bin"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/files/gone.bin", mock_server.uri());
        match streamer().stream("a1", &url).await {
            StreamOutcome::Error { message } => assert!(message.contains("404")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_per_attachment_error() {
        match streamer().stream("a1", "http://127.0.0.1:1/f").await {
            StreamOutcome::Error { message } => {
                assert!(message.contains("failed to fetch attachment a1"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_tracker_urls_are_signed() {
        assert!(is_tracker_url("https://trello.com/1/cards/c/attachments/a/download/f"));
        assert!(is_tracker_url("https://api.trello.com/1/whatever"));
        assert!(!is_tracker_url("https://example.com/f.png"));
        assert!(!is_tracker_url("not a url"));
    }
}
