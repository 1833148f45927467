//! Tests for the API client and outcome classification

use super::*;
use crate::auth::Credentials;
use chrono::{Duration as ChronoDuration, Utc};
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    let config = ApiClientConfig::new(base_url).no_rate_limit();
    ApiClient::new(config, Credentials::new("k", "t"))
}

// ============================================================================
// Retry-After parsing
// ============================================================================

#[test_case(Some("120"), 5, 120 ; "all digits taken as seconds")]
#[test_case(Some("0"), 5, 0 ; "zero seconds")]
#[test_case(None, 5, 5 ; "absent header uses engine default")]
#[test_case(None, 60, 60 ; "absent header uses stream default")]
#[test_case(Some("not a date"), 5, 5 ; "unparsable falls back to default")]
#[test_case(Some(""), 5, 5 ; "empty falls back to default")]
fn test_parse_retry_after(value: Option<&str>, default_secs: u64, expected: u64) {
    assert_eq!(parse_retry_after(value, default_secs), expected);
}

#[test]
fn test_parse_retry_after_http_date_future() {
    let when = (Utc::now() + ChronoDuration::seconds(90)).to_rfc2822();
    let delay = parse_retry_after(Some(&when), 5);
    assert!((89..=91).contains(&delay), "delay was {delay}");
}

#[test]
fn test_parse_retry_after_http_date_past() {
    let when = (Utc::now() - ChronoDuration::seconds(30)).to_rfc2822();
    assert_eq!(parse_retry_after(Some(&when), 5), 0);
}

// ============================================================================
// Classification
// ============================================================================

#[tokio::test]
async fn test_success_passes_body_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "m1", "fullName": "Alice"}
        ])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/members", &[]).await;

    assert!(response.is_success());
    assert_eq!(response.status_code, 200);
    assert_eq!(response.data.unwrap()[0]["id"], "m1");
}

#[tokio::test]
async fn test_credentials_sent_as_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1"))
        .and(query_param("key", "k"))
        .and(query_param("token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "b1"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/boards/b1", &[]).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_unauthorized_is_fixed_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/members", &[]).await;

    assert_eq!(response.status_code, 401);
    assert!(response.data.is_none());
    assert!(response.message.contains("authentication failed"));
}

#[tokio::test]
async fn test_forbidden_is_fixed_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/members", &[]).await;

    assert_eq!(response.status_code, 403);
    assert!(response.message.contains("authentication failed"));
}

#[tokio::test]
async fn test_rate_limited_with_numeric_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "120")
                .set_body_string("Rate limit exceeded"),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/cards", &[]).await;

    assert!(response.is_rate_limited());
    assert_eq!(response.api_delay, 120);
}

#[tokio::test]
async fn test_rate_limited_with_http_date_retry_after() {
    let mock_server = MockServer::start().await;
    let when = (Utc::now() + ChronoDuration::seconds(90)).to_rfc2822();

    Mock::given(method("GET"))
        .and(path("/cards"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", when.as_str()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/cards", &[]).await;

    assert!(response.is_rate_limited());
    assert!((89..=91).contains(&response.api_delay));
}

#[tokio::test]
async fn test_rate_limited_without_retry_after_uses_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/cards", &[]).await;

    assert!(response.is_rate_limited());
    assert_eq!(response.api_delay, client.default_retry_after());
}

#[tokio::test]
async fn test_server_error_is_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(503).set_body_string("internal stack trace"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/members", &[]).await;

    assert_eq!(response.status_code, 503);
    assert!(response.message.contains("server error"));
    // Upstream internals are not leaked through the envelope.
    assert!(!response.message.contains("stack trace"));
}

#[tokio::test]
async fn test_client_error_surfaces_upstream_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("board not found"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/boards/missing", &[]).await;

    assert_eq!(response.status_code, 404);
    assert_eq!(response.message, "board not found");
}

#[tokio::test]
async fn test_client_error_without_body_is_generic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<serde_json::Value> = client.get_json("/boards/missing", &[]).await;

    assert_eq!(response.status_code, 404);
    assert_eq!(response.message, "request failed");
}

#[tokio::test]
async fn test_transport_failure_is_status_zero() {
    // Nothing listens here; the request fails without a response.
    let client = test_client("http://127.0.0.1:1");
    let response: ApiResponse<serde_json::Value> = client.get_json("/members", &[]).await;

    assert_eq!(response.status_code, 0);
    assert_eq!(response.api_delay, 0);
    assert_eq!(response.message, "network error");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_malformed_success_body_keeps_status_clears_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response: ApiResponse<Vec<String>> = client.get_json("/members", &[]).await;

    assert_eq!(response.status_code, 200);
    assert!(response.data.is_none());
    assert!(response.message.contains("decode"));
}
