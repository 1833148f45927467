//! Tests for card pagination

use super::*;
use crate::api::TrelloApi;
use crate::auth::Credentials;
use crate::error::Error;
use crate::http::{ApiClient, ApiClientConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_api(base_url: &str) -> TrelloApi {
    let config = ApiClientConfig::new(base_url).no_rate_limit();
    TrelloApi::new(ApiClient::new(config, Credentials::new("k", "t")))
}

fn card(id: &str) -> serde_json::Value {
    json!({ "id": id, "name": format!("card {id}") })
}

#[tokio::test]
async fn test_full_page_continues_with_oldest_id() {
    let mock_server = MockServer::start().await;

    // Newest-first ordering: the first element is the oldest of this page.
    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([card("c3"), card("c2"), card("c1")])),
        )
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let outcome = fetch_card_page(&api, "b1", 3, None).await.unwrap();

    match outcome {
        PageOutcome::Page { cards, next } => {
            assert_eq!(cards.len(), 3);
            assert_eq!(
                next,
                NextPage::Continue {
                    before: "c3".to_string()
                }
            );
        }
        PageOutcome::RateLimited { .. } => panic!("unexpected rate limit"),
    }
}

#[tokio::test]
async fn test_short_page_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([card("c1")])))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let outcome = fetch_card_page(&api, "b1", 3, None).await.unwrap();

    match outcome {
        PageOutcome::Page { cards, next } => {
            assert_eq!(cards.len(), 1);
            assert_eq!(next, NextPage::Done);
        }
        PageOutcome::RateLimited { .. } => panic!("unexpected rate limit"),
    }
}

#[tokio::test]
async fn test_empty_first_page_completes_without_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let outcome = fetch_card_page(&api, "b1", 3, None).await.unwrap();

    match outcome {
        PageOutcome::Page { cards, next } => {
            assert!(cards.is_empty());
            assert_eq!(next, NextPage::Done);
        }
        PageOutcome::RateLimited { .. } => panic!("unexpected rate limit"),
    }
}

#[tokio::test]
async fn test_cursor_forwarded_to_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("before", "c3"))
        .and(query_param("limit", "3"))
        .and(query_param("attachments", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let outcome = fetch_card_page(&api, "b1", 3, Some("c3")).await.unwrap();
    assert!(matches!(
        outcome,
        PageOutcome::Page {
            next: NextPage::Done,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rate_limited_returns_delay_without_cards() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let outcome = fetch_card_page(&api, "b1", 3, Some("c3")).await.unwrap();

    // The caller keeps its cursor and retries the same page after the delay.
    match outcome {
        PageOutcome::RateLimited { delay } => assert_eq!(delay, 30),
        PageOutcome::Page { .. } => panic!("expected rate limit"),
    }
}

#[tokio::test]
async fn test_server_error_is_phase_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let err = fetch_card_page(&api, "b1", 3, None).await.unwrap_err();
    assert!(err.to_string().contains("card page fetch failed"));
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let err = fetch_card_page(&api, "b1", 3, None).await.unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}
