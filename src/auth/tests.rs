//! Tests for credential parsing and request signing

use super::signer::{hmac_sha1_base64, signature_base_string};
use super::{Credentials, RequestSigner};
use crate::error::Error;
use pretty_assertions::assert_eq;

// ============================================================================
// Credentials
// ============================================================================

#[test]
fn test_parse_credentials() {
    let creds = Credentials::parse("key=abc123&token=def456").unwrap();
    assert_eq!(creds.api_key, "abc123");
    assert_eq!(creds.token, "def456");
}

#[test]
fn test_parse_credentials_url_encoded() {
    let creds = Credentials::parse("key=a%2Bb&token=t%20t").unwrap();
    assert_eq!(creds.api_key, "a+b");
    assert_eq!(creds.token, "t t");
}

#[test]
fn test_parse_credentials_order_independent() {
    let creds = Credentials::parse("token=def&key=abc").unwrap();
    assert_eq!(creds.api_key, "abc");
    assert_eq!(creds.token, "def");
}

#[test]
fn test_parse_credentials_missing_token() {
    let err = Credentials::parse("key=abc").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials { .. }));
}

#[test]
fn test_parse_credentials_missing_key() {
    let err = Credentials::parse("token=def").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials { .. }));
}

#[test]
fn test_parse_credentials_empty_value() {
    let err = Credentials::parse("key=&token=def").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials { .. }));
}

#[test]
fn test_parse_credentials_garbage() {
    let err = Credentials::parse("not a connection string").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials { .. }));
}

#[test]
fn test_query_params() {
    let creds = Credentials::new("abc", "def");
    let params = creds.query_params();
    assert_eq!(params[0], ("key", "abc"));
    assert_eq!(params[1], ("token", "def"));
}

// ============================================================================
// Signer primitives
// ============================================================================

#[test]
fn test_signature_base_string() {
    let params = vec![
        ("b".to_string(), "2".to_string()),
        ("a".to_string(), "1".to_string()),
    ];
    let base = signature_base_string("GET", "https://example.com/a", &params);
    assert_eq!(
        base,
        "GET&https%3A%2F%2Fexample.com%2Fa&a%3D1%26b%3D2"
    );
}

#[test]
fn test_signature_base_string_encodes_values() {
    let params = vec![("q".to_string(), "a b".to_string())];
    let base = signature_base_string("GET", "https://example.com", &params);
    // "a b" encodes to "a%20b", then the whole param string is encoded again
    assert_eq!(base, "GET&https%3A%2F%2Fexample.com&q%3Da%2520b");
}

#[test]
fn test_hmac_sha1_known_vector() {
    let digest = hmac_sha1_base64("key", "The quick brown fox jumps over the lazy dog");
    assert_eq!(digest, "3nybhbi3iqa8ino29wqQcBydtNk=");
}

// ============================================================================
// Header assembly
// ============================================================================

#[test]
fn test_authorization_header_fields() {
    let signer = RequestSigner::new(Credentials::new("consumer", "usertoken"));
    let header = signer.header_for_test(
        "https://trello.com/1/cards/c1/attachments/a1/download/f.png",
        "1700000000",
        "nonce123",
    );

    assert!(header.starts_with("OAuth "));
    assert!(header.contains("oauth_consumer_key=\"consumer\""));
    assert!(header.contains("oauth_token=\"usertoken\""));
    assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    assert!(header.contains("oauth_timestamp=\"1700000000\""));
    assert!(header.contains("oauth_nonce=\"nonce123\""));
    assert!(header.contains("oauth_version=\"1.0\""));
    assert!(header.contains("oauth_signature=\""));
}

#[test]
fn test_authorization_header_deterministic_for_fixed_inputs() {
    let signer = RequestSigner::new(Credentials::new("consumer", "usertoken"));
    let a = signer.header_for_test("https://trello.com/x", "100", "n");
    let b = signer.header_for_test("https://trello.com/x", "100", "n");
    assert_eq!(a, b);
}

#[test]
fn test_authorization_header_single_use() {
    let signer = RequestSigner::new(Credentials::new("consumer", "usertoken"));
    // Fresh nonce per call: two live headers for the same URL must differ.
    let a = signer.authorization_header("https://trello.com/x");
    let b = signer.authorization_header("https://trello.com/x");
    assert_ne!(a, b);
}

#[test]
fn test_signature_changes_with_url() {
    let signer = RequestSigner::new(Credentials::new("consumer", "usertoken"));
    let a = signer.header_for_test("https://trello.com/x", "100", "n");
    let b = signer.header_for_test("https://trello.com/y", "100", "n");
    assert_ne!(a, b);
}
