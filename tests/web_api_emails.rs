//! Web API integration tests.
//!
//! Covers the mailbox endpoints, the challenge gate with verification
//! disabled, and the login flow.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tempbox::credential;

use common::{create_test_server, ingest_sample, TEST_SECRET};

// ============================================================================
// Config
// ============================================================================

#[tokio::test]
async fn test_get_config() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/config").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["emailDomain"], "tmp.test");
    assert_eq!(body["retentionHours"], 24);
    assert!(body["turnstileKey"].is_string());
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_requires_address() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/emails").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("address"));
}

#[tokio::test]
async fn test_list_empty_mailbox() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/emails")
        .json(&json!({"address": "nobody@tmp.test"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_scoped_to_recipient() {
    let (server, db) = create_test_server().await;

    ingest_sample(&db, "alice@tmp.test", "For Alice").await;
    ingest_sample(&db, "bob@tmp.test", "For Bob").await;

    let response = server
        .post("/api/emails")
        .json(&json!({"address": "alice@tmp.test"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let emails = body.as_array().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["subject"], "For Alice");
    assert_eq!(emails[0]["messageTo"], "alice@tmp.test");
}

#[tokio::test]
async fn test_list_two_messages_in_arrival_order() {
    let (server, db) = create_test_server().await;

    let first = ingest_sample(&db, "alice@tmp.test", "First").await;
    let second = ingest_sample(&db, "alice@tmp.test", "Second").await;
    assert_ne!(first[0].id, second[0].id);

    let response = server
        .post("/api/emails")
        .json(&json!({"address": "alice@tmp.test"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let emails = body.as_array().unwrap();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0]["id"], first[0].id.as_str());
    assert_eq!(emails[1]["id"], second[0].id.as_str());
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn test_get_email_by_id() {
    let (server, db) = create_test_server().await;

    let stored = ingest_sample(&db, "alice@tmp.test", "Hi").await;

    let response = server.get(&format!("/api/emails/{}", stored[0].id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], stored[0].id.as_str());
    assert_eq!(body["subject"], "Hi");
    assert_eq!(body["from"], "Alice <alice@remote.test>");
    assert!(body["headers"].is_array());
}

#[tokio::test]
async fn test_get_email_not_found() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/emails/no-such-id").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_delete_requires_ids() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/delete-emails").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/delete-emails")
        .json(&json!({"ids": []}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_counts_then_zero() {
    let (server, db) = create_test_server().await;

    let first = ingest_sample(&db, "alice@tmp.test", "One").await;
    let second = ingest_sample(&db, "alice@tmp.test", "Two").await;

    let ids = json!({"ids": [first[0].id, second[0].id, "missing"]});

    let response = server.post("/api/delete-emails").json(&ids).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], 2);

    // Deleting the same set again finds nothing.
    let response = server.post("/api/delete-emails").json(&ids).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], 0);
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn test_ingest_list_delete_roundtrip() {
    let (server, db) = create_test_server().await;

    ingest_sample(&db, "alice@tmp.test", "Hi").await;

    let response = server
        .post("/api/emails")
        .json(&json!({"address": "alice@tmp.test"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let emails = body.as_array().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["subject"], "Hi");
    let id = emails[0]["id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/delete-emails")
        .json(&json!({"ids": [id]}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], 1);

    let response = server
        .post("/api/emails")
        .json(&json!({"address": "alice@tmp.test"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 0);
}

// ============================================================================
// Verify and login
// ============================================================================

#[tokio::test]
async fn test_verify_with_gate_disabled() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/verify").json(&json!({})).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_login_recovers_address() {
    let (server, _db) = create_test_server().await;

    let address = "alice@tmp.test";
    let token = credential::encode(address, TEST_SECRET).unwrap();
    let password = credential::format_token(&token);

    let response = server
        .post("/api/login")
        .json(&json!({"password": password}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["address"], address);
}

#[tokio::test]
async fn test_login_invalid_password_is_404() {
    let (server, _db) = create_test_server().await;

    for password in ["garbage", "00", "ZZZZ-ZZZZ", "deadbeef"] {
        let response = server
            .post("/api/login")
            .json(&json!({"password": password}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_login_missing_password_is_400() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/login").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/login")
        .json(&json!({"password": ""}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Error body shape
// ============================================================================

#[tokio::test]
async fn test_api_error_body_shape() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/emails/nothing-here").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert!(body["message"].is_string());
    assert!(body.get("error").is_none());
}
