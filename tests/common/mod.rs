//! Test helpers for web API integration tests.

use std::sync::Arc;

use axum_test::TestServer;
use tempbox::config::TurnstileConfig;
use tempbox::ingest::{ingest_message, Envelope};
use tempbox::mailbox::Email;
use tempbox::turnstile::TurnstileVerifier;
use tempbox::web::handlers::AppState;
use tempbox::web::router::create_router;
use tempbox::Database;

/// Credential secret used by all test servers.
pub const TEST_SECRET: &str = "test-secret";

/// Domain served by all test servers.
pub const TEST_DOMAIN: &str = "tmp.test";

/// Create a test server over an in-memory database.
///
/// The challenge gate is disabled so gated endpoints work without a
/// Turnstile token.
pub async fn create_test_server() -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let verifier = TurnstileVerifier::new(TurnstileConfig {
        enabled: false,
        ..Default::default()
    })
    .expect("Failed to create verifier");

    let app_state = Arc::new(AppState {
        db: db.clone(),
        verifier,
        email_domain: TEST_DOMAIN.to_string(),
        credential_secret: TEST_SECRET.to_string(),
        retention_hours: 24,
    });

    let router = create_router(app_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Ingest a minimal message to the given recipient, returning the stored
/// records.
pub async fn ingest_sample(db: &Database, recipient: &str, subject: &str) -> Vec<Email> {
    let raw = format!(
        "From: Alice <alice@remote.test>\r\n\
To: {recipient}\r\n\
Subject: {subject}\r\n\
Message-ID: <{}@remote.test>\r\n\
Content-Type: text/plain\r\n\
\r\n\
hello there\r\n",
        uuid::Uuid::new_v4()
    );
    let envelope = Envelope {
        from: "alice@remote.test".to_string(),
        recipients: vec![recipient.to_string()],
    };
    ingest_message(db.pool(), &envelope, raw.as_bytes())
        .await
        .expect("Failed to ingest sample message")
}
