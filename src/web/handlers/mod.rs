//! API handlers for the web API.

pub mod auth;
pub mod config;
pub mod emails;

pub use auth::*;
pub use config::*;
pub use emails::*;

use axum::http::HeaderMap;

use crate::db::Database;
use crate::turnstile::TurnstileVerifier;

/// Shared application state for handlers.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Turnstile verifier for gated operations.
    pub verifier: TurnstileVerifier,
    /// Domain inbound addresses belong to.
    pub email_domain: String,
    /// Secret for the credential codec.
    pub credential_secret: String,
    /// Retention window exposed through /config.
    pub retention_hours: u64,
}

/// Pick the challenge token from the request body, falling back to the
/// `cf-turnstile-token` header.
pub(crate) fn challenge_token<'a>(
    body_token: Option<&'a str>,
    headers: &'a HeaderMap,
) -> Option<&'a str> {
    body_token.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get("cf-turnstile-token")
            .and_then(|v| v.to_str().ok())
    })
}
