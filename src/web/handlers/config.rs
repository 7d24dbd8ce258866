//! Configuration handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::ConfigResponse;

/// Get public service configuration.
///
/// Returns what the frontend needs to render: the email domain, the
/// Turnstile site key and the retention window. No authentication.
#[utoipa::path(
    get,
    path = "/config",
    tag = "Config",
    responses(
        (status = 200, description = "Service configuration", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        email_domain: state.email_domain.clone(),
        turnstile_key: state.verifier.site_key().to_string(),
        retention_hours: state.retention_hours,
    })
}
