//! Verification and login handlers.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use super::{challenge_token, AppState};
use crate::credential;
use crate::web::dto::{LoginRequest, LoginResponse, VerifyRequest, VerifyResponse};
use crate::web::error::ApiError;

/// Verify a Turnstile challenge token.
#[utoipa::path(
    post,
    path = "/api/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token accepted", body = VerifyResponse),
        (status = 400, description = "Token missing or rejected")
    )
)]
pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let token = challenge_token(req.token.as_deref(), &headers);
    state.verifier.verify(token).await?;
    Ok(Json(VerifyResponse { success: true }))
}

/// Recover a mailbox address from its password.
///
/// Gated by the challenge check. An invalid password is indistinguishable
/// from a nonexistent mailbox, both answer 404.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Address recovered", body = LoginResponse),
        (status = 400, description = "Challenge failed or password missing"),
        (status = 404, description = "Invalid password")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = challenge_token(req.token.as_deref(), &headers);
    state.verifier.verify(token).await?;

    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    let address = credential::decode(password, &state.credential_secret)
        .map_err(|_| ApiError::not_found("invalid password"))?;

    Ok(Json(LoginResponse { address }))
}
