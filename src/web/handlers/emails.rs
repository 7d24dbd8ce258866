//! Mailbox handlers: list, fetch and delete stored emails.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use super::{challenge_token, AppState};
use crate::mailbox::{Email, EmailRepository};
use crate::web::dto::{DeleteEmailsRequest, DeleteEmailsResponse, ListEmailsRequest};
use crate::web::error::ApiError;

/// List all emails for a mailbox address, in arrival order.
#[utoipa::path(
    post,
    path = "/api/emails",
    tag = "Emails",
    request_body = ListEmailsRequest,
    responses(
        (status = 200, description = "Emails for the address", body = Vec<Email>),
        (status = 400, description = "Address missing")
    )
)]
pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListEmailsRequest>,
) -> Result<Json<Vec<Email>>, ApiError> {
    let address = req
        .address
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("address is required"))?;

    let repo = EmailRepository::new(state.db.pool());
    let emails = repo.list_by_recipient(address).await?;
    Ok(Json(emails))
}

/// Fetch a single email by id.
#[utoipa::path(
    get,
    path = "/api/emails/{id}",
    tag = "Emails",
    params(
        ("id" = String, Path, description = "Email record id")
    ),
    responses(
        (status = 200, description = "The email", body = Email),
        (status = 404, description = "No such email")
    )
)]
pub async fn get_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Email>, ApiError> {
    let repo = EmailRepository::new(state.db.pool());
    let email = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("email not found"))?;
    Ok(Json(email))
}

/// Delete emails by id.
///
/// Gated by the challenge check. Ids with no matching record are ignored;
/// the response counts what was actually deleted.
#[utoipa::path(
    post,
    path = "/api/delete-emails",
    tag = "Emails",
    request_body = DeleteEmailsRequest,
    responses(
        (status = 200, description = "Deletion result", body = DeleteEmailsResponse),
        (status = 400, description = "Challenge failed or ids missing")
    )
)]
pub async fn delete_emails(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteEmailsRequest>,
) -> Result<Json<DeleteEmailsResponse>, ApiError> {
    let token = challenge_token(req.token.as_deref(), &headers);
    state.verifier.verify(token).await?;

    let ids = req
        .ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| ApiError::bad_request("ids are required"))?;

    let repo = EmailRepository::new(state.db.pool());
    let deleted = repo.delete_by_ids(&ids).await?;
    Ok(Json(DeleteEmailsResponse { deleted }))
}
