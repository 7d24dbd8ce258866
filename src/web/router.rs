//! Router configuration for the web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    delete_emails, get_config, get_email, list_emails, login, verify, AppState,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::config::get_config,
        super::handlers::auth::verify,
        super::handlers::auth::login,
        super::handlers::emails::list_emails,
        super::handlers::emails::get_email,
        super::handlers::emails::delete_emails,
    ),
    components(schemas(
        crate::mailbox::Email,
        crate::mailbox::MailHeader,
        crate::web::dto::ConfigResponse,
        crate::web::dto::VerifyRequest,
        crate::web::dto::VerifyResponse,
        crate::web::dto::ListEmailsRequest,
        crate::web::dto::DeleteEmailsRequest,
        crate::web::dto::DeleteEmailsResponse,
        crate::web::dto::LoginRequest,
        crate::web::dto::LoginResponse,
        crate::web::error::ErrorBody,
    )),
    tags(
        (name = "Config", description = "Public service configuration"),
        (name = "Auth", description = "Challenge verification and login"),
        (name = "Emails", description = "Mailbox operations"),
    )
)]
pub struct ApiDoc;

/// Build the CORS layer from configured origins; empty means allow any.
fn create_cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/verify", post(verify))
        .route("/emails", post(list_emails))
        .route("/emails/:id", get(get_email))
        .route("/delete-emails", post(delete_emails))
        .route("/login", post(login));

    Router::new()
        .route("/config", get(get_config))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
