//! Web server for Tempbox.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{RetentionConfig, WebConfig};
use crate::sweep::RetentionSweeper;

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_swagger_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
    /// Retention configuration for the background sweeper.
    retention_config: RetentionConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &WebConfig, retention: &RetentionConfig, app_state: AppState) -> Self {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .expect("Invalid web server address");

        Self {
            addr,
            app_state: Arc::new(app_state),
            web_config: config.clone(),
            retention_config: retention.clone(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> axum::Router {
        create_router(self.app_state.clone(), &self.web_config.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();
        let db = self.app_state.db.clone();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Start the retention sweeper after successful bind
        RetentionSweeper::new(self.retention_config.clone(), db).spawn();
        tracing::info!(
            interval_secs = self.retention_config.sweep_interval_secs,
            "Retention sweeper started"
        );

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let router = self.build_router();
        let db = self.app_state.db.clone();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        RetentionSweeper::new(self.retention_config.clone(), db).spawn();
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TurnstileConfig;
    use crate::db::Database;
    use crate::turnstile::TurnstileVerifier;

    fn create_test_web_config() -> WebConfig {
        WebConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port
            cors_origins: vec![],
        }
    }

    async fn create_test_state() -> AppState {
        let db = Database::open_in_memory().await.unwrap();
        let verifier = TurnstileVerifier::new(TurnstileConfig {
            enabled: false,
            ..Default::default()
        })
        .unwrap();
        AppState {
            db,
            verifier,
            email_domain: "tmp.test".to_string(),
            credential_secret: "secret".to_string(),
            retention_hours: 24,
        }
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let config = create_test_web_config();
        let state = create_test_state().await;

        let server = WebServer::new(&config, &RetentionConfig::default(), state);
        assert_eq!(server.addr.ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let config = create_test_web_config();
        let state = create_test_state().await;

        let server = WebServer::new(&config, &RetentionConfig::default(), state);
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
