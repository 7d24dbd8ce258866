use tracing::info;

use tempbox::ingest::smtp::SmtpServer;
use tempbox::turnstile::TurnstileVerifier;
use tempbox::web::{AppState, WebServer};
use tempbox::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = tempbox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        tempbox::logging::init_console_only(&config.logging.level);
    }

    info!("Tempbox - disposable email service");
    info!(domain = %config.mail.domain, "Serving mailboxes");

    if let Err(e) = run(config).await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> tempbox::Result<()> {
    let db = Database::open(&config.database.path).await?;

    // Inbound SMTP
    let smtp = SmtpServer::new(
        config.smtp.clone(),
        config.mail.domain.clone(),
        db.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = smtp.run().await {
            tracing::error!("SMTP server error: {}", e);
        }
    });

    // Web API plus retention sweeper
    let verifier = TurnstileVerifier::new(config.turnstile.clone())?;
    let state = AppState {
        db,
        verifier,
        email_domain: config.mail.domain.clone(),
        credential_secret: config.mail.secret.clone(),
        retention_hours: config.retention.window_hours,
    };
    let server = WebServer::new(&config.web, &config.retention, state);
    server.run().await?;

    Ok(())
}
