//! Configuration module for Tempbox.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, TempboxError};

/// Inbound SMTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Read timeout in seconds for a client command or DATA chunk.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Maximum accepted message size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_smtp_port() -> u16 {
    2525
}

fn default_read_timeout() -> u64 {
    300
}

fn default_max_message_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_smtp_port(),
            read_timeout_secs: default_read_timeout(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

/// Web API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Allowed CORS origins (empty = allow any).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_web_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Mailbox configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Domain that inbound addresses belong to (the part after `@`).
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Secret used by the credential codec. Must be non-empty.
    #[serde(default = "default_secret")]
    pub secret: String,
}

fn default_domain() -> String {
    "example.test".to_string()
}

fn default_secret() -> String {
    "change-me".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            secret: default_secret(),
        }
    }
}

/// Turnstile (anti-abuse) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnstileConfig {
    /// Whether verification is enforced. Disable for local development and
    /// tests only; gated operations then skip the challenge check.
    #[serde(default = "default_turnstile_enabled")]
    pub enabled: bool,
    /// Site key handed to the frontend widget.
    #[serde(default)]
    pub site_key: String,
    /// Server-side secret for the verification API.
    #[serde(default)]
    pub secret: String,
    /// Verification endpoint.
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Total timeout for one verification call, in seconds. On timeout the
    /// gated operation fails closed.
    #[serde(default = "default_verify_timeout")]
    pub timeout_secs: u64,
}

fn default_turnstile_enabled() -> bool {
    true
}

fn default_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}

fn default_verify_timeout() -> u64 {
    10
}

impl Default for TurnstileConfig {
    fn default() -> Self {
        Self {
            enabled: default_turnstile_enabled(),
            site_key: String::new(),
            secret: String::new(),
            verify_url: default_verify_url(),
            timeout_secs: default_verify_timeout(),
        }
    }
}

/// Retention configuration.
///
/// `window_hours` is the single source of truth for how long a stored email
/// lives; the frontend lifetime messaging is derived from the same value via
/// `GET /config`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// How long a stored email is kept, in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,
    /// How often the sweeper runs, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_window_hours() -> u64 {
    24
}

fn default_sweep_interval() -> u64 {
    3600
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/tempbox.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/tempbox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Inbound SMTP settings.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Web API settings.
    #[serde(default)]
    pub web: WebConfig,
    /// Mailbox settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Anti-abuse settings.
    #[serde(default)]
    pub turnstile: TurnstileConfig,
    /// Retention settings.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TempboxError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.mail.secret.is_empty() {
            return Err(TempboxError::Config(
                "mail.secret must not be empty".to_string(),
            ));
        }
        if self.mail.domain.is_empty() {
            return Err(TempboxError::Config(
                "mail.domain must not be empty".to_string(),
            ));
        }
        if self.retention.window_hours == 0 {
            return Err(TempboxError::Config(
                "retention.window_hours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
