//! Cloudflare Turnstile verification.
//!
//! Gated operations call [`TurnstileVerifier::verify`] before touching the
//! store. The verifier fails closed: a missing token, a rejected token, a
//! transport error or a timeout all yield `AntiAbuse`.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TurnstileConfig;
use crate::{Result, TempboxError};

/// Verifies challenge tokens against the Turnstile siteverify API.
#[derive(Clone)]
pub struct TurnstileVerifier {
    config: TurnstileConfig,
    client: reqwest::Client,
}

/// Siteverify response body.
#[derive(Debug, Deserialize)]
struct VerifyOutcome {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl TurnstileVerifier {
    /// Create a new verifier with a bounded-timeout HTTP client.
    pub fn new(config: TurnstileConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TempboxError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Site key handed to the frontend widget.
    pub fn site_key(&self) -> &str {
        &self.config.site_key
    }

    /// Whether verification is enforced.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Verify a challenge token.
    ///
    /// When verification is disabled by config this always succeeds.
    pub async fn verify(&self, token: Option<&str>) -> Result<()> {
        if !self.config.enabled {
            debug!("Turnstile verification disabled, skipping");
            return Ok(());
        }

        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            TempboxError::AntiAbuse("challenge token missing".to_string())
        })?;

        let params = [
            ("secret", self.config.secret.as_str()),
            ("response", token),
        ];

        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Turnstile verification request failed");
                TempboxError::AntiAbuse(format!("verification request failed: {e}"))
            })?;

        let outcome: VerifyOutcome = response.json().await.map_err(|e| {
            warn!(error = %e, "Turnstile verification response unreadable");
            TempboxError::AntiAbuse(format!("verification response unreadable: {e}"))
        })?;

        if outcome.success {
            Ok(())
        } else {
            debug!(codes = ?outcome.error_codes, "Turnstile rejected token");
            Err(TempboxError::AntiAbuse(format!(
                "challenge rejected: {}",
                outcome.error_codes.join(", ")
            )))
        }
    }
}
