//! Response DTOs for the web API.

use serde::Serialize;
use utoipa::ToSchema;

/// Public service configuration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    /// Domain inbound addresses belong to.
    pub email_domain: String,
    /// Turnstile site key for the frontend widget.
    pub turnstile_key: String,
    /// How long a stored email lives, in hours.
    pub retention_hours: u64,
}

/// Challenge verification response.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// Always true on success.
    pub success: bool,
}

/// Deletion response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteEmailsResponse {
    /// How many records were deleted.
    pub deleted: u64,
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// The mailbox address the password decodes to.
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_response_wire_names() {
        let config = ConfigResponse {
            email_domain: "tmp.test".to_string(),
            turnstile_key: "key".to_string(),
            retention_hours: 24,
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["emailDomain"], "tmp.test");
        assert_eq!(value["turnstileKey"], "key");
        assert_eq!(value["retentionHours"], 24);
    }
}
