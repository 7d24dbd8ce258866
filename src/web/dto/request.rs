//! Request DTOs for the web API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Challenge verification request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Turnstile challenge token.
    pub token: Option<String>,
}

/// Mailbox listing request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListEmailsRequest {
    /// Mailbox address to list.
    pub address: Option<String>,
}

/// Deletion request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteEmailsRequest {
    /// Ids of the records to delete.
    pub ids: Option<Vec<String>>,
    /// Turnstile challenge token.
    pub token: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Password token, raw or display form.
    pub password: Option<String>,
    /// Turnstile challenge token.
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_request_deserialize() {
        let req: DeleteEmailsRequest =
            serde_json::from_str(r#"{"ids": ["a", "b"], "token": "t"}"#).unwrap();
        assert_eq!(req.ids.unwrap().len(), 2);
        assert_eq!(req.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_missing_fields_deserialize_to_none() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.password.is_none());
        assert!(req.token.is_none());
    }
}
