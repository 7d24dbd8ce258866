//! Mailbox record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{Result, TempboxError};

/// A single raw message header, preserved in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MailHeader {
    /// Header name as received.
    pub name: String,
    /// Header value as received.
    pub value: String,
}

/// A stored email record.
///
/// Wire names are camelCase; `message_from`/`message_to` carry the SMTP
/// envelope while `sender`/`recipients` and friends carry the parsed
/// message content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Unique record id.
    pub id: String,
    /// Envelope sender.
    pub message_from: String,
    /// Envelope recipient; the mailbox this record belongs to.
    pub message_to: String,
    /// Parsed From header.
    #[serde(rename = "from")]
    pub sender: Option<String>,
    /// Parsed To header.
    #[serde(rename = "to")]
    pub recipients: Option<String>,
    /// Parsed Cc header.
    pub cc: Option<String>,
    /// Parsed Bcc header.
    pub bcc: Option<String>,
    /// Parsed Reply-To header.
    pub reply_to: Option<String>,
    /// Message subject.
    pub subject: Option<String>,
    /// Message-ID header, or a synthesized one when absent.
    pub message_id: String,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// References header.
    #[serde(rename = "references")]
    #[sqlx(rename = "refs")]
    pub references: Option<String>,
    /// Date header in RFC 3339 form.
    pub date: Option<String>,
    /// HTML body, if present.
    pub html: Option<String>,
    /// Plain-text body, if present.
    pub text: Option<String>,
    /// All raw headers in arrival order.
    #[schema(value_type = Vec<MailHeader>)]
    pub headers: Json<Vec<MailHeader>>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Record update time. Equals `created_at`; records are never updated.
    pub updated_at: DateTime<Utc>,
}

/// Candidate record for insertion.
#[derive(Debug, Clone)]
pub struct NewEmail {
    pub id: String,
    pub message_from: String,
    pub message_to: String,
    pub sender: Option<String>,
    pub recipients: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub message_id: String,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
    pub date: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub headers: Vec<MailHeader>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewEmail {
    /// Create a minimal candidate with the required fields; content fields
    /// start empty.
    pub fn new(
        id: impl Into<String>,
        message_from: impl Into<String>,
        message_to: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            message_from: message_from.into(),
            message_to: message_to.into(),
            sender: None,
            recipients: None,
            cc: None,
            bcc: None,
            reply_to: None,
            subject: None,
            message_id: message_id.into(),
            in_reply_to: None,
            references: None,
            date: None,
            html: None,
            text: None,
            headers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the required fields.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(TempboxError::Validation("id is required".to_string()));
        }
        if self.message_to.is_empty() {
            return Err(TempboxError::Validation(
                "message_to is required".to_string(),
            ));
        }
        if self.message_id.is_empty() {
            return Err(TempboxError::Validation(
                "message_id is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_email_defaults() {
        let email = NewEmail::new("id-1", "a@x.test", "b@y.test", "<m1@x.test>");
        assert_eq!(email.id, "id-1");
        assert_eq!(email.created_at, email.updated_at);
        assert!(email.headers.is_empty());
        assert!(email.subject.is_none());
    }

    #[test]
    fn test_validate_ok() {
        let email = NewEmail::new("id-1", "a@x.test", "b@y.test", "<m1@x.test>");
        assert!(email.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_id() {
        let email = NewEmail::new("", "a@x.test", "b@y.test", "<m1@x.test>");
        assert!(matches!(
            email.validate(),
            Err(TempboxError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_missing_recipient() {
        let email = NewEmail::new("id-1", "a@x.test", "", "<m1@x.test>");
        assert!(email.validate().is_err());
    }

    #[test]
    fn test_validate_missing_message_id() {
        let email = NewEmail::new("id-1", "a@x.test", "b@y.test", "");
        assert!(email.validate().is_err());
    }

    #[test]
    fn test_email_wire_names() {
        let email = Email {
            id: "id-1".to_string(),
            message_from: "a@x.test".to_string(),
            message_to: "b@y.test".to_string(),
            sender: Some("Alice <a@x.test>".to_string()),
            recipients: Some("b@y.test".to_string()),
            cc: None,
            bcc: None,
            reply_to: Some("a@x.test".to_string()),
            subject: Some("Hi".to_string()),
            message_id: "<m1@x.test>".to_string(),
            in_reply_to: None,
            references: Some("<m0@x.test>".to_string()),
            date: None,
            html: None,
            text: Some("hello".to_string()),
            headers: Json(vec![MailHeader {
                name: "Subject".to_string(),
                value: "Hi".to_string(),
            }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["messageFrom"], "a@x.test");
        assert_eq!(value["messageTo"], "b@y.test");
        assert_eq!(value["from"], "Alice <a@x.test>");
        assert_eq!(value["to"], "b@y.test");
        assert_eq!(value["replyTo"], "a@x.test");
        assert_eq!(value["messageId"], "<m1@x.test>");
        assert_eq!(value["references"], "<m0@x.test>");
        assert_eq!(value["headers"][0]["name"], "Subject");
        assert!(value.get("message_from").is_none());
    }
}
