//! Ingestion pipeline: one inbound transport message becomes one stored
//! record per envelope recipient, or an explicit rejection the transport can
//! act on.

pub mod smtp;

use mail_parser::{Address, HeaderValue, Message, MessageParser};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::mailbox::{EmailRepository, Email, MailHeader, NewEmail};
use crate::{Result, TempboxError};

/// SMTP envelope for one inbound message.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Envelope sender (MAIL FROM).
    pub from: String,
    /// Envelope recipients (RCPT TO). Must be non-empty.
    pub recipients: Vec<String>,
}

/// Parse a raw message and store one record per envelope recipient.
///
/// Returns the stored records in recipient order. Any failure rejects the
/// whole message: `Parse`/`Validation` means the content is bad and the
/// transport should bounce, `Database` means storage failed and the
/// transport should retry. There is no deduplication by message id, so a
/// retried delivery stores a fresh record.
pub async fn ingest_message(
    pool: &SqlitePool,
    envelope: &Envelope,
    raw: &[u8],
) -> Result<Vec<Email>> {
    if envelope.recipients.is_empty() {
        return Err(TempboxError::Validation(
            "envelope has no recipients".to_string(),
        ));
    }

    let message = MessageParser::default().parse(raw).ok_or_else(|| {
        warn!(
            from = %envelope.from,
            size = raw.len(),
            "Rejecting message that does not parse as MIME"
        );
        TempboxError::Parse("message does not parse as MIME".to_string())
    })?;

    // The parser is lenient and turns almost any byte blob into a message.
    // A result without a single header is not mail; reject it so the
    // transport bounces instead of storing junk records.
    if message.headers().is_empty() {
        warn!(
            from = %envelope.from,
            size = raw.len(),
            "Rejecting message with no parseable headers"
        );
        return Err(TempboxError::Parse(
            "message has no parseable headers".to_string(),
        ));
    }

    let mut stored = Vec::with_capacity(envelope.recipients.len());
    for recipient in &envelope.recipients {
        let record = build_record(&envelope.from, recipient, &message);
        let repo = EmailRepository::new(pool);
        let email = repo.insert(&record).await.map_err(|e| {
            warn!(
                recipient = %recipient,
                error = %e,
                "Failed to store inbound message"
            );
            e
        })?;
        debug!(
            id = %email.id,
            recipient = %recipient,
            subject = email.subject.as_deref().unwrap_or(""),
            "Stored inbound message"
        );
        stored.push(email);
    }

    Ok(stored)
}

/// Build a candidate record from the parsed message, under a fresh id.
fn build_record(envelope_from: &str, recipient: &str, message: &Message<'_>) -> NewEmail {
    let id = Uuid::new_v4().to_string();
    // Some senders omit Message-ID; synthesize one so the record is valid.
    let message_id = message
        .message_id()
        .map(|m| format!("<{m}>"))
        .unwrap_or_else(|| format!("<{id}@tempbox>"));

    let mut record = NewEmail::new(id, envelope_from, recipient, message_id);
    record.sender = message.from().and_then(format_address);
    record.recipients = message.to().and_then(format_address);
    record.cc = message.cc().and_then(format_address);
    record.bcc = message.bcc().and_then(format_address);
    record.reply_to = message.reply_to().and_then(format_address);
    record.subject = message.subject().map(|s| s.to_string());
    record.in_reply_to = message.header("In-Reply-To").and_then(header_text);
    record.references = message.header("References").and_then(header_text);
    record.date = message.date().map(|d| d.to_rfc3339());
    record.html = message.body_html(0).map(|b| b.to_string());
    record.text = message.body_text(0).map(|b| b.to_string());
    record.headers = message
        .headers()
        .iter()
        .map(|h| MailHeader {
            name: h.name().to_string(),
            value: header_value_text(h.value()),
        })
        .collect();
    record
}

/// Render an address header as a display string, `Name <addr>` per mailbox,
/// comma separated. Returns None when no mailbox has an address.
fn format_address(address: &Address<'_>) -> Option<String> {
    let parts: Vec<String> = address
        .iter()
        .filter_map(|a| {
            let email = a.address()?;
            Some(match a.name() {
                Some(name) => format!("{name} <{email}>"),
                None => email.to_string(),
            })
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Extract the textual content of a header value, if it has one.
fn header_text(value: &HeaderValue<'_>) -> Option<String> {
    match value {
        HeaderValue::Text(t) => Some(t.to_string()),
        HeaderValue::TextList(l) => Some(l.join(" ")),
        _ => None,
    }
}

/// Render any header value for the raw-headers list.
fn header_value_text(value: &HeaderValue<'_>) -> String {
    match value {
        HeaderValue::Text(t) => t.to_string(),
        HeaderValue::TextList(l) => l.join(", "),
        HeaderValue::Address(a) => format_address(a).unwrap_or_default(),
        HeaderValue::DateTime(d) => d.to_rfc3339(),
        _ => String::new(),
    }
}
