//! Email repository for Tempbox.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, SqlitePool};

use super::types::{Email, NewEmail};
use crate::{Result, TempboxError};

const SELECT_COLUMNS: &str = r#"
    SELECT id, message_from, message_to, sender, recipients, cc, bcc,
           reply_to, subject, message_id, in_reply_to, refs, date,
           html, text, headers, created_at, updated_at
    FROM emails
"#;

/// Repository for email operations.
pub struct EmailRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EmailRepository<'a> {
    /// Create a new repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new email record.
    ///
    /// Returns `Validation` when a required field is missing and `Conflict`
    /// when a record with the same id already exists.
    pub async fn insert(&self, email: &NewEmail) -> Result<Email> {
        email.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO emails (
                id, message_from, message_to, sender, recipients, cc, bcc,
                reply_to, subject, message_id, in_reply_to, refs, date,
                html, text, headers, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&email.id)
        .bind(&email.message_from)
        .bind(&email.message_to)
        .bind(&email.sender)
        .bind(&email.recipients)
        .bind(&email.cc)
        .bind(&email.bcc)
        .bind(&email.reply_to)
        .bind(&email.subject)
        .bind(&email.message_id)
        .bind(&email.in_reply_to)
        .bind(&email.references)
        .bind(&email.date)
        .bind(&email.html)
        .bind(&email.text)
        .bind(Json(&email.headers))
        .bind(email.created_at)
        .bind(email.updated_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) => {
                if e.as_database_error()
                    .is_some_and(|d| d.is_unique_violation())
                {
                    return Err(TempboxError::Conflict(format!(
                        "email id {} already exists",
                        email.id
                    )));
                }
                return Err(e.into());
            }
        }

        self.get_by_id(&email.id)
            .await?
            .ok_or_else(|| TempboxError::Database("inserted email not found".to_string()))
    }

    /// Get an email by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Email>> {
        let email = sqlx::query_as::<_, Email>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(email)
    }

    /// List all emails for a recipient in arrival order.
    ///
    /// Returns an empty vec when the recipient has no mail.
    pub async fn list_by_recipient(&self, recipient: &str) -> Result<Vec<Email>> {
        let emails = sqlx::query_as::<_, Email>(&format!(
            "{SELECT_COLUMNS} WHERE message_to = ? ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(recipient)
        .fetch_all(self.pool)
        .await?;
        Ok(emails)
    }

    /// Delete emails by id, returning how many were deleted.
    ///
    /// Ids with no matching record are ignored; an empty set deletes nothing.
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("DELETE FROM emails WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Delete emails created strictly before the cutoff, returning how many
    /// were deleted.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM emails WHERE created_at < ?")
            .bind(cutoff)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all stored emails.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emails")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
