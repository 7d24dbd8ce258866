//! Database schema migrations for Tempbox.
//!
//! Migrations are applied in order; each entry is one version. Never edit an
//! entry that has shipped, append a new one instead.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: emails table
    r#"
    CREATE TABLE IF NOT EXISTS emails (
        id              TEXT PRIMARY KEY,
        message_from    TEXT NOT NULL,
        message_to      TEXT NOT NULL,
        sender          TEXT,
        recipients      TEXT,
        cc              TEXT,
        bcc             TEXT,
        reply_to        TEXT,
        subject         TEXT,
        message_id      TEXT NOT NULL,
        in_reply_to     TEXT,
        refs            TEXT,
        date            TEXT,
        html            TEXT,
        text            TEXT,
        headers         TEXT NOT NULL DEFAULT '[]',
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_emails_message_to ON emails(message_to);
    CREATE INDEX IF NOT EXISTS idx_emails_created_at ON emails(created_at);
    "#,
];
