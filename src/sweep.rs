//! Retention sweeper.
//!
//! Periodically deletes emails older than the retention window. Failures are
//! logged and swallowed; the next tick tries again.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::config::RetentionConfig;
use crate::db::Database;
use crate::mailbox::EmailRepository;
use crate::Result;

/// Background task enforcing the retention window.
pub struct RetentionSweeper {
    config: RetentionConfig,
    db: Database,
}

impl RetentionSweeper {
    /// Create a new sweeper.
    pub fn new(config: RetentionConfig, db: Database) -> Self {
        Self { config, db }
    }

    /// Run one sweep, returning how many records were removed.
    pub async fn sweep_once(&self) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(self.config.window_hours as i64);
        let repo = EmailRepository::new(self.db.pool());
        repo.delete_older_than(cutoff).await
    }

    /// Spawn the periodic sweep task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.sweep_interval_secs));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match self.sweep_once().await {
                    Ok(count) => {
                        if count > 0 {
                            tracing::info!(deleted_count = count, "Swept expired emails");
                        } else {
                            tracing::debug!("No expired emails to sweep");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Retention sweep failed");
                    }
                }
            }
        })
    }
}
