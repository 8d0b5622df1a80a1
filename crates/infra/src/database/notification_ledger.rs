//! SQLite-backed notification ledger

use std::sync::Arc;

use async_trait::async_trait;
use calnotify_core::reminders::NotificationLedger;
use calnotify_domain::{ReminderKind, Result as DomainResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use tokio::task;
use tracing::{debug, instrument};

use super::event_repository::map_join_error;
use super::manager::DbManager;
use crate::errors::into_domain;

/// Persists delivered reminders in the `notification_log` table so a
/// restart does not re-send what was already delivered today.
pub struct SqliteNotificationLedger {
    db: Arc<DbManager>,
}

impl SqliteNotificationLedger {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationLedger for SqliteNotificationLedger {
    async fn was_sent(
        &self,
        event_id: i64,
        kind: ReminderKind,
        reminder_date: NaiveDate,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM notification_log
                    WHERE event_id = ?1 AND kind = ?2 AND reminder_date = ?3
                 )",
                params![event_id, kind.as_str(), reminder_date],
                |row| row.get::<_, bool>(0),
            )
            .map_err(into_domain)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, sent_at), fields(kind = %kind))]
    async fn record_sent(
        &self,
        event_id: i64,
        kind: ReminderKind,
        reminder_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO notification_log (event_id, kind, reminder_date, sent_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![event_id, kind.as_str(), reminder_date, sent_at],
                )
                .map_err(into_domain)?;
            debug!(event_id, inserted, "recorded delivered reminder");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
