//! Port interfaces for reminder bookkeeping

use async_trait::async_trait;
use calnotify_domain::{ReminderKind, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Trait for remembering which reminders were already delivered.
///
/// Entries are keyed by `(event_id, kind, reminder_date)`, where
/// `reminder_date` is the calendar day of the cycle that delivered it.
#[async_trait]
pub trait NotificationLedger: Send + Sync {
    /// Whether this reminder was already delivered on `reminder_date`
    async fn was_sent(&self, event_id: i64, kind: ReminderKind, reminder_date: NaiveDate)
        -> Result<bool>;

    /// Record a delivered reminder. Recording twice is not an error.
    async fn record_sent(
        &self,
        event_id: i64,
        kind: ReminderKind,
        reminder_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> Result<()>;
}
