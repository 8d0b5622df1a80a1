//! In-memory notification ledger

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use calnotify_domain::{CalNotifyError, ReminderKind, Result};
use chrono::{DateTime, NaiveDate, Utc};

use super::ports::NotificationLedger;

type LedgerKey = (i64, ReminderKind, NaiveDate);

/// Process-local ledger. Forgets everything on restart.
#[derive(Debug, Default)]
pub struct InMemoryNotificationLedger {
    entries: Mutex<HashMap<LedgerKey, DateTime<Utc>>>,
}

impl InMemoryNotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationLedger for InMemoryNotificationLedger {
    async fn was_sent(
        &self,
        event_id: i64,
        kind: ReminderKind,
        reminder_date: NaiveDate,
    ) -> Result<bool> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CalNotifyError::Internal("notification ledger lock poisoned".into()))?;
        Ok(entries.contains_key(&(event_id, kind, reminder_date)))
    }

    async fn record_sent(
        &self,
        event_id: i64,
        kind: ReminderKind,
        reminder_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CalNotifyError::Internal("notification ledger lock poisoned".into()))?;
        entries.entry((event_id, kind, reminder_date)).or_insert(sent_at);
        Ok(())
    }
}
