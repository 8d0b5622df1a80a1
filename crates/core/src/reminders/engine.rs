//! Reminder engine - one complete scan, dispatch and bookkeeping cycle
//!
//! Cycles are serialised by a lock: a manual check that arrives while the
//! timer-driven cycle is running waits for it and then runs on its own. With
//! the ledger enabled, a reminder delivered earlier in the day is not sent
//! again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use calnotify_domain::constants::{DEFAULT_CYCLE_TIMEOUT_SECS, TIME_FORMAT};
use calnotify_domain::{Event, ReminderKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::error::ReminderError;
use super::ports::NotificationLedger;
use super::scanner::{ReminderScanner, ScheduledReminder};
use crate::clock::Clock;
use crate::notifications::{DispatchReport, NotificationDispatcher};

/// Engine tunables
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Cycle budget. Bounds the store scan; the per-event loop always runs
    /// to completion and an overrun is only reported.
    pub cycle_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { cycle_timeout: Duration::from_secs(DEFAULT_CYCLE_TIMEOUT_SECS) }
    }
}

/// Aggregate counts for one cycle. No per-recipient detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Reminders the scan found due
    pub reminders_due: usize,
    /// Reminders actually dispatched this cycle
    pub dispatched: usize,
    /// Reminders skipped because the ledger already had them
    pub already_sent: usize,
    pub messages_sent: usize,
    pub messages_failed: usize,
    pub messages_skipped: usize,
    /// The cycle ran past its budget
    pub over_budget: bool,
}

impl CycleSummary {
    fn new(date: NaiveDate, started_at: DateTime<Utc>) -> Self {
        Self {
            date,
            started_at,
            duration_ms: 0,
            reminders_due: 0,
            dispatched: 0,
            already_sent: 0,
            messages_sent: 0,
            messages_failed: 0,
            messages_skipped: 0,
            over_budget: false,
        }
    }

    fn absorb(&mut self, report: &DispatchReport) {
        self.dispatched += 1;
        self.messages_sent += report.sent_count();
        self.messages_failed += report.failed_count();
        self.messages_skipped += report.skipped_count();
    }
}

/// Runs reminder cycles
pub struct ReminderEngine {
    scanner: ReminderScanner,
    dispatcher: Arc<NotificationDispatcher>,
    ledger: Option<Arc<dyn NotificationLedger>>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    cycle_lock: Mutex<()>,
}

impl ReminderEngine {
    pub fn new(
        scanner: ReminderScanner,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scanner,
            dispatcher,
            ledger: None,
            clock,
            settings: EngineSettings::default(),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Enable de-duplication through `ledger`
    pub fn with_ledger(mut self, ledger: Arc<dyn NotificationLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Run one full cycle for the current day.
    ///
    /// Waits for any cycle already in progress first.
    ///
    /// Once the scan has returned, every due reminder is dispatched even
    /// when the cycle runs past its budget.
    ///
    /// # Errors
    /// `StoreQueryFailure` when the scan fails, `Timeout` when the scan
    /// exceeds the cycle budget. Delivery problems never surface here.
    pub async fn run_cycle(&self) -> Result<CycleSummary, ReminderError> {
        let _guard = self.cycle_lock.lock().await;

        match self.run_locked().await {
            Ok(summary) => {
                log_cycle_summary(&summary);
                Ok(summary)
            }
            Err(err) => {
                error!(error = %err, error_kind = err.label(), "Reminder cycle aborted");
                Err(err)
            }
        }
    }

    /// Dispatch a synthetic reminder to the given contact.
    ///
    /// The event store and the ledger are not touched.
    pub async fn send_test_notification(
        &self,
        email: &str,
        phone: Option<&str>,
        kind: ReminderKind,
    ) -> DispatchReport {
        let now = self.clock.now();
        let today = self.clock.today();
        let date = match kind {
            ReminderKind::SameDay => today,
            ReminderKind::DayBefore => today.succ_opt().unwrap_or(today),
        };

        let mut event = Event::new(0, "Test notification", date);
        event.description = "This is a test reminder.".to_string();
        event.time = now.format(TIME_FORMAT).to_string();
        event.email = email.to_string();
        event.phone = phone.unwrap_or_default().to_string();
        match kind {
            ReminderKind::SameDay => event.remind_same_day = true,
            ReminderKind::DayBefore => event.remind_day_before = true,
        }

        info!(%kind, "Sending test notification");
        self.dispatcher.dispatch(&event, kind).await
    }

    async fn run_locked(&self) -> Result<CycleSummary, ReminderError> {
        let started = Instant::now();
        let today = self.clock.today();
        let mut summary = CycleSummary::new(today, self.clock.now());

        let budget = self.settings.cycle_timeout;
        let reminders = tokio::time::timeout(budget, self.scanner.scan(today))
            .await
            .map_err(|_| ReminderError::Timeout { seconds: budget.as_secs() })??;
        summary.reminders_due = reminders.len();

        for reminder in &reminders {
            if self.already_sent(reminder, today).await {
                summary.already_sent += 1;
                continue;
            }

            let report = self.dispatcher.dispatch(&reminder.event, reminder.kind).await;
            summary.absorb(&report);

            if report.any_sent() {
                self.record_sent(reminder, today).await;
            }
        }

        let elapsed = started.elapsed();
        summary.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if elapsed > budget {
            summary.over_budget = true;
            warn!(
                budget_secs = budget.as_secs(),
                elapsed_ms = summary.duration_ms,
                dispatched = summary.dispatched,
                "Reminder cycle ran past its budget"
            );
        }
        Ok(summary)
    }

    async fn already_sent(&self, reminder: &ScheduledReminder, today: NaiveDate) -> bool {
        let Some(ledger) = &self.ledger else {
            return false;
        };
        match ledger.was_sent(reminder.event.id, reminder.kind, today).await {
            Ok(sent) => {
                if sent {
                    debug!(event_id = reminder.event.id, kind = %reminder.kind, "Reminder already delivered today");
                }
                sent
            }
            Err(err) => {
                warn!(event_id = reminder.event.id, error = %err, "Ledger lookup failed, dispatching anyway");
                false
            }
        }
    }

    async fn record_sent(&self, reminder: &ScheduledReminder, today: NaiveDate) {
        let Some(ledger) = &self.ledger else {
            return;
        };
        if let Err(err) =
            ledger.record_sent(reminder.event.id, reminder.kind, today, self.clock.now()).await
        {
            warn!(event_id = reminder.event.id, error = %err, "Failed to record delivered reminder");
        }
    }
}

fn log_cycle_summary(summary: &CycleSummary) {
    info!(
        date = %summary.date,
        due = summary.reminders_due,
        dispatched = summary.dispatched,
        already_sent = summary.already_sent,
        sent = summary.messages_sent,
        failed = summary.messages_failed,
        skipped = summary.messages_skipped,
        duration_ms = summary.duration_ms,
        "Reminder cycle complete"
    );
}
