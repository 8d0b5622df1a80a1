//! Reminder scanner - which events need a reminder today
//!
//! A scan issues two single-day range queries, one for today and one for
//! tomorrow. Tomorrow's events with `remind_day_before` become day-before
//! reminders; today's events with `remind_same_day` become same-day
//! reminders. Day-before reminders come first in the output.

use std::collections::HashSet;
use std::sync::Arc;

use calnotify_domain::{DateRange, Event, ReminderKind};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::ReminderError;
use crate::events::EventStore;

/// An event paired with the reminder it is due for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledReminder {
    pub event: Event,
    pub kind: ReminderKind,
}

/// Computes the reminders due on a given day
pub struct ReminderScanner {
    store: Arc<dyn EventStore>,
}

impl ReminderScanner {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Reminders due on `today`.
    ///
    /// # Errors
    /// `StoreQueryFailure` if either range query fails. Nothing is returned
    /// in that case, not even the results of the query that succeeded.
    pub async fn scan(&self, today: NaiveDate) -> Result<Vec<ScheduledReminder>, ReminderError> {
        let today_range = DateRange::single_day(today);
        let tomorrow_range = DateRange::single_day(today_range.end);

        let (todays, tomorrows) =
            futures::try_join!(self.fetch(today_range), self.fetch(tomorrow_range))?;

        let mut reminders = due(tomorrows, tomorrow_range, ReminderKind::DayBefore);
        reminders.extend(due(todays, today_range, ReminderKind::SameDay));

        debug!(%today, due = reminders.len(), "Reminder scan complete");
        Ok(reminders)
    }

    async fn fetch(&self, range: DateRange) -> Result<Vec<Event>, ReminderError> {
        self.store
            .get_events_by_date_range(range)
            .await
            .map_err(|source| ReminderError::StoreQueryFailure { range, source })
    }
}

fn due(events: Vec<Event>, range: DateRange, kind: ReminderKind) -> Vec<ScheduledReminder> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            if range.contains(event.date) {
                return true;
            }
            warn!(event_id = event.id, date = %event.date, %range, "Store returned event outside queried range");
            false
        })
        .filter(|event| match kind {
            ReminderKind::DayBefore => event.remind_day_before,
            ReminderKind::SameDay => event.remind_same_day,
        })
        .filter(|event| seen.insert(event.id))
        .map(|event| ScheduledReminder { event, kind })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use calnotify_domain::{CalNotifyError, Result};

    use super::*;

    struct StaticStore {
        events: Vec<Event>,
        fail_on_call: Option<usize>,
        calls: AtomicUsize,
    }

    impl StaticStore {
        fn new(events: Vec<Event>) -> Self {
            Self { events, fail_on_call: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl EventStore for StaticStore {
        async fn get_events_by_date_range(&self, range: DateRange) -> Result<Vec<Event>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(CalNotifyError::Database("disk I/O error".into()));
            }
            Ok(self.events.iter().filter(|e| range.contains(e.date)).cloned().collect())
        }
    }

    /// Ignores the range entirely.
    struct SloppyStore(Vec<Event>);

    #[async_trait]
    impl EventStore for SloppyStore {
        async fn get_events_by_date_range(&self, _range: DateRange) -> Result<Vec<Event>> {
            Ok(self.0.clone())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
    }

    fn event(id: i64, date: NaiveDate, same_day: bool, day_before: bool) -> Event {
        let mut event = Event::new(id, format!("event {id}"), date);
        event.remind_same_day = same_day;
        event.remind_day_before = day_before;
        event
    }

    #[tokio::test]
    async fn test_day_before_and_same_day_are_selected() {
        let tomorrow = today().succ_opt().unwrap();
        let store = StaticStore::new(vec![
            event(1, today(), true, true),
            event(2, tomorrow, true, true),
            event(3, tomorrow, true, false),
            event(4, today(), false, true),
        ]);

        let reminders = ReminderScanner::new(Arc::new(store)).scan(today()).await.unwrap();

        let got: Vec<(i64, ReminderKind)> =
            reminders.iter().map(|r| (r.event.id, r.kind)).collect();
        assert_eq!(got, vec![(2, ReminderKind::DayBefore), (1, ReminderKind::SameDay)]);
    }

    #[tokio::test]
    async fn test_events_outside_today_and_tomorrow_never_appear() {
        let store = StaticStore::new(vec![
            event(1, today().pred_opt().unwrap(), true, true),
            event(2, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), true, true),
        ]);

        let reminders = ReminderScanner::new(Arc::new(store)).scan(today()).await.unwrap();
        assert!(reminders.is_empty());
    }

    #[tokio::test]
    async fn test_month_boundary_uses_calendar_days() {
        // 2024 is a leap year: tomorrow is Feb 29.
        let leap_day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let store = StaticStore::new(vec![event(5, leap_day, false, true)]);

        let reminders = ReminderScanner::new(Arc::new(store)).scan(today()).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].kind, ReminderKind::DayBefore);
    }

    #[tokio::test]
    async fn test_any_failed_query_fails_the_scan() {
        for failing_call in 0..2 {
            let mut store = StaticStore::new(vec![event(1, today(), true, false)]);
            store.fail_on_call = Some(failing_call);

            let err = ReminderScanner::new(Arc::new(store)).scan(today()).await.unwrap_err();
            assert!(matches!(err, ReminderError::StoreQueryFailure { .. }));
        }
    }

    #[tokio::test]
    async fn test_misbehaving_store_results_are_filtered() {
        let tomorrow = today().succ_opt().unwrap();
        let store = SloppyStore(vec![
            event(1, today(), true, true),
            event(2, tomorrow, true, true),
            event(9, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), true, true),
        ]);

        let reminders = ReminderScanner::new(Arc::new(store)).scan(today()).await.unwrap();

        let got: Vec<(i64, ReminderKind)> =
            reminders.iter().map(|r| (r.event.id, r.kind)).collect();
        assert_eq!(got, vec![(2, ReminderKind::DayBefore), (1, ReminderKind::SameDay)]);
    }
}
