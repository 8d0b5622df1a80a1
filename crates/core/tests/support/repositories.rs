//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the event ports, enabling deterministic tests
//! without database dependencies.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use calnotify_core::events::{EventRepository, EventStore};
use calnotify_domain::{
    CalNotifyError, DateRange, Event, EventFilter, EventPatch, NewEvent, Result as DomainResult,
};
use chrono::Utc;

/// In-memory mock for `EventStore` and `EventRepository`.
#[derive(Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<Mutex<Vec<Event>>>,
    next_id: Arc<AtomicUsize>,
    fail_queries: Arc<AtomicBool>,
    query_delay: Option<Duration>,
    pub range_queries: Arc<AtomicUsize>,
}

impl InMemoryEventRepository {
    /// Create a new mock seeded with the provided events.
    pub fn new(events: Vec<Event>) -> Self {
        let next = events.iter().map(|e| e.id).max().unwrap_or(0) as usize;
        Self {
            events: Arc::new(Mutex::new(events)),
            next_id: Arc::new(AtomicUsize::new(next)),
            ..Self::default()
        }
    }

    /// Every range query sleeps first; used to widen race windows.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

fn sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| (a.date, &a.time, a.id).cmp(&(b.date, &b.time, b.id)));
    events
}

#[async_trait]
impl EventStore for InMemoryEventRepository {
    async fn get_events_by_date_range(&self, range: DateRange) -> DomainResult<Vec<Event>> {
        self.range_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(CalNotifyError::Database("database is locked".into()));
        }
        let events = self.events.lock().unwrap();
        Ok(sorted(events.iter().filter(|e| range.contains(e.date)).cloned().collect()))
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create_event(&self, event: NewEvent) -> DomainResult<Event> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let created = event.into_event(id, Utc::now());
        self.events.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get_event(&self, id: i64) -> DomainResult<Option<Event>> {
        Ok(self.events.lock().unwrap().iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, filter: &EventFilter) -> DomainResult<Vec<Event>> {
        let events = self.events.lock().unwrap();
        Ok(sorted(
            events
                .iter()
                .filter(|e| filter.range.map_or(true, |range| range.contains(e.date)))
                .filter(|e| filter.category.as_deref().map_or(true, |c| e.category == c))
                .filter(|e| filter.text.as_deref().map_or(true, |t| e.matches_text(t)))
                .cloned()
                .collect(),
        ))
    }

    async fn update_event(&self, id: i64, patch: EventPatch) -> DomainResult<Option<Event>> {
        let mut events = self.events.lock().unwrap();
        Ok(events.iter_mut().find(|e| e.id == id).map(|event| {
            patch.apply(event, Utc::now());
            event.clone()
        }))
    }

    async fn delete_event(&self, id: i64) -> DomainResult<bool> {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() != before)
    }
}
