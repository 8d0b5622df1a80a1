//! Port interfaces for event storage
//!
//! `EventStore` is the narrow read side the reminder scanner needs;
//! `EventRepository` is the full CRUD surface used by the HTTP layer.

use async_trait::async_trait;
use calnotify_domain::{DateRange, Event, EventFilter, EventPatch, NewEvent, Result};

/// Trait for querying events by calendar day
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events with `range.start <= date < range.end`, ordered by date, time, id
    async fn get_events_by_date_range(&self, range: DateRange) -> Result<Vec<Event>>;
}

/// Trait for managing persisted events
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event and return it with its assigned id
    async fn create_event(&self, event: NewEvent) -> Result<Event>;

    /// Fetch one event
    async fn get_event(&self, id: i64) -> Result<Option<Event>>;

    /// List events matching the filter, ordered by date, time, id
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Apply a partial update; `None` when the event does not exist
    async fn update_event(&self, id: i64, patch: EventPatch) -> Result<Option<Event>>;

    /// Delete an event and its delivery history; `false` when it did not exist
    async fn delete_event(&self, id: i64) -> Result<bool>;
}
