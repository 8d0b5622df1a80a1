//! Event service - CRUD and calendar views

use std::sync::Arc;

use calnotify_domain::constants::{DEFAULT_UPCOMING_DAYS, MAX_TITLE_LENGTH, MAX_UPCOMING_DAYS};
use calnotify_domain::{
    CalNotifyError, DateRange, Event, EventFilter, EventPatch, EventStats, NewEvent, Result,
};
use tracing::info;

use super::ports::{EventRepository, EventStore};
use crate::clock::Clock;

/// Event management service
pub struct EventService {
    repository: Arc<dyn EventRepository>,
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    /// Create a new event service
    pub fn new(
        repository: Arc<dyn EventRepository>,
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, store, clock }
    }

    pub async fn create(&self, event: NewEvent) -> Result<Event> {
        validate_title(&event.title)?;
        validate_time(&event.time, event.is_all_day)?;
        let created = self.repository.create_event(event).await?;
        info!(event_id = created.id, date = %created.date, "Event created");
        Ok(created)
    }

    /// # Errors
    /// `NotFound` when no event has this id.
    pub async fn get(&self, id: i64) -> Result<Event> {
        self.repository.get_event(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.repository.list_events(filter).await
    }

    /// Fields absent from `patch` keep their stored values, and the time
    /// check runs against the merged event.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `InvalidInput` when the merged event
    /// is not all day and has no time.
    pub async fn update(&self, id: i64, patch: EventPatch) -> Result<Event> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if patch.time.is_some() || patch.is_all_day.is_some() {
            let stored = self.get(id).await?;
            let time = patch.time.as_deref().unwrap_or(&stored.time);
            validate_time(time, patch.is_all_day.unwrap_or(stored.is_all_day))?;
        }
        let updated = self.repository.update_event(id, patch).await?.ok_or_else(|| not_found(id))?;
        info!(event_id = id, "Event updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repository.delete_event(id).await? {
            return Err(not_found(id));
        }
        info!(event_id = id, "Event deleted");
        Ok(())
    }

    /// Events dated today in the deployment time zone.
    pub async fn today(&self) -> Result<Vec<Event>> {
        self.store.get_events_by_date_range(DateRange::single_day(self.clock.today())).await
    }

    /// Events from today through the next `days - 1` days.
    ///
    /// # Errors
    /// `InvalidInput` when `days` is zero or above the supported window.
    pub async fn upcoming(&self, days: u32) -> Result<Vec<Event>> {
        if days == 0 || days > MAX_UPCOMING_DAYS {
            return Err(CalNotifyError::InvalidInput(format!(
                "days must be between 1 and {MAX_UPCOMING_DAYS}"
            )));
        }
        let range = DateRange::starting_at(self.clock.today(), days);
        self.store.get_events_by_date_range(range).await
    }

    pub async fn in_range(&self, range: DateRange) -> Result<Vec<Event>> {
        self.store.get_events_by_date_range(range).await
    }

    /// Events whose title, description or location contain `term`.
    ///
    /// # Errors
    /// `InvalidInput` for a blank term.
    pub async fn search(&self, term: &str, range: Option<DateRange>) -> Result<Vec<Event>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CalNotifyError::InvalidInput("search term is required".into()));
        }
        let filter = EventFilter { range, category: None, text: Some(term.to_string()) };
        self.repository.list_events(&filter).await
    }

    pub async fn stats(&self) -> Result<EventStats> {
        let events = self.repository.list_events(&EventFilter::default()).await?;
        let today = self.clock.today();
        let upcoming = DateRange::starting_at(today, DEFAULT_UPCOMING_DAYS);

        let mut stats = EventStats { total: events.len(), ..EventStats::default() };
        for event in &events {
            if event.date == today {
                stats.today += 1;
            }
            if upcoming.contains(event.date) {
                stats.upcoming += 1;
            }
            *stats.by_category.entry(bucket(&event.category)).or_default() += 1;
            *stats.by_priority.entry(bucket(&event.priority)).or_default() += 1;
        }
        Ok(stats)
    }
}

fn bucket(value: &str) -> String {
    match value.trim() {
        "" => "none".to_string(),
        other => other.to_lowercase(),
    }
}

fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CalNotifyError::InvalidInput("title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CalNotifyError::InvalidInput(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_time(time: &str, is_all_day: bool) -> Result<()> {
    if !is_all_day && time.trim().is_empty() {
        return Err(CalNotifyError::InvalidInput(
            "time is required unless the event is all day".into(),
        ));
    }
    Ok(())
}

fn not_found(id: i64) -> CalNotifyError {
    CalNotifyError::NotFound(format!("event {id}"))
}
