//! SQLite-backed implementation of the event ports.
//!
//! Provides both the narrow `EventStore` read path used by the reminder
//! scanner and the full `EventRepository` CRUD surface.

use std::sync::Arc;

use async_trait::async_trait;
use calnotify_core::events::{EventRepository, EventStore};
use calnotify_domain::{
    CalNotifyError, DateRange, Event, EventFilter, EventPatch, NewEvent, Result as DomainResult,
};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::into_domain;

const EVENT_COLUMNS: &str = "id, title, description, date, time, location, email, phone,
    remind_same_day, remind_day_before, is_all_day, color, priority, category,
    notify_family, notify_father, notify_mother, child_tag, family_members,
    selected_children, created_at, updated_at";

/// SQLite-backed implementation of `EventStore` and `EventRepository`
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for SqliteEventRepository {
    #[instrument(skip(self), fields(range = %range))]
    async fn get_events_by_date_range(&self, range: DateRange) -> DomainResult<Vec<Event>> {
        let db = Arc::clone(&self.db);

        let events = task::spawn_blocking(move || -> DomainResult<Vec<Event>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE date >= ?1 AND date < ?2
                 ORDER BY date, time, id"
            );
            let mut stmt = conn.prepare(&sql).map_err(into_domain)?;
            let rows = stmt
                .query_map(params![range.start, range.end], map_event_row)
                .map_err(into_domain)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(into_domain)
        })
        .await
        .map_err(map_join_error)??;

        debug!(count = events.len(), "fetched events by date range");
        Ok(events)
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    #[instrument(skip(self, event), fields(date = %event.date))]
    async fn create_event(&self, event: NewEvent) -> DomainResult<Event> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Event> {
            let conn = db.get_connection()?;
            let now = Utc::now();
            let mut created = event.into_event(0, now);
            insert_event(&conn, &created)?;
            created.id = conn.last_insert_rowid();
            Ok(created)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_event(&self, id: i64) -> DomainResult<Option<Event>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Event>> {
            let conn = db.get_connection()?;
            find_event(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn list_events(&self, filter: &EventFilter) -> DomainResult<Vec<Event>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> DomainResult<Vec<Event>> {
            let conn = db.get_connection()?;

            let mut clauses = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(range) = filter.range {
                clauses.push("date >= ? AND date < ?");
                values.push(Value::Text(range.start.to_string()));
                values.push(Value::Text(range.end.to_string()));
            }
            if let Some(category) = filter.category {
                clauses.push("category = ?");
                values.push(Value::Text(category));
            }
            if let Some(text) = filter.text {
                clauses.push(
                    "(instr(lower(title), ?) > 0 OR instr(lower(description), ?) > 0 \
                     OR instr(lower(location), ?) > 0)",
                );
                let needle = text.trim().to_lowercase();
                values.extend(std::iter::repeat(Value::Text(needle)).take(3));
            }
            let where_clause = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };

            let sql =
                format!("SELECT {EVENT_COLUMNS} FROM events {where_clause} ORDER BY date, time, id");
            let mut stmt = conn.prepare(&sql).map_err(into_domain)?;
            let rows =
                stmt.query_map(params_from_iter(values), map_event_row).map_err(into_domain)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(into_domain)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, patch))]
    async fn update_event(&self, id: i64, patch: EventPatch) -> DomainResult<Option<Event>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Event>> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(into_domain)?;

            let Some(mut event) = find_event(&tx, id)? else {
                return Ok(None);
            };
            patch.apply(&mut event, Utc::now());
            update_row(&tx, &event)?;

            tx.commit().map_err(into_domain)?;
            Ok(Some(event))
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, id: i64) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(into_domain)?;

            tx.execute("DELETE FROM notification_log WHERE event_id = ?1", params![id])
                .map_err(into_domain)?;
            let deleted =
                tx.execute("DELETE FROM events WHERE id = ?1", params![id]).map_err(into_domain)?;

            tx.commit().map_err(into_domain)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn find_event(conn: &Connection, id: i64) -> DomainResult<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
    conn.query_row(&sql, params![id], map_event_row).optional().map_err(into_domain)
}

fn insert_event(conn: &Connection, event: &Event) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO events (
            title, description, date, time, location, email, phone,
            remind_same_day, remind_day_before, is_all_day, color, priority, category,
            notify_family, notify_father, notify_mother, child_tag, family_members,
            selected_children, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
        params![
            event.title,
            event.description,
            event.date,
            event.time,
            event.location,
            event.email,
            event.phone,
            event.remind_same_day,
            event.remind_day_before,
            event.is_all_day,
            event.color,
            event.priority,
            event.category,
            event.notify_family,
            event.notify_father,
            event.notify_mother,
            event.child_tag,
            event.family_members,
            event.selected_children,
            event.created_at,
            event.updated_at,
        ],
    )
    .map_err(into_domain)?;
    Ok(())
}

fn update_row(conn: &Connection, event: &Event) -> DomainResult<()> {
    let changed = conn
        .execute(
            "UPDATE events SET
                title = ?2, description = ?3, date = ?4, time = ?5, location = ?6,
                email = ?7, phone = ?8, remind_same_day = ?9, remind_day_before = ?10,
                is_all_day = ?11, color = ?12, priority = ?13, category = ?14,
                notify_family = ?15, notify_father = ?16, notify_mother = ?17,
                child_tag = ?18, family_members = ?19, selected_children = ?20,
                updated_at = ?21
             WHERE id = ?1",
            params![
                event.id,
                event.title,
                event.description,
                event.date,
                event.time,
                event.location,
                event.email,
                event.phone,
                event.remind_same_day,
                event.remind_day_before,
                event.is_all_day,
                event.color,
                event.priority,
                event.category,
                event.notify_family,
                event.notify_father,
                event.notify_mother,
                event.child_tag,
                event.family_members,
                event.selected_children,
                event.updated_at,
            ],
        )
        .map_err(into_domain)?;

    if changed == 0 {
        return Err(CalNotifyError::NotFound(format!("event {}", event.id)));
    }
    Ok(())
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        time: row.get("time")?,
        location: row.get("location")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        remind_same_day: row.get("remind_same_day")?,
        remind_day_before: row.get("remind_day_before")?,
        is_all_day: row.get("is_all_day")?,
        color: row.get("color")?,
        priority: row.get("priority")?,
        category: row.get("category")?,
        notify_family: row.get("notify_family")?,
        notify_father: row.get("notify_father")?,
        notify_mother: row.get("notify_mother")?,
        child_tag: row.get("child_tag")?,
        family_members: row.get("family_members")?,
        selected_children: row.get("selected_children")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn map_join_error(err: task::JoinError) -> CalNotifyError {
    CalNotifyError::Internal(format!("Task join error: {err}"))
}
