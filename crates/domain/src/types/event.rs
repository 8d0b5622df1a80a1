//! Calendar events and date ranges

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENT_COLOR, DEFAULT_EVENT_PRIORITY};
use crate::errors::CalNotifyError;
use crate::types::family::Recipient;

/// A calendar event as stored and served.
///
/// `date` is the calendar day of the event in the deployment time zone.
/// `family_members` and `selected_children` hold serialized JSON lists and
/// are parsed only when a reminder is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// `HH:MM`; empty for all-day events.
    pub time: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub remind_same_day: bool,
    pub remind_day_before: bool,
    pub is_all_day: bool,
    pub color: String,
    pub priority: String,
    pub category: String,
    pub notify_family: bool,
    pub notify_father: bool,
    pub notify_mother: bool,
    pub child_tag: String,
    pub family_members: String,
    pub selected_children: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Minimal event with default presentation fields and no reminders.
    pub fn new(id: i64, title: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            date,
            time: String::new(),
            location: String::new(),
            email: String::new(),
            phone: String::new(),
            remind_same_day: false,
            remind_day_before: false,
            is_all_day: false,
            color: DEFAULT_EVENT_COLOR.to_string(),
            priority: DEFAULT_EVENT_PRIORITY.to_string(),
            category: String::new(),
            notify_family: false,
            notify_father: false,
            notify_mother: false,
            child_tag: String::new(),
            family_members: String::new(),
            selected_children: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The event's own contact as a recipient.
    pub fn primary_recipient(&self) -> Recipient {
        Recipient::primary(&self.email, &self.phone)
    }

    pub fn has_location(&self) -> bool {
        !self.location.trim().is_empty()
    }

    /// Case-insensitive substring match over title, description and location.
    pub fn matches_text(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        [&self.title, &self.description, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Fields accepted when creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub remind_same_day: bool,
    pub remind_day_before: bool,
    pub is_all_day: bool,
    pub color: String,
    pub priority: String,
    pub category: String,
    pub notify_family: bool,
    pub notify_father: bool,
    pub notify_mother: bool,
    pub child_tag: String,
    pub family_members: String,
    pub selected_children: String,
}

impl NewEvent {
    pub fn into_event(self, id: i64, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            email: self.email,
            phone: self.phone,
            remind_same_day: self.remind_same_day,
            remind_day_before: self.remind_day_before,
            is_all_day: self.is_all_day,
            color: self.color,
            priority: self.priority,
            category: self.category,
            notify_family: self.notify_family,
            notify_father: self.notify_father,
            notify_mother: self.notify_mother,
            child_tag: self.child_tag,
            family_members: self.family_members,
            selected_children: self.selected_children,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub remind_same_day: Option<bool>,
    pub remind_day_before: Option<bool>,
    pub is_all_day: Option<bool>,
    pub color: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub notify_family: Option<bool>,
    pub notify_father: Option<bool>,
    pub notify_mother: Option<bool>,
    pub child_tag: Option<String>,
    pub family_members: Option<String>,
    pub selected_children: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place and bump `updated_at`.
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        macro_rules! set {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = self.$field { event.$field = value; })+
            };
        }
        set!(
            title,
            description,
            date,
            time,
            location,
            email,
            phone,
            remind_same_day,
            remind_day_before,
            is_all_day,
            color,
            priority,
            category,
            notify_family,
            notify_father,
            notify_mother,
            child_tag,
            family_members,
            selected_children,
        );
        event.updated_at = now;
    }
}

/// Listing filter for the event collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub range: Option<DateRange>,
    pub category: Option<String>,
    /// Substring of title, description or location
    pub text: Option<String>,
}

/// Aggregate counts over the stored events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub today: usize,
    /// Events from today through the default upcoming window
    pub upcoming: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
}

/// Half-open range of calendar days, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns `InvalidInput` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalNotifyError> {
        if end < start {
            return Err(CalNotifyError::InvalidInput(format!(
                "date range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The range covering exactly one calendar day.
    pub fn single_day(date: NaiveDate) -> Self {
        let end = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        Self { start: date, end }
    }

    /// `days` consecutive calendar days starting at `start`.
    pub fn starting_at(start: NaiveDate, days: u32) -> Self {
        let end = start.checked_add_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
