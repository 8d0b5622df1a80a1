//! Request payloads and their validation
//!
//! Handlers deserialize into these types and convert them into domain values;
//! every validation failure becomes a 400 with a message naming the field.

use calnotify_domain::constants::{
    DATE_FORMAT, DEFAULT_EVENT_COLOR, DEFAULT_EVENT_PRIORITY, DEFAULT_UPCOMING_DAYS, TIME_FORMAT,
};
use calnotify_domain::{DateRange, EventFilter, EventPatch, NewEvent, ReminderKind};
use chrono::{Days, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Body of `POST /api/v1/events`
///
/// The `reminder_day`, `notify_papa` and `notify_mama` spellings used by
/// older clients are accepted as aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "reminder_day")]
    pub remind_same_day: bool,
    #[serde(alias = "reminder_day_before")]
    pub remind_day_before: bool,
    pub is_all_day: bool,
    pub color: Option<String>,
    pub priority: Option<String>,
    pub category: String,
    pub notify_family: bool,
    #[serde(alias = "notify_papa")]
    pub notify_father: bool,
    #[serde(alias = "notify_mama")]
    pub notify_mother: bool,
    pub child_tag: String,
    pub family_members: Value,
    pub selected_children: Value,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> ApiResult<NewEvent> {
        let title = required_title(&self.title)?;
        let date = parse_date("date", &self.date)?;
        let time = parse_time(&self.time, self.is_all_day)?;
        let email = required_email(&self.email)?;

        Ok(NewEvent {
            title,
            description: self.description,
            date,
            time,
            location: self.location,
            email,
            phone: self.phone.trim().to_string(),
            remind_same_day: self.remind_same_day,
            remind_day_before: self.remind_day_before,
            is_all_day: self.is_all_day,
            color: non_blank(self.color).unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            priority: non_blank(self.priority).unwrap_or_else(|| DEFAULT_EVENT_PRIORITY.to_string()),
            category: self.category,
            notify_family: self.notify_family,
            notify_father: self.notify_father,
            notify_mother: self.notify_mother,
            child_tag: self.child_tag,
            family_members: embedded_json(self.family_members),
            selected_children: embedded_json(self.selected_children),
        })
    }
}

/// Body of `PUT /api/v1/events/{id}`; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "reminder_day")]
    pub remind_same_day: Option<bool>,
    #[serde(alias = "reminder_day_before")]
    pub remind_day_before: Option<bool>,
    pub is_all_day: Option<bool>,
    pub color: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub notify_family: Option<bool>,
    #[serde(alias = "notify_papa")]
    pub notify_father: Option<bool>,
    #[serde(alias = "notify_mama")]
    pub notify_mother: Option<bool>,
    pub child_tag: Option<String>,
    pub family_members: Option<Value>,
    pub selected_children: Option<Value>,
}

impl UpdateEventRequest {
    pub fn into_patch(self) -> ApiResult<EventPatch> {
        let title = self.title.as_deref().map(required_title).transpose()?;
        let date = self.date.as_deref().map(|raw| parse_date("date", raw)).transpose()?;
        // an empty time is checked against the stored all-day flag by the service
        let time = self.time.as_deref().map(|raw| parse_time(raw, true)).transpose()?;
        let email = self.email.as_deref().map(required_email).transpose()?;

        Ok(EventPatch {
            title,
            description: self.description,
            date,
            time,
            location: self.location,
            email,
            phone: self.phone.map(|p| p.trim().to_string()),
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
            family_members: self.family_members.map(embedded_json),
            selected_children: self.selected_children.map(embedded_json),
        })
    }
}

/// Query of `GET /api/v1/events`; `from` and `to` are inclusive days.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
}

impl ListEventsQuery {
    pub fn into_filter(self) -> ApiResult<EventFilter> {
        let range = inclusive_range(self.from.as_deref(), self.to.as_deref())?;
        Ok(EventFilter { range, category: non_blank(self.category), text: None })
    }
}

/// Query of `GET /api/mobile/events/range`; both bounds required, inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    pub fn into_range(self) -> ApiResult<DateRange> {
        let (Some(from), Some(to)) = (self.from.as_deref(), self.to.as_deref()) else {
            return Err(ApiError::bad_request("from and to are required"));
        };
        inclusive_range(Some(from), Some(to))?
            .ok_or_else(|| ApiError::bad_request("from and to are required"))
    }
}

/// Query of `GET /api/mobile/events/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl SearchQuery {
    pub fn into_parts(self) -> ApiResult<(String, Option<DateRange>)> {
        let term = non_blank(self.q).ok_or_else(|| ApiError::bad_request("q is required"))?;
        let range = inclusive_range(self.from.as_deref(), self.to.as_deref())?;
        Ok((term, range))
    }
}

/// Query of `GET /api/mobile/events/upcoming`
#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<u32>,
}

impl UpcomingQuery {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_UPCOMING_DAYS)
    }
}

/// Body of `POST /api/v1/notifications/test`
#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub kind: Option<ReminderKind>,
}

impl TestNotificationRequest {
    pub fn validate(&self) -> ApiResult<()> {
        required_email(&self.email).map(|_| ())
    }

    pub fn kind(&self) -> ReminderKind {
        self.kind.unwrap_or(ReminderKind::DayBefore)
    }
}

/// Inclusive `from`/`to` days as a half-open range; either bound may be open.
fn inclusive_range(from: Option<&str>, to: Option<&str>) -> ApiResult<Option<DateRange>> {
    let from = from.map(|raw| parse_date("from", raw)).transpose()?;
    let to = to.map(|raw| parse_date("to", raw)).transpose()?;

    match (from, to) {
        (None, None) => Ok(None),
        (start, end) => {
            let start = start.unwrap_or(NaiveDate::MIN);
            let end = end
                .map(|day| day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX))
                .unwrap_or(NaiveDate::MAX);
            Ok(Some(DateRange::new(start, end)?))
        }
    }
}

fn required_title(raw: &str) -> ApiResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    Ok(title.to_string())
}

fn required_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if !email.contains('@') {
        return Err(ApiError::bad_request(format!("email is not a valid address: {email}")));
    }
    Ok(email.to_string())
}

fn parse_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::bad_request(format!("{field} must be YYYY-MM-DD, got '{raw}'")))
}

/// All-day events may omit the time; anything provided must still be `HH:MM`.
fn parse_time(raw: &str, all_day: bool) -> ApiResult<String> {
    let time = raw.trim();
    if time.is_empty() {
        return if all_day {
            Ok(String::new())
        } else {
            Err(ApiError::bad_request("time is required unless the event is all day"))
        };
    }
    NaiveTime::parse_from_str(time, TIME_FORMAT)
        .map(|parsed| parsed.format(TIME_FORMAT).to_string())
        .map_err(|_| ApiError::bad_request(format!("time must be HH:MM, got '{raw}'")))
}

/// Family lists are stored as JSON text. Clients may send the text itself or
/// the structured value.
fn embedded_json(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
