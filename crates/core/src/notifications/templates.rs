//! Reminder message templates
//!
//! Two fixed templates, one per reminder kind. Family recipients get the same
//! templates with a greeting by name and, when children were selected, a line
//! naming who the event is for.

use calnotify_domain::constants::DISPLAY_DATE_FORMAT;
use calnotify_domain::{Event, ReminderKind};

/// Rendered content for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub subject: String,
    pub email_body: String,
    pub text_body: String,
}

/// Personal touches for a family recipient.
#[derive(Debug, Clone, Copy)]
pub struct Personalisation<'a> {
    pub name: Option<&'a str>,
    pub children: &'a [String],
}

/// Render the reminder for `event`.
///
/// `personal` is `None` for the event's primary contact.
pub fn compose(
    event: &Event,
    kind: ReminderKind,
    personal: Option<Personalisation<'_>>,
) -> ReminderMessage {
    let when = match kind {
        ReminderKind::DayBefore => "tomorrow",
        ReminderKind::SameDay => "today",
    };
    let sign_off = match kind {
        ReminderKind::DayBefore => "Don't miss it!",
        ReminderKind::SameDay => "Have a great day!",
    };
    let time = display_time(event);
    let date = event.date.format(DISPLAY_DATE_FORMAT).to_string();
    let children = personal.map(|p| children_line(p.children)).unwrap_or_default();

    let subject = match personal {
        Some(_) => format!("Family reminder: {} {when}", event.title),
        None => format!("Reminder: {} {when}", event.title),
    };

    let greeting = match personal.and_then(|p| p.name) {
        Some(name) => format!("Hi {name}!"),
        None => "Hi!".to_string(),
    };

    let mut details = vec![format!("Event: {}", event.title)];
    if kind == ReminderKind::DayBefore {
        details.push(format!("Date: {date}"));
    }
    details.push(format!("Time: {time}"));
    if event.has_location() {
        details.push(format!("Location: {}", event.location.trim()));
    }

    let email_body = format!(
        "{greeting}\n\nThis is a reminder that {when} you have:\n\n{}{children}\n\n{sign_off}",
        details.join("\n")
    );

    let text_body = match personal {
        None => {
            let mut text = match kind {
                ReminderKind::DayBefore => {
                    format!("Reminder: Tomorrow you have '{}' at {time}", event.title)
                }
                ReminderKind::SameDay => {
                    format!("Reminder: Today you have '{}' at {time}", event.title)
                }
            };
            if event.has_location() {
                text.push_str(&format!(" in {}", event.location.trim()));
            }
            text
        }
        Some(_) => {
            let on_date = match kind {
                ReminderKind::DayBefore => format!(" on {date}"),
                ReminderKind::SameDay => String::new(),
            };
            format!(
                "{greeting} Reminder: {when} you have {}{on_date} at {time}. {sign_off}{children}",
                event.title
            )
        }
    };

    ReminderMessage { subject, email_body, text_body }
}

fn display_time(event: &Event) -> String {
    let time = event.time.trim();
    if event.is_all_day || time.is_empty() {
        "all day".to_string()
    } else {
        time.to_string()
    }
}

fn children_line(children: &[String]) -> String {
    if children.is_empty() {
        String::new()
    } else {
        format!("\n\nThis event is for: {}", children.join(", "))
    }
}
