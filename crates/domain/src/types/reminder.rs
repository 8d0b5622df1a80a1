//! Reminder kinds

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Which reminder is being sent for an event.
///
/// The kind selects the message template and the event flag that gates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent on the day of the event (`remind_same_day`).
    SameDay,
    /// Sent the day before the event (`remind_day_before`).
    DayBefore,
}

impl_wire_enum_conversions!(ReminderKind {
    SameDay => "same_day",
    DayBefore => "day_before",
});

impl ReminderKind {
    /// Both kinds, in the order reminders are emitted by a scan.
    pub const ALL: [Self; 2] = [Self::DayBefore, Self::SameDay];

    /// Number of days between the reminder and the event.
    pub const fn lead_days(self) -> i64 {
        match self {
            Self::SameDay => 0,
            Self::DayBefore => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_and_display_agree() {
        let json = serde_json::to_string(&ReminderKind::DayBefore).unwrap();
        assert_eq!(json, "\"day_before\"");
        assert_eq!(ReminderKind::DayBefore.to_string(), "day_before");
        assert_eq!("same_day".parse::<ReminderKind>().unwrap(), ReminderKind::SameDay);
    }

    #[test]
    fn lead_days_match_kind() {
        assert_eq!(ReminderKind::SameDay.lead_days(), 0);
        assert_eq!(ReminderKind::DayBefore.lead_days(), 1);
    }
}
