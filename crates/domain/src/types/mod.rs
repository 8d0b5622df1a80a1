//! Domain types and models

pub mod event;
pub mod family;
pub mod reminder;

pub use event::{DateRange, Event, EventFilter, EventPatch, EventStats, NewEvent};
pub use family::{
    parse_family_members, parse_selected_children, FamilyMember, FamilyRole, Recipient,
    RecipientRole,
};
pub use reminder::ReminderKind;
