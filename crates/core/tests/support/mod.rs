//! Shared test helpers for `calnotify-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that
//! reminder and event tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod channels;
pub mod repositories;

use calnotify_domain::Event;
use chrono::NaiveDate;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Event with a primary email and no reminder flags.
pub fn event_on(id: i64, date: NaiveDate) -> Event {
    let mut event = Event::new(id, format!("Event {id}"), date);
    event.time = "09:00".into();
    event.email = format!("owner{id}@example.com");
    event
}
