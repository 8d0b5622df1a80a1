//! Calendar events: storage ports and the management service

pub mod ports;
pub mod service;

pub use ports::{EventRepository, EventStore};
pub use service::EventService;
