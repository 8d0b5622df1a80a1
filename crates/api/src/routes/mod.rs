//! HTTP routes

pub mod events;
pub mod health;
pub mod mobile;
pub mod notifications;

use std::sync::Arc;

use axum::Router;

use crate::context::AppContext;

/// Shared handler state
pub type AppState = Arc<AppContext>;

/// All application routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(events::router())
        .merge(mobile::router())
        .merge(notifications::router())
}
