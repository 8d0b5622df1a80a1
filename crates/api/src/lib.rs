//! # CalNotify API
//!
//! HTTP application layer and main entry point.
//!
//! This crate contains:
//! - axum routes for events and the reminder trigger surface
//! - Application context (dependency injection)
//! - Request validation and error responses
//! - Tracing setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod dto;
pub mod error;
pub mod routes;
pub mod utils;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use context::{AppContext, ChannelAvailability};
pub use error::{ApiError, ApiResult};

/// Full application router with CORS and request tracing.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    routes::router().with_state(ctx).layer(cors).layer(TraceLayer::new_for_http())
}
