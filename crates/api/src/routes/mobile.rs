//! Read-only views for the mobile client
//!
//! Days are computed in the configured time zone.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use calnotify_domain::{Event, EventStats};

use crate::dto::{RangeQuery, SearchQuery, UpcomingQuery};
use crate::error::ApiResult;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/mobile/events/today", get(today_events))
        .route("/api/mobile/events/upcoming", get(upcoming_events))
        .route("/api/mobile/events/range", get(range_events))
        .route("/api/mobile/events/search", get(search_events))
        .route("/api/mobile/stats", get(event_stats))
}

/// GET /api/mobile/events/today
async fn today_events(State(ctx): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(ctx.events.today().await?))
}

/// GET /api/mobile/events/upcoming?days=N
async fn upcoming_events(
    State(ctx): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(ctx.events.upcoming(query.days()).await?))
}

/// GET /api/mobile/events/range?from=&to=
async fn range_events(
    State(ctx): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let range = query.into_range()?;
    Ok(Json(ctx.events.in_range(range).await?))
}

/// GET /api/mobile/events/search?q=&from=&to=
async fn search_events(
    State(ctx): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let (term, range) = query.into_parts()?;
    Ok(Json(ctx.events.search(&term, range).await?))
}

/// GET /api/mobile/stats
async fn event_stats(State(ctx): State<AppState>) -> ApiResult<Json<EventStats>> {
    Ok(Json(ctx.events.stats().await?))
}
