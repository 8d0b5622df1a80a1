//! Event CRUD endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use calnotify_domain::Event;

use crate::dto::{CreateEventRequest, ListEventsQuery, UpdateEventRequest};
use crate::error::ApiResult;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/events", get(list_events).post(create_event))
        .route("/api/v1/events/{id}", get(get_event).put(update_event).delete(delete_event))
}

/// POST /api/v1/events
async fn create_event(
    State(ctx): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = ctx.events.create(req.into_new_event()?).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/v1/events?from=&to=&category=
async fn list_events(
    State(ctx): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let filter = query.into_filter()?;
    Ok(Json(ctx.events.list(&filter).await?))
}

/// GET /api/v1/events/{id}
async fn get_event(State(ctx): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Event>> {
    Ok(Json(ctx.events.get(id).await?))
}

/// PUT /api/v1/events/{id}
async fn update_event(
    State(ctx): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    let patch = req.into_patch()?;
    Ok(Json(ctx.events.update(id, patch).await?))
}

/// DELETE /api/v1/events/{id}
async fn delete_event(State(ctx): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    ctx.events.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
