//! Reminder trigger surface

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use calnotify_core::{Clock, CycleSummary};
use calnotify_domain::ReminderKind;
use calnotify_infra::SchedulerStatus;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::context::ChannelAvailability;
use crate::dto::TestNotificationRequest;
use crate::error::ApiResult;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/notifications/check", post(check_now))
        .route("/api/v1/notifications/check/async", post(check_async))
        .route("/api/v1/notifications/status", get(status))
        .route("/api/v1/notifications/test", post(send_test))
        .route("/api/v1/notifications/ping", get(ping))
}

#[derive(Serialize)]
struct CheckResponse {
    status: &'static str,
    summary: CycleSummary,
}

/// POST /api/v1/notifications/check - run one cycle and wait for it
async fn check_now(State(ctx): State<AppState>) -> ApiResult<Json<CheckResponse>> {
    let summary = ctx.scheduler.check_now().await?;
    Ok(Json(CheckResponse { status: "completed", summary }))
}

/// POST /api/v1/notifications/check/async - start one cycle in the background
async fn check_async(State(ctx): State<AppState>) -> (StatusCode, Json<Value>) {
    drop(ctx.scheduler.trigger());
    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
}

#[derive(Serialize)]
struct StatusResponse {
    scheduler: SchedulerStatus,
    channels: ChannelAvailability,
    timezone: String,
    today: chrono::NaiveDate,
    dedupe: bool,
}

/// GET /api/v1/notifications/status
async fn status(State(ctx): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        scheduler: ctx.scheduler.status(),
        channels: ctx.channels,
        timezone: ctx.config.scheduler.timezone.clone(),
        today: ctx.clock.today(),
        dedupe: ctx.config.scheduler.dedupe,
    })
}

#[derive(Serialize)]
struct TestResponse {
    status: &'static str,
    kind: ReminderKind,
    sent: usize,
    failed: usize,
    skipped: usize,
}

/// POST /api/v1/notifications/test - dispatch a synthetic reminder
async fn send_test(
    State(ctx): State<AppState>,
    Json(req): Json<TestNotificationRequest>,
) -> ApiResult<Json<TestResponse>> {
    req.validate()?;
    let kind = req.kind();
    let report = ctx.engine.send_test_notification(req.email.trim(), req.phone.as_deref(), kind).await;

    let response = TestResponse {
        status: if report.any_sent() { "sent" } else { "not_sent" },
        kind,
        sent: report.sent_count(),
        failed: report.failed_count(),
        skipped: report.skipped_count(),
    };
    info!(sent = response.sent, failed = response.failed, skipped = response.skipped, "Test notification dispatched");
    Ok(Json(response))
}

/// GET /api/v1/notifications/ping
async fn ping() -> Json<Value> {
    Json(json!({ "message": "Notification service is working", "status": "ok" }))
}
