//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use calnotify_domain::CalNotifyError;
use calnotify_infra::SchedulerError;
use serde::Serialize;
use tracing::error;

use crate::utils::logging::error_label;

/// Standard API error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Domain error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub CalNotifyError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(CalNotifyError::InvalidInput(message.into()))
    }

    pub const fn status(&self) -> StatusCode {
        match self.0 {
            CalNotifyError::NotFound(_) => StatusCode::NOT_FOUND,
            CalNotifyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, error_kind = error_label(&self.0), "request failed");
        }
        let body = Json(ErrorResponse { error: self.0.to_string() });
        (status, body).into_response()
    }
}

impl From<CalNotifyError> for ApiError {
    fn from(err: CalNotifyError) -> Self {
        Self(err)
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        Self(err.into())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
