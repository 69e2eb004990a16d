use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::JobError;

/// Envelope returned by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub fn json_ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::err(message))).into_response()
}

/// Maps store errors by kind: validation 400, missing 404, storage 500.
pub fn job_error_response(err: JobError, action: &str) -> Response {
    match err {
        JobError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        JobError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "Job not found"),
        JobError::Storage(e) => {
            tracing::error!("Failed to {}: {}", action, e);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

pub fn parse_job_id(raw: &str) -> Result<i64, Response> {
    raw.parse::<i64>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "Invalid job ID"))
}
