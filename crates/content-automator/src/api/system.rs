use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{Html, Response};
use serde::Serialize;
use serde_json::json;

use super::response::{job_error_response, json_ok};
use super::AppState;
use crate::store::StatusCounts;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub counts: StatusCounts,
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Starts a sweep over every pending job and returns immediately.
pub async fn process_jobs(Extension(state): Extension<Arc<AppState>>) -> Response {
    let worker = Arc::clone(&state.worker);
    tokio::task::spawn_blocking(move || match worker.process_all_pending() {
        Ok(summary) => tracing::info!(
            snapshot = summary.snapshot,
            completed = summary.completed,
            failed = summary.failed,
            skipped = summary.skipped,
            "Forced sweep finished"
        ),
        Err(e) => tracing::error!("Forced sweep failed: {}", e),
    });

    json_ok(json!({ "message": "Processing triggered for all pending jobs" }))
}

pub async fn model_status(Extension(state): Extension<Arc<AppState>>) -> Response {
    json_ok(state.worker.model_status())
}

pub async fn worker_status(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.worker.store().count_by_status() {
        Ok(counts) => json_ok(WorkerStatus {
            running: state.worker.is_running(),
            counts,
        }),
        Err(e) => job_error_response(e, "get worker status"),
    }
}
