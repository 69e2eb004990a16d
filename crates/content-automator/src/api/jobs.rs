use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::response::{job_error_response, json_error, json_ok, parse_job_id};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

pub async fn list_jobs(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.worker.store().list() {
        Ok(jobs) => {
            tracing::debug!("Returning {} jobs", jobs.len());
            json_ok(jobs)
        }
        Err(e) => job_error_response(e, "get jobs"),
    }
}

pub async fn create_job(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid JSON"),
    };

    match state.worker.store().create(&req.topic, &req.kind) {
        Ok(job) => {
            state.worker.notify();
            json_ok(job)
        }
        Err(e) => job_error_response(e, "create job"),
    }
}

pub async fn get_job(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.worker.store().get(id) {
        Ok(job) => json_ok(job),
        Err(e) => job_error_response(e, "get job"),
    }
}

pub async fn delete_job(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.worker.store().delete(id) {
        Ok(()) => json_ok(json!({ "message": "Job deleted successfully" })),
        Err(e) => job_error_response(e, "delete job"),
    }
}
