//! HTTP API and dashboard.
//!
//! Thin glue: handlers translate requests into [`JobStore`](crate::store::JobStore)
//! and [`ContentWorker`] calls and wrap results in [`response::ApiResponse`].

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::worker::ContentWorker;

pub mod jobs;
pub mod response;
pub mod system;

/// Shared state handed to every handler.
pub struct AppState {
    pub worker: Arc<ContentWorker>,
}

impl AppState {
    pub fn new(worker: Arc<ContentWorker>) -> Self {
        Self { worker }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(system::dashboard))
        .route("/health", get(system::health))
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/job/:id", get(jobs::get_job).delete(jobs::delete_job))
        .route("/api/process", post(system::process_jobs))
        .route("/api/model-status", get(system::model_status))
        .route("/api/worker-status", get(system::worker_status))
        .layer(Extension(state))
        .layer(middleware::from_fn(cors))
}

/// Permissive CORS for the dashboard and local tooling.
async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}
