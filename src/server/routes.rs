//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::AppState;
use crate::crawl_engine::ScrapeError;
use crate::extraction::ExtractionRecord;
use crate::jobs::TaskPoll;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,
}

/// Structured error body: `{"error": kind, "detail": reason}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: String,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", detail)
    }
}

/// Status code for a run failure kind
#[must_use]
pub fn status_for_kind(kind: &str) -> StatusCode {
    match kind {
        "timeout" => StatusCode::GATEWAY_TIMEOUT,
        "no_content" | "invalid_url" => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        Self::new(status_for_kind(err.kind()), err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.kind, "detail": self.detail })),
        )
            .into_response()
    }
}

fn require_url(payload: Result<Json<ScrapeRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Missing 'url' in request body"));
    }
    Ok(url.to_string())
}

pub async fn status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /scrape`: run to completion and return the record
pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ExtractionRecord>, ApiError> {
    let url = require_url(payload)?;
    info!(site = %url, "Synchronous scrape requested");
    match state.scraper.scrape(&url).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            warn!(site = %url, kind = e.kind(), error = %e, "Scrape failed");
            Err(e.into())
        }
    }
}

/// `POST /scrape/async`: start a deferred scrape
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let url = require_url(payload)?;
    let task_id = state.tasks.submit(url);
    Ok((StatusCode::ACCEPTED, Json(json!({ "task_id": task_id }))))
}

/// `GET /scrape/:task_id`: poll a deferred scrape
pub async fn poll(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.tasks.poll_str(&task_id) {
        TaskPoll::Pending { .. } => Ok(Json(json!({ "status": "pending" }))),
        TaskPoll::Completed(record) => Ok(Json(json!({ "status": "done", "result": record }))),
        TaskPoll::Failed { kind, reason } => Ok(Json(json!({
            "status": "error",
            "error": kind,
            "detail": reason,
        }))),
        TaskPoll::NotFound => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Unknown task id {task_id}"),
        )),
    }
}
