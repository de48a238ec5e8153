//! HTTP routes and handlers

use crate::config::API_TITLE;
use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hateshield_core::{AnalyzeRequest, AnalyzeResponse, BulkAnalyzeRequest, BulkAnalyzeResponse};
use serde_json::json;
use tracing::{debug, info};

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": format!("{} is running", API_TITLE) }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": state.adapter.is_ready(),
        "model": state.adapter.model_name(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state.metrics.as_ref().ok_or_else(|| {
        AppError::with_status(StatusCode::SERVICE_UNAVAILABLE, "Metrics exporter not installed")
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// Analyze a single text
pub async fn analyze(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    metrics::counter!("hateshield_requests_total", "endpoint" => "analyze").increment(1);
    debug!(chars = req.text.chars().count(), language = %req.language, "Analyze request");

    let result = state
        .adapter
        .classify_one(&req.text, &req.language)
        .await
        .map_err(|e| state.fail("Error during prediction", e))?;

    Ok(Json(AnalyzeResponse { result }))
}

/// Analyze texts one by one; any failure aborts the whole batch
pub async fn analyze_bulk(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BulkAnalyzeRequest>,
) -> Result<Json<BulkAnalyzeResponse>, AppError> {
    metrics::counter!("hateshield_requests_total", "endpoint" => "analyze_bulk").increment(1);
    info!(count = req.texts.len(), language = %req.language, "Bulk analyze request");

    let results = state
        .adapter
        .classify_many(&req.texts, &req.language)
        .await
        .map_err(|e| state.fail("Error during bulk prediction", e))?;

    Ok(Json(BulkAnalyzeResponse { results }))
}

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}
