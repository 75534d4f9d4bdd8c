/*
 * Responsibility
 * - GET /health (liveness)
 * - Anonymous; the oracle middleware lets it through without a token
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
