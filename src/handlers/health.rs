// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::error::AppError;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
