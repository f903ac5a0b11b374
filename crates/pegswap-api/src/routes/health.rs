//! Liveness endpoint

use axum::Json;

use crate::dto::HealthResponse;

/// GET /health - Process is up; says nothing about the node
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
