//! Health check endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::types::{ApiState, HealthResponse};

/// Handler for GET /api/health
pub async fn health_handler(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let service = state.service.read().await;
    let meta = service.meta();
    Json(HealthResponse {
        status: "ok".to_string(),
        kind: meta.kind,
        stats: meta.stats,
    })
}
