//! Search and chat endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use ontosight_core::{ChatResponse, Dataset, QueryRequest};

use crate::types::{ApiError, ApiState};

/// Handler for POST /api/search
pub async fn search_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Dataset>, ApiError> {
    let service = state.service.read().await;
    Ok(Json(service.search(&request.query)?))
}

/// Handler for POST /api/chat
pub async fn chat_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let service = state.service.read().await;
    Ok(Json(service.chat(&request.query)?))
}
