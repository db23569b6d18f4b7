//! Metadata, dataset and detail endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use ontosight_core::{Dataset, Element, Meta};
use tracing::debug;

use crate::types::{ApiError, ApiState, DataQuery};

/// Handler for GET /api/meta
pub async fn meta_handler(State(state): State<Arc<ApiState>>) -> Json<Meta> {
    let service = state.service.read().await;
    Json(service.meta())
}

/// Handler for GET /api/data - sample around `ids`, or the default view.
pub async fn data_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DataQuery>,
) -> Json<Dataset> {
    let ids = query.ids();
    let service = state.service.read().await;
    let dataset = service.data(&ids, query.page, query.page_size);
    debug!(centers = ids.len(), empty = dataset.is_empty(), "Data request");
    Json(dataset)
}

/// Handler for GET /api/details/{id}
pub async fn details_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Element>, ApiError> {
    let service = state.service.read().await;
    Ok(Json(service.details(&id)?))
}
