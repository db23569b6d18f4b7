//! Paginated entity listings.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use ontosight_core::{ElementKind, ListEntry, Paginated};

use crate::types::{ApiError, ApiState, PageQuery};

type PageResult = Result<Json<Paginated<ListEntry>>, ApiError>;

async fn paginate(state: &ApiState, entity: ElementKind, query: PageQuery) -> PageResult {
    let service = state.service.read().await;
    let page = service.paginated(entity.plural(), query.page.unwrap_or(0), query.page_size)?;
    Ok(Json(page))
}

/// Handler for GET /api/nodes_paginated
pub async fn nodes_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    paginate(&state, ElementKind::Node, query).await
}

/// Handler for GET /api/edges_paginated
pub async fn edges_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    paginate(&state, ElementKind::Edge, query).await
}

/// Handler for GET /api/hyperedges_paginated
pub async fn hyperedges_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    paginate(&state, ElementKind::Hyperedge, query).await
}

/// Handler for GET /api/items_paginated
pub async fn items_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    paginate(&state, ElementKind::Item, query).await
}
