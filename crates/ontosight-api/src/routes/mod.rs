//! API route handlers.

mod data;
mod health;
mod paginated;
mod query;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::types::ApiState;

/// Create the API router with all endpoints. Mount it under `/api`.
pub fn create_api_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health::health_handler))
        // Dataset endpoints
        .route("/meta", get(data::meta_handler))
        .route("/data", get(data::data_handler))
        .route("/details/{id}", get(data::details_handler))
        // Query endpoints
        .route("/search", post(query::search_handler))
        .route("/chat", post(query::chat_handler))
        // Entity listings
        .route("/nodes_paginated", get(paginated::nodes_handler))
        .route("/edges_paginated", get(paginated::edges_handler))
        .route("/hyperedges_paginated", get(paginated::hyperedges_handler))
        .route("/items_paginated", get(paginated::items_handler))
        // Request tracing (enable with RUST_LOG=tower_http=info or higher)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
