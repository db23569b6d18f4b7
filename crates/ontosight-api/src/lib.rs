//! REST API service for OntoSight.
//!
//! Serves one [`DataService`] to any frontend. Dataset payloads are returned
//! as-is; failures are `{code, message}` JSON.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check with kind and stats
//! - `GET /api/meta` - `{type, schemas, stats, features}`
//! - `GET /api/data?ids=a,b&page=&page_size=` - Sample around `ids`, or the default view
//! - `GET /api/details/{id}` - One element
//! - `POST /api/search` - `{query}` → dataset with matches highlighted
//! - `POST /api/chat` - `{query}` → `{response, data?}`
//! - `GET /api/{nodes,edges,hyperedges,items}_paginated?page=&page_size=` - Entity listings
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ontosight_api::{create_api_router, create_api_state};
//! use ontosight_core::{DataService, ListStore};
//!
//! let service = DataService::new(Box::new(ListStore::default()));
//! let state = create_api_state(service);
//! let router = axum::Router::new().nest("/api", create_api_router(state));
//! ```

mod routes;
mod types;

pub use routes::create_api_router;
pub use types::{ApiError, ApiState, DataQuery, ErrorResponse, HealthResponse, PageQuery};

use std::sync::Arc;

use ontosight_core::DataService;
use tokio::sync::RwLock;

/// Create a new API state around the given service.
pub fn create_api_state(service: DataService) -> Arc<ApiState> {
    Arc::new(ApiState {
        service: Arc::new(RwLock::new(service)),
    })
}
