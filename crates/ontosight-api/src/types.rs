//! API types and DTOs.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ontosight_core::{DataService, ElementId, ServiceError, VizKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{error, warn};

/// Shared application state for the API.
pub struct ApiState {
    /// The data service answering every request.
    pub service: Arc<RwLock<DataService>>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Visualization kind being served.
    pub kind: VizKind,
    /// Storage statistics.
    pub stats: Map<String, Value>,
}

/// Query parameters for the data endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    /// Center ids (comma-separated).
    #[serde(default)]
    pub ids: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl DataQuery {
    /// Parsed, non-empty center ids.
    pub fn ids(&self) -> Vec<ElementId> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ElementId::from)
            .collect()
    }
}

/// Query parameters for paginated listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

/// A [`ServiceError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::EmptyQuery | ServiceError::UnsupportedEntity { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::CallbackNotRegistered { .. } | ServiceError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ServiceError::CallbackFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.0.code(), error = %self.0, "Request failed");
        } else {
            warn!(code = self.0.code(), error = %self.0, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                code: self.0.code().to_string(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_split_and_trimmed() {
        let query = DataQuery {
            ids: Some(" a, b,,c ".into()),
            ..Default::default()
        };
        let ids: Vec<String> = query.ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(DataQuery::default().ids().is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(ServiceError::EmptyQuery).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(ServiceError::NotFound { id: "x".into() }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(ServiceError::CallbackNotRegistered { capability: "search" }).status(),
            StatusCode::NOT_FOUND
        );
    }
}
