//! Error types for the core data layer.

use thiserror::Error;

use crate::model::{ElementId, VizKind};

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or validating datasets and stores.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two elements of one document share an id.
    #[error("Duplicate element id: {id}")]
    DuplicateId { id: ElementId },

    /// An element references a node that does not exist.
    #[error("Element {element} references unknown node {node}")]
    UnknownNode { element: ElementId, node: ElementId },

    /// A hyperedge ended up with no members.
    #[error("Hyperedge {id} has no members")]
    EmptyHyperedge { id: ElementId },

    /// A hyperedge lists the same node twice.
    #[error("Hyperedge {id} lists node {node} more than once")]
    DuplicateMember { id: ElementId, node: ElementId },

    /// The `type` field of a meta payload is missing or unknown.
    #[error("Invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    /// A document declared one visualization kind but carries another's fields.
    #[error("Document of type {expected} is missing its {field} field")]
    KindMismatch { expected: VizKind, field: &'static str },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid-metadata error.
    pub fn invalid_metadata(reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            reason: reason.into(),
        }
    }
}

/// Result type for data-service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a search or chat handler.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

/// Errors surfaced by the data service to its callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Search or chat was called with a blank query.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// No handler is registered for the requested capability.
    #[error("No {capability} handler registered")]
    CallbackNotRegistered { capability: &'static str },

    /// The registered handler failed.
    #[error("{capability} failed: {source}")]
    CallbackFailed {
        capability: &'static str,
        #[source]
        source: HandlerError,
    },

    /// The requested element does not exist.
    #[error("Element not found: {id}")]
    NotFound { id: String },

    /// The requested entity listing does not exist for this visualization.
    #[error("Entity `{entity}` is not available for {kind} visualizations")]
    UnsupportedEntity { entity: String, kind: VizKind },
}

impl ServiceError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::EmptyQuery => "empty_query",
            ServiceError::CallbackNotRegistered { .. } => "callback_not_registered",
            ServiceError::CallbackFailed { .. } => "callback_failed",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::UnsupportedEntity { .. } => "unsupported_entity",
        }
    }
}
