//! Core domain types shared across the OntoSight workspace.
//!
//! - [`model`]: datasets of nodes, edges, hyperedges and list items
//! - [`visual`]: the single rule mapping selection/highlight to a display state
//! - [`geometry`]: curvature offsets for parallel edges
//! - [`region`]: colored membership regions for hyperedges
//! - [`storage`] and [`service`]: the in-memory backend serving samples,
//!   details, search, chat and paginated listings

pub mod document;
pub mod error;
pub mod geometry;
pub mod model;
pub mod query;
pub mod region;
pub mod service;
pub mod storage;
pub mod visual;

pub use document::Document;
pub use error::{CoreError, CoreResult, HandlerError, ServiceError, ServiceResult};
pub use geometry::{compute_edge_geometry, CurveType, EdgeGeometry, CURVE_STEP};
pub use model::{
    Attributes, ChatResponse, Dataset, Edge, Element, ElementId, ElementKind, Features, GraphData,
    Hyperedge, HypergraphData, Item, ListData, ListEntry, Meta, Node, Paginated, QueryRequest,
    SelectedItem, VizKind,
};
pub use query::{ChatAnswer, ChatHandler, LabelSearch, QueryHandlers, SearchHandler, SummaryChat};
pub use region::{build_region, build_regions, hit_test, Region, RegionColor, Rgb};
pub use service::DataService;
pub use storage::{GraphStore, HypergraphStore, ListStore, Storage};
pub use visual::VisualState;
