//! In-memory storage engines serving samples, details and pages.
//!
//! One engine per visualization kind. Engines are immutable after
//! construction and keep their elements in insertion order so that
//! pagination and sampling are deterministic.

mod graph;
mod hypergraph;
mod list;

pub use graph::GraphStore;
pub use hypergraph::HypergraphStore;
pub use list::ListStore;

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::model::{Dataset, Element, ElementId, ElementKind, ListEntry, Paginated, VizKind};

/// Common interface of the storage engines.
pub trait Storage: Send + Sync {
    fn kind(&self) -> VizKind;

    /// Look up a single element.
    fn element(&self, id: &str) -> Option<Element>;

    /// Full record shown by the details view.
    fn details(&self, id: &str) -> Option<Element> {
        self.element(id)
    }

    fn stats(&self) -> Map<String, Value>;

    /// Sub-dataset around `center_ids`, expanded `hops` times.
    ///
    /// An empty `center_ids` picks a default center. With `highlight_center`,
    /// the centers come back flagged as highlighted.
    fn sample(&self, center_ids: &[ElementId], hops: usize, highlight_center: bool) -> Dataset;

    /// A page of one entity kind, or `None` if this engine has no such entity.
    fn paginate(
        &self,
        entity: ElementKind,
        page: usize,
        page_size: usize,
    ) -> Option<Paginated<ListEntry>>;

    /// Every element in insertion order.
    fn elements(&self) -> Vec<Element>;

    fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }
}

/// Reject documents where two elements share an id.
pub(crate) fn ensure_unique<'a, I>(ids: I) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a ElementId>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::DuplicateId { id: id.clone() });
        }
    }
    Ok(())
}

pub(crate) fn page_of(
    elements: impl Iterator<Item = Element>,
    page: usize,
    page_size: usize,
) -> Paginated<ListEntry> {
    let entries: Vec<ListEntry> = elements.map(|e| ListEntry::from(&e)).collect();
    Paginated::from_slice(&entries, page, page_size)
}

pub(crate) fn to_stats(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
