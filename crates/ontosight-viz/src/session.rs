//! View session: metadata, the current dataset and the selection store.
//!
//! Installing a dataset (fetch, search, chat, reset) always produces a new
//! dataset reference. Selected ids that the new dataset still contains are
//! kept in their order; the rest are pruned. The highlight set is replaced
//! by the ids the new dataset flags as highlighted.

use std::rc::Rc;

use ontosight_core::{
    ChatResponse, CoreError, Dataset, ElementId, ListEntry, Meta, Paginated, VizKind,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::{Backend, BackendResult};
use crate::details::{DetailCache, DetailSource, DetailStatus};
use crate::store::{SelectionStore, ViewMode};

pub const DEFAULT_PAGE_SIZE: usize = 30;

/// User-facing load state. Invalid metadata and missing data are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    /// `meta.type` is missing or unknown.
    InvalidMetadata(String),
    /// Metadata is fine but the backend returned no dataset.
    NoData,
    /// The backend could not be reached.
    Unavailable(String),
    Ready,
}

#[derive(Debug)]
pub struct ViewSession {
    store: SelectionStore,
    meta: Option<Meta>,
    dataset: Option<Rc<Dataset>>,
    status: LoadStatus,
    details: DetailCache,
    chat_response: Option<String>,
    entity_page: Option<Paginated<ListEntry>>,
    page_size: usize,
}

impl Default for ViewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSession {
    pub fn new() -> Self {
        Self {
            store: SelectionStore::default(),
            meta: None,
            dataset: None,
            status: LoadStatus::Idle,
            details: DetailCache::new(),
            chat_response: None,
            entity_page: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SelectionStore {
        &mut self.store
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn dataset(&self) -> Option<&Rc<Dataset>> {
        self.dataset.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn chat_response(&self) -> Option<&str> {
        self.chat_response.as_deref()
    }

    pub fn entity_page(&self) -> Option<&Paginated<ListEntry>> {
        self.entity_page.as_ref()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch metadata and the default dataset.
    pub fn load(&mut self, backend: &dyn Backend) -> &LoadStatus {
        match backend.meta() {
            Ok(value) => {
                if self.apply_meta(value) {
                    self.fetch_default(backend);
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch metadata");
                self.status = LoadStatus::Unavailable(err.to_string());
            }
        }
        &self.status
    }

    /// Validate and install a meta payload. Returns false if it was invalid.
    pub fn apply_meta(&mut self, value: Value) -> bool {
        match Meta::from_value(value) {
            Ok(meta) => {
                info!(kind = %meta.kind, "Metadata loaded");
                self.store.set_view_mode(ViewMode::main(meta.kind));
                self.meta = Some(meta);
                if self.dataset.is_none() {
                    self.status = LoadStatus::NoData;
                }
                true
            }
            Err(CoreError::InvalidMetadata { reason }) => {
                warn!(%reason, "Invalid metadata");
                self.meta = None;
                self.dataset = None;
                self.status = LoadStatus::InvalidMetadata(reason);
                false
            }
            Err(err) => {
                warn!(error = %err, "Malformed metadata");
                self.meta = None;
                self.dataset = None;
                self.status = LoadStatus::InvalidMetadata(err.to_string());
                false
            }
        }
    }

    fn fetch_default(&mut self, backend: &dyn Backend) {
        match backend.data(&[], None, Some(self.page_size)) {
            Ok(Some(dataset)) => self.replace_dataset(dataset),
            Ok(None) => self.mark_no_data(),
            Err(err) => {
                warn!(error = %err, "Failed to fetch dataset");
                self.mark_no_data();
            }
        }
    }

    fn mark_no_data(&mut self) {
        self.dataset = None;
        let kind = self.meta.as_ref().map_or(VizKind::Graph, |m| m.kind);
        self.store.retain_present(&Dataset::empty(kind));
        self.status = LoadStatus::NoData;
        self.prune_details();
    }

    /// Install a new dataset reference.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        if let Some(meta) = &self.meta {
            if meta.kind != dataset.kind() {
                warn!(
                    expected = %meta.kind,
                    got = %dataset.kind(),
                    "Dataset shape does not match metadata type"
                );
            }
        }
        self.store.retain_present(&dataset);
        self.store.highlight_nodes(dataset.highlighted_ids());
        self.dataset = Some(Rc::new(dataset));
        self.status = LoadStatus::Ready;
        self.prune_details();
    }

    /// Install a search result and return to the main view.
    pub fn apply_search(&mut self, dataset: Dataset) {
        self.replace_dataset(dataset);
        self.show_main_view();
    }

    pub fn apply_chat(&mut self, response: ChatResponse) {
        self.chat_response = Some(response.response);
        if let Some(dataset) = response.data {
            self.apply_search(dataset);
        }
    }

    pub fn search(&mut self, backend: &dyn Backend, query: &str) -> BackendResult<()> {
        let dataset = backend.search(query)?;
        self.apply_search(dataset);
        Ok(())
    }

    pub fn chat(&mut self, backend: &dyn Backend, query: &str) -> BackendResult<()> {
        let response = backend.chat(query)?;
        self.apply_chat(response);
        Ok(())
    }

    /// Load the neighbourhood of `ids` with the ids highlighted.
    pub fn focus(&mut self, backend: &dyn Backend, ids: &[ElementId]) -> BackendResult<()> {
        if let Some(dataset) = backend.data(ids, None, None)? {
            self.apply_search(dataset);
        }
        Ok(())
    }

    /// Clear selection and highlight, cold-start the layout and refetch.
    pub fn reset(&mut self, backend: &dyn Backend) {
        self.store.reset_visualization();
        self.chat_response = None;
        self.show_main_view();
        self.fetch_default(backend);
    }

    /// Cold-start the layout of the current dataset.
    pub fn relayout(&mut self) {
        self.store.trigger_layout_reset();
    }

    fn show_main_view(&mut self) {
        if let Some(meta) = &self.meta {
            self.store.set_view_mode(ViewMode::main(meta.kind));
        }
        self.entity_page = None;
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn set_view_mode(&mut self, backend: &dyn Backend, mode: ViewMode) {
        self.store.set_view_mode(mode);
        if mode.entity().is_some() {
            self.load_page(backend, 0);
        } else {
            self.entity_page = None;
        }
    }

    /// Fetch one page of the active entity list.
    pub fn load_page(&mut self, backend: &dyn Backend, page: usize) {
        let Some(entity) = self.store.view_mode().entity() else {
            return;
        };
        match backend.paginated(entity, page, self.page_size) {
            Ok(result) => self.entity_page = Some(result),
            Err(err) => warn!(%entity, page, error = %err, "Failed to fetch page"),
        }
    }

    /// Select the next highlighted element after the current selection.
    pub fn cycle_match(&mut self) -> Option<ElementId> {
        let dataset = self.dataset.as_ref()?;
        let matches: Vec<&ElementId> = dataset
            .ids()
            .filter(|id| self.store.is_highlighted(id.as_str()))
            .collect();
        if matches.is_empty() {
            return None;
        }

        let next = self
            .store
            .current()
            .and_then(|current| matches.iter().position(|id| **id == current.id))
            .map_or(0, |pos| (pos + 1) % matches.len());
        let id = matches[next].clone();
        let kind = dataset.kind_of(id.as_str())?;

        self.store.select_item(id.clone(), kind);
        self.prune_details();
        Some(id)
    }

    // =========================================================================
    // Details
    // =========================================================================

    pub fn fetch_details(&mut self, id: &ElementId, source: &dyn DetailSource) -> DetailStatus<'_> {
        self.details.fetch_details(id, source)
    }

    pub fn details_cache_mut(&mut self) -> &mut DetailCache {
        &mut self.details
    }

    /// Forget details of ids no longer in the selection history.
    pub fn prune_details(&mut self) {
        self.details
            .retain(self.store.selection().iter().map(|item| &item.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use ontosight_core::{
        DataService, Edge, ElementKind, GraphStore, Node, QueryHandlers, VisualState,
    };
    use serde_json::json;

    fn backend() -> LocalBackend {
        let store = GraphStore::new(
            vec![
                Node::new("a", "Alpha"),
                Node::new("b", "Beta"),
                Node::new("c", "Gamma"),
                Node::new("d", "Delta"),
            ],
            vec![
                Edge::new("ab", "a", "b"),
                Edge::new("bc", "b", "c"),
                Edge::new("cd", "c", "d"),
            ],
        )
        .unwrap();
        LocalBackend::new(
            DataService::new(Box::new(store))
                .with_handlers(QueryHandlers::builtin())
                .with_hops(1),
        )
    }

    #[test]
    fn test_invalid_meta_is_not_no_data() {
        let mut session = ViewSession::new();
        assert!(!session.apply_meta(json!({"stats": {}})));
        assert!(matches!(session.status(), LoadStatus::InvalidMetadata(_)));

        assert!(session.apply_meta(json!({"type": "graph"})));
        assert_eq!(session.status(), &LoadStatus::NoData);
    }

    #[test]
    fn test_load_installs_dataset_and_view_mode() {
        let mut session = ViewSession::new();
        assert_eq!(session.load(&backend()), &LoadStatus::Ready);
        assert_eq!(session.store().view_mode(), ViewMode::Graph);
        assert!(session.dataset().is_some());
    }

    #[test]
    fn test_replacement_prunes_absent_and_keeps_present() {
        let backend = backend();
        let mut session = ViewSession::new();
        session.load(&backend);
        session.store_mut().select_item("a", ElementKind::Node);
        session.store_mut().select_item("b", ElementKind::Node);

        session.search(&backend, "gamma").unwrap();
        let ids: Vec<&str> = session
            .store()
            .selection()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(session.store().resolve("c"), VisualState::Highlighted);
    }

    #[test]
    fn test_each_replacement_is_a_new_reference() {
        let backend = backend();
        let mut session = ViewSession::new();
        session.load(&backend);
        let first = Rc::clone(session.dataset().unwrap());
        session.focus(&backend, &["a".into()]).unwrap();
        assert!(!Rc::ptr_eq(&first, session.dataset().unwrap()));
    }

    #[test]
    fn test_cycle_match_walks_highlights_in_order() {
        let backend = backend();
        let mut session = ViewSession::new();
        session.load(&backend);
        session.focus(&backend, &["a".into(), "c".into()]).unwrap();

        assert_eq!(session.cycle_match(), Some(ElementId::from("a")));
        assert_eq!(session.cycle_match(), Some(ElementId::from("c")));
        assert_eq!(session.cycle_match(), Some(ElementId::from("a")));
        assert_eq!(session.store().selection().len(), 2);
    }

    #[test]
    fn test_reset_clears_and_bumps_counter() {
        let backend = backend();
        let mut session = ViewSession::new();
        session.load(&backend);
        session.store_mut().select_item("b", ElementKind::Node);
        session.chat(&backend, "where is beta").unwrap();
        assert!(session.chat_response().is_some());

        session.reset(&backend);
        assert!(session.store().selection().is_empty());
        assert!(session.store().highlighted().is_empty());
        assert_eq!(session.store().reset_counter(), 1);
        assert!(session.chat_response().is_none());
    }

    #[test]
    fn test_entity_list_mode_loads_page() {
        let backend = backend();
        let mut session = ViewSession::new().with_page_size(2);
        session.load(&backend);
        session.set_view_mode(&backend, ViewMode::EdgeList);
        let page = session.entity_page().unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next);

        session.load_page(&backend, 1);
        assert_eq!(session.entity_page().unwrap().items.len(), 1);
    }

    #[test]
    fn test_details_follow_selection_history() {
        let backend = backend();
        let mut session = ViewSession::new();
        session.load(&backend);
        session.store_mut().select_item("b", ElementKind::Node);
        let id = ElementId::from("b");
        assert!(matches!(
            session.fetch_details(&id, &backend),
            DetailStatus::Ready(_)
        ));
        session.store_mut().clear_selection();
        session.prune_details();
        assert!(session.details_cache_mut().is_empty());
    }
}
