//! Observable selection store.
//!
//! The single source of truth for which elements are selected or
//! highlighted, which view is active, and how many layout resets have been
//! requested. Every mutator is a synchronous state transition that cannot
//! fail; observers are notified after the state has changed.

use std::collections::HashSet;

use ontosight_core::{Dataset, ElementId, ElementKind, SelectedItem, VisualState, VizKind};

/// Which renderer subtree is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Graph,
    Hypergraph,
    List,
    NodeList,
    EdgeList,
    HyperedgeList,
}

impl ViewMode {
    /// Main view of a visualization kind.
    pub fn main(kind: VizKind) -> Self {
        match kind {
            VizKind::Graph => ViewMode::Graph,
            VizKind::Hypergraph => ViewMode::Hypergraph,
            VizKind::List => ViewMode::List,
        }
    }

    /// Views that make sense for a visualization kind, main view first.
    pub fn available(kind: VizKind) -> &'static [ViewMode] {
        match kind {
            VizKind::Graph => &[ViewMode::Graph, ViewMode::NodeList, ViewMode::EdgeList],
            VizKind::Hypergraph => &[
                ViewMode::Hypergraph,
                ViewMode::NodeList,
                ViewMode::HyperedgeList,
            ],
            VizKind::List => &[ViewMode::List],
        }
    }

    /// Entity paged by an entity-list submode.
    pub fn entity(self) -> Option<ElementKind> {
        match self {
            ViewMode::NodeList => Some(ElementKind::Node),
            ViewMode::EdgeList => Some(ElementKind::Edge),
            ViewMode::HyperedgeList => Some(ElementKind::Hyperedge),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Graph => "graph",
            ViewMode::Hypergraph => "hypergraph",
            ViewMode::List => "list",
            ViewMode::NodeList => "nodes",
            ViewMode::EdgeList => "edges",
            ViewMode::HyperedgeList => "hyperedges",
        }
    }
}

/// Change notification sent to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SelectionChanged,
    HighlightChanged,
    ViewModeChanged(ViewMode),
    LayoutReset(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent)>;

pub struct SelectionStore {
    /// Newest selection first, no duplicate ids.
    selection: Vec<SelectedItem>,
    highlighted: HashSet<ElementId>,
    view_mode: ViewMode,
    reset_counter: u64,
    /// Bumped whenever selection or highlight changes.
    revision: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(ViewMode::Graph)
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("selection", &self.selection)
            .field("highlighted", &self.highlighted)
            .field("view_mode", &self.view_mode)
            .field("reset_counter", &self.reset_counter)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SelectionStore {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            selection: Vec::new(),
            highlighted: HashSet::new(),
            view_mode,
            reset_counter: 0,
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        if matches!(
            event,
            StoreEvent::SelectionChanged | StoreEvent::HighlightChanged
        ) {
            self.revision += 1;
        }
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Make `id` the most recent selection, moving it to the front if present.
    pub fn select_item(&mut self, id: impl Into<ElementId>, kind: ElementKind) {
        let id = id.into();
        self.selection.retain(|item| item.id != id);
        self.selection.insert(0, SelectedItem { id, kind });
        self.notify(StoreEvent::SelectionChanged);
    }

    pub fn deselect_item(&mut self, id: &str) {
        let before = self.selection.len();
        self.selection.retain(|item| item.id.as_str() != id);
        if self.selection.len() != before {
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    /// Replace the highlighted set wholesale.
    pub fn highlight_nodes<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ElementId>,
    {
        let next: HashSet<ElementId> = ids.into_iter().collect();
        if next != self.highlighted {
            self.highlighted = next;
            self.notify(StoreEvent::HighlightChanged);
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlight_nodes(std::iter::empty());
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.notify(StoreEvent::ViewModeChanged(mode));
        }
    }

    /// Request a cold-start layout of the current dataset.
    pub fn trigger_layout_reset(&mut self) {
        self.reset_counter += 1;
        self.notify(StoreEvent::LayoutReset(self.reset_counter));
    }

    /// Clear selection and highlight, then request a cold-start layout.
    pub fn reset_visualization(&mut self) {
        self.clear_selection();
        self.clear_highlight();
        self.trigger_layout_reset();
    }

    /// Drop selected and highlighted ids that `dataset` does not contain.
    pub fn retain_present(&mut self, dataset: &Dataset) {
        let before = self.selection.len();
        self.selection.retain(|item| dataset.contains(item.id.as_str()));
        if self.selection.len() != before {
            self.notify(StoreEvent::SelectionChanged);
        }

        let before = self.highlighted.len();
        self.highlighted.retain(|id| dataset.contains(id.as_str()));
        if self.highlighted.len() != before {
            self.notify(StoreEvent::HighlightChanged);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Selection history, newest first.
    pub fn selection(&self) -> &[SelectedItem] {
        &self.selection
    }

    /// The most recent selection.
    pub fn current(&self) -> Option<&SelectedItem> {
        self.selection.first()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|item| item.id.as_str() == id)
    }

    pub fn highlighted(&self) -> &HashSet<ElementId> {
        &self.highlighted
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.contains(id)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn reset_counter(&self) -> u64 {
        self.reset_counter
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Visual state of an element under the current selection and highlight.
    pub fn resolve(&self, id: &str) -> VisualState {
        VisualState::resolve(self.is_selected(id), self.is_highlighted(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontosight_core::{GraphData, Node};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn order(store: &SelectionStore) -> Vec<&str> {
        store.selection().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_reselect_moves_to_front() {
        let mut store = SelectionStore::default();
        store.select_item("n1", ElementKind::Node);
        store.select_item("n2", ElementKind::Node);
        store.select_item("n1", ElementKind::Node);
        assert_eq!(order(&store), vec!["n1", "n2"]);
        assert_eq!(store.current().map(|s| s.id.as_str()), Some("n1"));
    }

    #[test]
    fn test_deselect_absent_is_noop() {
        let mut store = SelectionStore::default();
        store.select_item("a", ElementKind::Edge);
        let revision = store.revision();
        store.deselect_item("zzz");
        assert_eq!(store.revision(), revision);
        store.deselect_item("a");
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_highlight_replaces_set() {
        let mut store = SelectionStore::default();
        store.highlight_nodes(["a".into(), "b".into()]);
        store.highlight_nodes(["c".into()]);
        assert!(!store.is_highlighted("a"));
        assert!(store.is_highlighted("c"));
        store.clear_highlight();
        assert!(store.highlighted().is_empty());
    }

    #[test]
    fn test_layout_reset_counts() {
        let mut store = SelectionStore::default();
        for _ in 0..4 {
            store.trigger_layout_reset();
        }
        assert_eq!(store.reset_counter(), 4);
    }

    #[test]
    fn test_reset_visualization_clears_and_counts() {
        let mut store = SelectionStore::default();
        store.select_item("a", ElementKind::Node);
        store.highlight_nodes(["b".into()]);
        store.reset_visualization();
        assert!(store.selection().is_empty());
        assert!(store.highlighted().is_empty());
        assert_eq!(store.reset_counter(), 1);
    }

    #[test]
    fn test_resolve_uses_precedence() {
        let mut store = SelectionStore::default();
        store.select_item("a", ElementKind::Node);
        store.select_item("b", ElementKind::Node);
        store.highlight_nodes(["b".into()]);
        assert_eq!(store.resolve("a"), VisualState::Selected);
        assert_eq!(store.resolve("b"), VisualState::Highlighted);
        assert_eq!(store.resolve("c"), VisualState::Normal);
    }

    #[test]
    fn test_retain_present_prunes_stale_ids() {
        let mut store = SelectionStore::default();
        store.select_item("a", ElementKind::Node);
        store.select_item("gone", ElementKind::Node);
        store.select_item("b", ElementKind::Node);
        let dataset = Dataset::Graph(GraphData {
            nodes: vec![Node::new("a", "A"), Node::new("b", "B")],
            edges: vec![],
        });
        store.retain_present(&dataset);
        assert_eq!(order(&store), vec!["b", "a"]);
    }

    #[test]
    fn test_observers_receive_events_until_unsubscribed() {
        let mut store = SelectionStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.select_item("a", ElementKind::Node);
        store.set_view_mode(ViewMode::NodeList);
        store.set_view_mode(ViewMode::NodeList);
        store.trigger_layout_reset();
        assert!(store.unsubscribe(sub));
        store.clear_selection();

        assert_eq!(
            *seen.borrow(),
            vec![
                StoreEvent::SelectionChanged,
                StoreEvent::ViewModeChanged(ViewMode::NodeList),
                StoreEvent::LayoutReset(1),
            ]
        );
        assert!(!store.unsubscribe(sub));
    }
}
