//! Engine-facing descriptors derived from a dataset and the selection store.

use std::collections::HashMap;

use ontosight_core::{
    build_regions, compute_edge_geometry, Attributes, Dataset, EdgeGeometry, ElementId,
    ElementKind, ListEntry, Region, VisualState, VizKind,
};

use crate::store::SelectionStore;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub id: ElementId,
    pub label: String,
    /// Stored coordinate; `None` lets the engine lay the node out.
    pub position: Option<(f32, f32)>,
    pub state: VisualState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDescriptor {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    pub label: String,
    pub geometry: EdgeGeometry,
    pub state: VisualState,
    /// Auxiliary hypergraph edge: drives layout but is not drawn.
    pub layout_only: bool,
}

/// Everything the engine needs for a full render.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub kind: VizKind,
    pub nodes: Vec<NodeDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
    pub regions: Vec<Region>,
}

impl Scene {
    pub fn build(dataset: &Dataset, store: &SelectionStore) -> Self {
        let geometry = compute_edge_geometry(dataset.edges());
        let layout_only = dataset.kind() == VizKind::Hypergraph;

        let nodes = dataset
            .nodes()
            .iter()
            .map(|n| NodeDescriptor {
                id: n.id.clone(),
                label: if n.label.is_empty() {
                    n.id.to_string()
                } else {
                    n.label.clone()
                },
                position: n.position(),
                state: store.resolve(n.id.as_str()),
            })
            .collect();

        let edges = dataset
            .edges()
            .iter()
            .map(|e| EdgeDescriptor {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                label: e.label.clone(),
                geometry: geometry
                    .get(&e.id)
                    .copied()
                    .unwrap_or(EdgeGeometry::STRAIGHT),
                state: store.resolve(e.id.as_str()),
                layout_only,
            })
            .collect();

        let regions = build_regions(dataset.hyperedges(), |id| store.resolve(id.as_str()));

        Self {
            kind: dataset.kind(),
            nodes,
            edges,
            regions,
        }
    }

    pub fn states(&self) -> HashMap<ElementId, VisualState> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.state))
            .chain(self.edges.iter().map(|e| (e.id.clone(), e.state)))
            .chain(self.regions.iter().map(|r| (r.hyperedge_id.clone(), r.state)))
            .collect()
    }
}

/// Visual state of every node, edge and hyperedge of `dataset`.
pub fn visual_states(dataset: &Dataset, store: &SelectionStore) -> HashMap<ElementId, VisualState> {
    dataset
        .nodes()
        .iter()
        .map(|n| &n.id)
        .chain(dataset.edges().iter().map(|e| &e.id))
        .chain(dataset.hyperedges().iter().map(|h| &h.id))
        .map(|id| (id.clone(), store.resolve(id.as_str())))
        .collect()
}

/// Incremental state update pushed to a ready engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    /// Elements whose state changed, sorted by id.
    pub changes: Vec<(ElementId, VisualState)>,
    /// Rebuilt regions, present only when a hyperedge changed state.
    pub regions: Option<Vec<Region>>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.regions.is_none()
    }
}

/// Entries of `next` that differ from `prev`.
pub fn diff_states(
    prev: &HashMap<ElementId, VisualState>,
    next: &HashMap<ElementId, VisualState>,
) -> Vec<(ElementId, VisualState)> {
    let mut changes: Vec<_> = next
        .iter()
        .filter(|(id, state)| prev.get(*id) != Some(*state))
        .map(|(id, state)| (id.clone(), *state))
        .collect();
    changes.sort_by(|a, b| a.0.cmp(&b.0));
    changes
}

/// Compute the patch that moves an engine from `prev` to the store's state.
pub fn state_patch(
    dataset: &Dataset,
    store: &SelectionStore,
    prev: &HashMap<ElementId, VisualState>,
) -> (StatePatch, HashMap<ElementId, VisualState>) {
    let next = visual_states(dataset, store);
    let changes = diff_states(prev, &next);
    let region_changed = changes
        .iter()
        .any(|(id, _)| dataset.hyperedges().iter().any(|h| &h.id == id));
    let regions = region_changed
        .then(|| build_regions(dataset.hyperedges(), |id| store.resolve(id.as_str())));
    (StatePatch { changes, regions }, next)
}

// =============================================================================
// Cards
// =============================================================================

/// Card representation of a list item or a paginated entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCard {
    pub id: ElementId,
    pub label: String,
    pub kind: ElementKind,
    pub data: Attributes,
    pub state: VisualState,
}

/// Cards for the items of a list dataset.
pub fn item_cards(dataset: &Dataset, store: &SelectionStore) -> Vec<ItemCard> {
    dataset
        .items()
        .iter()
        .map(|item| ItemCard {
            id: item.id.clone(),
            label: if item.label.is_empty() {
                item.id.to_string()
            } else {
                item.label.clone()
            },
            kind: ElementKind::Item,
            data: item.data.clone(),
            state: store.resolve(item.id.as_str()),
        })
        .collect()
}

/// Cards for a page of an entity listing.
pub fn entry_cards(entries: &[ListEntry], store: &SelectionStore) -> Vec<ItemCard> {
    entries
        .iter()
        .map(|entry| ItemCard {
            id: entry.id.clone(),
            label: entry.label.clone(),
            kind: entry.kind,
            data: entry.data.clone(),
            state: store.resolve(entry.id.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontosight_core::{CurveType, Edge, Hyperedge, HypergraphData, Item, ListData, Node};

    fn hypergraph() -> Dataset {
        Dataset::Hypergraph(HypergraphData {
            nodes: vec![
                Node::new("a", "A").with_position(1.0, 1.0),
                Node::new("b", ""),
            ],
            edges: vec![Edge::new("h::b", "a", "b")],
            hyperedges: vec![Hyperedge::new("h", "H", ["a", "b"])],
        })
    }

    #[test]
    fn test_scene_carries_geometry_and_states() {
        let ds = Dataset::Graph(ontosight_core::GraphData {
            nodes: vec![Node::new("A", "A"), Node::new("B", "B")],
            edges: vec![Edge::new("e1", "A", "B"), Edge::new("e2", "A", "B")],
        });
        let mut store = SelectionStore::default();
        store.select_item("e2", ElementKind::Edge);
        let scene = Scene::build(&ds, &store);
        assert_eq!(scene.edges[0].geometry.offset, -15.0);
        assert_eq!(scene.edges[1].geometry.curve, CurveType::Curve);
        assert_eq!(scene.edges[1].state, VisualState::Selected);
        assert!(!scene.edges[0].layout_only);
    }

    #[test]
    fn test_hypergraph_scene() {
        let store = SelectionStore::default();
        let scene = Scene::build(&hypergraph(), &store);
        assert_eq!(scene.regions.len(), 1);
        assert!(scene.edges[0].layout_only);
        assert_eq!(scene.nodes[0].position, Some((1.0, 1.0)));
        assert_eq!(scene.nodes[1].label, "b");
    }

    #[test]
    fn test_patch_contains_only_changes() {
        let ds = hypergraph();
        let mut store = SelectionStore::default();
        let prev = visual_states(&ds, &store);

        store.select_item("a", ElementKind::Node);
        let (patch, next) = state_patch(&ds, &store, &prev);
        assert_eq!(patch.changes, vec![(ElementId::from("a"), VisualState::Selected)]);
        assert!(patch.regions.is_none());

        store.highlight_nodes(["h".into()]);
        let (patch, _) = state_patch(&ds, &store, &next);
        assert_eq!(patch.changes.len(), 1);
        let regions = patch.regions.unwrap();
        assert_eq!(regions[0].state, VisualState::Highlighted);
    }

    #[test]
    fn test_cards_share_resolver() {
        let ds = Dataset::List(ListData {
            items: vec![Item::new("i1", "One"), Item::new("i2", "Two")],
        });
        let mut store = SelectionStore::default();
        store.select_item("i1", ElementKind::Item);
        store.highlight_nodes(["i1".into()]);
        let cards = item_cards(&ds, &store);
        assert_eq!(cards[0].state, VisualState::Highlighted);
        assert_eq!(cards[1].state, VisualState::Normal);
    }
}
