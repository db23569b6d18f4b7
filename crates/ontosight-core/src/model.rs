//! Dataset model: nodes, edges, hyperedges and list items.
//!
//! Every element carries an open `data` map for passthrough attributes.
//! Ids are assumed unique across element kinds within one dataset.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Free-form attributes attached to an element.
pub type Attributes = Map<String, Value>;

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of any element in a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kind of a dataset element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
    Hyperedge,
    Item,
}

impl ElementKind {
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Edge => "edge",
            ElementKind::Hyperedge => "hyperedge",
            ElementKind::Item => "item",
        }
    }

    /// Plural form used by the paginated endpoints (`nodes_paginated`, ...).
    pub fn plural(self) -> &'static str {
        match self {
            ElementKind::Node => "nodes",
            ElementKind::Edge => "edges",
            ElementKind::Hyperedge => "hyperedges",
            ElementKind::Item => "items",
        }
    }

    pub fn from_plural(value: &str) -> Option<Self> {
        match value {
            "nodes" => Some(ElementKind::Node),
            "edges" => Some(ElementKind::Edge),
            "hyperedges" => Some(ElementKind::Hyperedge),
            "items" => Some(ElementKind::Item),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the selection collection.
///
/// Selection is keyed by `id` alone; `kind` is carried for downstream lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
}

impl SelectedItem {
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

// =============================================================================
// Elements
// =============================================================================

/// A graph or hypergraph vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Attributes,
    /// Stored layout coordinate; absent means the engine picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlighted: bool,
}

impl Node {
    pub fn new(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data: Attributes::new(),
            x: None,
            y: None,
            highlighted: false,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.x.zip(self.y)
    }
}

/// A binary relation between two nodes. Several edges may share an endpoint pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlighted: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: String::new(),
            data: Attributes::new(),
            highlighted: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A relation over an unordered set of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperedge {
    pub id: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(alias = "linked_nodes")]
    pub node_set: Vec<ElementId>,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlighted: bool,
}

impl Hyperedge {
    pub fn new<I, S>(id: impl Into<ElementId>, label: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            node_set: members.into_iter().map(Into::into).collect(),
            data: Attributes::new(),
            highlighted: false,
        }
    }

    /// Whether `members` is exactly this hyperedge's node set, ignoring order.
    pub fn has_members(&self, members: &[ElementId]) -> bool {
        if members.len() != self.node_set.len() {
            return false;
        }
        let ours: HashSet<&ElementId> = self.node_set.iter().collect();
        let theirs: HashSet<&ElementId> = members.iter().collect();
        ours == theirs
    }
}

/// A flat record of a list-mode dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlighted: bool,
}

impl Item {
    pub fn new(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data: Attributes::new(),
            highlighted: false,
        }
    }
}

/// Any dataset element, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Edge(Edge),
    Hyperedge(Hyperedge),
    Item(Item),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Node(n) => &n.id,
            Element::Edge(e) => &e.id,
            Element::Hyperedge(h) => &h.id,
            Element::Item(i) => &i.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Node(_) => ElementKind::Node,
            Element::Edge(_) => ElementKind::Edge,
            Element::Hyperedge(_) => ElementKind::Hyperedge,
            Element::Item(_) => ElementKind::Item,
        }
    }

    /// Label, falling back to the id when the label is blank.
    pub fn display_label(&self) -> &str {
        let label = match self {
            Element::Node(n) => &n.label,
            Element::Edge(e) => &e.label,
            Element::Hyperedge(h) => &h.label,
            Element::Item(i) => &i.label,
        };
        if label.trim().is_empty() {
            self.id().as_str()
        } else {
            label
        }
    }

    pub fn data(&self) -> &Attributes {
        match self {
            Element::Node(n) => &n.data,
            Element::Edge(e) => &e.data,
            Element::Hyperedge(h) => &h.data,
            Element::Item(i) => &i.data,
        }
    }
}

// =============================================================================
// Datasets
// =============================================================================

/// Which renderer family a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VizKind {
    Graph,
    Hypergraph,
    List,
}

impl VizKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "graph" => Some(VizKind::Graph),
            "hypergraph" => Some(VizKind::Hypergraph),
            "list" => Some(VizKind::List),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VizKind::Graph => "graph",
            VizKind::Hypergraph => "hypergraph",
            VizKind::List => "list",
        }
    }

    /// Entity kinds that can be paginated for this visualization.
    pub fn entities(self) -> &'static [ElementKind] {
        match self {
            VizKind::Graph => &[ElementKind::Node, ElementKind::Edge],
            VizKind::Hypergraph => &[ElementKind::Node, ElementKind::Hyperedge],
            VizKind::List => &[ElementKind::Item],
        }
    }
}

impl fmt::Display for VizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Hypergraph payload. `edges` are auxiliary layout edges between members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypergraphData {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub hyperedges: Vec<Hyperedge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    pub items: Vec<Item>,
}

/// A complete dataset as delivered by the backend.
///
/// The wire form carries no tag; the shape is recognised from its fields,
/// trying the hypergraph shape first since it is a superset of the graph one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dataset {
    Hypergraph(HypergraphData),
    Graph(GraphData),
    List(ListData),
}

impl Dataset {
    pub fn empty(kind: VizKind) -> Self {
        match kind {
            VizKind::Graph => Dataset::Graph(GraphData::default()),
            VizKind::Hypergraph => Dataset::Hypergraph(HypergraphData::default()),
            VizKind::List => Dataset::List(ListData::default()),
        }
    }

    pub fn kind(&self) -> VizKind {
        match self {
            Dataset::Graph(_) => VizKind::Graph,
            Dataset::Hypergraph(_) => VizKind::Hypergraph,
            Dataset::List(_) => VizKind::List,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        match self {
            Dataset::Graph(g) => &g.nodes,
            Dataset::Hypergraph(h) => &h.nodes,
            Dataset::List(_) => &[],
        }
    }

    pub fn edges(&self) -> &[Edge] {
        match self {
            Dataset::Graph(g) => &g.edges,
            Dataset::Hypergraph(h) => &h.edges,
            Dataset::List(_) => &[],
        }
    }

    pub fn hyperedges(&self) -> &[Hyperedge] {
        match self {
            Dataset::Hypergraph(h) => &h.hyperedges,
            _ => &[],
        }
    }

    pub fn items(&self) -> &[Item] {
        match self {
            Dataset::List(l) => &l.items,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty() && self.hyperedges().is_empty() && self.items().is_empty()
    }

    /// All element ids in dataset order: nodes, edges, hyperedges, items.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.nodes()
            .iter()
            .map(|n| &n.id)
            .chain(self.edges().iter().map(|e| &e.id))
            .chain(self.hyperedges().iter().map(|h| &h.id))
            .chain(self.items().iter().map(|i| &i.id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate.as_str() == id)
    }

    pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
        if self.nodes().iter().any(|n| n.id.as_str() == id) {
            Some(ElementKind::Node)
        } else if self.edges().iter().any(|e| e.id.as_str() == id) {
            Some(ElementKind::Edge)
        } else if self.hyperedges().iter().any(|h| h.id.as_str() == id) {
            Some(ElementKind::Hyperedge)
        } else if self.items().iter().any(|i| i.id.as_str() == id) {
            Some(ElementKind::Item)
        } else {
            None
        }
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        if let Some(n) = self.nodes().iter().find(|n| n.id.as_str() == id) {
            return Some(Element::Node(n.clone()));
        }
        if let Some(e) = self.edges().iter().find(|e| e.id.as_str() == id) {
            return Some(Element::Edge(e.clone()));
        }
        if let Some(h) = self.hyperedges().iter().find(|h| h.id.as_str() == id) {
            return Some(Element::Hyperedge(h.clone()));
        }
        self.items()
            .iter()
            .find(|i| i.id.as_str() == id)
            .map(|i| Element::Item(i.clone()))
    }

    /// Ids whose element carries `highlighted: true`, in dataset order.
    pub fn highlighted_ids(&self) -> Vec<ElementId> {
        let nodes = self.nodes().iter().filter(|n| n.highlighted).map(|n| &n.id);
        let edges = self.edges().iter().filter(|e| e.highlighted).map(|e| &e.id);
        let hyperedges = self
            .hyperedges()
            .iter()
            .filter(|h| h.highlighted)
            .map(|h| &h.id);
        let items = self.items().iter().filter(|i| i.highlighted).map(|i| &i.id);
        nodes
            .chain(edges)
            .chain(hyperedges)
            .chain(items)
            .cloned()
            .collect()
    }

    /// Remove stored coordinates from every node.
    pub fn strip_positions(&mut self) {
        let nodes = match self {
            Dataset::Graph(g) => &mut g.nodes,
            Dataset::Hypergraph(h) => &mut h.nodes,
            Dataset::List(_) => return,
        };
        for node in nodes {
            node.x = None;
            node.y = None;
        }
    }

    /// Copy of this dataset with every node coordinate removed.
    pub fn without_positions(&self) -> Dataset {
        let mut copy = self.clone();
        copy.strip_positions();
        copy
    }

    /// Build an undirected petgraph over the node/edge lists.
    ///
    /// Edges whose endpoints are missing are left out.
    pub fn to_petgraph(&self) -> (StableUnGraph<ElementId, ElementId>, HashMap<ElementId, NodeIndex>) {
        let mut graph = StableUnGraph::default();
        let mut id_to_index = HashMap::new();

        for node in self.nodes() {
            let idx = graph.add_node(node.id.clone());
            id_to_index.insert(node.id.clone(), idx);
        }

        for edge in self.edges() {
            if let (Some(&from), Some(&to)) =
                (id_to_index.get(&edge.source), id_to_index.get(&edge.target))
            {
                graph.add_edge(from, to, edge.id.clone());
            }
        }

        (graph, id_to_index)
    }
}

// =============================================================================
// Backend payloads
// =============================================================================

/// Capabilities advertised by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub search: bool,
    #[serde(default)]
    pub chat: bool,
}

/// Response of the `meta` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "type")]
    pub kind: VizKind,
    #[serde(default)]
    pub schemas: Value,
    #[serde(default)]
    pub stats: Map<String, Value>,
    #[serde(default)]
    pub features: Features,
}

impl Meta {
    /// Parse a meta payload, rejecting a missing or unknown `type`.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let kind = match value.get("type") {
            None | Some(Value::Null) => {
                return Err(CoreError::invalid_metadata("missing `type` field"))
            }
            Some(Value::String(s)) => VizKind::parse(s)
                .ok_or_else(|| CoreError::invalid_metadata(format!("unknown type `{s}`")))?,
            Some(other) => {
                return Err(CoreError::invalid_metadata(format!(
                    "`type` must be a string, got {other}"
                )))
            }
        };
        let mut meta: Meta = serde_json::from_value(value)?;
        meta.kind = kind;
        Ok(meta)
    }
}

/// One entry of a paginated entity listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: ElementId,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub data: Attributes,
}

impl From<&Element> for ListEntry {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id().clone(),
            label: element.display_label().to_string(),
            kind: element.kind(),
            data: element.data().clone(),
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_next: bool,
}

impl<T: Clone> Paginated<T> {
    /// Slice a zero-based page out of `all`.
    pub fn from_slice(all: &[T], page: usize, page_size: usize) -> Self {
        let start = page.saturating_mul(page_size).min(all.len());
        let end = start.saturating_add(page_size).min(all.len());
        Self {
            items: all[start..end].to_vec(),
            page,
            page_size,
            total: all.len(),
            has_next: page.saturating_add(1).saturating_mul(page_size) < all.len(),
        }
    }
}

/// Body of `search` and `chat` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Response of the `chat` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Dataset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_shape_detection() {
        let graph: Dataset = serde_json::from_value(json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [{"id": "e", "source": "a", "target": "b"}]
        }))
        .unwrap();
        assert_eq!(graph.kind(), VizKind::Graph);

        let hyper: Dataset = serde_json::from_value(json!({
            "nodes": [{"id": "a"}],
            "edges": [],
            "hyperedges": [{"id": "h", "linked_nodes": ["a"]}]
        }))
        .unwrap();
        assert_eq!(hyper.kind(), VizKind::Hypergraph);
        assert_eq!(hyper.hyperedges()[0].node_set, vec![ElementId::from("a")]);

        let list: Dataset = serde_json::from_value(json!({"items": [{"id": "i1"}]})).unwrap();
        assert_eq!(list.kind(), VizKind::List);
    }

    #[test]
    fn test_highlight_flag_round_trip_omits_false() {
        let node = Node::new("a", "A");
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("highlighted").is_none());
        assert!(value.get("x").is_none());
    }

    #[test]
    fn test_strip_positions() {
        let mut ds = Dataset::Graph(GraphData {
            nodes: vec![Node::new("a", "A").with_position(1.0, 2.0)],
            edges: vec![],
        });
        ds.strip_positions();
        assert_eq!(ds.nodes()[0].position(), None);
    }

    #[test]
    fn test_highlighted_ids_in_dataset_order() {
        let mut a = Node::new("a", "A");
        a.highlighted = true;
        let mut e = Edge::new("e", "a", "b");
        e.highlighted = true;
        let ds = Dataset::Graph(GraphData {
            nodes: vec![Node::new("b", "B"), a],
            edges: vec![e],
        });
        assert_eq!(
            ds.highlighted_ids(),
            vec![ElementId::from("a"), ElementId::from("e")]
        );
    }

    #[test]
    fn test_meta_missing_type_is_invalid() {
        let err = Meta::from_value(json!({"stats": {}})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMetadata { .. }));

        let err = Meta::from_value(json!({"type": "tree"})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMetadata { .. }));

        let meta = Meta::from_value(json!({"type": "hypergraph", "features": {"search": true}}))
            .unwrap();
        assert_eq!(meta.kind, VizKind::Hypergraph);
        assert!(meta.features.search);
        assert!(!meta.features.chat);
    }

    #[test]
    fn test_paginate_bounds() {
        let all: Vec<u32> = (0..5).collect();
        let page = Paginated::from_slice(&all, 1, 2);
        assert_eq!(page.items, vec![2, 3]);
        assert!(page.has_next);

        let last = Paginated::from_slice(&all, 2, 2);
        assert_eq!(last.items, vec![4]);
        assert!(!last.has_next);

        let beyond = Paginated::from_slice(&all, 9, 2);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn test_hyperedge_member_equality_ignores_order() {
        let h = Hyperedge::new("h", "H", ["a", "b", "c"]);
        assert!(h.has_members(&["c".into(), "a".into(), "b".into()]));
        assert!(!h.has_members(&["a".into(), "b".into()]));
    }
}
