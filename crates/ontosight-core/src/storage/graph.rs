use std::collections::{BTreeSet, HashMap};

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{ensure_unique, page_of, to_stats, Storage};
use crate::error::CoreResult;
use crate::model::{
    Dataset, Edge, Element, ElementId, ElementKind, GraphData, ListEntry, Node, Paginated,
    VizKind,
};

/// Storage for node/edge graphs.
///
/// Node and edge weights in the petgraph are positions into `nodes`/`edges`.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_pos: HashMap<ElementId, usize>,
    edge_pos: HashMap<ElementId, usize>,
    graph: StableUnGraph<usize, usize>,
    indices: Vec<NodeIndex>,
    degree: Vec<usize>,
}

impl GraphStore {
    /// Build the store. Edges referencing unknown nodes are skipped.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> CoreResult<Self> {
        ensure_unique(nodes.iter().map(|n| &n.id).chain(edges.iter().map(|e| &e.id)))?;

        let mut graph = StableUnGraph::default();
        let mut node_pos = HashMap::with_capacity(nodes.len());
        let mut indices = Vec::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            indices.push(graph.add_node(pos));
            node_pos.insert(node.id.clone(), pos);
        }

        let mut kept = Vec::with_capacity(edges.len());
        let mut degree = vec![0; nodes.len()];
        for edge in edges {
            let (Some(&s), Some(&t)) = (node_pos.get(&edge.source), node_pos.get(&edge.target))
            else {
                warn!(
                    edge = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Skipping edge with unknown endpoint"
                );
                continue;
            };
            graph.add_edge(indices[s], indices[t], kept.len());
            if s != t {
                degree[s] += 1;
                degree[t] += 1;
            }
            kept.push(edge);
        }

        let edge_pos = kept
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.id.clone(), pos))
            .collect();

        info!(nodes = nodes.len(), edges = kept.len(), "Graph store initialized");

        Ok(Self {
            nodes,
            edges: kept,
            node_pos,
            edge_pos,
            graph,
            indices,
            degree,
        })
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.node_pos.get(id).map(|&pos| self.degree[pos])
    }

    /// Highest-degree non-isolated node, earliest on ties.
    fn default_center(&self) -> Option<usize> {
        self.degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .fold(None, |best: Option<(usize, usize)>, (pos, &d)| match best {
                Some((_, best_d)) if best_d >= d => best,
                _ => Some((pos, d)),
            })
            .map(|(pos, _)| pos)
    }
}

impl Storage for GraphStore {
    fn kind(&self) -> VizKind {
        VizKind::Graph
    }

    fn element(&self, id: &str) -> Option<Element> {
        if let Some(&pos) = self.node_pos.get(id) {
            return Some(Element::Node(self.nodes[pos].clone()));
        }
        self.edge_pos
            .get(id)
            .map(|&pos| Element::Edge(self.edges[pos].clone()))
    }

    fn stats(&self) -> Map<String, Value> {
        let total_degree: usize = self.degree.iter().sum();
        let avg_degree = if self.nodes.is_empty() {
            0.0
        } else {
            total_degree as f64 / self.nodes.len() as f64
        };
        to_stats(json!({
            "total_nodes": self.nodes.len(),
            "total_edges": self.edges.len(),
            "avg_degree": avg_degree,
        }))
    }

    fn sample(&self, center_ids: &[ElementId], hops: usize, highlight_center: bool) -> Dataset {
        let mut visited_nodes = BTreeSet::new();
        let mut visited_edges = BTreeSet::new();
        let mut center_nodes = BTreeSet::new();
        let mut center_edges = BTreeSet::new();

        if center_ids.is_empty() {
            if let Some(pos) = self.default_center() {
                visited_nodes.insert(pos);
            }
        }

        for id in center_ids {
            if let Some(&pos) = self.node_pos.get(id) {
                visited_nodes.insert(pos);
                center_nodes.insert(pos);
            } else if let Some(&pos) = self.edge_pos.get(id) {
                visited_edges.insert(pos);
                center_edges.insert(pos);
                let edge = &self.edges[pos];
                visited_nodes.insert(self.node_pos[&edge.source]);
                visited_nodes.insert(self.node_pos[&edge.target]);
            }
        }

        if visited_nodes.is_empty() {
            return Dataset::empty(VizKind::Graph);
        }

        let mut frontier: Vec<usize> = visited_nodes.iter().copied().collect();
        for _ in 0..hops {
            let mut next = Vec::new();
            for &pos in &frontier {
                for edge_ref in self.graph.edges(self.indices[pos]) {
                    let edge_pos = *edge_ref.weight();
                    if !visited_edges.insert(edge_pos) {
                        continue;
                    }
                    let edge = &self.edges[edge_pos];
                    let other = if self.node_pos[&edge.source] == pos {
                        self.node_pos[&edge.target]
                    } else {
                        self.node_pos[&edge.source]
                    };
                    if visited_nodes.insert(other) {
                        next.push(other);
                    }
                }
            }
            frontier = next;
        }

        let nodes = visited_nodes
            .iter()
            .map(|&pos| {
                let mut node = self.nodes[pos].clone();
                node.highlighted = highlight_center && center_nodes.contains(&pos);
                node
            })
            .collect();
        let edges = visited_edges
            .iter()
            .map(|&pos| {
                let mut edge = self.edges[pos].clone();
                edge.highlighted = highlight_center && center_edges.contains(&pos);
                edge
            })
            .collect();

        let data = GraphData { nodes, edges };
        info!(nodes = data.nodes.len(), edges = data.edges.len(), "Graph sample");
        Dataset::Graph(data)
    }

    fn paginate(
        &self,
        entity: ElementKind,
        page: usize,
        page_size: usize,
    ) -> Option<Paginated<ListEntry>> {
        match entity {
            ElementKind::Node => Some(page_of(
                self.nodes.iter().cloned().map(Element::Node),
                page,
                page_size,
            )),
            ElementKind::Edge => Some(page_of(
                self.edges.iter().cloned().map(Element::Edge),
                page,
                page_size,
            )),
            _ => None,
        }
    }

    fn elements(&self) -> Vec<Element> {
        self.nodes
            .iter()
            .cloned()
            .map(Element::Node)
            .chain(self.edges.iter().cloned().map(Element::Edge))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    /// a - b - c - d, plus isolated e
    fn chain() -> GraphStore {
        GraphStore::new(
            vec![
                Node::new("a", "A"),
                Node::new("b", "B"),
                Node::new("c", "C"),
                Node::new("d", "D"),
                Node::new("e", "E"),
            ],
            vec![
                Edge::new("ab", "a", "b"),
                Edge::new("bc", "b", "c"),
                Edge::new("cd", "c", "d"),
            ],
        )
        .unwrap()
    }

    fn ids(ds: &Dataset) -> Vec<&str> {
        ds.ids().map(ElementId::as_str).collect()
    }

    #[test]
    fn test_skips_edges_with_unknown_endpoints() {
        let store = GraphStore::new(
            vec![Node::new("a", "A")],
            vec![Edge::new("ax", "a", "x")],
        )
        .unwrap();
        assert_eq!(store.stats()["total_edges"], json!(0));
        assert!(store.element("ax").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = GraphStore::new(
            vec![Node::new("a", "A")],
            vec![Edge::new("a", "a", "a")],
        )
        .err()
        .unwrap();
        assert!(matches!(err, CoreError::DuplicateId { .. }));
    }

    #[test]
    fn test_sample_one_hop_from_node() {
        let store = chain();
        let ds = store.sample(&["b".into()], 1, true);
        assert_eq!(ids(&ds), vec!["a", "b", "c", "ab", "bc"]);
        assert_eq!(ds.highlighted_ids(), vec![ElementId::from("b")]);
    }

    #[test]
    fn test_sample_from_edge_center() {
        let store = chain();
        let ds = store.sample(&["cd".into()], 0, true);
        assert_eq!(ids(&ds), vec!["c", "d", "cd"]);
        assert_eq!(ds.highlighted_ids(), vec![ElementId::from("cd")]);
    }

    #[test]
    fn test_default_center_is_highest_degree() {
        let store = chain();
        let ds = store.sample(&[], 0, false);
        assert_eq!(ids(&ds), vec!["b"]);
        assert!(ds.highlighted_ids().is_empty());
    }

    #[test]
    fn test_unknown_centers_give_empty_sample() {
        let store = chain();
        let ds = store.sample(&["zz".into()], 2, false);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_stats_and_degree() {
        let store = chain();
        let stats = store.stats();
        assert_eq!(stats["total_nodes"], json!(5));
        assert_eq!(stats["total_edges"], json!(3));
        assert_eq!(stats["avg_degree"], json!(1.2));
        assert_eq!(store.degree("b"), Some(2));
        assert_eq!(store.degree("e"), Some(0));
    }

    #[test]
    fn test_paginate_edges() {
        let store = chain();
        let page = store.paginate(ElementKind::Edge, 1, 2).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "cd");
        assert_eq!(page.items[0].kind, ElementKind::Edge);
        assert!(!page.has_next);
        assert!(store.paginate(ElementKind::Hyperedge, 0, 10).is_none());
    }
}
