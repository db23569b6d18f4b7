use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{ensure_unique, page_of, to_stats, Storage};
use crate::error::{CoreError, CoreResult};
use crate::model::{
    Dataset, Edge, Element, ElementId, ElementKind, Hyperedge, HypergraphData, ListEntry, Node,
    Paginated, VizKind,
};

/// Storage for hypergraphs.
///
/// Node degree is the number of hyperedges containing the node.
pub struct HypergraphStore {
    nodes: Vec<Node>,
    hyperedges: Vec<Hyperedge>,
    node_pos: HashMap<ElementId, usize>,
    hyperedge_pos: HashMap<ElementId, usize>,
    /// Hyperedge positions containing each node, by node position.
    incidence: Vec<Vec<usize>>,
    /// Member node positions, by hyperedge position.
    members: Vec<Vec<usize>>,
}

impl HypergraphStore {
    /// Build the store.
    ///
    /// Members that are not known nodes are dropped; a hyperedge left with no
    /// members is skipped. A hyperedge naming the same node twice is rejected.
    pub fn new(nodes: Vec<Node>, hyperedges: Vec<Hyperedge>) -> CoreResult<Self> {
        ensure_unique(
            nodes
                .iter()
                .map(|n| &n.id)
                .chain(hyperedges.iter().map(|h| &h.id)),
        )?;

        let node_pos: HashMap<ElementId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(pos, n)| (n.id.clone(), pos))
            .collect();

        let mut kept = Vec::with_capacity(hyperedges.len());
        let mut members = Vec::with_capacity(hyperedges.len());
        let mut incidence = vec![Vec::new(); nodes.len()];

        for mut he in hyperedges {
            if he.node_set.is_empty() {
                return Err(CoreError::EmptyHyperedge { id: he.id });
            }
            let mut seen = HashSet::new();
            for member in &he.node_set {
                if !seen.insert(member) {
                    return Err(CoreError::DuplicateMember {
                        id: he.id.clone(),
                        node: member.clone(),
                    });
                }
            }

            let before = he.node_set.len();
            he.node_set.retain(|m| node_pos.contains_key(m));
            if he.node_set.len() != before {
                warn!(
                    hyperedge = %he.id,
                    dropped = before - he.node_set.len(),
                    "Dropping unknown hyperedge members"
                );
            }
            if he.node_set.is_empty() {
                warn!(hyperedge = %he.id, "Skipping hyperedge with no valid members");
                continue;
            }

            let position = kept.len();
            let member_pos: Vec<usize> = he.node_set.iter().map(|m| node_pos[m]).collect();
            for &m in &member_pos {
                incidence[m].push(position);
            }
            members.push(member_pos);
            kept.push(he);
        }

        let hyperedge_pos = kept
            .iter()
            .enumerate()
            .map(|(pos, h)| (h.id.clone(), pos))
            .collect();

        info!(
            nodes = nodes.len(),
            hyperedges = kept.len(),
            "Hypergraph store initialized"
        );

        Ok(Self {
            nodes,
            hyperedges: kept,
            node_pos,
            hyperedge_pos,
            incidence,
            members,
        })
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.node_pos.get(id).map(|&pos| self.incidence[pos].len())
    }

    fn default_center(&self) -> Option<usize> {
        self.incidence
            .iter()
            .enumerate()
            .filter(|(_, inc)| !inc.is_empty())
            .fold(None, |best: Option<(usize, usize)>, (pos, inc)| match best {
                Some((_, best_d)) if best_d >= inc.len() => best,
                _ => Some((pos, inc.len())),
            })
            .map(|(pos, _)| pos)
    }

    /// Star-shaped layout edges from the lowest-degree member to the others.
    fn layout_edges(&self, hyperedge: usize) -> Vec<Edge> {
        let members = &self.members[hyperedge];
        let Some(&hub) = members.iter().min_by_key(|&&m| self.incidence[m].len()) else {
            return Vec::new();
        };
        let he_id = &self.hyperedges[hyperedge].id;
        let hub_id = &self.nodes[hub].id;
        members
            .iter()
            .filter(|&&m| m != hub)
            .map(|&m| {
                let target = &self.nodes[m].id;
                Edge::new(format!("{he_id}::{target}"), hub_id.clone(), target.clone())
            })
            .collect()
    }
}

impl Storage for HypergraphStore {
    fn kind(&self) -> VizKind {
        VizKind::Hypergraph
    }

    fn element(&self, id: &str) -> Option<Element> {
        if let Some(&pos) = self.node_pos.get(id) {
            return Some(Element::Node(self.nodes[pos].clone()));
        }
        self.hyperedge_pos
            .get(id)
            .map(|&pos| Element::Hyperedge(self.hyperedges[pos].clone()))
    }

    fn stats(&self) -> Map<String, Value> {
        let incidences: usize = self.members.iter().map(Vec::len).sum();
        let avg = |count: usize| {
            if count == 0 {
                0.0
            } else {
                incidences as f64 / count as f64
            }
        };
        to_stats(json!({
            "total_nodes": self.nodes.len(),
            "total_hyperedges": self.hyperedges.len(),
            "avg_node_degree": avg(self.nodes.len()),
            "avg_hyperedge_degree": avg(self.hyperedges.len()),
        }))
    }

    fn sample(&self, center_ids: &[ElementId], hops: usize, highlight_center: bool) -> Dataset {
        let mut visited_nodes = BTreeSet::new();
        let mut visited_hyperedges = BTreeSet::new();
        let mut center_nodes = BTreeSet::new();
        let mut center_hyperedges = BTreeSet::new();

        if center_ids.is_empty() {
            if let Some(pos) = self.default_center() {
                visited_nodes.insert(pos);
            }
        }

        for id in center_ids {
            if let Some(&pos) = self.node_pos.get(id) {
                visited_nodes.insert(pos);
                center_nodes.insert(pos);
            } else if let Some(&pos) = self.hyperedge_pos.get(id) {
                visited_hyperedges.insert(pos);
                center_hyperedges.insert(pos);
                visited_nodes.extend(self.members[pos].iter().copied());
            }
        }

        if visited_nodes.is_empty() {
            return Dataset::empty(VizKind::Hypergraph);
        }

        let mut frontier: Vec<usize> = visited_nodes.iter().copied().collect();
        for _ in 0..hops {
            let mut next = Vec::new();
            for &pos in &frontier {
                for &he in &self.incidence[pos] {
                    if !visited_hyperedges.insert(he) {
                        continue;
                    }
                    for &m in &self.members[he] {
                        if visited_nodes.insert(m) {
                            next.push(m);
                        }
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
        let hyperedges = visited_hyperedges
            .iter()
            .map(|&pos| {
                let mut he = self.hyperedges[pos].clone();
                he.highlighted = highlight_center && center_hyperedges.contains(&pos);
                he
            })
            .collect();
        let edges = visited_hyperedges
            .iter()
            .flat_map(|&pos| self.layout_edges(pos))
            .collect();

        let data = HypergraphData {
            nodes,
            edges,
            hyperedges,
        };
        info!(
            nodes = data.nodes.len(),
            hyperedges = data.hyperedges.len(),
            layout_edges = data.edges.len(),
            "Hypergraph sample"
        );
        Dataset::Hypergraph(data)
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
            ElementKind::Hyperedge => Some(page_of(
                self.hyperedges.iter().cloned().map(Element::Hyperedge),
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
            .chain(self.hyperedges.iter().cloned().map(Element::Hyperedge))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HypergraphStore {
        HypergraphStore::new(
            vec![
                Node::new("a", "A"),
                Node::new("b", "B"),
                Node::new("c", "C"),
                Node::new("d", "D"),
            ],
            vec![
                Hyperedge::new("h1", "team", ["a", "b", "c"]),
                Hyperedge::new("h2", "pair", ["c", "d"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let err = HypergraphStore::new(
            vec![Node::new("a", "A")],
            vec![Hyperedge::new("h", "H", ["a", "a"])],
        )
        .err()
        .unwrap();
        assert!(matches!(err, CoreError::DuplicateMember { .. }));
    }

    #[test]
    fn test_unknown_members_dropped_and_empty_skipped() {
        let store = HypergraphStore::new(
            vec![Node::new("a", "A")],
            vec![
                Hyperedge::new("h1", "H1", ["a", "ghost"]),
                Hyperedge::new("h2", "H2", ["ghost"]),
            ],
        )
        .unwrap();
        match store.element("h1") {
            Some(Element::Hyperedge(h)) => assert_eq!(h.node_set, vec![ElementId::from("a")]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.element("h2").is_none());
    }

    #[test]
    fn test_sample_from_hyperedge_center() {
        let ds = store().sample(&["h2".into()], 0, true);
        let ids: Vec<&str> = ds.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
        assert_eq!(ds.highlighted_ids(), vec![ElementId::from("h2")]);
        assert_eq!(ds.edges().len(), 1);
    }

    #[test]
    fn test_sample_expands_through_hyperedges() {
        let ds = store().sample(&["a".into()], 2, false);
        assert_eq!(ds.nodes().len(), 4);
        assert_eq!(ds.hyperedges().len(), 2);
    }

    #[test]
    fn test_layout_edges_star_from_lowest_degree_member() {
        let ds = store().sample(&["h1".into()], 0, false);
        let edges = ds.edges();
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.source.as_str() == "a"));
        assert_eq!(edges[0].id.as_str(), "h1::b");
    }

    #[test]
    fn test_default_center_and_stats() {
        let store = store();
        let ds = store.sample(&[], 0, false);
        assert_eq!(ds.nodes()[0].id.as_str(), "c");
        let stats = store.stats();
        assert_eq!(stats["total_hyperedges"], json!(2));
        assert_eq!(stats["avg_hyperedge_degree"], json!(2.5));
        assert_eq!(stats["avg_node_degree"], json!(1.25));
    }
}
