//! Source documents loaded from disk or handed in by an embedding page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::model::{Dataset, Edge, Hyperedge, Item, Node, VizKind};
use crate::storage::{GraphStore, HypergraphStore, ListStore, Storage};

/// A full, unsampled dataset together with its declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub kind: VizKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperedges: Option<Vec<Hyperedge>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    /// Opaque schema description passed through to `meta`.
    #[serde(default)]
    pub schemas: Value,
}

impl Document {
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Wrap an already-shaped dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let kind = dataset.kind();
        let mut doc = Self {
            kind,
            nodes: None,
            edges: None,
            hyperedges: None,
            items: None,
            schemas: Value::Null,
        };
        match dataset {
            Dataset::Graph(g) => {
                doc.nodes = Some(g.nodes);
                doc.edges = Some(g.edges);
            }
            Dataset::Hypergraph(h) => {
                doc.nodes = Some(h.nodes);
                doc.hyperedges = Some(h.hyperedges);
            }
            Dataset::List(l) => doc.items = Some(l.items),
        }
        doc
    }

    /// Build the storage engine matching the declared kind.
    pub fn into_storage(self) -> CoreResult<Box<dyn Storage>> {
        let kind = self.kind;
        let missing = move |field| CoreError::KindMismatch {
            expected: kind,
            field,
        };
        match kind {
            VizKind::Graph => {
                let nodes = self.nodes.ok_or_else(|| missing("nodes"))?;
                let edges = self.edges.unwrap_or_default();
                Ok(Box::new(GraphStore::new(nodes, edges)?))
            }
            VizKind::Hypergraph => {
                let nodes = self.nodes.ok_or_else(|| missing("nodes"))?;
                let hyperedges = self.hyperedges.ok_or_else(|| missing("hyperedges"))?;
                Ok(Box::new(HypergraphStore::new(nodes, hyperedges)?))
            }
            VizKind::List => {
                let items = self.items.ok_or_else(|| missing("items"))?;
                Ok(Box::new(ListStore::new(items)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_document_builds_graph_store() {
        let doc = Document::from_json(
            &json!({
                "type": "graph",
                "nodes": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
                "edges": [{"id": "e", "source": "a", "target": "b"}]
            })
            .to_string(),
        )
        .unwrap();
        let store = doc.into_storage().unwrap();
        assert_eq!(store.kind(), VizKind::Graph);
        assert!(store.contains("e"));
    }

    #[test]
    fn test_missing_field_is_kind_mismatch() {
        let doc = Document::from_json(r#"{"type": "hypergraph", "nodes": []}"#).unwrap();
        let err = doc.into_storage().err().unwrap();
        assert!(matches!(
            err,
            CoreError::KindMismatch {
                field: "hyperedges",
                ..
            }
        ));
    }
}
