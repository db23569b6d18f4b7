//! Sample data for demonstration purposes.

use ontosight_core::{Dataset, Document, Hyperedge, HypergraphData, Node};
use serde_json::json;

/// A small co-authorship hypergraph.
pub fn create_sample_document() -> Document {
    let people = [
        ("ada", "Ada Lovelace", "math"),
        ("alan", "Alan Turing", "math"),
        ("grace", "Grace Hopper", "compilers"),
        ("john", "John Backus", "compilers"),
        ("barbara", "Barbara Liskov", "languages"),
        ("edsger", "Edsger Dijkstra", "algorithms"),
        ("donald", "Donald Knuth", "algorithms"),
        ("tony", "Tony Hoare", "languages"),
    ];

    let nodes = people
        .iter()
        .map(|(id, name, field)| {
            let mut node = Node::new(*id, *name);
            node.data.insert("field".into(), json!(field));
            node
        })
        .collect();

    let hyperedges = vec![
        paper("p1", "On Computable Numbers", &["ada", "alan"], 1936),
        paper("p2", "Compiler Design", &["grace", "john", "barbara"], 1957),
        paper("p3", "Structured Programming", &["edsger", "tony", "donald"], 1972),
        paper("p4", "Program Correctness", &["tony", "barbara", "edsger"], 1974),
        paper("p5", "Literate Algorithms", &["donald", "alan"], 1984),
    ];

    let mut document = Document::from_dataset(Dataset::Hypergraph(HypergraphData {
        nodes,
        edges: Vec::new(),
        hyperedges,
    }));
    document.schemas = json!({
        "node": {"field": "string"},
        "hyperedge": {"year": "integer"},
    });
    document
}

fn paper(id: &str, title: &str, authors: &[&str], year: u32) -> Hyperedge {
    let mut hyperedge = Hyperedge::new(id, title, authors.iter().copied());
    hyperedge.data.insert("year".into(), json!(year));
    hyperedge
}

/// Simple pseudo-random number generator for WASM compatibility.
pub fn rand_simple() -> f32 {
    use std::cell::Cell;
    thread_local! {
        static SEED: Cell<u64> = const { Cell::new(12345) };
    }
    SEED.with(|seed| {
        let mut s = seed.get();
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        seed.set(s);
        (s as f32) / (u64::MAX as f32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontosight_core::VizKind;

    #[test]
    fn test_sample_document_loads() {
        let storage = create_sample_document().into_storage().unwrap();
        assert_eq!(storage.kind(), VizKind::Hypergraph);
        assert_eq!(storage.elements().len(), 8 + 5);
    }

    #[test]
    fn test_rand_simple_in_unit_range() {
        for _ in 0..100 {
            let v = rand_simple();
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
