//! Curvature assignment for parallel edges.
//!
//! Edges are grouped by their unordered endpoint pair. A lone edge is drawn
//! straight; a group of `n` edges gets offsets `(i - mid) * CURVE_STEP` with
//! `mid = (n - 1) / 2`, so the group fans out symmetrically around the
//! straight path. Offsets are measured perpendicular to the segment running
//! from the lexicographically smaller endpoint to the larger one, which keeps
//! `A -> B` and `B -> A` edges from landing on the same curve.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Edge, ElementId};

/// Spacing between neighbouring curves of one group, in display units.
pub const CURVE_STEP: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    Line,
    Curve,
}

/// Geometry of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeGeometry {
    #[serde(rename = "curveType")]
    pub curve: CurveType,
    #[serde(rename = "curveOffset")]
    pub offset: f32,
}

impl EdgeGeometry {
    pub const STRAIGHT: EdgeGeometry = EdgeGeometry {
        curve: CurveType::Line,
        offset: 0.0,
    };

    fn with_offset(offset: f32) -> Self {
        if offset == 0.0 {
            Self::STRAIGHT
        } else {
            Self {
                curve: CurveType::Curve,
                offset,
            }
        }
    }
}

/// Unordered endpoint pair, smaller id first.
pub fn pair_key<'a>(source: &'a ElementId, target: &'a ElementId) -> (&'a ElementId, &'a ElementId) {
    if source <= target {
        (source, target)
    } else {
        (target, source)
    }
}

/// Offsets for a group of `n` parallel edges, in group order.
pub fn group_offsets(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![0.0; n];
    }
    let mid = (n as f32 - 1.0) / 2.0;
    (0..n).map(|i| (i as f32 - mid) * CURVE_STEP).collect()
}

/// Assign geometry to every edge of `edges`.
///
/// Groups keep the order in which their edges appear in the list.
pub fn compute_edge_geometry(edges: &[Edge]) -> HashMap<ElementId, EdgeGeometry> {
    let mut groups: HashMap<(&ElementId, &ElementId), Vec<&ElementId>> = HashMap::new();
    for edge in edges {
        groups
            .entry(pair_key(&edge.source, &edge.target))
            .or_default()
            .push(&edge.id);
    }

    let mut out = HashMap::with_capacity(edges.len());
    for members in groups.values() {
        for (id, offset) in members.iter().zip(group_offsets(members.len())) {
            out.insert((*id).clone(), EdgeGeometry::with_offset(offset));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry_of<'a>(
        map: &'a HashMap<ElementId, EdgeGeometry>,
        id: &str,
    ) -> &'a EdgeGeometry {
        map.get(id).unwrap()
    }

    #[test]
    fn test_two_parallel_edges() {
        let edges = vec![Edge::new("e1", "A", "B"), Edge::new("e2", "A", "B")];
        let geo = compute_edge_geometry(&edges);
        assert_eq!(geometry_of(&geo, "e1").offset, -15.0);
        assert_eq!(geometry_of(&geo, "e2").offset, 15.0);
        assert_eq!(geometry_of(&geo, "e1").curve, CurveType::Curve);
    }

    #[test]
    fn test_single_edge_is_straight() {
        let geo = compute_edge_geometry(&[Edge::new("e", "A", "B")]);
        assert_eq!(*geometry_of(&geo, "e"), EdgeGeometry::STRAIGHT);
    }

    #[test]
    fn test_reverse_direction_shares_group() {
        let edges = vec![
            Edge::new("e1", "A", "B"),
            Edge::new("e2", "B", "A"),
            Edge::new("e3", "A", "B"),
        ];
        let geo = compute_edge_geometry(&edges);
        assert_eq!(geometry_of(&geo, "e1").offset, -30.0);
        assert_eq!(*geometry_of(&geo, "e2"), EdgeGeometry::STRAIGHT);
        assert_eq!(geometry_of(&geo, "e3").offset, 30.0);
    }

    #[test]
    fn test_offsets_symmetric() {
        for n in 1..9 {
            let offsets = group_offsets(n);
            let sum: f32 = offsets.iter().sum();
            assert!(sum.abs() < 1e-3, "n = {n}");
            if n % 2 == 1 {
                assert!(offsets.contains(&0.0));
            }
        }
    }

    #[test]
    fn test_independent_groups() {
        let edges = vec![
            Edge::new("e1", "A", "B"),
            Edge::new("e2", "B", "C"),
            Edge::new("e3", "A", "B"),
        ];
        let geo = compute_edge_geometry(&edges);
        assert_eq!(*geometry_of(&geo, "e2"), EdgeGeometry::STRAIGHT);
        assert_eq!(geometry_of(&geo, "e1").offset, -15.0);
    }
}
