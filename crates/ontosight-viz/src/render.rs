//! Node/edge/region rendering helpers.
//!
//! Pure functions over screen-space points so the egui engine stays a thin
//! painting loop.

use egui::{Color32, Pos2, Stroke, Vec2};
use ontosight_core::{CurveType, EdgeGeometry, Rgb, VisualState};

/// Points sampled along a curved edge.
pub const CURVE_SEGMENTS: usize = 16;

/// Points used to approximate each member's padding circle in a region hull.
const HULL_CIRCLE_POINTS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct NodeVisuals {
    pub radius: f32,
    pub fill: Color32,
    pub stroke: Stroke,
}

pub fn base_node_radius(zoom: f32) -> f32 {
    (5.0 * zoom).clamp(3.0, 14.0)
}

pub fn resolve_node_visuals(state: VisualState, zoom: f32, dark_mode: bool) -> NodeVisuals {
    let base_radius = base_node_radius(zoom);
    match state {
        VisualState::Normal => NodeVisuals {
            radius: base_radius,
            fill: node_base_color(dark_mode),
            stroke: Stroke::NONE,
        },
        VisualState::Highlighted => NodeVisuals {
            radius: base_radius * 1.2,
            fill: highlight_color(dark_mode),
            stroke: Stroke::new(2.0, highlight_color(dark_mode)),
        },
        VisualState::Selected => NodeVisuals {
            radius: base_radius * 1.4,
            fill: selection_color(dark_mode),
            stroke: Stroke::new(3.0, selection_color(dark_mode)),
        },
    }
}

pub fn resolve_edge_stroke(state: VisualState, dark_mode: bool) -> Stroke {
    match state {
        VisualState::Normal => Stroke::new(1.0, edge_base_color(dark_mode)),
        VisualState::Highlighted => Stroke::new(2.0, highlight_color(dark_mode)),
        VisualState::Selected => Stroke::new(3.0, selection_color(dark_mode)),
    }
}

/// Region colour at the given opacity.
pub fn region_color(rgb: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
}

fn node_base_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(100, 140, 180)
    } else {
        Color32::from_rgb(60, 100, 140)
    }
}

fn selection_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(0, 212, 255)
    } else {
        Color32::from_rgb(0, 150, 200)
    }
}

fn highlight_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(255, 200, 0)
    } else {
        Color32::from_rgb(217, 119, 6)
    }
}

fn edge_base_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgba_unmultiplied(120, 120, 140, 120)
    } else {
        Color32::from_rgba_unmultiplied(100, 100, 120, 140)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Screen polyline of an edge.
///
/// `offset` is in screen units. The bend direction is taken relative to the
/// canonical orientation of the pair, so `reversed` must be true when the
/// edge runs from the larger to the smaller endpoint id.
pub fn edge_polyline(from: Pos2, to: Pos2, geometry: EdgeGeometry, offset: f32, reversed: bool) -> Vec<Pos2> {
    if geometry.curve == CurveType::Line || offset == 0.0 {
        return vec![from, to];
    }
    let (a, b) = if reversed { (to, from) } else { (from, to) };
    let dir = b - a;
    let len = dir.length();
    if len <= f32::EPSILON {
        return vec![from, to];
    }

    let normal = Vec2::new(-dir.y, dir.x) / len;
    // A quadratic curve peaks at half its control point's displacement.
    let control = from + (to - from) * 0.5 + normal * offset * 2.0;

    (0..=CURVE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            Pos2::new(
                u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
                u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
            )
        })
        .collect()
}

/// Convex hull (monotone chain), counter-clockwise without repeats.
pub fn convex_hull(points: &[Pos2]) -> Vec<Pos2> {
    let mut pts: Vec<Pos2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Pos2> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Pos2> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Padded outline around a set of member positions.
pub fn region_outline(members: &[Pos2], padding: f32) -> Vec<Pos2> {
    let padding = padding.max(1.0);
    let ring: Vec<Pos2> = members
        .iter()
        .flat_map(|&center| {
            (0..HULL_CIRCLE_POINTS).map(move |i| {
                let angle = i as f32 / HULL_CIRCLE_POINTS as f32 * std::f32::consts::TAU;
                center + Vec2::angled(angle) * padding
            })
        })
        .collect();
    convex_hull(&ring)
}

/// Ray-casting point-in-polygon test.
pub fn polygon_contains(polygon: &[Pos2], point: Pos2) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn polygon_area(polygon: &[Pos2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum * 0.5).abs()
}

pub fn distance_to_polyline(points: &[Pos2], p: Pos2) -> f32 {
    points
        .windows(2)
        .map(|w| distance_to_segment(w[0], w[1], p))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn curve(offset: f32) -> EdgeGeometry {
        EdgeGeometry {
            curve: CurveType::Curve,
            offset,
        }
    }

    #[test]
    fn test_straight_edge_has_two_points() {
        let line = edge_polyline(pos2(0.0, 0.0), pos2(10.0, 0.0), EdgeGeometry::STRAIGHT, 0.0, false);
        assert_eq!(line, vec![pos2(0.0, 0.0), pos2(10.0, 0.0)]);
    }

    #[test]
    fn test_curve_peaks_at_offset() {
        let points = edge_polyline(pos2(0.0, 0.0), pos2(100.0, 0.0), curve(15.0), 15.0, false);
        let mid = points[CURVE_SEGMENTS / 2];
        assert!((mid.x - 50.0).abs() < 1e-3);
        assert!((mid.y - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_opposite_offsets_bend_to_opposite_sides() {
        let a = pos2(0.0, 0.0);
        let b = pos2(100.0, 0.0);
        let up = edge_polyline(a, b, curve(15.0), 15.0, false)[CURVE_SEGMENTS / 2];
        let down = edge_polyline(a, b, curve(-15.0), -15.0, false)[CURVE_SEGMENTS / 2];
        assert!(up.y > 0.0 && down.y < 0.0);
    }

    #[test]
    fn test_reversed_edge_uses_canonical_side() {
        let a = pos2(0.0, 0.0);
        let b = pos2(100.0, 0.0);
        let forward = edge_polyline(a, b, curve(15.0), 15.0, false)[CURVE_SEGMENTS / 2];
        let backward = edge_polyline(b, a, curve(15.0), 15.0, true)[CURVE_SEGMENTS / 2];
        assert!((forward.y - backward.y).abs() < 1e-3);
    }

    #[test]
    fn test_region_outline_contains_members() {
        let members = [pos2(0.0, 0.0), pos2(50.0, 0.0), pos2(25.0, 40.0)];
        let outline = region_outline(&members, 10.0);
        for m in members {
            assert!(polygon_contains(&outline, m));
        }
        assert!(!polygon_contains(&outline, pos2(200.0, 200.0)));
    }

    #[test]
    fn test_single_member_region_is_a_disc() {
        let outline = region_outline(&[pos2(5.0, 5.0)], 10.0);
        assert_eq!(outline.len(), HULL_CIRCLE_POINTS);
        assert!(polygon_contains(&outline, pos2(5.0, 5.0)));
        assert!(polygon_area(&outline) > 250.0);
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = [pos2(0.0, 0.0), pos2(10.0, 0.0)];
        assert!((distance_to_polyline(&line, pos2(5.0, 3.0)) - 3.0).abs() < 1e-5);
        assert!((distance_to_polyline(&line, pos2(13.0, 4.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_selected_nodes_grow() {
        let normal = resolve_node_visuals(VisualState::Normal, 1.0, true);
        let selected = resolve_node_visuals(VisualState::Selected, 1.0, true);
        assert!(selected.radius > normal.radius);
        assert_eq!(normal.stroke, Stroke::NONE);
    }
}
