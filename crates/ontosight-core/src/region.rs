//! Membership regions ("bubbles") drawn around hyperedge members.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ElementId, Hyperedge};
use crate::visual::VisualState;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Fill and stroke of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionColor {
    pub fill: Rgb,
    pub stroke: Rgb,
}

const fn pair(fill: Rgb, stroke: Rgb) -> RegionColor {
    RegionColor { fill, stroke }
}

/// Cyclic base palette, indexed by hyperedge position.
pub const PALETTE: [RegionColor; 10] = [
    pair(Rgb(147, 197, 253), Rgb(37, 99, 235)),
    pair(Rgb(134, 239, 172), Rgb(22, 163, 74)),
    pair(Rgb(253, 186, 116), Rgb(234, 88, 12)),
    pair(Rgb(216, 180, 254), Rgb(147, 51, 234)),
    pair(Rgb(252, 165, 165), Rgb(220, 38, 38)),
    pair(Rgb(103, 232, 249), Rgb(8, 145, 178)),
    pair(Rgb(253, 224, 71), Rgb(202, 138, 4)),
    pair(Rgb(249, 168, 212), Rgb(219, 39, 119)),
    pair(Rgb(165, 180, 252), Rgb(79, 70, 229)),
    pair(Rgb(190, 242, 100), Rgb(101, 163, 13)),
];

pub const SELECTED_COLOR: RegionColor = pair(Rgb(56, 189, 248), Rgb(2, 132, 199));
pub const HIGHLIGHTED_COLOR: RegionColor = pair(Rgb(250, 204, 21), Rgb(217, 119, 6));

pub const NORMAL_FILL_OPACITY: f32 = 0.12;
pub const NORMAL_STROKE_OPACITY: f32 = 0.5;
pub const ACTIVE_FILL_OPACITY: f32 = 0.3;
pub const ACTIVE_STROKE_OPACITY: f32 = 0.95;

pub fn palette_color(index: usize) -> RegionColor {
    PALETTE[index % PALETTE.len()]
}

/// Region descriptor handed to the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Tag used to map clicks back to the hyperedge.
    pub hyperedge_id: ElementId,
    pub members: Vec<ElementId>,
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub stroke: Rgb,
    pub stroke_opacity: f32,
    pub label: String,
    pub state: VisualState,
}

/// Build the region of the hyperedge at `index` in the dataset's list.
pub fn build_region(index: usize, hyperedge: &Hyperedge, state: VisualState) -> Region {
    let (color, fill_opacity, stroke_opacity) = match state {
        VisualState::Normal => (
            palette_color(index),
            NORMAL_FILL_OPACITY,
            NORMAL_STROKE_OPACITY,
        ),
        VisualState::Selected => (SELECTED_COLOR, ACTIVE_FILL_OPACITY, ACTIVE_STROKE_OPACITY),
        VisualState::Highlighted => (
            HIGHLIGHTED_COLOR,
            ACTIVE_FILL_OPACITY,
            ACTIVE_STROKE_OPACITY,
        ),
    };

    Region {
        hyperedge_id: hyperedge.id.clone(),
        members: hyperedge.node_set.clone(),
        fill: color.fill,
        fill_opacity,
        stroke: color.stroke,
        stroke_opacity,
        label: hyperedge.label.clone(),
        state,
    }
}

/// Build regions for every hyperedge, asking `state_of` for each one's state.
pub fn build_regions<F>(hyperedges: &[Hyperedge], state_of: F) -> Vec<Region>
where
    F: Fn(&ElementId) -> VisualState,
{
    hyperedges
        .iter()
        .enumerate()
        .map(|(index, he)| build_region(index, he, state_of(&he.id)))
        .collect()
}

/// Map a clicked region back to a hyperedge id.
///
/// A tag naming a known hyperedge wins. Otherwise the member list is compared
/// by set equality; when several hyperedges share the same node set the first
/// one in list order is returned.
pub fn hit_test(
    hyperedges: &[Hyperedge],
    tag: Option<&str>,
    members: &[ElementId],
) -> Option<ElementId> {
    if let Some(tag) = tag {
        if let Some(he) = hyperedges.iter().find(|h| h.id.as_str() == tag) {
            return Some(he.id.clone());
        }
    }

    let mut matches = hyperedges.iter().filter(|h| h.has_members(members));
    let first = matches.next()?;
    let others = matches.count();
    if others > 0 {
        debug!(
            hyperedge = %first.id,
            ambiguous = others + 1,
            "Region hit-test matched several hyperedges with the same node set"
        );
    }
    Some(first.id.clone())
}
