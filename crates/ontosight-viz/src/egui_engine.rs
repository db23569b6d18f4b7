//! Force-directed egui engine built on `egui_graphs`.
//!
//! `egui_graphs` owns node positions and the layout simulation. Edges,
//! hyperedge regions and state markers are painted on top each frame from
//! the engine's own descriptors, so state patches never touch the layout.

use std::collections::HashMap;

use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Vec2};
use egui_graphs::{
    FruchtermanReingoldWithCenterGravity, FruchtermanReingoldWithCenterGravityState, Graph,
    GraphView, LayoutForceDirected, MetadataFrame,
};
use ontosight_core::{ElementId, Region, VisualState};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use tracing::{debug, warn};

use crate::engine::{
    EngineError, EngineEvent, EngineFactory, EventSink, MountTarget, RenderEngine,
};
use crate::render::{
    base_node_radius, distance_to_polyline, edge_polyline, polygon_area, polygon_contains,
    region_color, region_outline, resolve_edge_stroke, resolve_node_visuals,
};
use crate::sample::rand_simple;
use crate::scene::{EdgeDescriptor, NodeDescriptor, Scene, StatePatch};
use crate::settings::ViewSettings;

// Type aliases for Force-Directed layout with Center Gravity
type ForceLayout = LayoutForceDirected<FruchtermanReingoldWithCenterGravity>;
type ForceState = FruchtermanReingoldWithCenterGravityState;

/// Spread of the random start positions of unplaced nodes.
const INITIAL_SPREAD: f32 = 200.0;

/// Extra screen px around a node or edge that still counts as a hit.
const HIT_SLOP: f32 = 4.0;

pub struct EguiEngine {
    sink: EventSink,
    mount: MountTarget,
    graph: Graph<(), ()>,
    node_index: HashMap<ElementId, NodeIndex>,
    nodes: Vec<NodeDescriptor>,
    edges: Vec<EdgeDescriptor>,
    regions: Vec<Region>,
    states: HashMap<ElementId, VisualState>,
    render_pending: bool,
    restart_layout: bool,
    last_size: Option<Vec2>,
    press_origin: Option<Pos2>,
    destroyed: bool,
}

impl EguiEngine {
    fn new(mount: MountTarget, sink: EventSink) -> Self {
        Self {
            sink,
            mount,
            graph: Graph::from(&StableDiGraph::<(), ()>::new()),
            node_index: HashMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            regions: Vec::new(),
            states: HashMap::new(),
            render_pending: false,
            restart_layout: false,
            last_size: None,
            press_origin: None,
            destroyed: false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mount(&self) -> &MountTarget {
        &self.mount
    }

    fn state_of(&self, id: &ElementId) -> VisualState {
        self.states.get(id).copied().unwrap_or_default()
    }

    /// Paint the engine into `ui` and translate pointer input into events.
    pub fn show(&mut self, ui: &mut egui::Ui, settings: &ViewSettings) {
        if self.destroyed {
            return;
        }

        let size = ui.available_size();
        if self.last_size != Some(size) {
            self.last_size = Some(size);
            self.sink.emit(EngineEvent::Resized {
                width: size.x,
                height: size.y,
            });
        }

        if std::mem::take(&mut self.restart_layout) {
            let mut state = egui_graphs::get_layout_state::<ForceState>(ui, None);
            state.base.is_running = true;
            egui_graphs::set_layout_state::<ForceState>(ui, state, None);
        }

        let settings_interaction = egui_graphs::SettingsInteraction::new()
            .with_dragging_enabled(settings.interaction.dragging_enabled)
            .with_hover_enabled(settings.interaction.hover_enabled);

        let settings_navigation = egui_graphs::SettingsNavigation::new()
            .with_fit_to_screen_enabled(settings.navigation.fit_to_screen_enabled)
            .with_zoom_and_pan_enabled(settings.navigation.zoom_and_pan_enabled)
            .with_zoom_speed(settings.navigation.zoom_speed)
            .with_fit_to_screen_padding(settings.navigation.fit_to_screen_padding);

        // Edges and node outlines are painted by the overlay below.
        let settings_style = egui_graphs::SettingsStyle::new()
            .with_labels_always(settings.style.labels_always)
            .with_node_stroke_hook(|_selected, _dragged, _color, _stroke, _style| Stroke::NONE)
            .with_edge_stroke_hook(|_selected, _order, _stroke, _style| Stroke::NONE);

        let graph_response = ui.add(
            &mut GraphView::<_, _, _, _, _, _, ForceState, ForceLayout>::new(&mut self.graph)
                .with_interactions(&settings_interaction)
                .with_navigations(&settings_navigation)
                .with_styles(&settings_style),
        );
        let graph_rect = graph_response.rect;

        let meta = MetadataFrame::new(None).load(ui);
        let to_screen = |canvas_pos: Pos2| {
            let widget_relative = meta.canvas_to_screen_pos(canvas_pos);
            egui::pos2(
                widget_relative.x + graph_rect.min.x,
                widget_relative.y + graph_rect.min.y,
            )
        };
        let zoom = (to_screen(egui::pos2(1.0, 0.0)) - to_screen(egui::pos2(0.0, 0.0))).x;

        let positions: HashMap<ElementId, Pos2> = self
            .node_index
            .iter()
            .filter_map(|(id, idx)| {
                self.graph
                    .node(*idx)
                    .map(|n| (id.clone(), to_screen(n.location())))
            })
            .collect();

        let frame = FrameGeometry::new(self, &positions, zoom, settings);
        frame.paint(ui.painter_at(graph_rect), self, &positions, zoom, settings);
        self.handle_pointer(ui, graph_rect, &frame, &positions, zoom, settings);

        if std::mem::take(&mut self.render_pending) {
            debug!(nodes = self.nodes.len(), "First frame painted");
            self.sink.emit(EngineEvent::RenderComplete);
            ui.ctx().request_repaint();
        }
    }

    fn handle_pointer(
        &mut self,
        ui: &egui::Ui,
        rect: Rect,
        frame: &FrameGeometry,
        positions: &HashMap<ElementId, Pos2>,
        zoom: f32,
        settings: &ViewSettings,
    ) {
        let pointer = ui.input(|i| i.pointer.clone());
        if pointer.primary_pressed() {
            self.press_origin = pointer.hover_pos().filter(|pos| rect.contains(*pos));
        }
        if !pointer.primary_released() {
            return;
        }
        let Some(origin) = self.press_origin.take() else {
            return;
        };
        let Some(pos) = pointer.hover_pos() else {
            return;
        };
        if origin.distance(pos) > settings.interaction.click_tolerance {
            return;
        }

        let event = self
            .hit_node(positions, pos, zoom)
            .map(EngineEvent::NodeClicked)
            .or_else(|| frame.hit_edge(pos).map(EngineEvent::EdgeClicked))
            .or_else(|| {
                frame.hit_region(pos).map(|region| EngineEvent::RegionClicked {
                    tag: Some(region.hyperedge_id.to_string()),
                    members: region.members.clone(),
                })
            })
            .unwrap_or(EngineEvent::CanvasClicked);
        self.sink.emit(event);
    }

    fn hit_node(&self, positions: &HashMap<ElementId, Pos2>, pos: Pos2, zoom: f32) -> Option<ElementId> {
        let radius = base_node_radius(zoom) * 1.4 + HIT_SLOP;
        self.nodes
            .iter()
            .filter_map(|n| positions.get(&n.id).map(|p| (n, p.distance(pos))))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n.id.clone())
    }
}

/// Screen-space shapes of one frame, shared by painting and hit-testing.
struct FrameGeometry {
    edges: Vec<(ElementId, Vec<Pos2>)>,
    /// Regions with their outline, smallest area first.
    regions: Vec<(Region, Vec<Pos2>)>,
}

impl FrameGeometry {
    fn new(
        engine: &EguiEngine,
        positions: &HashMap<ElementId, Pos2>,
        zoom: f32,
        settings: &ViewSettings,
    ) -> Self {
        let edges = engine
            .edges
            .iter()
            .filter(|e| !e.layout_only)
            .filter_map(|e| {
                let from = *positions.get(&e.source)?;
                let to = *positions.get(&e.target)?;
                let reversed = e.source > e.target;
                let points = edge_polyline(from, to, e.geometry, e.geometry.offset * zoom, reversed);
                Some((e.id.clone(), points))
            })
            .collect();

        let padding = settings.style.region_padding * zoom;
        let mut regions: Vec<(Region, Vec<Pos2>)> = engine
            .regions
            .iter()
            .filter_map(|region| {
                let members: Vec<Pos2> = region
                    .members
                    .iter()
                    .filter_map(|m| positions.get(m).copied())
                    .collect();
                (!members.is_empty()).then(|| (region.clone(), region_outline(&members, padding)))
            })
            .collect();
        regions.sort_by(|a, b| polygon_area(&a.1).total_cmp(&polygon_area(&b.1)));

        Self { edges, regions }
    }

    fn paint(
        &self,
        painter: egui::Painter,
        engine: &EguiEngine,
        positions: &HashMap<ElementId, Pos2>,
        zoom: f32,
        settings: &ViewSettings,
    ) {
        let dark_mode = settings.dark_mode;
        let text_color = if dark_mode {
            Color32::from_gray(220)
        } else {
            Color32::from_gray(40)
        };

        // Largest regions first so smaller ones stay visible on top.
        for (region, outline) in self.regions.iter().rev() {
            painter.add(Shape::convex_polygon(
                outline.clone(),
                region_color(region.fill, region.fill_opacity),
                Stroke::new(1.5, region_color(region.stroke, region.stroke_opacity)),
            ));
            if settings.style.show_region_labels {
                if let Some(top) = outline.iter().min_by(|a, b| a.y.total_cmp(&b.y)) {
                    painter.text(
                        *top - Vec2::new(0.0, 4.0),
                        Align2::CENTER_BOTTOM,
                        &region.label,
                        FontId::proportional(11.0),
                        region_color(region.stroke, 1.0),
                    );
                }
            }
        }

        let labels: HashMap<&ElementId, &str> = engine
            .edges
            .iter()
            .map(|e| (&e.id, e.label.as_str()))
            .collect();
        for (id, points) in &self.edges {
            let stroke = resolve_edge_stroke(engine.state_of(id), dark_mode);
            painter.add(Shape::line(points.clone(), stroke));
            if settings.style.show_edge_labels {
                let label = labels.get(id).copied().unwrap_or_default();
                if !label.is_empty() {
                    painter.text(
                        points[points.len() / 2],
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(10.0),
                        text_color,
                    );
                }
            }
        }

        for node in &engine.nodes {
            let Some(center) = positions.get(&node.id) else {
                continue;
            };
            let visuals = resolve_node_visuals(engine.state_of(&node.id), zoom, dark_mode);
            painter.circle_filled(*center, visuals.radius, visuals.fill);
            if visuals.stroke != Stroke::NONE {
                painter.circle_stroke(*center, visuals.radius + 2.0, visuals.stroke);
            }
        }
    }

    fn hit_edge(&self, pos: Pos2) -> Option<ElementId> {
        self.edges
            .iter()
            .map(|(id, points)| (id, distance_to_polyline(points, pos)))
            .filter(|(_, d)| *d <= HIT_SLOP)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.clone())
    }

    fn hit_region(&self, pos: Pos2) -> Option<&Region> {
        self.regions
            .iter()
            .find(|(_, outline)| polygon_contains(outline, pos))
            .map(|(region, _)| region)
    }
}

impl RenderEngine for EguiEngine {
    fn render(&mut self, scene: &Scene) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Render("engine already destroyed".into()));
        }

        let mut graph = StableDiGraph::<(), ()>::new();
        let mut node_index = HashMap::new();
        for node in &scene.nodes {
            node_index.insert(node.id.clone(), graph.add_node(()));
        }
        for edge in &scene.edges {
            match (node_index.get(&edge.source), node_index.get(&edge.target)) {
                (Some(&source), Some(&target)) => {
                    graph.add_edge(source, target, ());
                }
                _ => warn!(edge = %edge.id, "Edge endpoint not in scene, not laid out"),
            }
        }

        let mut egui_graph = Graph::from(&graph);
        for node in &scene.nodes {
            let Some(view) = node_index.get(&node.id).and_then(|idx| egui_graph.node_mut(*idx)) else {
                continue;
            };
            let location = match node.position {
                Some((x, y)) => egui::Pos2::new(x, y),
                None => egui::Pos2::new(
                    (rand_simple() - 0.5) * INITIAL_SPREAD * 2.0,
                    (rand_simple() - 0.5) * INITIAL_SPREAD * 2.0,
                ),
            };
            view.set_location(location);
            view.set_label(node.label.clone());
        }

        self.graph = egui_graph;
        self.node_index = node_index;
        self.nodes = scene.nodes.clone();
        self.edges = scene.edges.clone();
        self.regions = scene.regions.clone();
        self.states = scene.states();
        self.render_pending = true;
        self.restart_layout = true;
        Ok(())
    }

    fn apply_states(&mut self, patch: &StatePatch) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Patch("engine already destroyed".into()));
        }
        for (id, state) in &patch.changes {
            match self.states.get_mut(id) {
                Some(current) => *current = *state,
                None => debug!(%id, "State patch for unknown element"),
            }
        }
        if let Some(regions) = &patch.regions {
            self.regions = regions.clone();
        }
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.mount.width = width;
        self.mount.height = height;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.graph = Graph::from(&StableDiGraph::<(), ()>::new());
        self.node_index.clear();
        self.nodes.clear();
        self.edges.clear();
        self.regions.clear();
        self.states.clear();
        self.render_pending = false;
    }
}

/// Builds [`EguiEngine`]s.
#[derive(Debug, Default)]
pub struct EguiEngineFactory;

impl EngineFactory for EguiEngineFactory {
    type Engine = EguiEngine;

    fn create(&mut self, mount: &MountTarget, sink: EventSink) -> Result<EguiEngine, EngineError> {
        if mount.id.is_empty() {
            return Err(EngineError::Construction {
                mount: "<unnamed>".into(),
                message: "mount target has no id".into(),
            });
        }
        Ok(EguiEngine::new(mount.clone(), sink))
    }
}
