//! Main application state and rendering logic.

use eframe::{App, CreationContext};
use egui::{CollapsingHeader, Color32, Context, RichText, ScrollArea};
use egui_graphs::FruchtermanReingoldWithCenterGravityState;
use ontosight_core::{
    DataService, Document, ElementId, ElementKind, ListStore, QueryHandlers, VisualState, VizKind,
};
use tracing::{error, info};

use crate::adapter::{AdapterState, RenderAdapter};
use crate::backend::LocalBackend;
use crate::details::DetailStatus;
use crate::egui_engine::EguiEngineFactory;
use crate::engine::MountTarget;
use crate::sample::create_sample_document;
use crate::scene::{entry_cards, item_cards, ItemCard};
use crate::session::{LoadStatus, ViewSession};
use crate::settings::ViewSettings;
use crate::store::ViewMode;

/// Id of the mount the engine draws into.
pub const CANVAS_ID: &str = "ontosight-canvas";

/// The main visualization application.
pub struct OntoSightApp {
    backend: LocalBackend,
    session: ViewSession,
    adapter: RenderAdapter<EguiEngineFactory>,
    settings: ViewSettings,
    show_sidebar: bool,
    search_input: String,
    chat_input: String,
    last_error: Option<String>,
}

impl OntoSightApp {
    /// Create a new app from embedded data, or the sample hypergraph.
    pub fn new(cc: &CreationContext<'_>) -> Self {
        let document = Self::load_or_sample();
        match DataService::from_document(document) {
            Ok(service) => Self::from_service(cc, service),
            Err(err) => {
                error!(error = %err, "Embedded document rejected, showing sample");
                let fallback = DataService::from_document(create_sample_document())
                    .unwrap_or_else(|_| DataService::new(Box::new(ListStore::default())));
                Self::from_service(cc, fallback)
            }
        }
    }

    pub fn from_service(cc: &CreationContext<'_>, service: DataService) -> Self {
        let backend = LocalBackend::new(service.with_handlers(QueryHandlers::builtin()));
        let mut session = ViewSession::new();
        let status = session.load(&backend).clone();
        info!(?status, "Visualization loaded");

        let settings = ViewSettings {
            dark_mode: cc.egui_ctx.style().visuals.dark_mode,
            ..Default::default()
        };

        Self {
            backend,
            session,
            adapter: RenderAdapter::new(EguiEngineFactory, MountTarget::new(CANVAS_ID, 1400.0, 900.0)),
            settings,
            show_sidebar: true,
            search_input: String::new(),
            chat_input: String::new(),
            last_error: None,
        }
    }

    /// Load a document from embedded page data or return the sample.
    fn load_or_sample() -> Document {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(document) = Self::try_load_from_window() {
                return document;
            }
        }
        create_sample_document()
    }

    #[cfg(target_arch = "wasm32")]
    fn try_load_from_window() -> Option<Document> {
        let window = web_sys::window()?;
        let data = js_sys::Reflect::get(&window, &"ONTOSIGHT_DATA".into()).ok()?;
        let json_str = data.as_string()?;
        match Document::from_json(&json_str) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring malformed ONTOSIGHT_DATA");
                None
            }
        }
    }

    fn is_canvas_view(&self) -> bool {
        matches!(
            self.session.store().view_mode(),
            ViewMode::Graph | ViewMode::Hypergraph
        )
    }
}

// =============================================================================
// Sidebar Panel UI
// =============================================================================

impl OntoSightApp {
    fn info_icon(ui: &mut egui::Ui, tip: &str) {
        ui.add_space(4.0);
        ui.small_button("ℹ").on_hover_text(tip);
    }

    fn ui_info(&self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Dataset")
            .default_open(true)
            .show(ui, |ui| {
                match self.session.meta() {
                    Some(meta) => {
                        ui.label(format!("Type: {}", meta.kind));
                        for (key, value) in &meta.stats {
                            ui.label(format!("{key}: {value}"));
                        }
                    }
                    None => {
                        ui.label("No metadata");
                    }
                }
                if let Some(dataset) = self.session.dataset() {
                    ui.separator();
                    ui.label(format!("Shown: {} elements", dataset.ids().count()));
                }
                ui.label(format!("Engine: {:?}", self.adapter.state()));
            });
    }

    fn ui_views(&mut self, ui: &mut egui::Ui) {
        let Some(kind) = self.session.meta().map(|m| m.kind) else {
            return;
        };
        CollapsingHeader::new("View")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    let current = self.session.store().view_mode();
                    for &mode in ViewMode::available(kind) {
                        if ui.selectable_label(current == mode, mode.label()).clicked()
                            && current != mode
                        {
                            self.session.set_view_mode(&self.backend, mode);
                        }
                    }
                });

                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        self.session.reset(&self.backend);
                    }
                    if ui.button("Re-layout").clicked() {
                        self.session.relayout();
                    }
                    let has_matches = !self.session.store().highlighted().is_empty();
                    if ui
                        .add_enabled(has_matches, egui::Button::new("Next match"))
                        .clicked()
                    {
                        self.session.cycle_match();
                    }
                });
            });
    }

    fn ui_query(&mut self, ui: &mut egui::Ui) {
        let features = self
            .session
            .meta()
            .map(|m| m.features)
            .unwrap_or_default();
        if !features.search && !features.chat {
            return;
        }

        CollapsingHeader::new("Query")
            .default_open(true)
            .show(ui, |ui| {
                if features.search {
                    ui.horizontal(|ui| {
                        let response = ui.text_edit_singleline(&mut self.search_input);
                        let submitted = response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if ui.button("Search").clicked() || submitted {
                            self.last_error = self
                                .session
                                .search(&self.backend, &self.search_input)
                                .err()
                                .map(|e| e.to_string());
                        }
                        Self::info_icon(ui, "Case-insensitive label search");
                    });
                }

                if features.chat {
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut self.chat_input);
                        if ui.button("Ask").clicked() {
                            self.last_error = self
                                .session
                                .chat(&self.backend, &self.chat_input)
                                .err()
                                .map(|e| e.to_string());
                        }
                    });
                    if let Some(answer) = self.session.chat_response() {
                        ui.label(RichText::new(answer).italics());
                    }
                }

                if let Some(message) = &self.last_error {
                    ui.colored_label(Color32::from_rgb(220, 60, 60), message);
                }
            });
    }

    fn ui_navigation(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Navigation")
            .default_open(false)
            .show(ui, |ui| {
                let navigation = &mut self.settings.navigation;
                if ui
                    .checkbox(&mut navigation.fit_to_screen_enabled, "fit_to_screen")
                    .clicked()
                {
                    navigation.zoom_and_pan_enabled = !navigation.fit_to_screen_enabled;
                }
                if ui
                    .checkbox(&mut navigation.zoom_and_pan_enabled, "zoom_and_pan")
                    .clicked()
                {
                    navigation.fit_to_screen_enabled = !navigation.zoom_and_pan_enabled;
                }
                ui.add(egui::Slider::new(&mut navigation.zoom_speed, 0.01..=0.1).text("zoom_speed"));

                let style = &mut self.settings.style;
                ui.separator();
                ui.checkbox(&mut style.labels_always, "labels_always");
                ui.checkbox(&mut style.show_edge_labels, "edge labels");
                ui.checkbox(&mut style.show_region_labels, "region labels");
                ui.add(egui::Slider::new(&mut style.region_padding, 4.0..=48.0).text("region padding"));
            });
    }

    fn ui_layout(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Layout")
            .default_open(false)
            .show(ui, |ui| {
                let mut state = egui_graphs::get_layout_state::<
                    FruchtermanReingoldWithCenterGravityState,
                >(ui, None);

                ui.checkbox(&mut state.base.is_running, "running");
                ui.add(egui::Slider::new(&mut state.base.dt, 0.001..=0.2).text("dt"));
                ui.add(egui::Slider::new(&mut state.base.damping, 0.0..=1.0).text("damping"));
                ui.add(egui::Slider::new(&mut state.base.k_scale, 0.2..=3.0).text("k_scale"));
                ui.add(egui::Slider::new(&mut state.base.c_attract, 0.1..=3.0).text("c_attract"));
                ui.add(egui::Slider::new(&mut state.base.c_repulse, 0.1..=3.0).text("c_repulse"));

                ui.separator();
                ui.checkbox(&mut state.extras.0.enabled, "center gravity");
                ui.add_enabled_ui(state.extras.0.enabled, |ui| {
                    ui.add(egui::Slider::new(&mut state.extras.0.params.c, 0.0..=2.0).text("strength"));
                });

                egui_graphs::set_layout_state::<FruchtermanReingoldWithCenterGravityState>(
                    ui, state, None,
                );
            });
    }

    fn ui_selected(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Selected")
            .default_open(true)
            .show(ui, |ui| {
                let selection = self.session.store().selection().to_vec();
                if selection.is_empty() {
                    ui.label("Click an element to inspect it");
                    return;
                }
                if ui.small_button("Clear").clicked() {
                    self.session.store_mut().clear_selection();
                }

                for (position, item) in selection.iter().enumerate() {
                    let title = format!("{} {}", item.kind, item.id);
                    CollapsingHeader::new(title)
                        .id_salt(("selected", item.id.as_str()))
                        .default_open(position == 0)
                        .show(ui, |ui| {
                            match self.session.fetch_details(&item.id, &self.backend) {
                                DetailStatus::Loading => {
                                    ui.spinner();
                                }
                                DetailStatus::Ready(element) => {
                                    ui.strong(element.display_label());
                                    for (key, value) in element.data() {
                                        ui.label(format!("{key}: {value}"));
                                    }
                                }
                            }
                            if ui.small_button("Deselect").clicked() {
                                self.session.store_mut().deselect_item(item.id.as_str());
                            }
                        });
                }
            });
    }

    /// Card grid; returns the card the user clicked.
    fn ui_cards(ui: &mut egui::Ui, cards: &[ItemCard]) -> Option<(ElementId, ElementKind)> {
        let mut clicked = None;
        for card in cards {
            let fill = match card.state {
                VisualState::Selected => Color32::from_rgba_unmultiplied(0, 150, 200, 60),
                VisualState::Highlighted => Color32::from_rgba_unmultiplied(250, 204, 21, 50),
                VisualState::Normal => Color32::TRANSPARENT,
            };
            let response = egui::Frame::group(ui.style())
                .fill(fill)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.strong(&card.label);
                    ui.small(format!("{} {}", card.kind, card.id));
                    for (key, value) in card.data.iter().take(4) {
                        ui.label(format!("{key}: {value}"));
                    }
                })
                .response
                .interact(egui::Sense::click());
            if response.clicked() {
                clicked = Some((card.id.clone(), card.kind));
            }
        }
        clicked
    }

    fn ui_entity_page(&mut self, ui: &mut egui::Ui) {
        let Some(page) = self.session.entity_page().cloned() else {
            ui.label("Loading…");
            return;
        };
        ui.horizontal(|ui| {
            if ui
                .add_enabled(page.page > 0, egui::Button::new("◀"))
                .clicked()
            {
                self.session.load_page(&self.backend, page.page - 1);
            }
            ui.label(format!("page {} · {} total", page.page + 1, page.total));
            if ui.add_enabled(page.has_next, egui::Button::new("▶")).clicked() {
                self.session.load_page(&self.backend, page.page + 1);
            }
        });
        let cards = entry_cards(&page.items, self.session.store());
        ScrollArea::vertical().show(ui, |ui| {
            if let Some((id, kind)) = Self::ui_cards(ui, &cards) {
                self.session.store_mut().select_item(id, kind);
            }
        });
    }
}

/// Lists are drawn as cards and never mount the engine.
fn draws_on_canvas(kind: VizKind) -> bool {
    matches!(kind, VizKind::Graph | VizKind::Hypergraph)
}

impl App for OntoSightApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Tab) {
                self.show_sidebar = !self.show_sidebar;
            }
        });
        self.settings.dark_mode = ctx.style().visuals.dark_mode;

        // Engine events from the previous frame land in the store first.
        self.adapter.pump(self.session.store_mut());
        self.session.prune_details();
        if let Some(dataset) = self.session.dataset().cloned() {
            if draws_on_canvas(dataset.kind()) {
                self.adapter.sync(&dataset, self.session.store());
            }
        }

        if self.show_sidebar {
            egui::SidePanel::right("right_panel")
                .default_width(300.0)
                .show(ctx, |ui| {
                    ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("OntoSight");
                        ui.separator();

                        self.ui_info(ui);
                        ui.separator();

                        self.ui_views(ui);
                        ui.separator();

                        self.ui_query(ui);
                        ui.separator();

                        self.ui_selected(ui);
                        ui.separator();

                        self.ui_navigation(ui);
                        ui.separator();

                        self.ui_layout(ui);
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.session.status().clone() {
            LoadStatus::Idle => {
                ui.centered_and_justified(|ui| ui.spinner());
            }
            LoadStatus::InvalidMetadata(reason) => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!("Invalid metadata: {reason}"));
                });
            }
            LoadStatus::NoData => {
                ui.centered_and_justified(|ui| ui.label("No data available"));
            }
            LoadStatus::Unavailable(reason) => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!("Backend unavailable: {reason}"));
                });
            }
            LoadStatus::Ready if self.is_canvas_view() => {
                if self.adapter.state() == AdapterState::Faulted {
                    ui.centered_and_justified(|ui| {
                        ui.label("The graph could not be drawn; see the log for details");
                    });
                } else if let Some(engine) = self.adapter.engine_mut() {
                    engine.show(ui, &self.settings);
                }
            }
            LoadStatus::Ready => match self.session.store().view_mode() {
                ViewMode::List => {
                    let cards = self
                        .session
                        .dataset()
                        .map(|d| item_cards(d, self.session.store()))
                        .unwrap_or_default();
                    ScrollArea::vertical().show(ui, |ui| {
                        if let Some((id, kind)) = Self::ui_cards(ui, &cards) {
                            self.session.store_mut().select_item(id, kind);
                        }
                    });
                }
                _ => self.ui_entity_page(ui),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontosight_core::{Dataset, Item, ListData};

    #[test]
    fn test_only_graph_kinds_mount_the_engine() {
        assert!(draws_on_canvas(VizKind::Graph));
        assert!(draws_on_canvas(VizKind::Hypergraph));

        let list = Dataset::List(ListData {
            items: vec![Item::new("i1", "One")],
        });
        assert!(!draws_on_canvas(list.kind()));
    }
}
