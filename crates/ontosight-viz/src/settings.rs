//! Settings structures for the visualization UI.

/// Interaction-related toggles.
#[derive(Debug, Clone)]
pub struct SettingsInteraction {
    pub dragging_enabled: bool,
    pub hover_enabled: bool,
    /// Pointer travel (screen px) below which a release counts as a click.
    pub click_tolerance: f32,
}

impl Default for SettingsInteraction {
    fn default() -> Self {
        Self {
            dragging_enabled: true,
            hover_enabled: true,
            click_tolerance: 4.0,
        }
    }
}

/// Navigation & viewport parameters.
#[derive(Debug, Clone)]
pub struct SettingsNavigation {
    pub fit_to_screen_enabled: bool,
    pub zoom_and_pan_enabled: bool,
    pub zoom_speed: f32,
    pub fit_to_screen_padding: f32,
}

impl Default for SettingsNavigation {
    fn default() -> Self {
        Self {
            // Mutually exclusive: only one should be true
            fit_to_screen_enabled: true,
            zoom_and_pan_enabled: false,
            zoom_speed: 0.02,
            fit_to_screen_padding: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStyle {
    /// Always show node labels (vs hover-only).
    pub labels_always: bool,
    pub show_edge_labels: bool,
    pub show_region_labels: bool,
    /// Canvas units added around hyperedge members when drawing a region.
    pub region_padding: f32,
}

impl Default for SettingsStyle {
    fn default() -> Self {
        Self {
            labels_always: true,
            show_edge_labels: false,
            show_region_labels: true,
            region_padding: 18.0,
        }
    }
}

/// Everything the engine reads while painting a frame.
#[derive(Debug, Clone, Default)]
pub struct ViewSettings {
    pub interaction: SettingsInteraction,
    pub navigation: SettingsNavigation,
    pub style: SettingsStyle,
    pub dark_mode: bool,
}
