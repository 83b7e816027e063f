//! Studio configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Loaded from JSON by the CLI; library users build it directly.

use serde::{Deserialize, Serialize};
use studio_core::geometry::{MIN_LAYER_SIZE, ROTATION_STEP};
use studio_core::guides::{
    DEFAULT_SNAP_THRESHOLD, DEFAULT_SPACING, DEFAULT_SPACING_TOLERANCE, GuideSettings,
};
use studio_core::{CanvasView, GridSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub grid: GridSettings,

    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied per zoom-in / zoom-out step.
    pub zoom_step: f64,

    /// Smallest width/height a resize gesture may produce.
    pub min_layer_size: f64,
    /// Rotation snap increment, in degrees.
    pub rotation_step: f64,

    /// Smart guide alignment threshold, in screen pixels.
    pub guide_threshold: f64,
    pub guide_spacing: f64,
    pub guide_spacing_tolerance: f64,

    /// Maximum number of undo entries; `None` keeps everything.
    pub history_depth: Option<usize>,

    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// URL the generation request is POSTed to.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/generate".into(),
            timeout_secs: 120,
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1024.0,
            canvas_height: 768.0,
            grid: GridSettings::default(),
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 1.2,
            min_layer_size: MIN_LAYER_SIZE,
            rotation_step: ROTATION_STEP,
            guide_threshold: DEFAULT_SNAP_THRESHOLD,
            guide_spacing: DEFAULT_SPACING,
            guide_spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
            history_depth: Some(100),
            generation: GenerationConfig::default(),
        }
    }
}

impl StudioConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Initial view for a new studio.
    pub fn canvas_view(&self) -> CanvasView {
        CanvasView {
            width: self.canvas_width,
            height: self.canvas_height,
            grid: self.grid,
            ..CanvasView::default()
        }
    }

    pub fn guide_settings(&self) -> GuideSettings {
        GuideSettings {
            threshold: self.guide_threshold,
            spacing: self.guide_spacing,
            spacing_tolerance: self.guide_spacing_tolerance,
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
