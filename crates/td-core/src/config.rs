//! Editor configuration.
//!
//! Every knob has a default matching the stock editor, so hosts only send
//! the fields they want to override. Field names are camelCase on the wire.

use crate::geometry::MIN_SIZE;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default undo depth.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Configuration for a `Scene` and the editor driving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Fixed design surface all elements must stay inside. Default: **1920×1080**.
    pub canvas_size: Size,

    /// Maximum number of history snapshots kept. Default: **50**.
    pub history_cap: usize,

    /// Smallest size a resize can produce. Default: **50×30**.
    pub min_size: Size,

    /// Offset applied to duplicates and pasted copies. Default: **(20, 20)**.
    pub duplicate_offset: Vec2,

    /// Size of elements created from text or presets without their own size.
    pub default_element_size: Size,

    /// Text of a freshly added text element.
    pub default_text: String,

    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied by one zoom-in / zoom-out step.
    pub zoom_step: f64,

    /// Arrow-key nudge distance in canvas units (Shift: `nudge_large`).
    pub nudge: f64,
    pub nudge_large: f64,

    /// Pointer travel (screen px) under which a press/release is a click.
    pub click_tolerance: f64,

    /// Side of a resize grip, in screen px.
    pub handle_size: f64,

    /// Distance from the frame's bottom edge to the rotation grip, in screen px.
    pub rotation_handle_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: Size::new(1920.0, 1080.0),
            history_cap: DEFAULT_HISTORY_CAP,
            min_size: MIN_SIZE,
            duplicate_offset: Vec2::new(20.0, 20.0),
            default_element_size: Size::new(200.0, 80.0),
            default_text: "Click to edit".to_string(),
            min_zoom: 0.1,
            max_zoom: 8.0,
            zoom_step: 1.2,
            nudge: 1.0,
            nudge_large: 10.0,
            click_tolerance: 3.0,
            handle_size: 8.0,
            rotation_handle_offset: 24.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (partial) JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns a message if the input is not valid JSON for this shape.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid editor config: {e}"))?;
        Ok(config.normalized())
    }

    /// Replace nonsensical values (non-positive, NaN) with defaults so the
    /// geometry code can rely on finite, ordered bounds.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let d = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };

        self.canvas_size = Size::new(
            positive(self.canvas_size.width, d.canvas_size.width),
            positive(self.canvas_size.height, d.canvas_size.height),
        );
        self.min_size = Size::new(
            positive(self.min_size.width, d.min_size.width),
            positive(self.min_size.height, d.min_size.height),
        );
        self.default_element_size = Size::new(
            positive(self.default_element_size.width, d.default_element_size.width),
            positive(self.default_element_size.height, d.default_element_size.height),
        );
        if !(self.duplicate_offset.x.is_finite() && self.duplicate_offset.y.is_finite()) {
            self.duplicate_offset = d.duplicate_offset;
        }
        self.history_cap = self.history_cap.max(1);
        self.min_zoom = positive(self.min_zoom, d.min_zoom);
        self.max_zoom = positive(self.max_zoom, d.max_zoom).max(self.min_zoom);
        self.zoom_step = positive(self.zoom_step, d.zoom_step);
        self.nudge = positive(self.nudge, d.nudge);
        self.nudge_large = positive(self.nudge_large, d.nudge_large);
        self.click_tolerance = positive(self.click_tolerance, d.click_tolerance);
        self.handle_size = positive(self.handle_size, d.handle_size);
        self.rotation_handle_offset =
            positive(self.rotation_handle_offset, d.rotation_handle_offset);
        self
    }
}
