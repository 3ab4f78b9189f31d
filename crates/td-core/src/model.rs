//! Element data model.
//!
//! An [`Element`] is a positioned, styled text box on the canvas. Its
//! geometry (`position`, `size`, `rotation`, `scale`) is strongly typed and
//! owned by the core; its look lives in a [`StyleBag`] the core never reads.

use crate::geometry::{self, finite_or};
use crate::id::ElementId;
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix for ids minted by the editor (`element_12`).
pub const ELEMENT_ID_PREFIX: &str = "element";

// ─── Style ───────────────────────────────────────────────────────────────

/// Renderer-owned style properties (font, color, shadow, outline, gradient,
/// filter, transform sub-fields, ...).
///
/// The core only stores and copies this bag. It is a JSON object so the
/// host can round-trip whatever its renderer understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleBag(Map<String, Value>);

impl StyleBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set one property, returning the builder for chaining.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Shallow merge: keys in `other` overwrite keys in `self`.
    pub fn merge(&mut self, other: &StyleBag) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

// ─── Element ─────────────────────────────────────────────────────────────

/// A single manipulable node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique for the element's lifetime; never changes.
    pub id: ElementId,
    pub text: String,
    /// Top-left corner in canvas units.
    pub position: Point,
    pub size: Size,
    /// Degrees, unnormalized (may exceed ±360).
    pub rotation: f64,
    pub scale: f64,
    /// `0.0 ..= 1.0`.
    pub opacity: f64,
    /// Paint order; higher paints on top.
    pub z_index: i64,
    pub style: StyleBag,
    pub locked: bool,
    pub visible: bool,
    pub is_selected: bool,
    pub is_editing: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Element {
    /// A visible, unlocked, unrotated element. `z_index` and timestamps are
    /// assigned when it is added to a scene.
    pub fn new(id: ElementId, text: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id,
            text: text.into(),
            position,
            size,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
            z_index: 0,
            style: StyleBag::default(),
            locked: false,
            visible: true,
            is_selected: false,
            is_editing: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleBag) -> Self {
        self.style = style;
        self
    }

    /// Unrotated bounding box in canvas units.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Canvas transform the renderer applies: scale and rotation about the centre.
    pub fn transform(&self) -> Affine {
        geometry::box_transform(self.rect(), self.rotation, self.scale)
    }

    /// Direct manipulation (drag/resize/rotate) is allowed.
    pub fn is_manipulable(&self) -> bool {
        !self.locked && !self.is_editing
    }

    /// Equality over persistent state, ignoring selection/edit flags and
    /// `updated_at`. Used to decide whether an edit produced a new snapshot.
    pub fn same_state(&self, other: &Element) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.position == other.position
            && self.size == other.size
            && self.rotation == other.rotation
            && self.scale == other.scale
            && self.opacity == other.opacity
            && self.z_index == other.z_index
            && self.style == other.style
            && self.locked == other.locked
            && self.visible == other.visible
            && self.created_at == other.created_at
    }

    /// Copy with transient UI flags cleared, as stored in history.
    pub fn without_transient_flags(&self) -> Element {
        Element {
            is_selected: false,
            is_editing: false,
            ..self.clone()
        }
    }
}

// ─── Patch ───────────────────────────────────────────────────────────────

/// Partial update for `SceneAction::Update`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub text: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
    pub opacity: Option<f64>,
    /// Replaces the whole bag. Use `SceneAction::Restyle` to merge.
    pub style: Option<StyleBag>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
}

impl ElementPatch {
    /// # Errors
    /// Returns a message if `json` is not a valid patch object.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid element patch: {e}"))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn touches_geometry(&self) -> bool {
        self.position.is_some()
            || self.size.is_some()
            || self.rotation.is_some()
            || self.scale.is_some()
    }

    /// Merge into `el`. Non-finite numbers keep the previous value, opacity
    /// is clamped to `[0, 1]` and scale must stay positive. Geometry fields
    /// are skipped when `allow_geometry` is false (locked elements).
    ///
    /// Position/size are merged raw; the scene re-clamps them afterwards.
    pub fn apply_to(&self, el: &mut Element, allow_geometry: bool) {
        if let Some(text) = &self.text {
            el.text.clone_from(text);
        }
        if allow_geometry {
            if let Some(p) = self.position {
                el.position = Point::new(finite_or(p.x, el.position.x), finite_or(p.y, el.position.y));
            }
            if let Some(s) = self.size {
                el.size = Size::new(
                    finite_or(s.width, el.size.width),
                    finite_or(s.height, el.size.height),
                );
            }
            if let Some(r) = self.rotation {
                el.rotation = finite_or(r, el.rotation);
            }
            if let Some(s) = self.scale
                && s.is_finite()
                && s > 0.0
            {
                el.scale = s;
            }
        }
        if let Some(o) = self.opacity
            && o.is_finite()
        {
            el.opacity = o.clamp(0.0, 1.0);
        }
        if let Some(style) = &self.style {
            el.style = style.clone();
        }
        if let Some(locked) = self.locked {
            el.locked = locked;
        }
        if let Some(visible) = self.visible {
            el.visible = visible;
        }
    }
}
