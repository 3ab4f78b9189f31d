//! Preset instantiation.
//!
//! The host's catalog hands over a [`PresetBundle`] (a style plus sample
//! text); the scene turns it into a new element at a [`Placement`].

use crate::geometry::clamp_position;
use crate::id::ElementId;
use crate::model::{ELEMENT_ID_PREFIX, Element, StyleBag};
use crate::scene::Scene;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A catalog entry as the host sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresetBundle {
    /// Display name; informational only.
    pub name: Option<String>,
    pub style: StyleBag,
    pub sample_text: String,
    /// Falls back to `EditorConfig::default_element_size`.
    pub size: Option<Size>,
}

impl PresetBundle {
    /// # Errors
    /// Returns a message if `json` is not a valid preset object.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid preset: {e}"))
    }
}

/// Where a new element lands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Placement {
    /// Centred on the canvas.
    #[default]
    Center,
    /// Top-left corner at a canvas point.
    At { x: f64, y: f64 },
    /// Each new instance steps by the duplicate offset, wrapping inside the
    /// canvas.
    Cascade,
}

impl Placement {
    pub fn at(p: Point) -> Self {
        Placement::At { x: p.x, y: p.y }
    }
}

/// Top-left corner for the `step`-th cascaded element of `size`.
pub fn cascade_origin(step: u32, offset: Vec2, size: Size, canvas: Size) -> Point {
    let n = f64::from(step) + 1.0;
    let wrap = |v: f64, room: f64| if room > 0.0 { v.rem_euclid(room) } else { 0.0 };
    Point::new(
        wrap(offset.x * n, canvas.width - size.width),
        wrap(offset.y * n, canvas.height - size.height),
    )
}

impl Scene {
    /// Build a fresh element for `text` at `placement` without adding it.
    pub fn new_element(
        &mut self,
        text: &str,
        size: Option<Size>,
        style: StyleBag,
        placement: Placement,
    ) -> Element {
        let config = self.config();
        let canvas = config.canvas_size;
        let size = size.unwrap_or(config.default_element_size);
        let offset = config.duplicate_offset;
        let origin = match placement {
            Placement::Center => {
                Point::new((canvas.width - size.width) / 2.0, (canvas.height - size.height) / 2.0)
            }
            Placement::At { x, y } => Point::new(x, y),
            Placement::Cascade => cascade_origin(self.next_cascade_step(), offset, size, canvas),
        };
        Element::new(
            ElementId::fresh(ELEMENT_ID_PREFIX),
            text,
            clamp_position(origin, size, canvas),
            size,
        )
        .with_style(style)
    }

    /// Add an element built from `bundle`. Empty sample text falls back to
    /// the configured default text.
    pub fn instantiate_from_preset(
        &mut self,
        bundle: &PresetBundle,
        placement: Placement,
    ) -> Option<ElementId> {
        let text = if bundle.sample_text.is_empty() {
            self.config().default_text.clone()
        } else {
            bundle.sample_text.clone()
        };
        let element = self.new_element(&text, bundle.size, bundle.style.clone(), placement);
        log::debug!(
            "instantiate preset {:?} as {}",
            bundle.name.as_deref().unwrap_or("unnamed"),
            element.id
        );
        self.add(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use serde_json::json;

    #[test]
    fn center_placement() {
        let mut scene = Scene::new(EditorConfig::default());
        let bundle = PresetBundle {
            sample_text: "Sale!".into(),
            size: Some(Size::new(400.0, 100.0)),
            ..PresetBundle::default()
        };
        let id = scene.instantiate_from_preset(&bundle, Placement::Center).unwrap();
        let el = scene.element(id).unwrap();
        assert_eq!(el.position, Point::new(760.0, 490.0));
        assert_eq!(el.text, "Sale!");
        assert_eq!(el.z_index, 1);
    }

    #[test]
    fn at_placement_is_clamped() {
        let mut scene = Scene::new(EditorConfig::default());
        let id = scene
            .instantiate_from_preset(&PresetBundle::default(), Placement::at(Point::new(1900.0, -5.0)))
            .unwrap();
        let el = scene.element(id).unwrap();
        assert_eq!(el.size, Size::new(200.0, 80.0));
        assert_eq!(el.position, Point::new(1720.0, 0.0));
        assert_eq!(el.text, "Click to edit");
    }

    #[test]
    fn cascade_steps_and_wraps() {
        let canvas = Size::new(300.0, 200.0);
        let size = Size::new(100.0, 50.0);
        let offset = Vec2::new(20.0, 20.0);
        assert_eq!(cascade_origin(0, offset, size, canvas), Point::new(20.0, 20.0));
        assert_eq!(cascade_origin(1, offset, size, canvas), Point::new(40.0, 40.0));
        // 20 * 8 = 160 wraps in 150 of vertical room.
        assert_eq!(cascade_origin(7, offset, size, canvas), Point::new(160.0, 10.0));
    }

    #[test]
    fn cascade_placements_differ() {
        let mut scene = Scene::new(EditorConfig::default());
        let bundle = PresetBundle::default();
        let a = scene.instantiate_from_preset(&bundle, Placement::Cascade).unwrap();
        let b = scene.instantiate_from_preset(&bundle, Placement::Cascade).unwrap();
        let (pa, pb) = (scene.element(a).unwrap().position, scene.element(b).unwrap().position);
        assert_eq!(pb - pa, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn bundle_from_json_keeps_style_opaque() {
        let bundle = PresetBundle::from_json(
            r#"{"name": "Neon", "sampleText": "Glow", "style": {"textShadow": "0 0 8px #0ff"}}"#,
        )
        .unwrap();
        assert_eq!(bundle.style.get("textShadow"), Some(&json!("0 0 8px #0ff")));
        assert_eq!(bundle.size, None);
        assert!(PresetBundle::from_json("42").is_err());
    }

    #[test]
    fn placement_serde_is_tagged() {
        let p: Placement = serde_json::from_str(r#"{"kind": "at", "x": 5, "y": 6}"#).unwrap();
        assert_eq!(p, Placement::at(Point::new(5.0, 6.0)));
        let c: Placement = serde_json::from_str(r#"{"kind": "cascade"}"#).unwrap();
        assert_eq!(c, Placement::Cascade);
    }
}
