//! Hit testing: screen point → what the pointer is over.
//!
//! Grips of the manipulable element win over element bodies; bodies are
//! walked front-to-back (last painted = topmost) through each element's
//! inverse transform, so rotated and scaled boxes hit where they are drawn.

use crate::paint::manipulator;
use kurbo::{Point, Rect, Size};
use serde::Serialize;
use td_core::geometry::ResizeHandle;
use td_core::{ElementId, Scene};

/// Extra screen px around a grip that still counts as a hit.
const GRIP_SLOP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HitTarget {
    /// The body of an element.
    Element { id: ElementId },
    /// A resize grip of the manipulable element.
    Handle {
        id: ElementId,
        handle: ResizeHandle,
    },
    /// The rotation grip of the manipulable element.
    RotationGrip { id: ElementId },
    /// Empty canvas.
    Canvas,
}

impl HitTarget {
    pub fn element(&self) -> Option<ElementId> {
        match *self {
            HitTarget::Element { id }
            | HitTarget::Handle { id, .. }
            | HitTarget::RotationGrip { id } => Some(id),
            HitTarget::Canvas => None,
        }
    }
}

/// Resolve a screen-space point against the scene.
pub fn hit_test(scene: &Scene, screen: Point) -> HitTarget {
    if !(screen.x.is_finite() && screen.y.is_finite()) {
        return HitTarget::Canvas;
    }

    if let Some(m) = manipulator(scene) {
        let local = m.unrotate(screen);
        let reach = m.handle_size / 2.0 + GRIP_SLOP;
        if local.distance(m.grip) <= reach {
            return HitTarget::RotationGrip { id: m.id };
        }
        let grip_box = Size::new(reach * 2.0, reach * 2.0);
        for &(handle, center) in &m.handle_centers {
            if contains_closed(Rect::from_center_size(center, grip_box), local) {
                return HitTarget::Handle { id: m.id, handle };
            }
        }
    }

    hit_element(scene, screen).map_or(HitTarget::Canvas, |id| HitTarget::Element { id })
}

/// Topmost visible element under a screen point.
pub fn hit_element(scene: &Scene, screen: Point) -> Option<ElementId> {
    let canvas = scene.viewport().screen_to_canvas(screen);
    scene
        .render_list()
        .into_iter()
        .rev()
        .find(|el| {
            let local = el.transform().inverse() * canvas;
            contains_closed(el.rect(), local)
        })
        .map(|el| el.id)
}

fn contains_closed(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
