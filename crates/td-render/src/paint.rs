//! Scene → display list.
//!
//! The renderer contract: visible elements in paint order with their
//! resolved transforms, plus the selection overlay (frames, resize grips,
//! rotation grip) laid out in screen space. No paint backend lives here;
//! the host draws the list with whatever technology it uses.

use serde::Serialize;
use td_core::geometry::{ResizeHandle, Viewport, rotate_point};
use td_core::{Affine, Element, ElementId, Point, Rect, Scene, Size, StyleBag};

/// One element, resolved for painting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintItem {
    pub id: ElementId,
    pub text: String,
    /// Unrotated box in canvas units.
    pub rect: Rect,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i64,
    pub style: StyleBag,
    /// Canvas-local box → screen (element transform, then viewport).
    pub transform: Affine,
    pub selected: bool,
    pub editing: bool,
    pub locked: bool,
}

impl PaintItem {
    fn new(el: &Element, viewport: &Viewport) -> Self {
        Self {
            id: el.id,
            text: el.text.clone(),
            rect: el.rect(),
            rotation: el.rotation,
            scale: el.scale,
            opacity: el.opacity,
            z_index: el.z_index,
            style: el.style.clone(),
            transform: viewport.to_affine() * el.transform(),
            selected: el.is_selected,
            editing: el.is_editing,
            locked: el.locked,
        }
    }
}

/// Outline drawn around a selected element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionFrame {
    pub id: ElementId,
    /// Unrotated frame in screen px; rotate by `rotation` about its centre.
    pub rect: Rect,
    pub rotation: f64,
    pub locked: bool,
}

/// A resize grip in screen px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleBox {
    pub handle: ResizeHandle,
    /// Grip centre after rotation.
    pub center: Point,
    pub rect: Rect,
}

/// Grip geometry for the element that can be manipulated right now.
///
/// Positions are in screen px. `handle_centers` and `grip` are *unrotated*;
/// callers rotate them by `rotation` about `center` for display, or rotate
/// the pointer the other way for hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct Manipulator {
    pub id: ElementId,
    pub frame: Rect,
    pub center: Point,
    pub rotation: f64,
    pub handle_centers: [(ResizeHandle, Point); 8],
    pub grip: Point,
    pub handle_size: f64,
}

impl Manipulator {
    pub fn new(el: &Element, viewport: &Viewport, handle_size: f64, grip_offset: f64) -> Self {
        let frame = screen_frame(el, viewport);
        let handle_centers = ResizeHandle::ALL.map(|h| {
            let (fx, fy) = h.anchor_fraction();
            (
                h,
                Point::new(
                    frame.x0 + frame.width() * fx,
                    frame.y0 + frame.height() * fy,
                ),
            )
        });
        Self {
            id: el.id,
            frame,
            center: frame.center(),
            rotation: el.rotation,
            handle_centers,
            grip: Point::new(frame.center().x, frame.y1 + grip_offset),
            handle_size,
        }
    }

    /// Grips as drawn on screen.
    pub fn handle_boxes(&self) -> Vec<HandleBox> {
        let size = Size::new(self.handle_size, self.handle_size);
        self.handle_centers
            .iter()
            .map(|&(handle, c)| {
                let center = rotate_point(c, self.center, self.rotation);
                HandleBox {
                    handle,
                    center,
                    rect: Rect::from_center_size(center, size),
                }
            })
            .collect()
    }

    pub fn rotation_grip(&self) -> Point {
        rotate_point(self.grip, self.center, self.rotation)
    }

    /// Bring a screen point into the frame's unrotated space.
    pub fn unrotate(&self, p: Point) -> Point {
        rotate_point(p, self.center, -self.rotation)
    }
}

/// The single element that shows grips: exactly one selected element that
/// is visible, unlocked and not being text-edited.
pub fn manipulation_target(scene: &Scene) -> Option<&Element> {
    match scene.selection() {
        [id] => scene
            .element(*id)
            .filter(|e| e.visible && e.is_manipulable()),
        _ => None,
    }
}

pub fn manipulator(scene: &Scene) -> Option<Manipulator> {
    let config = scene.config();
    manipulation_target(scene).map(|el| {
        Manipulator::new(
            el,
            scene.viewport(),
            config.handle_size,
            config.rotation_handle_offset,
        )
    })
}

/// Scaled (unrotated) element box mapped to screen px.
pub fn screen_frame(el: &Element, viewport: &Viewport) -> Rect {
    let visual = Rect::from_center_size(el.center(), el.size * el.scale);
    Rect::from_points(
        viewport.canvas_to_screen(visual.origin()),
        viewport.canvas_to_screen(Point::new(visual.x1, visual.y1)),
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOverlay {
    pub frames: Vec<SelectionFrame>,
    pub handles: Vec<HandleBox>,
    pub rotation_grip: Option<Point>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayList {
    pub viewport: Viewport,
    pub canvas_size: Size,
    pub items: Vec<PaintItem>,
    pub overlay: SelectionOverlay,
}

impl DisplayList {
    /// Build the list for the scene's current state. Invisible elements
    /// are excluded and so are their selection frames.
    pub fn build(scene: &Scene) -> Self {
        let viewport = *scene.viewport();
        let items: Vec<PaintItem> = scene
            .render_list()
            .into_iter()
            .map(|el| PaintItem::new(el, &viewport))
            .collect();

        let frames = scene
            .selection()
            .iter()
            .filter_map(|id| scene.element(*id))
            .filter(|el| el.visible)
            .map(|el| SelectionFrame {
                id: el.id,
                rect: screen_frame(el, &viewport),
                rotation: el.rotation,
                locked: el.locked,
            })
            .collect();

        let overlay = match manipulator(scene) {
            Some(m) => SelectionOverlay {
                frames,
                handles: m.handle_boxes(),
                rotation_grip: Some(m.rotation_grip()),
            },
            None => SelectionOverlay {
                frames,
                ..SelectionOverlay::default()
            },
        };

        log::trace!(
            "display list: {} items, {} frames",
            items.len(),
            overlay.frames.len()
        );
        Self {
            viewport,
            canvas_size: scene.canvas_size(),
            items,
            overlay,
        }
    }

    /// Serialize for the host.
    ///
    /// # Errors
    /// Returns a message if serialization fails (non-string map keys in a
    /// style bag cannot occur, so this is effectively infallible).
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("display list: {e}"))
    }
}
