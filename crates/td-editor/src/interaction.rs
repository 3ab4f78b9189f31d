//! Direct manipulation: the pointer state machine.
//!
//! ```text
//! Idle ──down on body──────▶ Dragging ───up──▶ Idle
//!      ──down on grip──────▶ Resizing(handle)
//!      ──down on rotation──▶ Rotating
//! ```
//!
//! Each manipulation opens a scene gesture on pointer-down and closes it on
//! pointer-up, so a whole drag lands as one history step. Locked and
//! editing elements never leave `Idle`. A press that travels less than the
//! click tolerance is reported as a click and moves nothing.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Pointer down | Dragging |
//! |----------|--------------|----------|
//! | **Shift / Cmd** | Toggle selection membership | — |
//! | **Shift** | — | Constrain to the dominant axis |

use crate::input::Modifiers;
use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;
use td_core::geometry::{
    ResizeHandle, angle_from_center, resize_scaled_from_handle, screen_delta_to_canvas_delta,
};
use td_core::{ElementId, Scene, SceneAction};
use td_render::HitTarget;

/// The active manipulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving one or more elements; start positions in canvas units.
    Dragging {
        origin: Point,
        targets: SmallVec<[(ElementId, Point); 4]>,
    },
    /// `start` is the unscaled box; `scale` is what it is drawn at.
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        origin: Point,
        start: Rect,
        scale: f64,
    },
    /// `center` is in screen px. The element takes the pointer's bearing
    /// around it directly.
    Rotating { id: ElementId, center: Point },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging { .. } => "dragging",
            Gesture::Resizing { .. } => "resizing",
            Gesture::Rotating { .. } => "rotating",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

/// A pointer press on an element body, tracked for click detection.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    id: ElementId,
    origin: Point,
    was_selected: bool,
    additive: bool,
    moved: bool,
}

/// A press/release on an element that stayed within the click tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub id: ElementId,
    /// The element was already selected before the press.
    pub was_selected: bool,
    pub additive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownOutcome {
    pub selection_changed: bool,
    pub gesture_started: bool,
    /// The press landed on empty canvas.
    pub on_canvas: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpOutcome {
    /// `Some(committed)` when a gesture ended.
    pub gesture_ended: Option<bool>,
    pub click: Option<Click>,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
    press: Option<Press>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// Handle a press at `screen` that hit `hit`.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        hit: HitTarget,
        screen: Point,
        modifiers: Modifiers,
    ) -> DownOutcome {
        // A lost pointer-up leaves a gesture open; close it before starting over.
        if self.gesture.is_active() {
            self.finish(scene);
        }
        self.press = None;
        let mut outcome = DownOutcome::default();

        match hit {
            HitTarget::Handle { id, handle } => {
                if let Some(el) = scene.element(id).filter(|e| e.is_manipulable()) {
                    self.gesture = Gesture::Resizing {
                        id,
                        handle,
                        origin: screen,
                        start: el.rect(),
                        scale: el.scale,
                    };
                }
            }

            HitTarget::RotationGrip { id } => {
                if let Some(el) = scene.element(id).filter(|e| e.is_manipulable()) {
                    let center = scene.viewport().canvas_to_screen(el.center());
                    self.gesture = Gesture::Rotating { id, center };
                }
            }

            HitTarget::Element { id } => {
                let Some(editing) = scene.element(id).map(|e| e.is_editing) else {
                    return outcome;
                };
                // Presses inside the edit surface belong to the text input.
                if editing {
                    return outcome;
                }
                let was_selected = scene.is_selected(id);
                let additive = modifiers.additive();
                if additive {
                    outcome.selection_changed = scene.select(id, true);
                } else if !was_selected {
                    outcome.selection_changed = scene.select(id, false);
                }
                self.press = Some(Press {
                    id,
                    origin: screen,
                    was_selected,
                    additive,
                    moved: false,
                });

                if scene.is_selected(id) {
                    let targets: SmallVec<[(ElementId, Point); 4]> = scene
                        .selection()
                        .iter()
                        .filter_map(|sid| scene.element(*sid))
                        .filter(|e| e.is_manipulable())
                        .map(|e| (e.id, e.position))
                        .collect();
                    if !targets.is_empty() {
                        self.gesture = Gesture::Dragging {
                            origin: screen,
                            targets,
                        };
                    }
                }
            }

            HitTarget::Canvas => {
                outcome.on_canvas = true;
                if !modifiers.additive() {
                    outcome.selection_changed = scene.clear_selection();
                }
            }
        }

        if self.gesture.is_active() {
            scene.begin_gesture();
            outcome.gesture_started = true;
            log::debug!("gesture start: {}", self.gesture.name());
        }
        outcome
    }

    /// Handle a move. Returns true if the scene changed.
    pub fn pointer_move(&mut self, scene: &mut Scene, screen: Point, modifiers: Modifiers) -> bool {
        let tolerance = scene.config().click_tolerance;
        if let Some(press) = &mut self.press
            && !press.moved
        {
            if (screen - press.origin).hypot() < tolerance {
                return false;
            }
            press.moved = true;
        }

        let zoom = scene.viewport().zoom();
        match &self.gesture {
            Gesture::Idle => false,

            Gesture::Dragging { origin, targets } => {
                let mut delta = screen - *origin;
                if modifiers.shift {
                    delta = constrain_to_axis(delta);
                }
                let delta = screen_delta_to_canvas_delta(delta, zoom);
                log::trace!("drag by {delta:?}");
                let mut changed = false;
                for &(id, start) in targets.iter() {
                    changed |= scene.apply(SceneAction::Move {
                        id,
                        position: start + delta,
                    });
                }
                changed
            }

            Gesture::Resizing {
                id,
                handle,
                origin,
                start,
                scale,
            } => {
                let delta = screen_delta_to_canvas_delta(screen - *origin, zoom);
                let rect = resize_scaled_from_handle(
                    *start,
                    *scale,
                    *handle,
                    delta,
                    scene.config().min_size,
                    scene.canvas_size(),
                );
                log::trace!("resize {} to {rect:?}", handle.name());
                scene.apply(SceneAction::Resize { id: *id, rect })
            }

            Gesture::Rotating { id, center } => {
                let degrees = angle_from_center(screen, *center);
                log::trace!("rotate to {degrees:.1}°");
                scene.apply(SceneAction::Rotate { id: *id, degrees })
            }
        }
    }

    /// Handle a release: close the gesture and report a click if the press
    /// never left the click tolerance.
    pub fn pointer_up(&mut self, scene: &mut Scene) -> UpOutcome {
        let gesture_ended = self.gesture.is_active().then(|| self.finish(scene));
        let click = self.press.take().and_then(|p| {
            (!p.moved).then_some(Click {
                id: p.id,
                was_selected: p.was_selected,
                additive: p.additive,
            })
        });
        UpOutcome {
            gesture_ended,
            click,
        }
    }

    /// Abandon pointer tracking (focus loss). An open gesture is committed
    /// as it stands. Returns `Some(committed)` if a gesture was open.
    pub fn cancel(&mut self, scene: &mut Scene) -> Option<bool> {
        self.press = None;
        self.gesture.is_active().then(|| self.finish(scene))
    }

    fn finish(&mut self, scene: &mut Scene) -> bool {
        let name = self.gesture.name();
        self.gesture = Gesture::Idle;
        let committed = scene.end_gesture();
        log::debug!("gesture end: {name} (committed: {committed})");
        committed
    }
}

/// Zero the smaller component of a drag delta.
pub fn constrain_to_axis(delta: Vec2) -> Vec2 {
    if delta.x.abs() >= delta.y.abs() {
        Vec2::new(delta.x, 0.0)
    } else {
        Vec2::new(0.0, delta.y)
    }
}
