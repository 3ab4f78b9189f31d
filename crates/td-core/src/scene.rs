//! The scene: every element of one editing session plus selection,
//! viewport and history.
//!
//! [`Scene::apply`] is the only way to mutate elements. Each action that
//! changes something pushes one history snapshot, unless a gesture is open:
//! between [`Scene::begin_gesture`] and [`Scene::end_gesture`] actions are
//! applied live and the whole gesture lands as a single snapshot.
//!
//! All operations are total. Unknown ids, locked targets and non-finite
//! numbers resolve to no-ops (or keep the previous value) instead of errors.

use crate::clock::{Clock, SystemClock};
use crate::config::EditorConfig;
use crate::geometry::{Viewport, clamp_position, clamp_size_within, finite_or};
use crate::history::{History, Snapshot};
use crate::id::ElementId;
use crate::model::{ELEMENT_ID_PREFIX, Element, ElementPatch, StyleBag};
use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// A short list of element ids (selection, multi-delete).
pub type IdList = SmallVec<[ElementId; 4]>;

/// A mutation request. Interaction, keyboard and toolbar code only ever
/// produce these; the scene decides what actually changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    /// Insert a new element on top of the stack.
    Add { element: Box<Element> },
    /// Merge a partial update (property panel edits).
    Update { id: ElementId, patch: ElementPatch },
    /// Direct manipulation: move to a canvas position.
    Move { id: ElementId, position: Point },
    /// Direct manipulation: set the box (resize handles).
    Resize { id: ElementId, rect: Rect },
    /// Direct manipulation: set the rotation in degrees.
    Rotate { id: ElementId, degrees: f64 },
    SetText { id: ElementId, text: String },
    /// Shallow-merge style properties.
    Restyle { id: ElementId, style: StyleBag },
    SetLocked { id: ElementId, locked: bool },
    SetVisible { id: ElementId, visible: bool },
    /// Clone with a fresh id, offset, on top, and select only the clone.
    Duplicate { id: ElementId },
    /// Remove elements (locked ones are skipped).
    Delete { ids: IdList },
    BringToFront { id: ElementId },
    SendToBack { id: ElementId },
    BringForward { id: ElementId },
    SendBackward { id: ElementId },
}

impl SceneAction {
    pub fn name(&self) -> &'static str {
        match self {
            SceneAction::Add { .. } => "add",
            SceneAction::Update { .. } => "update",
            SceneAction::Move { .. } => "move",
            SceneAction::Resize { .. } => "resize",
            SceneAction::Rotate { .. } => "rotate",
            SceneAction::SetText { .. } => "set_text",
            SceneAction::Restyle { .. } => "restyle",
            SceneAction::SetLocked { .. } => "set_locked",
            SceneAction::SetVisible { .. } => "set_visible",
            SceneAction::Duplicate { .. } => "duplicate",
            SceneAction::Delete { .. } => "delete",
            SceneAction::BringToFront { .. } => "bring_to_front",
            SceneAction::SendToBack { .. } => "send_to_back",
            SceneAction::BringForward { .. } => "bring_forward",
            SceneAction::SendBackward { .. } => "send_backward",
        }
    }

    /// Actions fired at pointer-move rate.
    fn is_gesture_step(&self) -> bool {
        matches!(
            self,
            SceneAction::Move { .. } | SceneAction::Resize { .. } | SceneAction::Rotate { .. }
        )
    }
}

/// Result of reducing one action.
enum Outcome {
    Unchanged,
    Changed,
    Created(ElementId),
}

/// Consumers of the current element list (save / export buttons).
///
/// Both receive a read-only copy ordered by `z_index`; what happens to it
/// afterwards is the host's business.
pub trait SceneHooks {
    fn on_save(&mut self, _elements: &[Element]) {}
    fn on_export(&mut self, _elements: &[Element]) {}
}

pub struct Scene {
    elements: HashMap<ElementId, Element>,
    selected: IdList,
    history: History,
    viewport: Viewport,
    config: EditorConfig,
    clock: Box<dyn Clock>,
    /// Open gesture nesting depth (0 = not batching).
    gesture_depth: usize,
    /// Whether any action changed something inside the current gesture.
    gesture_dirty: bool,
    /// How many cascade placements have been handed out.
    cascade_step: u32,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("elements", &self.elements.len())
            .field("selected", &self.selected)
            .field("history_index", &self.history.index())
            .field("history_len", &self.history.len())
            .field("viewport", &self.viewport)
            .field("gesture_depth", &self.gesture_depth)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Scene {
    /// An empty scene on the system clock.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        let config = config.normalized();
        Self {
            elements: HashMap::new(),
            selected: IdList::new(),
            history: History::new(Snapshot::default(), config.history_cap),
            viewport: Viewport::default(),
            config,
            clock,
            gesture_depth: 0,
            gesture_dirty: false,
            cascade_step: 0,
        }
    }

    /// Replace all elements (opening a saved template). History restarts
    /// with the loaded state as its only entry; selection is cleared.
    pub fn load(&mut self, elements: Vec<Element>) {
        let canvas = self.config.canvas_size;
        let min = self.config.min_size;
        self.elements = elements
            .into_iter()
            .map(|mut el| {
                normalize_geometry(&mut el, min, canvas);
                el.is_selected = false;
                el.is_editing = false;
                (el.id, el)
            })
            .collect();
        self.selected.clear();
        self.gesture_depth = 0;
        self.gesture_dirty = false;
        self.cascade_step = 0;
        self.history.reset(Snapshot::new(self.elements.values()));
        log::debug!("scene loaded with {} elements", self.elements.len());
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> Size {
        self.config.canvas_size
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in paint order (ascending `z_index`, ties by id).
    pub fn elements_by_z(&self) -> Vec<&Element> {
        let mut list: Vec<&Element> = self.elements.values().collect();
        list.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        list
    }

    /// What the renderer paints: visible elements in paint order.
    pub fn render_list(&self) -> Vec<&Element> {
        let mut list = self.elements_by_z();
        list.retain(|e| e.visible);
        list
    }

    /// Read-only copy of the current element list, in paint order.
    pub fn snapshot(&self) -> Vec<Element> {
        self.elements_by_z().into_iter().cloned().collect()
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selected
    }

    /// The most recently selected element.
    pub fn primary_selection(&self) -> Option<ElementId> {
        self.selected.last().copied()
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// The element currently in a text-edit session, if any.
    pub fn editing(&self) -> Option<ElementId> {
        self.elements.values().find(|e| e.is_editing).map(|e| e.id)
    }

    pub fn max_z(&self) -> Option<i64> {
        self.elements.values().map(|e| e.z_index).max()
    }

    pub fn min_z(&self) -> Option<i64> {
        self.elements.values().map(|e| e.z_index).min()
    }

    pub fn can_undo(&self) -> bool {
        self.gesture_depth == 0 && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.gesture_depth == 0 && self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    /// The snapshot at the history cursor.
    pub fn current_snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_depth > 0
    }

    // ─── Hooks ───────────────────────────────────────────────────────────

    pub fn save(&self, hooks: &mut dyn SceneHooks) {
        hooks.on_save(&self.snapshot());
    }

    pub fn export(&self, hooks: &mut dyn SceneHooks) {
        hooks.on_export(&self.snapshot());
    }

    // ─── Selection (not history-tracked) ─────────────────────────────────

    /// Select `id`. Additive toggles membership; otherwise the selection
    /// becomes exactly `{id}`. Returns true if the selection changed.
    pub fn select(&mut self, id: ElementId, additive: bool) -> bool {
        if !self.elements.contains_key(&id) {
            return false;
        }
        if additive {
            if let Some(pos) = self.selected.iter().position(|s| *s == id) {
                self.selected.remove(pos);
            } else {
                self.selected.push(id);
            }
        } else {
            if self.selected.as_slice() == [id] {
                return false;
            }
            self.selected.clear();
            self.selected.push(id);
        }
        self.sync_selection_flags();
        true
    }

    /// Replace the selection with `ids` (unknown ids are dropped).
    pub fn set_selection(&mut self, ids: &[ElementId]) -> bool {
        let mut next = IdList::new();
        for id in ids {
            if self.elements.contains_key(id) && !next.contains(id) {
                next.push(*id);
            }
        }
        if next == self.selected {
            return false;
        }
        self.selected = next;
        self.sync_selection_flags();
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        self.sync_selection_flags();
        true
    }

    /// Select every visible element, in paint order.
    pub fn select_all(&mut self) -> bool {
        let ids: Vec<ElementId> = self.render_list().iter().map(|e| e.id).collect();
        self.set_selection(&ids)
    }

    /// Mark `id` as the element in a text-edit session (or none). Locked
    /// and unknown elements cannot be edited. Returns true if `id` is now
    /// the editing element (always true for `None`).
    pub fn set_editing(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id
            && !self.elements.get(&id).is_some_and(|e| !e.locked)
        {
            return false;
        }
        for el in self.elements.values_mut() {
            el.is_editing = Some(el.id) == id;
        }
        true
    }

    fn sync_selection_flags(&mut self) {
        for el in self.elements.values_mut() {
            el.is_selected = self.selected.contains(&el.id);
        }
    }

    // ─── Viewport (not history-tracked) ──────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.viewport
            .set_zoom(zoom, self.config.min_zoom, self.config.max_zoom)
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> bool {
        self.viewport
            .zoom_around(factor, anchor, self.config.min_zoom, self.config.max_zoom)
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        self.viewport.pan_by(delta)
    }

    pub fn reset_view(&mut self) -> bool {
        if self.viewport == Viewport::default() {
            return false;
        }
        self.viewport = Viewport::default();
        true
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Open a gesture batch. Actions until the matching `end_gesture` are
    /// applied live but recorded as one history step.
    pub fn begin_gesture(&mut self) {
        if self.gesture_depth == 0 {
            self.gesture_dirty = false;
        }
        self.gesture_depth += 1;
    }

    /// Close a gesture batch. When the outermost batch closes and the
    /// elements differ from the snapshot at the cursor, one snapshot is
    /// committed. Returns true if a commit happened.
    pub fn end_gesture(&mut self) -> bool {
        if self.gesture_depth == 0 {
            return false;
        }
        self.gesture_depth -= 1;
        if self.gesture_depth > 0 || !std::mem::take(&mut self.gesture_dirty) {
            return false;
        }
        let snapshot = Snapshot::new(self.elements.values());
        if snapshot.same_state(self.history.current()) {
            log::debug!("gesture ended without net change");
            return false;
        }
        self.history.commit(snapshot);
        true
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one snapshot. No-op at the oldest entry or mid-gesture.
    pub fn undo(&mut self) -> bool {
        if self.gesture_depth > 0 {
            return false;
        }
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. No-op at the newest entry or mid-gesture.
    pub fn redo(&mut self) -> bool {
        if self.gesture_depth > 0 {
            return false;
        }
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Load a snapshot. Selection keeps the ids that still exist; edit
    /// sessions end.
    fn restore(&mut self, snapshot: &Snapshot) {
        self.elements = snapshot
            .elements()
            .iter()
            .map(|e| (e.id, e.clone()))
            .collect();
        self.selected.retain(|id| self.elements.contains_key(&*id));
        self.sync_selection_flags();
    }

    fn record(&mut self) {
        if self.gesture_depth > 0 {
            self.gesture_dirty = true;
        } else {
            self.history.commit(Snapshot::new(self.elements.values()));
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply one action. Returns true if anything changed.
    pub fn apply(&mut self, action: SceneAction) -> bool {
        !matches!(self.dispatch(action), Outcome::Unchanged)
    }

    /// Add an element; returns its id, or `None` if the id is taken.
    pub fn add(&mut self, element: Element) -> Option<ElementId> {
        match self.dispatch(SceneAction::Add {
            element: Box::new(element),
        }) {
            Outcome::Created(id) => Some(id),
            _ => None,
        }
    }

    /// Duplicate `id`; returns the clone's id.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        match self.dispatch(SceneAction::Duplicate { id }) {
            Outcome::Created(id) => Some(id),
            _ => None,
        }
    }

    fn dispatch(&mut self, action: SceneAction) -> Outcome {
        let name = action.name();
        let step = action.is_gesture_step();
        let outcome = self.reduce(action);
        if !matches!(outcome, Outcome::Unchanged) {
            if step {
                log::trace!("scene {name}");
            } else {
                log::debug!("scene {name}");
            }
            self.record();
        }
        outcome
    }

    fn reduce(&mut self, action: SceneAction) -> Outcome {
        let now = self.clock.now_ms();
        let canvas = self.config.canvas_size;
        let min = self.config.min_size;

        match action {
            SceneAction::Add { element } => {
                let mut el = *element;
                if self.elements.contains_key(&el.id) {
                    log::warn!("add ignored: element {} already exists", el.id);
                    return Outcome::Unchanged;
                }
                el.z_index = self.next_z();
                el.created_at = now;
                el.updated_at = now;
                el.is_selected = false;
                el.is_editing = false;
                normalize_geometry(&mut el, min, canvas);
                let id = el.id;
                self.elements.insert(id, el);
                Outcome::Created(id)
            }

            SceneAction::Update { id, patch } => {
                let Some(el) = self.elements.get_mut(&id) else {
                    return Outcome::Unchanged;
                };
                let before = el.clone();
                let allow_geometry = !el.locked;
                patch.apply_to(el, allow_geometry);
                normalize_geometry(el, min, canvas);
                finish_edit(el, &before, now)
            }

            SceneAction::Move { id, position } => {
                let Some(el) = self.manipulable_mut(id) else {
                    return Outcome::Unchanged;
                };
                let position = Point::new(
                    finite_or(position.x, el.position.x),
                    finite_or(position.y, el.position.y),
                );
                let next = clamp_position(position, el.size, canvas);
                if next == el.position {
                    return Outcome::Unchanged;
                }
                el.position = next;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::Resize { id, rect } => {
                let Some(el) = self.manipulable_mut(id) else {
                    return Outcome::Unchanged;
                };
                let size = clamp_size_within(rect.size(), min, canvas);
                let origin = Point::new(
                    finite_or(rect.x0, el.position.x),
                    finite_or(rect.y0, el.position.y),
                );
                let position = clamp_position(origin, size, canvas);
                if size == el.size && position == el.position {
                    return Outcome::Unchanged;
                }
                el.size = size;
                el.position = position;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::Rotate { id, degrees } => {
                let Some(el) = self.manipulable_mut(id) else {
                    return Outcome::Unchanged;
                };
                if !degrees.is_finite() || degrees == el.rotation {
                    return Outcome::Unchanged;
                }
                el.rotation = degrees;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::SetText { id, text } => {
                let Some(el) = self.elements.get_mut(&id) else {
                    return Outcome::Unchanged;
                };
                if el.text == text {
                    return Outcome::Unchanged;
                }
                el.text = text;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::Restyle { id, style } => {
                let Some(el) = self.elements.get_mut(&id) else {
                    return Outcome::Unchanged;
                };
                let before = el.clone();
                el.style.merge(&style);
                finish_edit(el, &before, now)
            }

            SceneAction::SetLocked { id, locked } => {
                let Some(el) = self.elements.get_mut(&id) else {
                    return Outcome::Unchanged;
                };
                if el.locked == locked {
                    return Outcome::Unchanged;
                }
                el.locked = locked;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::SetVisible { id, visible } => {
                let Some(el) = self.elements.get_mut(&id) else {
                    return Outcome::Unchanged;
                };
                if el.visible == visible {
                    return Outcome::Unchanged;
                }
                el.visible = visible;
                el.updated_at = now;
                Outcome::Changed
            }

            SceneAction::Duplicate { id } => {
                let Some(source) = self.elements.get(&id) else {
                    return Outcome::Unchanged;
                };
                let mut clone = source.clone();
                clone.id = ElementId::fresh(ELEMENT_ID_PREFIX);
                clone.position = clamp_position(
                    source.position + self.config.duplicate_offset,
                    clone.size,
                    canvas,
                );
                clone.z_index = self.next_z();
                clone.created_at = now;
                clone.updated_at = now;
                clone.is_editing = false;
                let new_id = clone.id;
                self.elements.insert(new_id, clone);
                self.selected.clear();
                self.selected.push(new_id);
                self.sync_selection_flags();
                Outcome::Created(new_id)
            }

            SceneAction::Delete { ids } => {
                let mut removed = false;
                for id in ids {
                    if self.elements.get(&id).is_some_and(|e| !e.locked) {
                        self.elements.remove(&id);
                        removed = true;
                    }
                }
                if !removed {
                    return Outcome::Unchanged;
                }
                self.selected.retain(|id| self.elements.contains_key(&*id));
                Outcome::Changed
            }

            SceneAction::BringToFront { id } => {
                let Some(z) = self.elements.get(&id).map(|e| e.z_index) else {
                    return Outcome::Unchanged;
                };
                let top = self.others_z(id).max();
                match top {
                    Some(top) if top >= z => {
                        let front = top.checked_add(1).unwrap_or_else(|| {
                            self.renumber();
                            self.elements.len() as i64 + 1
                        });
                        self.set_z(id, front, now)
                    }
                    _ => Outcome::Unchanged,
                }
            }

            SceneAction::SendToBack { id } => {
                let Some(z) = self.elements.get(&id).map(|e| e.z_index) else {
                    return Outcome::Unchanged;
                };
                let bottom = self.others_z(id).min();
                match bottom {
                    Some(bottom) if bottom <= z => {
                        let back = bottom.checked_sub(1).unwrap_or_else(|| {
                            self.renumber();
                            0
                        });
                        self.set_z(id, back, now)
                    }
                    _ => Outcome::Unchanged,
                }
            }

            SceneAction::BringForward { id } => self.swap_with_neighbor(id, true, now),
            SceneAction::SendBackward { id } => self.swap_with_neighbor(id, false, now),
        }
    }

    fn manipulable_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements
            .get_mut(&id)
            .filter(|e| e.is_manipulable())
    }

    /// `max(z) + 1`, or 1 on an empty scene. At the top of the `i64`
    /// range the scene is renumbered first.
    fn next_z(&mut self) -> i64 {
        match self.max_z() {
            None => 1,
            Some(z) => z.checked_add(1).unwrap_or_else(|| {
                self.renumber();
                self.elements.len() as i64 + 1
            }),
        }
    }

    fn others_z(&self, id: ElementId) -> impl Iterator<Item = i64> + '_ {
        self.elements
            .values()
            .filter(move |e| e.id != id)
            .map(|e| e.z_index)
    }

    fn set_z(&mut self, id: ElementId, z: i64, now: u64) -> Outcome {
        match self.elements.get_mut(&id) {
            Some(el) if el.z_index != z => {
                el.z_index = z;
                el.updated_at = now;
                Outcome::Changed
            }
            _ => Outcome::Unchanged,
        }
    }

    /// Swap paint order with the element directly above (or below).
    fn swap_with_neighbor(&mut self, id: ElementId, forward: bool, now: u64) -> Outcome {
        let order: Vec<ElementId> = self.elements_by_z().iter().map(|e| e.id).collect();
        let Some(pos) = order.iter().position(|e| *e == id) else {
            return Outcome::Unchanged;
        };
        let neighbor = if forward {
            order.get(pos + 1)
        } else {
            pos.checked_sub(1).and_then(|p| order.get(p))
        };
        let Some(&neighbor) = neighbor else {
            return Outcome::Unchanged;
        };
        // Ties have to be split before a swap can change anything.
        self.renumber_ties();
        let (Some(a), Some(b)) = (
            self.elements.get(&id).map(|e| e.z_index),
            self.elements.get(&neighbor).map(|e| e.z_index),
        ) else {
            return Outcome::Unchanged;
        };
        self.set_z(id, b, now);
        self.set_z(neighbor, a, now);
        Outcome::Changed
    }

    /// Give every element a distinct `z_index` (1..=n, paint order kept)
    /// when two share one. Loaded templates may contain ties.
    fn renumber_ties(&mut self) {
        let mut zs: Vec<i64> = self.elements.values().map(|e| e.z_index).collect();
        zs.sort_unstable();
        if zs.windows(2).all(|w| w[0] != w[1]) {
            return;
        }
        self.renumber();
    }

    /// Reassign `z_index` as 1..=n in the current paint order.
    fn renumber(&mut self) {
        let order: Vec<ElementId> = self.elements_by_z().iter().map(|e| e.id).collect();
        for (i, id) in order.into_iter().enumerate() {
            if let Some(el) = self.elements.get_mut(&id) {
                el.z_index = i as i64 + 1;
            }
        }
    }

    /// Advance the cascade counter used by preset placement.
    pub(crate) fn next_cascade_step(&mut self) -> u32 {
        let step = self.cascade_step;
        self.cascade_step = self.cascade_step.wrapping_add(1);
        step
    }
}

/// Clamp size (minimum and canvas) and then position into the canvas.
fn normalize_geometry(el: &mut Element, min: Size, canvas: Size) {
    el.size = clamp_size_within(el.size, min, canvas);
    el.position = clamp_position(el.position, el.size, canvas);
    el.opacity = finite_or(el.opacity, 1.0).clamp(0.0, 1.0);
    if !(el.scale.is_finite() && el.scale > 0.0) {
        el.scale = 1.0;
    }
    el.rotation = finite_or(el.rotation, 0.0);
}

/// Bump `updated_at` if the edit changed persistent state.
fn finish_edit(el: &mut Element, before: &Element, now: u64) -> Outcome {
    if el.same_state(before) {
        return Outcome::Unchanged;
    }
    el.updated_at = now;
    Outcome::Changed
}
