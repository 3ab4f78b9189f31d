//! The editor facade.
//!
//! `Editor` owns one `Scene` and wires the interaction controller, the edit
//! session and the shortcut table to it. Hosts feed it input and drain a
//! queue of `EditorEvent`s; nothing is broadcast globally.
//!
//! Commands that touch several elements (nudging a selection, pasting,
//! duplicating) run inside a scene gesture so they land as one history step.

use crate::input::{InputEvent, Modifiers};
use crate::interaction::{Gesture, InteractionController};
use crate::session::EditSession;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::{Point, Vec2};
use serde::Serialize;
use std::collections::VecDeque;
use td_core::preset::{Placement, PresetBundle};
use td_core::scene::IdList;
use td_core::geometry::finite_or;
use td_core::{
    Clock, EditorConfig, Element, ElementId, ElementPatch, Scene, SceneAction, SceneHooks,
    StyleBag, Viewport,
};
use td_render::{DisplayList, hit_element, hit_test};

/// Wheel delta (px) that halves or doubles the zoom with Cmd held.
const WHEEL_ZOOM_SPAN: f64 = 500.0;

/// Notifications for the host, drained with [`Editor::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Elements changed; re-render.
    SceneChanged,
    SelectionChanged {
        selection: Vec<ElementId>,
    },
    /// A manipulation began; attach move/up listeners.
    GestureStarted {
        gesture: &'static str,
    },
    /// The manipulation ended; detach listeners.
    GestureEnded {
        committed: bool,
    },
    /// Focus the text input with `text`, selecting all of it when asked.
    EditStarted {
        id: ElementId,
        text: String,
        #[serde(rename = "selectAll")]
        select_all: bool,
    },
    EditEnded {
        id: ElementId,
        committed: bool,
    },
    ViewportChanged {
        viewport: Viewport,
    },
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOutcome {
    pub action: Option<ShortcutAction>,
    pub changed: bool,
    /// The host should call `preventDefault()` on the key event.
    pub prevent_default: bool,
}

pub struct Editor {
    scene: Scene,
    interaction: InteractionController,
    session: Option<EditSession>,
    clipboard: Vec<Element>,
    events: VecDeque<EditorEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("gesture", self.interaction.gesture())
            .field("session", &self.session)
            .field("clipboard", &self.clipboard.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::from_scene(Scene::new(config))
    }

    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self::from_scene(Scene::with_clock(config, clock))
    }

    pub fn from_scene(scene: Scene) -> Self {
        Self {
            scene,
            interaction: InteractionController::new(),
            session: None,
            clipboard: Vec::new(),
            events: VecDeque::new(),
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        self.scene.config()
    }

    pub fn gesture(&self) -> &Gesture {
        self.interaction.gesture()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn display_list(&self) -> DisplayList {
        DisplayList::build(&self.scene)
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    /// Take every pending notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    // ─── Events ──────────────────────────────────────────────────────────

    fn emit(&mut self, event: EditorEvent) {
        if self.events.back() == Some(&event) {
            return;
        }
        self.events.push_back(event);
    }

    fn scene_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.emit(EditorEvent::SceneChanged);
        }
        changed
    }

    /// Emit `SelectionChanged` if the selection differs from `before`.
    fn selection_since(&mut self, before: &[ElementId]) {
        if self.scene.selection() != before {
            let selection = self.scene.selection().to_vec();
            self.emit(EditorEvent::SelectionChanged { selection });
        }
    }

    fn viewport_changed(&mut self, changed: bool) -> bool {
        if changed {
            let viewport = *self.scene.viewport();
            self.emit(EditorEvent::ViewportChanged { viewport });
        }
        changed
    }

    fn selection_snapshot(&self) -> IdList {
        IdList::from_slice(self.scene.selection())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route a normalized input event. Returns true if the host should
    /// suppress the browser default for it.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers);
                true
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerUp { .. } => {
                self.pointer_up();
                true
            }
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers).prevent_default,
            InputEvent::Wheel {
                x,
                y,
                dx,
                dy,
                modifiers,
            } => self.wheel(Point::new(*x, *y), Vec2::new(*dx, *dy), *modifiers),
            InputEvent::Blur => {
                self.blur();
                false
            }
        }
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        let before = self.selection_snapshot();
        let hit = hit_test(&self.scene, screen);
        if let Some(session) = &self.session
            && hit.element() != Some(session.id())
        {
            self.commit_edit();
        }
        let down = self
            .interaction
            .pointer_down(&mut self.scene, hit, screen, modifiers);
        self.selection_since(&before);
        if down.gesture_started {
            let gesture = self.interaction.gesture().name();
            self.emit(EditorEvent::GestureStarted { gesture });
        }
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> bool {
        let changed = self
            .interaction
            .pointer_move(&mut self.scene, screen, modifiers);
        self.scene_changed(changed)
    }

    pub fn pointer_up(&mut self) {
        let up = self.interaction.pointer_up(&mut self.scene);
        if let Some(committed) = up.gesture_ended {
            self.emit(EditorEvent::GestureEnded { committed });
        }
        // Clicking an already-selected element opens it for editing.
        if let Some(click) = up.click
            && click.was_selected
            && !click.additive
            && self
                .scene
                .element(click.id)
                .is_some_and(|e| e.is_manipulable())
        {
            self.begin_edit(click.id);
        }
    }

    /// Double-click opens the element under the pointer for editing.
    pub fn double_click(&mut self, screen: Point) -> bool {
        match hit_element(&self.scene, screen) {
            Some(id) => self.begin_edit(id),
            None => false,
        }
    }

    /// Focus loss: an open gesture commits as it stands and an open edit
    /// session commits its pending text.
    pub fn blur(&mut self) {
        if let Some(committed) = self.interaction.cancel(&mut self.scene) {
            self.emit(EditorEvent::GestureEnded { committed });
        }
        self.commit_edit();
    }

    /// Handle a key press. During an edit session only Enter (without
    /// Shift) and Escape are interpreted; everything else belongs to the
    /// text input.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> KeyOutcome {
        if self.session.is_some() {
            return match key {
                "Enter" if !modifiers.shift => KeyOutcome {
                    action: None,
                    changed: self.commit_edit(),
                    prevent_default: true,
                },
                "Escape" => {
                    self.cancel_edit();
                    KeyOutcome {
                        action: None,
                        changed: false,
                        prevent_default: true,
                    }
                }
                _ => KeyOutcome::default(),
            };
        }

        match ShortcutMap::resolve(key, modifiers) {
            Some(action) => {
                log::debug!("shortcut {key:?} → {action:?}");
                KeyOutcome {
                    action: Some(action),
                    changed: self.run(action),
                    prevent_default: true,
                }
            }
            None => KeyOutcome::default(),
        }
    }

    /// Wheel: with Cmd held, zoom around the pointer; otherwise pan.
    pub fn wheel(&mut self, screen: Point, delta: Vec2, modifiers: Modifiers) -> bool {
        let changed = if modifiers.cmd() {
            let factor = (1.0 - finite_or(delta.y, 0.0) / WHEEL_ZOOM_SPAN).max(0.1);
            self.scene.zoom_by(factor, screen)
        } else {
            self.scene.pan_by(-delta)
        };
        self.viewport_changed(changed)
    }

    // ─── Shortcut actions ────────────────────────────────────────────────

    /// Run a shortcut action. Returns true if the scene or view changed.
    pub fn run(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::DeleteSelected => self.delete_selected(),
            ShortcutAction::ClearSelection => self.clear_selection(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Duplicate => !self.duplicate_selected().is_empty(),
            ShortcutAction::Copy => {
                self.copy();
                false
            }
            ShortcutAction::Cut => self.cut(),
            ShortcutAction::Paste => !self.paste().is_empty(),
            ShortcutAction::BringToFront => self.reorder(|id| SceneAction::BringToFront { id }, false),
            ShortcutAction::SendToBack => self.reorder(|id| SceneAction::SendToBack { id }, true),
            ShortcutAction::BringForward => self.reorder(|id| SceneAction::BringForward { id }, true),
            ShortcutAction::SendBackward => self.reorder(|id| SceneAction::SendBackward { id }, false),
            ShortcutAction::ZoomIn => self.zoom_step(true),
            ShortcutAction::ZoomOut => self.zoom_step(false),
            ShortcutAction::ZoomReset => {
                let changed = self.scene.reset_view();
                self.viewport_changed(changed)
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    self.config().nudge_large
                } else {
                    self.config().nudge
                };
                self.nudge(Vec2::new(f64::from(dx) * step, f64::from(dy) * step))
            }
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back. An open edit session is committed first so its text is
    /// what gets undone. No-op during a pointer gesture.
    pub fn undo(&mut self) -> bool {
        if self.interaction.is_active() {
            return false;
        }
        self.commit_edit();
        let before = self.selection_snapshot();
        let changed = self.scene.undo();
        self.selection_since(&before);
        self.scene_changed(changed)
    }

    pub fn redo(&mut self) -> bool {
        if self.interaction.is_active() {
            return false;
        }
        self.commit_edit();
        let before = self.selection_snapshot();
        let changed = self.scene.redo();
        self.selection_since(&before);
        self.scene_changed(changed)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: ElementId, additive: bool) -> bool {
        let before = self.selection_snapshot();
        let changed = self.scene.select(id, additive);
        self.selection_since(&before);
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let before = self.selection_snapshot();
        let changed = self.scene.clear_selection();
        self.selection_since(&before);
        changed
    }

    pub fn select_all(&mut self) -> bool {
        let before = self.selection_snapshot();
        let changed = self.scene.select_all();
        self.selection_since(&before);
        changed
    }

    // ─── Edit sessions ───────────────────────────────────────────────────

    /// Open `id` for text editing. Any other session is committed first.
    pub fn begin_edit(&mut self, id: ElementId) -> bool {
        if self.session.as_ref().is_some_and(|s| s.id() == id) {
            return false;
        }
        if self.interaction.is_active() {
            return false;
        }
        self.commit_edit();
        let before = self.selection_snapshot();
        let Some(session) = EditSession::begin(&mut self.scene, id) else {
            return false;
        };
        let text = session.original().to_string();
        self.session = Some(session);
        self.selection_since(&before);
        self.emit(EditorEvent::EditStarted {
            id,
            text,
            select_all: true,
        });
        true
    }

    /// Mirror the host text input.
    pub fn edit_input(&mut self, text: &str) {
        if let Some(session) = &mut self.session {
            session.input(text);
        }
    }

    /// Close the session keeping the typed text. Returns true if the text
    /// changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let id = session.id();
        let committed = session.commit(&mut self.scene);
        self.emit(EditorEvent::EditEnded { id, committed });
        self.scene_changed(committed)
    }

    /// Close the session discarding the typed text.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.session.take() {
            let id = session.id();
            session.cancel(&mut self.scene);
            self.emit(EditorEvent::EditEnded {
                id,
                committed: false,
            });
        }
    }

    // ─── Scene commands ──────────────────────────────────────────────────

    /// Apply one action directly (property panels, toolbars).
    pub fn apply(&mut self, action: SceneAction) -> bool {
        let before = self.selection_snapshot();
        let changed = self.scene.apply(action);
        self.selection_since(&before);
        self.scene_changed(changed)
    }

    /// Run `f` as one history step.
    fn batch<R>(&mut self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let before = self.selection_snapshot();
        self.scene.begin_gesture();
        let result = f(&mut self.scene);
        let committed = self.scene.end_gesture();
        self.selection_since(&before);
        self.scene_changed(committed);
        result
    }

    /// Add a text element (default text when `text` is `None`) and select it.
    pub fn add_text(&mut self, text: Option<&str>, placement: Placement) -> Option<ElementId> {
        let text = text.map_or_else(|| self.config().default_text.clone(), str::to_string);
        let element = self
            .scene
            .new_element(&text, None, StyleBag::new(), placement);
        self.add_and_select(element)
    }

    /// Add an element built by the host and select it.
    pub fn add_element(&mut self, element: Element) -> Option<ElementId> {
        self.add_and_select(element)
    }

    pub fn add_preset(&mut self, bundle: &PresetBundle, placement: Placement) -> Option<ElementId> {
        self.commit_edit();
        let before = self.selection_snapshot();
        let id = self.scene.instantiate_from_preset(bundle, placement)?;
        self.scene.select(id, false);
        self.selection_since(&before);
        self.scene_changed(true);
        Some(id)
    }

    fn add_and_select(&mut self, element: Element) -> Option<ElementId> {
        self.commit_edit();
        let before = self.selection_snapshot();
        let id = self.scene.add(element)?;
        self.scene.select(id, false);
        self.selection_since(&before);
        self.scene_changed(true);
        Some(id)
    }

    /// Merge `patch` into every selected element as one step.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let ids = self.selection_snapshot();
        self.batch(|scene| {
            let mut changed = false;
            for id in ids {
                changed |= scene.apply(SceneAction::Update {
                    id,
                    patch: patch.clone(),
                });
            }
            changed
        })
    }

    /// Shallow-merge `style` into every selected element as one step.
    pub fn restyle_selected(&mut self, style: &StyleBag) -> bool {
        let ids = self.selection_snapshot();
        self.batch(|scene| {
            let mut changed = false;
            for id in ids {
                changed |= scene.apply(SceneAction::Restyle {
                    id,
                    style: style.clone(),
                });
            }
            changed
        })
    }

    pub fn set_locked_selected(&mut self, locked: bool) -> bool {
        if locked
            && let Some(session) = &self.session
            && self.scene.is_selected(session.id())
        {
            self.commit_edit();
        }
        let ids = self.selection_snapshot();
        self.batch(|scene| {
            let mut changed = false;
            for id in ids {
                changed |= scene.apply(SceneAction::SetLocked { id, locked });
            }
            changed
        })
    }

    /// Delete the selection (locked elements stay).
    pub fn delete_selected(&mut self) -> bool {
        self.commit_edit();
        let ids = self.selection_snapshot();
        if ids.is_empty() {
            return false;
        }
        self.apply(SceneAction::Delete { ids })
    }

    /// Duplicate every selected element; the copies become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        self.commit_edit();
        let ids = self.selected_by_z();
        if ids.is_empty() {
            return Vec::new();
        }
        self.batch(|scene| {
            let copies: Vec<ElementId> = ids.iter().filter_map(|id| scene.duplicate(*id)).collect();
            scene.set_selection(&copies);
            copies
        })
    }

    /// Copy the selection into the internal clipboard.
    pub fn copy(&mut self) -> usize {
        self.clipboard = self
            .selected_by_z()
            .into_iter()
            .filter_map(|id| self.scene.element(id))
            .map(Element::without_transient_flags)
            .collect();
        log::debug!("copied {} elements", self.clipboard.len());
        self.clipboard.len()
    }

    pub fn cut(&mut self) -> bool {
        self.copy() > 0 && self.delete_selected()
    }

    /// Paste the clipboard offset from its source; repeated pastes keep
    /// stepping. The pasted elements become the selection.
    pub fn paste(&mut self) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.commit_edit();
        let offset = self.config().duplicate_offset;
        for el in &mut self.clipboard {
            el.position += offset;
        }
        let clipboard = self.clipboard.clone();
        self.batch(|scene| {
            let pasted: Vec<ElementId> = clipboard
                .into_iter()
                .filter_map(|mut el| {
                    el.id = ElementId::fresh(td_core::model::ELEMENT_ID_PREFIX);
                    scene.add(el)
                })
                .collect();
            scene.set_selection(&pasted);
            pasted
        })
    }

    /// Move every selected, manipulable element by `delta` canvas units.
    pub fn nudge(&mut self, delta: Vec2) -> bool {
        let ids = self.selection_snapshot();
        self.batch(|scene| {
            let mut changed = false;
            for id in ids {
                let Some(position) = scene.element(id).map(|e| e.position) else {
                    continue;
                };
                changed |= scene.apply(SceneAction::Move {
                    id,
                    position: position + delta,
                });
            }
            changed
        })
    }

    /// Apply a z-order action to each selected element. `top_down` walks the
    /// selection from the topmost element so relative order survives.
    fn reorder(&mut self, action: fn(ElementId) -> SceneAction, top_down: bool) -> bool {
        let mut ids = self.selected_by_z();
        if top_down {
            ids.reverse();
        }
        self.batch(|scene| {
            let mut changed = false;
            for id in ids {
                changed |= scene.apply(action(id));
            }
            changed
        })
    }

    /// Selected ids in paint order (bottom first).
    fn selected_by_z(&self) -> Vec<ElementId> {
        self.scene
            .elements_by_z()
            .into_iter()
            .filter(|e| self.scene.is_selected(e.id))
            .map(|e| e.id)
            .collect()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    fn zoom_step(&mut self, zoom_in: bool) -> bool {
        let step = self.config().zoom_step;
        let factor = if zoom_in { step } else { 1.0 / step };
        let canvas = self.scene.canvas_size();
        let anchor = self
            .scene
            .viewport()
            .canvas_to_screen(Point::new(canvas.width / 2.0, canvas.height / 2.0));
        let changed = self.scene.zoom_by(factor, anchor);
        self.viewport_changed(changed)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let changed = self.scene.set_zoom(zoom);
        self.viewport_changed(changed)
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        let changed = self.scene.pan_by(delta);
        self.viewport_changed(changed)
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Replace the document. Open gestures and sessions are dropped.
    pub fn load(&mut self, elements: Vec<Element>) {
        self.interaction.cancel(&mut self.scene);
        self.cancel_edit();
        let before = self.selection_snapshot();
        self.scene.load(elements);
        self.selection_since(&before);
        self.scene_changed(true);
    }

    pub fn save(&mut self, hooks: &mut dyn SceneHooks) {
        self.commit_edit();
        self.scene.save(hooks);
    }

    pub fn export(&mut self, hooks: &mut dyn SceneHooks) {
        self.commit_edit();
        self.scene.export(hooks);
    }
}
