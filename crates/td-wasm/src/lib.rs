//! WASM bridge: exposes the TD editing engine to the browser host.
//!
//! Compiled via `wasm-pack build --target web`. Every method takes plain
//! numbers/strings and answers with a `bool` or a JSON string, so the host
//! never handles Rust types directly. Fallible calls answer
//! `{"ok":true,...}` or `{"ok":false,"error":"..."}`.

mod console;

use serde::Serialize;
use serde_json::{Value, json};
use td_core::preset::{Placement, PresetBundle};
use td_core::{EditorConfig, Element, ElementId, ElementPatch, Point, SceneAction, SceneHooks, StyleBag, Vec2};
use td_editor::{Editor, Modifiers};
use wasm_bindgen::prelude::*;

pub use console::{ConsoleLogger, JsClock};

/// Host callbacks for the save / export buttons. Each receives the element
/// list as a JSON string.
#[derive(Default)]
struct JsHooks {
    on_save: Option<js_sys::Function>,
    on_export: Option<js_sys::Function>,
}

impl JsHooks {
    fn call(hook: Option<&js_sys::Function>, name: &str, elements: &[Element]) {
        let Some(f) = hook else {
            log::warn!("{name} requested but no hook is registered");
            return;
        };
        match serde_json::to_string(elements) {
            Ok(payload) => {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                    log::error!("{name} hook threw: {e:?}");
                }
            }
            Err(e) => log::error!("{name}: cannot serialize elements: {e}"),
        }
    }
}

impl SceneHooks for JsHooks {
    fn on_save(&mut self, elements: &[Element]) {
        Self::call(self.on_save.as_ref(), "save", elements);
    }

    fn on_export(&mut self, elements: &[Element]) {
        Self::call(self.on_export.as_ref(), "export", elements);
    }
}

/// The main WASM-facing canvas controller.
///
/// Holds the editor (scene, interaction, edit session, shortcuts) and the
/// host hooks. All interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct TdCanvas {
    editor: Editor,
    hooks: JsHooks,
}

#[wasm_bindgen]
impl TdCanvas {
    /// Create a controller from a (partial) JSON `EditorConfig`. Invalid
    /// config is logged and replaced by the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console::init(log::LevelFilter::Info);

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).unwrap_or_else(|e| {
                log::warn!("{e}; using defaults");
                EditorConfig::default()
            })
        };
        Self {
            editor: Editor::with_clock(config, Box::new(JsClock)),
            hooks: JsHooks::default(),
        }
    }

    // ─── Pointer / keyboard ──────────────────────────────────────────────

    /// Returns true if the host should re-render or react to events.
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers::new(shift, ctrl, alt, meta);
        self.editor.pointer_down(Point::new(x, y), mods);
        true
    }

    /// Returns true if the scene changed.
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers::new(shift, ctrl, alt, meta);
        self.editor.pointer_move(Point::new(x, y), mods)
    }

    pub fn handle_pointer_up(&mut self) {
        self.editor.pointer_up();
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> bool {
        self.editor.double_click(Point::new(x, y))
    }

    /// Returns JSON: `{"action":..., "changed":bool, "preventDefault":bool}`.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let outcome = self.editor.key(key, Modifiers::new(shift, ctrl, alt, meta));
        to_json(&outcome)
    }

    /// Returns true if the viewport changed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_wheel(
        &mut self,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers::new(shift, ctrl, alt, meta);
        self.editor.wheel(Point::new(x, y), Vec2::new(dx, dy), mods)
    }

    pub fn handle_blur(&mut self) {
        self.editor.blur();
    }

    /// Pending events as a JSON array, oldest first.
    pub fn drain_events(&mut self) -> String {
        to_json(&self.editor.drain_events())
    }

    // ─── Edit sessions ───────────────────────────────────────────────────

    pub fn begin_edit(&mut self, id: &str) -> bool {
        ElementId::lookup(id).is_some_and(|id| self.editor.begin_edit(id))
    }

    pub fn edit_input(&mut self, text: &str) {
        self.editor.edit_input(text);
    }

    pub fn commit_edit(&mut self) -> bool {
        self.editor.commit_edit()
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel_edit();
    }

    /// The text being typed, if a session is open.
    pub fn pending_text(&self) -> Option<String> {
        self.editor.session().map(|s| s.pending().to_string())
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.scene().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.scene().can_redo()
    }

    // ─── Toolbar commands ────────────────────────────────────────────────

    /// Add a text element (default text when `text` is omitted) centred on
    /// the canvas. Returns the new id.
    pub fn add_text(&mut self, text: Option<String>) -> Option<String> {
        self.editor
            .add_text(text.as_deref(), Placement::Center)
            .map(|id| id.to_string())
    }

    /// Instantiate a preset. `placement_json` is `{"kind":"center"}`,
    /// `{"kind":"at","x":..,"y":..}` or `{"kind":"cascade"}` (default: center).
    pub fn add_preset(&mut self, bundle_json: &str, placement_json: Option<String>) -> String {
        let parsed = PresetBundle::from_json(bundle_json)
            .and_then(|bundle| Ok((bundle, parse_placement(placement_json.as_deref())?)));
        match parsed {
            Ok((bundle, placement)) => match self.editor.add_preset(&bundle, placement) {
                Some(id) => ok_json(json!({ "id": id })),
                None => error_json("preset could not be added"),
            },
            Err(e) => error_json(&e),
        }
    }

    /// Merge a JSON `ElementPatch` into every selected element.
    pub fn update_selected(&mut self, patch_json: &str) -> String {
        match ElementPatch::from_json(patch_json) {
            Ok(patch) => ok_json(json!({ "changed": self.editor.update_selected(&patch) })),
            Err(e) => error_json(&e),
        }
    }

    /// Shallow-merge a JSON style object into every selected element.
    pub fn restyle_selected(&mut self, style_json: &str) -> String {
        match parse_style(style_json) {
            Ok(style) => ok_json(json!({ "changed": self.editor.restyle_selected(&style) })),
            Err(e) => error_json(&e),
        }
    }

    pub fn set_locked_selected(&mut self, locked: bool) -> bool {
        self.editor.set_locked_selected(locked)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        ElementId::lookup(id)
            .is_some_and(|id| self.editor.apply(SceneAction::SetVisible { id, visible }))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    /// Returns the ids of the copies as a JSON array.
    pub fn duplicate_selected(&mut self) -> String {
        to_json(&self.editor.duplicate_selected())
    }

    /// `op` is `front`, `back`, `forward` or `backward`.
    pub fn reorder_selected(&mut self, op: &str) -> bool {
        use td_editor::ShortcutAction as A;
        let action = match op {
            "front" => A::BringToFront,
            "back" => A::SendToBack,
            "forward" => A::BringForward,
            "backward" => A::SendBackward,
            _ => {
                log::warn!("unknown reorder op {op:?}");
                return false;
            }
        };
        self.editor.run(action)
    }

    pub fn select(&mut self, id: &str, additive: bool) -> bool {
        ElementId::lookup(id).is_some_and(|id| self.editor.select(id, additive))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.editor.clear_selection()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.editor.set_zoom(zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.editor.scene().viewport().zoom()
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        self.editor.pan_by(Vec2::new(dx, dy))
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// The display list (items, selection overlay, viewport) as JSON.
    pub fn render_list(&self) -> String {
        self.editor
            .display_list()
            .to_json()
            .unwrap_or_else(|e| error_json(&e))
    }

    /// Selected ids as a JSON array, primary last.
    pub fn selection(&self) -> String {
        to_json(&self.editor.scene().selection())
    }

    /// All elements in paint order as JSON.
    pub fn elements(&self) -> String {
        to_json(&self.editor.scene().snapshot())
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Replace the document with a JSON array of elements.
    pub fn load(&mut self, elements_json: &str) -> String {
        match serde_json::from_str::<Vec<Element>>(elements_json) {
            Ok(elements) => {
                let count = elements.len();
                self.editor.load(elements);
                ok_json(json!({ "count": count }))
            }
            Err(e) => error_json(&format!("invalid elements: {e}")),
        }
    }

    pub fn set_save_hook(&mut self, f: js_sys::Function) {
        self.hooks.on_save = Some(f);
    }

    pub fn set_export_hook(&mut self, f: js_sys::Function) {
        self.hooks.on_export = Some(f);
    }

    pub fn save(&mut self) {
        self.editor.save(&mut self.hooks);
    }

    pub fn export(&mut self) {
        self.editor.export(&mut self.hooks);
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Set the console log level (`error`, `warn`, `info`, `debug`, `trace`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    console::set_level(level)
}

/// Validate a JSON `EditorConfig`. Returns `{"ok":true,"config":{...}}` with
/// defaults filled in, or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_config(config_json: &str) -> String {
    match EditorConfig::from_json(config_json) {
        Ok(config) => ok_json(json!({ "config": config })),
        Err(e) => error_json(&e),
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(&format!("serialization error: {e}")))
}

/// `{"ok":true}` merged with the fields of `extra` (an object).
fn ok_json(extra: Value) -> String {
    let mut out = json!({ "ok": true });
    if let (Value::Object(out), Value::Object(extra)) = (&mut out, extra) {
        out.extend(extra);
    }
    out.to_string()
}

fn error_json(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}

fn parse_placement(json: Option<&str>) -> Result<Placement, String> {
    match json.map(str::trim) {
        None | Some("") => Ok(Placement::Center),
        Some(s) => serde_json::from_str(s).map_err(|e| format!("invalid placement: {e}")),
    }
}

fn parse_style(json: &str) -> Result<StyleBag, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid style: {e}"))?;
    StyleBag::from_value(value).ok_or_else(|| "invalid style: expected an object".to_string())
}
