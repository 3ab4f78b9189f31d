//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s through a
//! static table. A binding matches only when the modifier state is exactly
//! the one listed (Ctrl and ⌘ both count as `cmd`), so Cmd+Shift+Z never
//! falls through to Cmd+Z.
//!
//! The table lives in Rust so the browser bridge and native tests share it.

use crate::input::Modifiers;
use serde::Serialize;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    DeleteSelected,
    /// Escape outside an edit session.
    ClearSelection,
    SelectAll,
    Duplicate,
    Copy,
    Cut,
    Paste,

    // ── Z-order ──
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    /// Arrow keys: move the selection one step (`large` with Shift).
    Nudge { dx: i8, dy: i8, large: bool },
}

/// Modifier chord a binding requires. `cmd` is Ctrl or ⌘.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Chord {
    cmd: bool,
    shift: bool,
    alt: bool,
}

impl Chord {
    const fn new(cmd: bool, shift: bool) -> Self {
        Self {
            cmd,
            shift,
            alt: false,
        }
    }

    fn of(m: Modifiers) -> Self {
        Self {
            cmd: m.cmd(),
            shift: m.shift,
            alt: m.alt,
        }
    }
}

const PLAIN: Chord = Chord::new(false, false);
const SHIFT: Chord = Chord::new(false, true);
const CMD: Chord = Chord::new(true, false);
const CMD_SHIFT: Chord = Chord::new(true, true);

const fn nudge(dx: i8, dy: i8, large: bool) -> ShortcutAction {
    ShortcutAction::Nudge { dx, dy, large }
}

/// `(key, chord, action)`. Single-character keys are matched lowercased.
static BINDINGS: &[(&str, Chord, ShortcutAction)] = &[
    ("z", CMD, ShortcutAction::Undo),
    ("z", CMD_SHIFT, ShortcutAction::Redo),
    ("y", CMD, ShortcutAction::Redo),
    ("Delete", PLAIN, ShortcutAction::DeleteSelected),
    ("Backspace", PLAIN, ShortcutAction::DeleteSelected),
    ("Escape", PLAIN, ShortcutAction::ClearSelection),
    ("a", CMD, ShortcutAction::SelectAll),
    ("d", CMD, ShortcutAction::Duplicate),
    ("c", CMD, ShortcutAction::Copy),
    ("x", CMD, ShortcutAction::Cut),
    ("v", CMD, ShortcutAction::Paste),
    ("]", CMD, ShortcutAction::BringToFront),
    ("[", CMD, ShortcutAction::SendToBack),
    // Shift turns the bracket keys into braces on most layouts.
    ("]", CMD_SHIFT, ShortcutAction::BringForward),
    ("}", CMD_SHIFT, ShortcutAction::BringForward),
    ("[", CMD_SHIFT, ShortcutAction::SendBackward),
    ("{", CMD_SHIFT, ShortcutAction::SendBackward),
    ("=", CMD, ShortcutAction::ZoomIn),
    ("+", CMD, ShortcutAction::ZoomIn),
    ("+", CMD_SHIFT, ShortcutAction::ZoomIn),
    ("-", CMD, ShortcutAction::ZoomOut),
    ("0", CMD, ShortcutAction::ZoomReset),
    ("ArrowLeft", PLAIN, nudge(-1, 0, false)),
    ("ArrowRight", PLAIN, nudge(1, 0, false)),
    ("ArrowUp", PLAIN, nudge(0, -1, false)),
    ("ArrowDown", PLAIN, nudge(0, 1, false)),
    ("ArrowLeft", SHIFT, nudge(-1, 0, true)),
    ("ArrowRight", SHIFT, nudge(1, 0, true)),
    ("ArrowUp", SHIFT, nudge(0, -1, true)),
    ("ArrowDown", SHIFT, nudge(0, 1, true)),
];

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let chord = Chord::of(modifiers);
        let mut chars = key.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        };
        BINDINGS
            .iter()
            .find(|(k, c, _)| {
                *c == chord
                    && match single {
                        Some(ch) => k.len() == 1 && k.starts_with(ch),
                        None => *k == key,
                    }
            })
            .map(|&(_, _, action)| action)
    }

    /// Every binding, for a help overlay.
    pub fn bindings() -> impl Iterator<Item = (&'static str, bool, bool, ShortcutAction)> {
        BINDINGS
            .iter()
            .map(|&(key, chord, action)| (key, chord.cmd, chord.shift, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(shift: bool) -> Modifiers {
        Modifiers::new(shift, false, false, true)
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(ShortcutMap::resolve("z", meta(false)), Some(ShortcutAction::Undo));
        // Ctrl+Z → Undo
        assert_eq!(ShortcutMap::resolve("z", Modifiers::CMD), Some(ShortcutAction::Undo));
        // Cmd+Shift+Z reports "Z" in most browsers
        assert_eq!(ShortcutMap::resolve("Z", meta(true)), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("y", Modifiers::CMD), Some(ShortcutAction::Redo));
    }

    #[test]
    fn modifiers_must_match_exactly() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::CMD), None);
        let alt_cmd = Modifiers::new(false, true, true, false);
        assert_eq!(ShortcutMap::resolve("z", alt_cmd), None);
    }

    #[test]
    fn resolve_delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::ClearSelection)
        );
    }

    #[test]
    fn resolve_z_order_with_shifted_brackets() {
        assert_eq!(ShortcutMap::resolve("]", Modifiers::CMD), Some(ShortcutAction::BringToFront));
        assert_eq!(ShortcutMap::resolve("[", Modifiers::CMD), Some(ShortcutAction::SendToBack));
        assert_eq!(
            ShortcutMap::resolve("}", Modifiers::CMD_SHIFT),
            Some(ShortcutAction::BringForward)
        );
        assert_eq!(
            ShortcutMap::resolve("{", Modifiers::CMD_SHIFT),
            Some(ShortcutAction::SendBackward)
        );
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(ShortcutMap::resolve("=", Modifiers::CMD), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("+", Modifiers::CMD_SHIFT), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("-", Modifiers::CMD), Some(ShortcutAction::ZoomOut));
        assert_eq!(ShortcutMap::resolve("0", Modifiers::CMD), Some(ShortcutAction::ZoomReset));
    }

    #[test]
    fn resolve_nudge() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", Modifiers::NONE),
            Some(ShortcutAction::Nudge {
                dx: -1,
                dy: 0,
                large: false
            })
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", Modifiers::SHIFT),
            Some(ShortcutAction::Nudge {
                dx: 0,
                dy: 1,
                large: true
            })
        );
    }

    #[test]
    fn unbound_keys_resolve_to_none() {
        assert_eq!(ShortcutMap::resolve("q", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("F5", Modifiers::NONE), None);
        assert!(ShortcutMap::bindings().count() > 20);
    }
}
