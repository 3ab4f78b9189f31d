//! Input abstraction layer.
//!
//! Normalizes browser pointer, wheel and keyboard events into a single
//! `InputEvent` enum consumed by the editor. Coordinates are screen px
//! relative to the canvas element.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub const CMD: Modifiers = Modifiers {
        ctrl: true,
        ..Self::NONE
    };

    pub const CMD_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    pub fn new(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self {
            shift,
            ctrl,
            alt,
            meta,
        }
    }

    /// The platform command key: Ctrl or ⌘.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Shift- or cmd-click extends the selection.
    pub fn additive(&self) -> bool {
        self.shift || self.cmd()
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifiers: Modifiers },
    PointerMove { x: f64, y: f64, modifiers: Modifiers },
    PointerUp { x: f64, y: f64, modifiers: Modifiers },
    DoubleClick { x: f64, y: f64 },
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    Key { key: String, modifiers: Modifiers },
    /// Scroll / pinch. Positive `dy` scrolls down.
    Wheel {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },
    /// The canvas or the text input surface lost focus.
    Blur,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerDown { x, y, modifiers }
    }

    pub fn pointer_move(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerMove { x, y, modifiers }
    }

    pub fn pointer_up(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerUp { x, y, modifiers }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    /// Extract the screen position if this event has one.
    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some(Point::new(x, y)),
            Self::Key { .. } | Self::Blur => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Key { modifiers, .. }
            | Self::Wheel { modifiers, .. } => *modifiers,
            Self::DoubleClick { .. } | Self::Blur => Modifiers::NONE,
        }
    }

    /// Wheel delta, if this is a wheel event.
    pub fn scroll(&self) -> Option<Vec2> {
        match *self {
            Self::Wheel { dx, dy, .. } => Some(Vec2::new(dx, dy)),
            _ => None,
        }
    }
}
