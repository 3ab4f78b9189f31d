pub mod editor;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;

pub use editor::{Editor, EditorEvent, KeyOutcome};
pub use input::{InputEvent, Modifiers};
pub use interaction::{Gesture, InteractionController};
pub use session::EditSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
