//! Text edit sessions.
//!
//! While a session is open the element is flagged `is_editing`, direct
//! manipulation is refused, and keystrokes only touch the pending text.
//! The scene sees the result once: `commit` writes the text as a single
//! history step (none if unchanged), `cancel` drops it.

use td_core::{ElementId, Scene, SceneAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    id: ElementId,
    original: String,
    pending: String,
}

impl EditSession {
    /// Open a session on `id`: selects it alone and flags it as editing.
    /// Returns `None` for unknown or locked elements.
    pub fn begin(scene: &mut Scene, id: ElementId) -> Option<Self> {
        let original = scene.element(id).filter(|e| !e.locked)?.text.clone();
        scene.select(id, false);
        if !scene.set_editing(Some(id)) {
            return None;
        }
        log::debug!("edit session begin on {id}");
        Some(Self {
            id,
            pending: original.clone(),
            original,
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_dirty(&self) -> bool {
        self.pending != self.original
    }

    /// Replace the pending text with the host input's current value.
    pub fn input(&mut self, text: impl Into<String>) {
        self.pending = text.into();
    }

    /// Close the session, writing the pending text. Returns true if a
    /// history step was recorded.
    pub fn commit(self, scene: &mut Scene) -> bool {
        scene.set_editing(None);
        let changed = self.is_dirty()
            && scene.apply(SceneAction::SetText {
                id: self.id,
                text: self.pending,
            });
        log::debug!("edit session commit on {} (changed: {changed})", self.id);
        changed
    }

    /// Close the session and discard the pending text.
    pub fn cancel(self, scene: &mut Scene) {
        scene.set_editing(None);
        log::debug!("edit session cancel on {}", self.id);
    }
}
