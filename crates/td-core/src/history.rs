//! Bounded linear undo/redo over element snapshots.
//!
//! History is a flat list with a cursor. `history[index]` is always the
//! state the scene shows once any open gesture is closed. A commit after an
//! undo discards the redo future; there is no branching.

use crate::model::Element;

/// An immutable copy of the element list at one history position,
/// ordered by `z_index`, with selection/edit flags cleared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    elements: Vec<Element>,
}

impl Snapshot {
    pub fn new<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Self {
        let mut elements: Vec<Element> = elements
            .into_iter()
            .map(Element::without_transient_flags)
            .collect();
        elements.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `other` holds the same persistent state (order-insensitive).
    pub fn same_state(&self, other: &Snapshot) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.same_state(b))
    }
}

/// Snapshot stack with a cursor and a fixed capacity.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: usize,
    cap: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Snapshot, cap: usize) -> Self {
        let cap = cap.max(1);
        let mut snapshots = Vec::with_capacity(cap);
        snapshots.push(initial);
        Self {
            snapshots,
            index: 0,
            cap,
        }
    }

    /// Truncate everything after the cursor, append `snapshot`, and move the
    /// cursor onto it. Drops the oldest entry when over capacity.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.cap {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
        log::debug!(
            "history commit: {} entries, cursor {}",
            self.snapshots.len(),
            self.index
        );
    }

    /// Step the cursor back. Returns the snapshot to restore, or `None` at
    /// the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        log::debug!("history undo → {}", self.index);
        Some(&self.snapshots[self.index])
    }

    /// Step the cursor forward. Returns the snapshot to restore, or `None`
    /// at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        log::debug!("history redo → {}", self.index);
        Some(&self.snapshots[self.index])
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    /// Replace everything with a single entry (loading a new document).
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}
