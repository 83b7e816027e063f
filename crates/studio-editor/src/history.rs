//! Undo/Redo history.
//!
//! Every completed user action records a deep copy of the whole layer list.
//! Undo and redo move a cursor through the recorded snapshots and replace the
//! live layers with a copy of the entry under the cursor. Gestures record one
//! snapshot when they complete, never per move.

use studio_core::{Document, Layer};

/// One recorded document state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub description: String,
    pub layers: Vec<Layer>,
}

/// Linear snapshot history with a cursor.
///
/// `index` is `None` only while the history is empty; otherwise it points at
/// the entry matching the live document.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: Option<usize>,
    /// Maximum number of entries kept; `None` keeps everything.
    max_depth: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
            ..Self::default()
        }
    }

    /// Record the current layers. Anything after the cursor is discarded.
    pub fn snapshot(&mut self, doc: &Document, description: impl Into<String>) {
        let description = description.into();
        if let Some(index) = self.index {
            self.entries.truncate(index + 1);
        }
        self.entries.push(HistoryEntry {
            description,
            layers: doc.layers().to_vec(),
        });
        if let Some(max) = self.max_depth
            && self.entries.len() > max
        {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
        self.index = Some(self.entries.len() - 1);
        log::trace!(
            "history: recorded {:?} ({} entries)",
            self.entries[self.entries.len() - 1].description,
            self.entries.len()
        );
    }

    /// Step back one entry. Returns the description of the undone action.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        let index = self.index.filter(|i| *i > 0)?;
        let undone = self.entries[index].description.clone();
        self.restore(index - 1, doc);
        Some(undone)
    }

    /// Step forward one entry. Returns the description of the redone action.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        let next = self.index? + 1;
        if next >= self.entries.len() {
            return None;
        }
        self.restore(next, doc);
        Some(self.entries[next].description.clone())
    }

    /// Jump straight to entry `index`. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize, doc: &mut Document) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.restore(index, doc);
        true
    }

    fn restore(&mut self, index: usize, doc: &mut Document) {
        doc.restore_layers(self.entries[index].layers.clone());
        self.index = Some(index);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studio_core::{LayerPatch, LayerType, NewLayer};

    fn seeded() -> (Document, History) {
        let doc = Document::new();
        let mut history = History::new();
        history.snapshot(&doc, "Initial state");
        (doc, history)
    }

    #[test]
    fn undo_redo_move() {
        let (mut doc, mut history) = seeded();
        let id = doc.add_layer(NewLayer::new(LayerType::Shape).at(0.0, 0.0));
        history.snapshot(&doc, "Add shape");
        doc.update_layer(id, LayerPatch::x(100.0));
        history.snapshot(&doc, "Move shape");

        assert_eq!(history.undo(&mut doc).as_deref(), Some("Move shape"));
        assert_eq!(doc.get(id).unwrap().x, 0.0);
        assert_eq!(history.redo(&mut doc).as_deref(), Some("Move shape"));
        assert_eq!(doc.get(id).unwrap().x, 100.0);
    }

    #[test]
    fn undo_at_start_is_noop() {
        let (mut doc, mut history) = seeded();
        assert!(!history.can_undo());
        assert_eq!(history.undo(&mut doc), None);
        assert_eq!(history.current_index(), Some(0));

        let mut empty = History::new();
        assert_eq!(empty.undo(&mut doc), None);
        assert_eq!(empty.redo(&mut doc), None);
    }

    #[test]
    fn redo_clears_on_new_action() {
        let (mut doc, mut history) = seeded();
        doc.add_layer(NewLayer::new(LayerType::Text));
        history.snapshot(&doc, "Add text");
        doc.add_layer(NewLayer::new(LayerType::Image));
        history.snapshot(&doc, "Add image");

        history.undo(&mut doc);
        assert!(history.can_redo());
        doc.add_layer(NewLayer::new(LayerType::Frame));
        history.snapshot(&doc, "Add frame");

        assert!(!history.can_redo());
        let names: Vec<&str> = history.entries().iter().map(|e| e.description.as_str()).collect();
        assert_eq!(names, vec!["Initial state", "Add text", "Add frame"]);
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut doc = Document::new();
        let mut history = History::with_max_depth(3);
        for i in 0..5 {
            doc.add_layer(NewLayer::new(LayerType::Shape));
            history.snapshot(&doc, format!("step {i}"));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_index(), Some(2));
        assert_eq!(history.entries()[0].description, "step 2");
    }

    #[test]
    fn jump_to_bounds_checked() {
        let (mut doc, mut history) = seeded();
        doc.add_layer(NewLayer::new(LayerType::Shape));
        history.snapshot(&doc, "Add shape");

        assert!(!history.jump_to(9, &mut doc));
        assert!(history.jump_to(0, &mut doc));
        assert!(doc.is_empty());
        assert!(history.jump_to(1, &mut doc));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn clear_resets_cursor() {
        let (_, mut history) = seeded();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn snapshots_are_independent_copies() {
        let (mut doc, mut history) = seeded();
        let id = doc.add_layer(NewLayer::new(LayerType::Shape).at(5.0, 5.0));
        history.snapshot(&doc, "Add shape");
        doc.update_layer(id, LayerPatch::x(99.0));
        assert_eq!(history.entries()[1].layers[0].x, 5.0);
    }
}
