//! Linear undo history of drawing surface snapshots.

use std::sync::Arc;

use image::RgbaImage;

pub type HistoryEntry = Arc<RgbaImage>;

/// Ordered snapshots with a cursor on the current entry.
///
/// The cursor is `None` exactly when there are no entries; otherwise it always
/// points inside the sequence. Recording a snapshot after an undo drops the
/// entries beyond the cursor before appending.
#[derive(Debug, Default, Clone)]
pub struct CanvasHistory {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl CanvasHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|index| self.entries.get(index))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|index| index > 0)
    }

    pub fn snapshot(&mut self, surface: &RgbaImage) {
        let keep = self.cursor.map_or(0, |index| index + 1);
        let pruned = self.entries.len().saturating_sub(keep);
        self.entries.truncate(keep);
        self.entries.push(Arc::new(surface.clone()));
        self.cursor = Some(self.entries.len() - 1);
        tracing::debug!(
            len = self.entries.len(),
            pruned,
            "canvas history snapshot recorded"
        );
    }

    /// Steps the cursor back and returns the entry to restore, or `None` when
    /// already at the first entry.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let index = self.cursor.filter(|index| *index > 0)? - 1;
        self.cursor = Some(index);
        tracing::debug!(cursor = index, len = self.entries.len(), "undo applied");
        self.entries.get(index).cloned()
    }

    pub fn reset_to(&mut self, surface: &RgbaImage) {
        self.entries.clear();
        self.entries.push(Arc::new(surface.clone()));
        self.cursor = Some(0);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
