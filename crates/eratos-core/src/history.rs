//! Linear undo/redo timeline of patch pairs.

use crate::error::{Error, Result};
use crate::model::Document;
use crate::patch::PatchPair;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<PatchPair>,
    /// Position of the next redo; everything before it has been applied.
    index: usize,
    capacity: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` pairs, dropping the oldest first. `None` is unbounded.
    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Appends a pair at the cursor.
    ///
    /// Pairs after the cursor (undone edits) are discarded; they can no longer be redone.
    pub fn record(&mut self, pair: PatchPair) {
        if self.index < self.entries.len() {
            tracing::trace!(
                dropped = self.entries.len() - self.index,
                "discarding redo history"
            );
            self.entries.truncate(self.index);
        }
        self.entries.push(pair);
        self.index = self.entries.len();

        if let Some(cap) = self.capacity {
            if self.entries.len() > cap {
                let excess = self.entries.len() - cap;
                self.entries.drain(..excess);
                self.index -= excess;
            }
        }
    }

    /// Applies the backward patch of the last applied pair to `doc`.
    pub fn undo(&mut self, doc: &Document) -> Result<Document> {
        if self.index == 0 {
            return Err(Error::NoEarlierState);
        }
        self.index -= 1;
        Ok(self.entries[self.index].backward.apply(doc))
    }

    /// Applies the forward patch of the pair at the cursor to `doc`.
    pub fn redo(&mut self, doc: &Document) -> Result<Document> {
        let Some(pair) = self.entries.get(self.index) else {
            return Err(Error::NoLaterState);
        };
        let out = pair.forward.apply(doc);
        self.index += 1;
        Ok(out)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}
