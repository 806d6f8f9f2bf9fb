//! # Undo/Redo History
//!
//! Linear history of page snapshots with a cursor.
//!
//! ## Design
//!
//! - Every committed edit pushes the resulting tree as a snapshot
//! - Undo steps the cursor back, redo steps it forward
//! - Pushing after an undo discards the redo tail
//! - Batches collapse many commits (e.g. the hover moves of one drag) into a
//!   single undo step
//!
//! Snapshots are whole trees. Mutations are pure, so a snapshot can never
//! change after it was recorded.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(initial);
//!
//! history.push_state(next, Some("Add text"));
//! let previous = history.undo();   // Some(&initial)
//! let again = history.redo();      // Some(&next)
//! ```

use kendr_blocks::PageContent;

/// One recorded state
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub content: PageContent,

    /// Label of the edit that produced this state
    pub description: Option<String>,
}

/// Commits collected while a batch is open
#[derive(Debug, Clone)]
struct Batch {
    description: Option<String>,
    latest: Option<PageContent>,
}

/// Undo/redo history for one page region
#[derive(Debug)]
pub struct History {
    /// Recorded states, oldest first; never empty
    entries: Vec<HistoryEntry>,

    /// Index of the current state
    cursor: usize,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    batch: Option<Batch>,
}

impl History {
    /// Create a history with default max levels (100)
    pub fn new(initial: PageContent) -> Self {
        Self::with_max_levels(initial, 100)
    }

    /// Create a history with custom max levels
    pub fn with_max_levels(initial: PageContent, max_levels: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                content: initial,
                description: None,
            }],
            cursor: 0,
            max_levels,
            batch: None,
        }
    }

    /// Record a new state after a committed edit.
    ///
    /// Inside a batch the state is held back until [`History::end_batch`].
    pub fn push_state(&mut self, content: PageContent, description: Option<String>) {
        if let Some(batch) = &mut self.batch {
            batch.latest = Some(content);
            if batch.description.is_none() {
                batch.description = description;
            }
            return;
        }

        self.push_entry(HistoryEntry {
            content,
            description,
        });
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        // New action invalidates the redo tail
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.entries.len() > self.max_levels + 1 {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Start a batch of commits (undone/redone together)
    pub fn begin_batch(&mut self, description: Option<String>) {
        self.batch = Some(Batch {
            description,
            latest: None,
        });
    }

    /// Close the current batch, recording its final state if it differs from
    /// the current one. Returns whether an entry was recorded.
    pub fn end_batch(&mut self) -> bool {
        let Some(batch) = self.batch.take() else {
            return false;
        };

        match batch.latest {
            Some(content) if &content != self.current() => {
                self.push_entry(HistoryEntry {
                    content,
                    description: batch.description,
                });
                true
            }
            _ => false,
        }
    }

    /// Drop the current batch without recording anything
    pub fn discard_batch(&mut self) {
        self.batch = None;
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.batch {
            batch.description = Some(description.into());
        }
    }

    /// Step back; `None` when already at the oldest state
    pub fn undo(&mut self) -> Option<&PageContent> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor].content)
    }

    /// Step forward; `None` when already at the newest state
    pub fn redo(&mut self) -> Option<&PageContent> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor].content)
    }

    /// State under the cursor
    pub fn current(&self) -> &PageContent {
        &self.entries[self.cursor].content
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.cursor
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - 1 - self.cursor
    }

    /// Forget everything but the current state
    pub fn clear(&mut self) {
        let current = self.entries.swap_remove(self.cursor);
        self.entries = vec![current];
        self.cursor = 0;
        self.batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.entries[self.cursor].description.as_deref()
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.entries
            .get(self.cursor + 1)
            .and_then(|entry| entry.description.as_deref())
    }
}
