//! # Document Handle
//!
//! The page content of one region (page body, header or footer) plus its
//! persistence state.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit → Save
//!   ↓      ↓       ↓
//! JSON  Mutations  SaveHandler
//! ```
//!
//! The document never performs I/O itself. Persisting is handed to a
//! [`SaveHandler`] supplied by the host.

use crate::{EditorError, Mutation, MutationResult};
use kendr_blocks::{ContentRegion, PageContent};
use tracing::{debug, info, warn};

/// Error type returned by save handlers
pub type SaveError = Box<dyn std::error::Error + Send + Sync>;

/// Host callback that persists a region's content
pub trait SaveHandler {
    fn save(&mut self, region: ContentRegion, content: &PageContent) -> Result<(), SaveError>;
}

impl<F> SaveHandler for F
where
    F: FnMut(ContentRegion, &PageContent) -> Result<(), SaveError>,
{
    fn save(&mut self, region: ContentRegion, content: &PageContent) -> Result<(), SaveError> {
        self(region, content)
    }
}

/// Editable page content
#[derive(Debug, Clone)]
pub struct Document {
    /// Region this content belongs to
    pub region: ContentRegion,

    /// Current version number (increments on each committed change)
    pub version: u64,

    content: PageContent,

    /// Unsaved changes since the last successful save
    dirty: bool,

    /// A save is in flight
    saving: bool,
}

impl Document {
    pub fn new(region: ContentRegion, content: PageContent) -> Self {
        Self {
            region,
            version: 0,
            content,
            dirty: false,
            saving: false,
        }
    }

    /// Parse the region's content from its JSON form
    pub fn from_json(region: ContentRegion, json: &str) -> Result<Self, EditorError> {
        Ok(Self::new(region, PageContent::from_json(json)?))
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Swap in a new tree (commit, undo, redo, drag preview)
    pub(crate) fn replace(&mut self, content: PageContent) -> u64 {
        self.content = content;
        self.version += 1;
        self.dirty = true;
        self.version
    }

    /// Put back a tree along with the version and dirty flag it had
    pub(crate) fn restore(&mut self, content: PageContent, version: u64, dirty: bool) {
        self.content = content;
        self.version = version;
        self.dirty = dirty;
    }

    /// Apply a mutation directly, without history
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        let applied = mutation.apply(&self.content)?;
        if applied.content == self.content {
            return Ok(MutationResult {
                version: self.version,
                created: applied.created,
            });
        }
        let version = self.replace(applied.content);
        debug!(mutation = mutation.name(), version, "Applied mutation");

        Ok(MutationResult {
            version,
            created: applied.created,
        })
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.content.to_json()?)
    }

    /// Mark a save as started; returns the version being saved
    pub fn begin_save(&mut self) -> u64 {
        self.saving = true;
        self.version
    }

    /// Mark the save started at `version` as finished.
    ///
    /// A successful save only clears `dirty` when nothing changed meanwhile.
    pub fn finish_save(&mut self, version: u64, success: bool) -> Result<(), EditorError> {
        if !self.saving {
            return Err(EditorError::NotSaving);
        }
        self.saving = false;
        if success && version == self.version {
            self.dirty = false;
        }
        Ok(())
    }

    /// Hand the content to `handler`
    pub fn save(&mut self, handler: &mut impl SaveHandler) -> Result<(), EditorError> {
        let version = self.begin_save();
        let result = handler.save(self.region, &self.content);
        self.finish_save(version, result.is_ok())?;

        match result {
            Ok(()) => {
                info!(region = ?self.region, version, "Saved content");
                Ok(())
            }
            Err(error) => {
                warn!(region = ?self.region, version, %error, "Save failed");
                Err(EditorError::Save(error.to_string()))
            }
        }
    }
}
