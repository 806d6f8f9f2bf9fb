//! # Edit Session Management
//!
//! An [`EditingSession`] is one client's view of a region being edited: the
//! document, its history, the current selection and the outline's collapsed
//! set. Everything the UI would otherwise keep in ambient state is carried
//! here explicitly.
//!
//! Every change to the tree goes through one commit path, which
//! records history and then re-derives selection and collapsed state from
//! block ids, since paths captured before a mutation may no longer be valid.

use std::collections::HashSet;

use kendr_blocks::{
    collect_ids, find_path_by_id, resolve, BlockId, BlockNode, ContentRegion, PageContent, Path,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::document::{Document, SaveHandler};
use crate::drag::{DragGesture, DragPhase};
use crate::history::History;
use crate::{EditorError, Mutation, MutationResult};

/// Rendering mode of the editor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Edit,
    Preview,
    /// Published rendering; nothing is interactive
    Public,
}

impl EditorMode {
    pub fn is_read_only(self) -> bool {
        matches!(self, EditorMode::Public)
    }
}

/// Block chosen by the user for its settings panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub path: Path,
    pub id: BlockId,
}

/// Single edit session over one content region
#[derive(Debug)]
pub struct EditingSession {
    /// Unique session identifier
    pub id: String,

    pub(crate) document: Document,
    pub(crate) history: History,
    pub(crate) selection: Option<Selection>,
    pub(crate) collapsed: HashSet<BlockId>,
    pub(crate) mode: EditorMode,

    /// Drag gesture in flight, if any
    pub(crate) gesture: Option<DragGesture>,
    pub(crate) last_phase: DragPhase,

    pub(crate) config: EditorConfig,
}

impl EditingSession {
    /// Create new edit session
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_config(id, document, EditorConfig::default())
    }

    pub fn with_config(id: impl Into<String>, document: Document, config: EditorConfig) -> Self {
        let history = History::with_max_levels(document.content().clone(), config.history_limit);

        Self {
            id: id.into(),
            document,
            history,
            selection: None,
            collapsed: HashSet::new(),
            mode: EditorMode::default(),
            gesture: None,
            last_phase: DragPhase::Idle,
            config,
        }
    }

    /// Session over the page region parsed from JSON
    pub fn from_json(id: impl Into<String>, json: &str) -> Result<Self, EditorError> {
        Ok(Self::new(id, Document::from_json(ContentRegion::Page, json)?))
    }

    pub fn content(&self) -> &PageContent {
        self.document.content()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Switch rendering mode. Entering public mode abandons any drag.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode.is_read_only() && self.gesture.is_some() {
            self.abandon_drag();
        }
        self.mode = mode;
    }

    /// Apply a mutation as one undoable step.
    ///
    /// A mutation that leaves the tree as it was records nothing and keeps the
    /// current version.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        if self.mode.is_read_only() {
            return Err(EditorError::ReadOnly);
        }
        if self.gesture.is_some() {
            return Err(EditorError::DragInProgress);
        }

        let applied = mutation.apply(self.document.content())?;
        if &applied.content == self.document.content() {
            debug!(session = %self.id, mutation = mutation.name(), "Mutation changed nothing");
            return Ok(MutationResult {
                version: self.document.version,
                created: applied.created,
            });
        }

        let version = self.commit(applied.content, Some(mutation.describe()));
        debug!(session = %self.id, mutation = mutation.name(), version, "Committed mutation");

        Ok(MutationResult {
            version,
            created: applied.created,
        })
    }

    /// Make `content` the live tree and record it in history
    pub(crate) fn commit(&mut self, content: PageContent, description: Option<String>) -> u64 {
        let version = self.document.replace(content.clone());
        self.history.push_state(content, description);
        self.reconcile();
        version
    }

    /// Step back one history entry; `Ok(false)` at the oldest state
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.guard_history()?;
        let Some(content) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.document.replace(content);
        self.reconcile();
        Ok(true)
    }

    /// Step forward one history entry; `Ok(false)` at the newest state
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.guard_history()?;
        let Some(content) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.document.replace(content);
        self.reconcile();
        Ok(true)
    }

    fn guard_history(&self) -> Result<(), EditorError> {
        if self.mode.is_read_only() {
            return Err(EditorError::ReadOnly);
        }
        if self.gesture.is_some() {
            return Err(EditorError::DragInProgress);
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Select the block at `path`
    pub fn select(&mut self, path: &Path) -> Result<&Selection, EditorError> {
        let id = resolve(self.document.content(), path)?.id.clone();
        Ok(&*self.selection.insert(Selection {
            path: path.clone(),
            id,
        }))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selection.as_ref().map(|s| &s.path)
    }

    pub fn selected_node(&self) -> Option<&BlockNode> {
        let selection = self.selection.as_ref()?;
        resolve(self.document.content(), &selection.path).ok()
    }

    /// Flip the collapsed state of `id`; returns the new state
    pub fn toggle_collapsed(&mut self, id: &BlockId) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.clone());
            true
        }
    }

    pub fn is_collapsed(&self, id: &BlockId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed(&self) -> impl Iterator<Item = &BlockId> {
        self.collapsed.iter()
    }

    /// Re-derive id-keyed UI state after the tree changed
    pub(crate) fn reconcile(&mut self) {
        let content = self.document.content();

        if let Some(selection) = self.selection.take() {
            match find_path_by_id(content, &selection.id) {
                Some(path) => {
                    self.selection = Some(Selection {
                        path,
                        id: selection.id,
                    })
                }
                None => debug!(id = %selection.id, "Selected block was removed"),
            }
        }

        if !self.collapsed.is_empty() {
            let live = collect_ids(content);
            self.collapsed.retain(|id| live.contains(id));
        }
    }

    /// Mark a host-driven save as started; returns the version being saved
    pub fn begin_save(&mut self) -> u64 {
        self.document.begin_save()
    }

    pub fn finish_save(&mut self, version: u64, success: bool) -> Result<(), EditorError> {
        self.document.finish_save(version, success)
    }

    /// Persist the current content through `handler`
    pub fn save(&mut self, handler: &mut impl SaveHandler) -> Result<(), EditorError> {
        self.document.save(handler)
    }
}
