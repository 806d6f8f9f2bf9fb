//! # Kendr Editor
//!
//! Editing sessions over Kendr page content.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ kendr-blocks: tree model + pure mutations   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditingSession                      │
//! │  - Mutation commands with undo/redo         │
//! │  - Selection + collapsed outline state      │
//! │  - Drag gestures → live tree moves          │
//! │  - Save hand-off to the host                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host UI (kendr-wasm, or any Rust caller)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are values**: every edit produces a new tree, old ones are kept
//!    as history snapshots
//! 2. **Ids outlive paths**: selection and collapsed state are keyed by block
//!    id and re-derived after each edit
//! 3. **One gesture, one undo step**: live drag previews are batched
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kendr_editor::{EditingSession, Mutation};
//! use kendr_blocks::Path;
//!
//! let mut session = EditingSession::from_json("client-1", json)?;
//!
//! session.apply(Mutation::RemoveBlock { path: Path::root(0) })?;
//! session.undo()?;
//!
//! session.save(&mut |region, content: &PageContent| upload(region, content))?;
//! ```

mod config;
mod document;
mod drag;
mod errors;
mod history;
mod mutations;
mod session;

pub use config::{CancelPolicy, EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::{Document, SaveError, SaveHandler};
pub use drag::{
    ColumnSurface, DragGesture, DragItem, DragPhase, DropOutcome, DropZone, HoverOutcome, ZoneKind,
};
pub use errors::EditorError;
pub use history::{History, HistoryEntry};
pub use mutations::{Applied, Mutation, MutationError, MutationResult};
pub use session::{EditingSession, EditorMode, Selection};
