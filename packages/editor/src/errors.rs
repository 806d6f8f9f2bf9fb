//! Error types for the editor

use kendr_blocks::{BlockError, PathError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Block error: {0}")]
    Block(#[from] BlockError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor is read-only in public mode")]
    ReadOnly,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("A drag is already in progress")]
    DragInProgress,

    #[error("Block {0} is not at the dragged path")]
    DragSourceMismatch(String),

    #[error("Save failed: {0}")]
    Save(String),

    #[error("No save in progress")]
    NotSaving,
}
