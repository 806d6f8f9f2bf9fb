//! # Block Mutations
//!
//! High-level editing commands on a page's block tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each mutation is one user-visible edit
//! 2. **Pure**: `apply` never touches the tree it is given
//! 3. **Serializable**: The UI can send mutations as JSON
//!
//! ## Mutation Semantics
//!
//! ### Move
//! - Atomic relocation of a block to any sequence (top level or a column)
//! - Fails if the target lies inside the moved block
//! - Same source and target is a no-op
//!
//! ### UpdateData
//! - Atomic replacement of the whole payload
//! - For layouts, `preset` and `columns` inside the payload are honored
//!
//! ### Insert
//! - Fails if the node, or any block inside it, reuses an id already in the
//!   tree
//!
//! ### Remove
//! - Removes the block and all descendants

use kendr_blocks::{
    collect_ids, repeated_id, resolve, subtree_ids, try_duplicate_by_path, try_insert_by_path, try_move_by_path, try_remove_by_path,
    try_set_field_by_path, try_set_layout_preset, try_update_data_by_path, BlockData, BlockId,
    BlockNode, LayoutPreset, PageContent, Path, PathError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert a block at an insertion path
    InsertBlock { path: Path, node: BlockNode },

    /// Move a block to a new position, possibly in another column
    MoveBlock { from: Path, to: Path },

    /// Remove a block and its subtree
    RemoveBlock { path: Path },

    /// Replace a block's whole payload (wire form of `data`)
    UpdateData { path: Path, data: Map<String, Value> },

    /// Set one field of a block's payload
    SetField { path: Path, key: String, value: Value },

    /// Change a layout's column arrangement
    SetLayoutPreset { path: Path, preset: LayoutPreset },

    /// Insert a copy of a block (with fresh ids) right after it
    DuplicateBlock { path: Path },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Invalid block data: {0}")]
    InvalidData(String),

    #[error("Block id {0} is already in use")]
    DuplicateId(BlockId),
}

/// Tree produced by a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub content: PageContent,

    /// Block created by the mutation, if any
    pub created: Option<BlockId>,
}

impl Mutation {
    /// Apply mutation to a tree, producing a new tree
    pub fn apply(&self, tree: &PageContent) -> Result<Applied, MutationError> {
        let mut created = None;

        let content = match self {
            Mutation::InsertBlock { path, node } => {
                let live = collect_ids(tree);
                if let Some(id) = subtree_ids(node).into_iter().find(|id| live.contains(id)) {
                    return Err(MutationError::DuplicateId(id));
                }
                created = Some(node.id.clone());
                try_insert_by_path(tree, node.clone(), path)?
            }

            Mutation::MoveBlock { from, to } => try_move_by_path(tree, from, to)?,

            Mutation::RemoveBlock { path } => try_remove_by_path(tree, path)?,

            Mutation::UpdateData { path, data } => {
                let target = resolve(tree, path)?;
                let data = BlockData::from_wire(&target.block_type, data.clone())
                    .map_err(|e| MutationError::InvalidData(e.to_string()))?;
                let next = try_update_data_by_path(tree, path, data)?;
                // Columns in the payload may carry ids already in the tree
                if let Some(id) = repeated_id(&next) {
                    return Err(MutationError::DuplicateId(id));
                }
                next
            }

            Mutation::SetField { path, key, value } => {
                try_set_field_by_path(tree, path, key, value.clone())?
            }

            Mutation::SetLayoutPreset { path, preset } => {
                try_set_layout_preset(tree, path, preset.clone())?
            }

            Mutation::DuplicateBlock { path } => {
                let (content, id) = try_duplicate_by_path(tree, path)?;
                created = Some(id);
                content
            }
        };

        Ok(Applied { content, created })
    }

    /// Validate without applying
    pub fn validate(&self, tree: &PageContent) -> Result<(), MutationError> {
        self.apply(tree).map(|_| ())
    }

    /// Label for the undo history
    pub fn describe(&self) -> String {
        match self {
            Mutation::InsertBlock { node, .. } => format!("Add {}", node.block_type.label()),
            Mutation::MoveBlock { .. } => "Move block".to_string(),
            Mutation::RemoveBlock { .. } => "Delete block".to_string(),
            Mutation::UpdateData { .. } => "Edit block".to_string(),
            Mutation::SetField { key, .. } => format!("Change {key}"),
            Mutation::SetLayoutPreset { preset, .. } => format!("Columns {preset}"),
            Mutation::DuplicateBlock { .. } => "Duplicate block".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::MoveBlock { .. } => "move_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::UpdateData { .. } => "update_data",
            Mutation::SetField { .. } => "set_field",
            Mutation::SetLayoutPreset { .. } => "set_layout_preset",
            Mutation::DuplicateBlock { .. } => "duplicate_block",
        }
    }
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone, Serialize)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Block created by the mutation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<BlockId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kendr_blocks::{find_by_path, BlockType};
    use serde_json::json;

    fn page() -> PageContent {
        PageContent::from_json(
            r#"[
                { "id": "h1", "type": "hero", "data": { "title": "Hi" } },
                { "id": "l1", "type": "layout", "data": { "preset": "50-50", "columns": [[], []] } }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveBlock {
            from: Path::root(0),
            to: Path::root(1).child(0, 0),
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            json!({ "kind": "move_block", "from": [0], "to": [1, "data", "columns", 0, 0] })
        );

        let deserialized: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_reports_created_id() {
        let node = BlockNode::with_data("t1", BlockType::Text, BlockData::new());
        let applied = Mutation::InsertBlock {
            path: Path::root(1),
            node,
        }
        .apply(&page())
        .unwrap();

        assert_eq!(applied.created, Some(BlockId::from("t1")));
        assert_eq!(applied.content.len(), 3);
    }

    #[test]
    fn test_insert_rejects_reused_ids() {
        let reused = BlockNode::with_data("h1", BlockType::Image, BlockData::new());
        let result = Mutation::InsertBlock {
            path: Path::root(0),
            node: reused,
        }
        .apply(&page());
        assert_eq!(result, Err(MutationError::DuplicateId(BlockId::from("h1"))));

        // A fresh layout whose column holds an existing id
        let nested: BlockNode = serde_json::from_value(json!({
            "id": "l2", "type": "layout",
            "data": { "preset": "100", "columns": [[{ "id": "l1", "type": "text", "data": {} }]] }
        }))
        .unwrap();
        let result = Mutation::InsertBlock {
            path: Path::root(2),
            node: nested,
        }
        .apply(&page());
        assert_eq!(result, Err(MutationError::DuplicateId(BlockId::from("l1"))));
    }

    #[test]
    fn test_update_data_on_layout_parses_columns() {
        let data = json!({
            "preset": "100",
            "columns": [[{ "id": "x", "type": "text", "data": {} }]]
        });
        let mutation = Mutation::UpdateData {
            path: Path::root(1),
            data: data.as_object().cloned().unwrap(),
        };

        let applied = mutation.apply(&page()).unwrap();
        let nested = find_by_path(&applied.content, &Path::root(1).child(0, 0)).unwrap();
        assert_eq!(nested.id.as_str(), "x");
    }

    #[test]
    fn test_update_data_rejects_reused_ids_in_columns() {
        let data = json!({
            "preset": "100",
            "columns": [[{ "id": "h1", "type": "text", "data": {} }]]
        });
        let mutation = Mutation::UpdateData {
            path: Path::root(1),
            data: data.as_object().cloned().unwrap(),
        };

        assert_eq!(
            mutation.apply(&page()),
            Err(MutationError::DuplicateId(BlockId::from("h1")))
        );
    }

    #[test]
    fn test_update_data_rejects_bad_layout_payload() {
        let mutation = Mutation::UpdateData {
            path: Path::root(1),
            data: json!({ "columns": 3 }).as_object().cloned().unwrap(),
        };

        assert!(matches!(
            mutation.apply(&page()),
            Err(MutationError::InvalidData(_))
        ));
    }

    #[test]
    fn test_validation_rejects_stale_paths() {
        let mutation = Mutation::RemoveBlock {
            path: Path::root(7),
        };

        assert_eq!(
            mutation.validate(&page()),
            Err(MutationError::Path(PathError::IndexOutOfRange { index: 7, len: 2 }))
        );
    }

    #[test]
    fn test_describe() {
        let node = BlockNode::with_data("t1", BlockType::CatalogGrid, BlockData::new());
        let insert = Mutation::InsertBlock {
            path: Path::root(0),
            node,
        };
        assert_eq!(insert.describe(), "Add Product grid");
        assert_eq!(insert.name(), "insert_block");
    }
}
