//! # Kendr Blocks
//!
//! The data model and tree algorithms behind the Kendr site editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ block: BlockNode / BlockType / PageContent  │
//! │ defaults: payloads for new blocks           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ path: positional addressing                 │
//! │  - Index(n) / IntoColumns segments          │
//! │  - find_by_path, find_path_by_id            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutate: pure insert / move / remove / update│
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use kendr_blocks::{insert_by_path, move_by_path, BlockDefaults, BlockNode, BlockType, PageContent, Path};
//!
//! let defaults = BlockDefaults::default();
//! let page = PageContent::new(vec![BlockNode::new(BlockType::Hero, &defaults, None)]);
//!
//! let text = BlockNode::new(BlockType::Text, &defaults, None);
//! let page = insert_by_path(&page, text, &Path::root(1));
//! let page = move_by_path(&page, &Path::root(1), &Path::root(0));
//!
//! assert_eq!(page.nodes()[0].block_type, BlockType::Text);
//! ```

mod block;
mod defaults;
mod mutate;
mod path;
pub mod visitor;

pub use block::{
    BlockCategory, BlockData, BlockError, BlockId, BlockNode, BlockType, Column, ContentRegion,
    LayoutData, LayoutPreset, PageContent, LAYOUT_KEYS,
};
pub use defaults::{create_default_data, BlockDefaults, DEFAULT_PLACEHOLDER_IMAGE};
pub use mutate::{
    duplicate_by_path, insert_by_path, move_by_path, remove_by_path, set_field_by_path,
    set_layout_preset, try_duplicate_by_path, try_insert_by_path, try_move_by_path,
    try_remove_by_path, try_set_field_by_path, try_set_layout_preset, try_update_data_by_path,
    update_data_by_path,
};
pub use path::{find_by_path, find_path_by_id, resolve, Path, PathError, PathSegment};
pub use visitor::{collect_ids, repeated_id, subtree_ids};
