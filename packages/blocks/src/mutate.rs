//! # Tree Mutations
//!
//! Pure, path-addressed edits of a [`PageContent`] tree.
//!
//! Every primitive takes the current tree by reference and returns a new
//! tree; the input is never touched, which is what lets the editor keep old
//! trees around as undo snapshots.
//!
//! ## Error policy
//!
//! Each operation comes in two forms:
//!
//! - `try_*` returns `Result<PageContent, PathError>` so callers can react to
//!   stale or malformed paths.
//! - The plain form degrades to returning an unchanged copy of the tree when
//!   the path doesn't resolve. Paths captured before an earlier mutation can
//!   legitimately go stale in the UI, and a stale drop must not break the page.
//!
//! ## Move semantics
//!
//! `move` removes the node and inserts it at `to`, computed on one private
//! copy so no intermediate state escapes. Within one sequence `to`'s final
//! index is where the node ends up: moving `B` onto `D` in `[A,B,C,D,E]`
//! yields `[A,C,D,B,E]`. When `to` descends through the sequence the node
//! left, `to` is shifted so it keeps naming the same container.

use serde_json::Value;
use tracing::debug;

use crate::block::{BlockData, BlockId, BlockNode, LayoutPreset, PageContent, LAYOUT_KEYS};
use crate::path::{node_mut, sequence_mut, Path, PathError, PathSegment};
use crate::visitor::{IdRegenerator, VisitorMut};

/// Replace the `data` of the node at `path`, keeping its id and type.
///
/// `data` must carry layout data exactly when the node is a layout.
pub fn try_update_data_by_path(
    tree: &PageContent,
    path: &Path,
    data: BlockData,
) -> Result<PageContent, PathError> {
    let mut next = tree.clone();
    let node = node_mut(&mut next, path)?;
    if node.is_layout() != data.layout.is_some() {
        return Err(PathError::DataMismatch(node.id.clone()));
    }
    node.data = data;
    Ok(next)
}

/// Set a single free-form field of the node at `path`.
///
/// Setting `preset` on a layout reshapes its columns; `columns` can only be
/// changed through the structural mutations.
pub fn try_set_field_by_path(
    tree: &PageContent,
    path: &Path,
    key: &str,
    value: Value,
) -> Result<PageContent, PathError> {
    let mut next = tree.clone();
    let node = node_mut(&mut next, path)?;

    if let Some(layout) = node.data.layout.as_mut() {
        if LAYOUT_KEYS.contains(&key) {
            return match (key, value) {
                ("preset", Value::String(preset)) => {
                    layout.reshape(LayoutPreset::new(preset));
                    Ok(next)
                }
                _ => Err(PathError::ReservedField(key.to_string())),
            };
        }
    }

    node.data.fields.insert(key.to_string(), value);
    Ok(next)
}

/// Remove the node at `path` (and its subtree)
pub fn try_remove_by_path(tree: &PageContent, path: &Path) -> Result<PageContent, PathError> {
    let mut next = tree.clone();
    take(&mut next, path)?;
    Ok(next)
}

/// Insert `node` at `path`.
///
/// The final index is an insertion index into the parent sequence: its
/// length appends, and anything beyond is clamped to an append.
pub fn try_insert_by_path(
    tree: &PageContent,
    node: BlockNode,
    path: &Path,
) -> Result<PageContent, PathError> {
    let mut next = tree.clone();
    put(&mut next, node, path)?;
    Ok(next)
}

/// Move the node at `from` to `to` in one transformation
pub fn try_move_by_path(
    tree: &PageContent,
    from: &Path,
    to: &Path,
) -> Result<PageContent, PathError> {
    if from == to {
        crate::path::resolve(tree, from)?;
        return Ok(tree.clone());
    }
    if from.is_ancestor_of(to) {
        return Err(PathError::IntoOwnSubtree);
    }

    let mut next = tree.clone();
    let node = take(&mut next, from)?;
    let target = shift_after_removal(from, to)?;
    put(&mut next, node, &target)?;
    Ok(next)
}

/// Change the preset of the layout at `path`, folding surplus columns into
/// the last remaining one
pub fn try_set_layout_preset(
    tree: &PageContent,
    path: &Path,
    preset: LayoutPreset,
) -> Result<PageContent, PathError> {
    let mut next = tree.clone();
    let node = node_mut(&mut next, path)?;
    match node.data.layout.as_mut() {
        Some(layout) => layout.reshape(preset),
        None => return Err(PathError::NotALayout(node.id.clone())),
    }
    Ok(next)
}

/// Insert a deep copy of the node at `path` right after it.
///
/// The copy and all of its descendants get fresh ids. Returns the new tree
/// and the id of the copy.
pub fn try_duplicate_by_path(
    tree: &PageContent,
    path: &Path,
) -> Result<(PageContent, BlockId), PathError> {
    let (parent, index) = path.split_last()?;
    let mut copy = crate::path::resolve(tree, path)?.clone();
    IdRegenerator.visit_node_mut(&mut copy);
    let id = copy.id.clone();

    let mut next = tree.clone();
    sequence_mut(next.nodes_mut(), parent)?.insert(index + 1, copy);
    Ok((next, id))
}

/// [`try_update_data_by_path`], or the unchanged tree
pub fn update_data_by_path(tree: &PageContent, path: &Path, data: BlockData) -> PageContent {
    or_unchanged(tree, "update", path, try_update_data_by_path(tree, path, data))
}

/// [`try_set_field_by_path`], or the unchanged tree
pub fn set_field_by_path(tree: &PageContent, path: &Path, key: &str, value: Value) -> PageContent {
    or_unchanged(tree, "set_field", path, try_set_field_by_path(tree, path, key, value))
}

/// [`try_remove_by_path`], or the unchanged tree
pub fn remove_by_path(tree: &PageContent, path: &Path) -> PageContent {
    or_unchanged(tree, "remove", path, try_remove_by_path(tree, path))
}

/// [`try_insert_by_path`], or the unchanged tree
pub fn insert_by_path(tree: &PageContent, node: BlockNode, path: &Path) -> PageContent {
    or_unchanged(tree, "insert", path, try_insert_by_path(tree, node, path))
}

/// [`try_move_by_path`], or the unchanged tree
pub fn move_by_path(tree: &PageContent, from: &Path, to: &Path) -> PageContent {
    or_unchanged(tree, "move", from, try_move_by_path(tree, from, to))
}

/// [`try_set_layout_preset`], or the unchanged tree
pub fn set_layout_preset(tree: &PageContent, path: &Path, preset: LayoutPreset) -> PageContent {
    or_unchanged(tree, "set_preset", path, try_set_layout_preset(tree, path, preset))
}

/// [`try_duplicate_by_path`], or the unchanged tree
pub fn duplicate_by_path(tree: &PageContent, path: &Path) -> PageContent {
    let result = try_duplicate_by_path(tree, path).map(|(next, _)| next);
    or_unchanged(tree, "duplicate", path, result)
}

fn or_unchanged(
    tree: &PageContent,
    op: &'static str,
    path: &Path,
    result: Result<PageContent, PathError>,
) -> PageContent {
    result.unwrap_or_else(|error| {
        debug!(op, %path, %error, "Skipping mutation on unresolved path");
        tree.clone()
    })
}

fn take(tree: &mut PageContent, path: &Path) -> Result<BlockNode, PathError> {
    let (parent, index) = path.split_last()?;
    let sequence = sequence_mut(tree.nodes_mut(), parent)?;
    if index >= sequence.len() {
        return Err(PathError::IndexOutOfRange {
            index,
            len: sequence.len(),
        });
    }
    Ok(sequence.remove(index))
}

fn put(tree: &mut PageContent, node: BlockNode, path: &Path) -> Result<(), PathError> {
    let (parent, index) = path.split_last()?;
    let sequence = sequence_mut(tree.nodes_mut(), parent)?;
    let index = index.min(sequence.len());
    sequence.insert(index, node);
    Ok(())
}

/// Rewrite `to` for a tree in which the node at `from` is already gone
fn shift_after_removal(from: &Path, to: &Path) -> Result<Path, PathError> {
    let (parent, removed) = from.split_last()?;
    let depth = parent.len();
    let segments = to.segments();

    if segments.len() > depth + 1 && segments.starts_with(parent) {
        if let PathSegment::Index(index) = segments[depth] {
            if index > removed {
                let mut shifted = segments.to_vec();
                shifted[depth] = PathSegment::Index(index - 1);
                return Ok(Path::new(shifted));
            }
        }
    }

    Ok(to.clone())
}
