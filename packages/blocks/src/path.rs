//! # Path Addressing
//!
//! A [`Path`] names a node (or an insertion point) by position. It alternates
//! between indices into node sequences and descents into a layout's columns:
//!
//! ```text
//! [Index(2)]                                        top-level node 2
//! [Index(2), IntoColumns, Index(1), Index(0)]       first node of column 1 of node 2
//! ```
//!
//! On the wire the descent is spelled `"data", "columns"`, so the second path
//! above serializes as `[2, "data", "columns", 1, 0]`.
//!
//! Paths are positional: one captured before a mutation may name a different
//! node (or nothing) afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::block::{BlockId, BlockNode, PageContent};

/// One step of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Index into a sequence (top-level list, column, or a layout's column list)
    Index(usize),
    /// Descend into the columns of the current layout node
    IntoColumns,
}

/// Positional address of a node in a [`PageContent`] tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<WireSegment>", into = "Vec<WireSegment>")]
pub struct Path(Vec<PathSegment>);

/// Reasons a path fails to resolve or a mutation is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    EmptyPath,

    #[error("Index {index} out of range for sequence of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Column {index} out of range for layout with {len} columns")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Block {0} is not a layout")]
    NotALayout(BlockId),

    #[error("Malformed path: {0}")]
    Malformed(String),

    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),

    #[error("Cannot move a block into its own subtree")]
    IntoOwnSubtree,

    #[error("Field {0} is managed by the layout and cannot be set directly")]
    ReservedField(String),

    #[error("Data for block {0} does not match its type")]
    DataMismatch(BlockId),
}

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Path of a top-level node
    pub fn root(index: usize) -> Self {
        Self(vec![PathSegment::Index(index)])
    }

    /// Path of node `index` inside column `column` of the layout at `self`
    pub fn child(&self, column: usize, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.extend([
            PathSegment::IntoColumns,
            PathSegment::Index(column),
            PathSegment::Index(index),
        ]);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of layout columns between the top level and this node
    pub fn depth(&self) -> usize {
        self.0
            .iter()
            .filter(|s| matches!(s, PathSegment::IntoColumns))
            .count()
    }

    /// Final index, i.e. the position within the parent sequence
    pub fn last_index(&self) -> Option<usize> {
        match self.0.last() {
            Some(PathSegment::Index(index)) => Some(*index),
            _ => None,
        }
    }

    /// Segments naming the parent sequence, paired with the final index
    pub fn split_last(&self) -> Result<(&[PathSegment], usize), PathError> {
        match self.0.split_last() {
            Some((PathSegment::Index(index), parent)) => Ok((parent, *index)),
            Some((PathSegment::IntoColumns, _)) => {
                Err(PathError::Malformed(format!("{self} ends inside a layout")))
            }
            None => Err(PathError::EmptyPath),
        }
    }

    /// Same parent sequence, different final index
    pub fn with_last_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        match segments.last_mut() {
            Some(PathSegment::Index(last)) => *last = index,
            _ => segments.push(PathSegment::Index(index)),
        }
        Self(segments)
    }

    /// Path of the layout node whose column holds this node
    pub fn parent(&self) -> Option<Self> {
        let len = self.0.len();
        if len < 4 {
            return None;
        }
        match self.0[len - 3] {
            PathSegment::IntoColumns => Some(Self(self.0[..len - 3].to_vec())),
            _ => None,
        }
    }

    /// True when `other` lies strictly inside the subtree named by `self`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    /// True when both paths index into the same parent sequence
    pub fn same_sequence(&self, other: &Path) -> bool {
        match (self.split_last(), other.split_last()) {
            (Ok((a, _)), Ok((b, _))) => a == b,
            _ => false,
        }
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match segment {
                PathSegment::Index(index) => write!(f, "{index}")?,
                PathSegment::IntoColumns => f.write_str("\"data\", \"columns\"")?,
            }
        }
        f.write_str("]")
    }
}

/// Wire spelling of a path segment: a number or a literal key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSegment {
    Index(usize),
    Key(String),
}

impl TryFrom<Vec<WireSegment>> for Path {
    type Error = PathError;

    fn try_from(wire: Vec<WireSegment>) -> Result<Self, Self::Error> {
        let mut segments = Vec::with_capacity(wire.len());
        let mut iter = wire.into_iter();

        while let Some(segment) = iter.next() {
            match segment {
                WireSegment::Index(index) => segments.push(PathSegment::Index(index)),
                WireSegment::Key(key) if key == "data" => match iter.next() {
                    Some(WireSegment::Key(next)) if next == "columns" => {
                        segments.push(PathSegment::IntoColumns)
                    }
                    _ => return Err(PathError::InvalidSegment("data".to_string())),
                },
                WireSegment::Key(key) => return Err(PathError::InvalidSegment(key)),
            }
        }

        Ok(Self(segments))
    }
}

impl From<Path> for Vec<WireSegment> {
    fn from(path: Path) -> Self {
        let mut wire = Vec::with_capacity(path.0.len() + path.depth());
        for segment in path.0 {
            match segment {
                PathSegment::Index(index) => wire.push(WireSegment::Index(index)),
                PathSegment::IntoColumns => {
                    wire.push(WireSegment::Key("data".to_string()));
                    wire.push(WireSegment::Key("columns".to_string()));
                }
            }
        }
        wire
    }
}

/// Look up the node at `path`.
///
/// Returns `None` when an index is out of range or the path descends into a
/// node that has no columns. Never panics.
pub fn find_by_path<'a>(tree: &'a PageContent, path: &Path) -> Option<&'a BlockNode> {
    resolve(tree, path).ok()
}

/// Like [`find_by_path`], but says why the lookup failed
pub fn resolve<'a>(tree: &'a PageContent, path: &Path) -> Result<&'a BlockNode, PathError> {
    let (parent, index) = path.split_last()?;
    let sequence = sequence(tree.nodes(), parent)?;
    sequence.get(index).ok_or(PathError::IndexOutOfRange {
        index,
        len: sequence.len(),
    })
}

/// Path of the node with `id`, searching depth-first in document order
pub fn find_path_by_id(tree: &PageContent, id: &BlockId) -> Option<Path> {
    crate::visitor::path_of(tree, id)
}

fn sequence<'a>(
    mut nodes: &'a [BlockNode],
    segments: &[PathSegment],
) -> Result<&'a [BlockNode], PathError> {
    let mut rest = segments;

    while !rest.is_empty() {
        match rest {
            [PathSegment::Index(index), PathSegment::IntoColumns, PathSegment::Index(column), tail @ ..] =>
            {
                let node = nodes.get(*index).ok_or(PathError::IndexOutOfRange {
                    index: *index,
                    len: nodes.len(),
                })?;
                let layout = node
                    .data
                    .layout
                    .as_ref()
                    .ok_or_else(|| PathError::NotALayout(node.id.clone()))?;
                nodes = layout
                    .columns
                    .get(*column)
                    .ok_or(PathError::ColumnOutOfRange {
                        index: *column,
                        len: layout.columns.len(),
                    })?;
                rest = tail;
            }
            _ => return Err(malformed(segments)),
        }
    }

    Ok(nodes)
}

/// Mutable counterpart of the sequence walk used by the mutation primitives
pub(crate) fn sequence_mut<'a>(
    mut nodes: &'a mut Vec<BlockNode>,
    segments: &[PathSegment],
) -> Result<&'a mut Vec<BlockNode>, PathError> {
    let mut rest = segments;

    while !rest.is_empty() {
        match rest {
            [PathSegment::Index(index), PathSegment::IntoColumns, PathSegment::Index(column), tail @ ..] =>
            {
                let len = nodes.len();
                let node = match nodes.get_mut(*index) {
                    Some(node) => node,
                    None => return Err(PathError::IndexOutOfRange { index: *index, len }),
                };
                let layout = match node.data.layout.as_mut() {
                    Some(layout) => layout,
                    None => return Err(PathError::NotALayout(node.id.clone())),
                };
                let count = layout.columns.len();
                nodes = match layout.columns.get_mut(*column) {
                    Some(column) => column,
                    None => {
                        return Err(PathError::ColumnOutOfRange {
                            index: *column,
                            len: count,
                        })
                    }
                };
                rest = tail;
            }
            _ => return Err(malformed(segments)),
        }
    }

    Ok(nodes)
}

pub(crate) fn node_mut<'a>(
    tree: &'a mut PageContent,
    path: &Path,
) -> Result<&'a mut BlockNode, PathError> {
    let (parent, index) = path.split_last()?;
    let sequence = sequence_mut(tree.nodes_mut(), parent)?;
    let len = sequence.len();
    sequence
        .get_mut(index)
        .ok_or(PathError::IndexOutOfRange { index, len })
}

fn malformed(segments: &[PathSegment]) -> PathError {
    PathError::Malformed(Path(segments.to_vec()).to_string())
}
