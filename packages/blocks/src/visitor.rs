use std::collections::HashSet;

use crate::block::{BlockId, BlockNode, Column, PageContent};
use crate::path::Path;

/// Visitor pattern for traversing block trees immutably
///
/// The default implementations walk the entire tree in document order and
/// hand every node its [`Path`]. Override specific `visit_*` methods to act
/// on nodes.
pub trait Visitor: Sized {
    fn visit_content(&mut self, content: &PageContent) {
        walk_content(self, content);
    }

    fn visit_node(&mut self, node: &BlockNode, path: &Path) {
        walk_node(self, node, path);
    }

    fn visit_column(&mut self, column: &Column, layout_path: &Path, index: usize) {
        walk_column(self, column, layout_path, index);
    }
}

/// Mutable visitor pattern for transforming block trees
///
/// Paths are not tracked here: a mutable walk may reshape the tree under it.
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut BlockNode) {
        walk_node_mut(self, node);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_content<V: Visitor>(visitor: &mut V, content: &PageContent) {
    for (index, node) in content.iter().enumerate() {
        visitor.visit_node(node, &Path::root(index));
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &BlockNode, path: &Path) {
    if let Some(columns) = node.columns() {
        for (index, column) in columns.iter().enumerate() {
            visitor.visit_column(column, path, index);
        }
    }
}

pub fn walk_column<V: Visitor>(visitor: &mut V, column: &Column, layout_path: &Path, index: usize) {
    for (position, node) in column.iter().enumerate() {
        visitor.visit_node(node, &layout_path.child(index, position));
    }
}

// Default walk implementations for mutable visitor

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut BlockNode) {
    if let Some(layout) = node.data.layout.as_mut() {
        for column in &mut layout.columns {
            for child in column {
                visitor.visit_node_mut(child);
            }
        }
    }
}

#[derive(Default)]
struct IdCollector {
    ids: HashSet<BlockId>,

    /// First id seen twice
    repeated: Option<BlockId>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &BlockNode, path: &Path) {
        if !self.ids.insert(node.id.clone()) && self.repeated.is_none() {
            self.repeated = Some(node.id.clone());
        }
        walk_node(self, node, path);
    }
}

/// Ids of every block in the tree
pub fn collect_ids(content: &PageContent) -> HashSet<BlockId> {
    let mut collector = IdCollector::default();
    collector.visit_content(content);
    collector.ids
}

/// Ids of `node` and all of its descendants
pub fn subtree_ids(node: &BlockNode) -> HashSet<BlockId> {
    let mut collector = IdCollector::default();
    collector.visit_node(node, &Path::root(0));
    collector.ids
}

/// First id carried by more than one block, in document order
pub fn repeated_id(content: &PageContent) -> Option<BlockId> {
    let mut collector = IdCollector::default();
    collector.visit_content(content);
    collector.repeated
}

struct PathFinder<'a> {
    target: &'a BlockId,
    found: Option<Path>,
}

impl Visitor for PathFinder<'_> {
    fn visit_node(&mut self, node: &BlockNode, path: &Path) {
        if self.found.is_some() {
            return;
        }
        if &node.id == self.target {
            self.found = Some(path.clone());
            return;
        }
        walk_node(self, node, path);
    }
}

pub(crate) fn path_of(content: &PageContent, id: &BlockId) -> Option<Path> {
    let mut finder = PathFinder {
        target: id,
        found: None,
    };
    finder.visit_content(content);
    finder.found
}

struct PathCollector {
    paths: Vec<Path>,
}

impl Visitor for PathCollector {
    fn visit_node(&mut self, node: &BlockNode, path: &Path) {
        self.paths.push(path.clone());
        walk_node(self, node, path);
    }
}

pub(crate) fn collect_paths(content: &PageContent) -> Vec<Path> {
    let mut collector = PathCollector { paths: Vec::new() };
    collector.visit_content(content);
    collector.paths
}

pub(crate) fn count_nodes(content: &PageContent) -> usize {
    collect_paths(content).len()
}

/// Gives every node in a subtree a fresh id
pub(crate) struct IdRegenerator;

impl VisitorMut for IdRegenerator {
    fn visit_node_mut(&mut self, node: &mut BlockNode) {
        node.id = BlockId::generate();
        walk_node_mut(self, node);
    }
}
