//! # Drag and Drop
//!
//! Turns pointer gestures into tree mutations.
//!
//! ## Gesture
//!
//! ```text
//! begin_drag ──▶ hover* ──▶ drop ──────▶ Dropped
//!                   │         └ no zone ▶ Cancelled
//!                   └──────▶ cancel_drag ▶ Cancelled
//! ```
//!
//! - Hovering an existing block over another position moves it there
//!   immediately, so neighbours make room while the pointer is still down.
//! - Palette blocks do nothing on hover; they are created on drop.
//! - A drop is offered to the zones under the pointer innermost first. The
//!   first zone that accepts it handles it, and outer zones never see it. A
//!   zone whose path no longer resolves passes the drop outward.
//! - The whole gesture is a single undo step.
//!
//! In public mode every zone is inert.

use kendr_blocks::{
    find_path_by_id, resolve, try_insert_by_path, try_move_by_path, BlockId, BlockNode, BlockType,
    LayoutPreset, PageContent, Path, PathError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CancelPolicy;
use crate::session::{EditingSession, EditorMode};
use crate::EditorError;

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragItem {
    /// A block already in the tree, at its current path
    Existing { id: BlockId, path: Path },

    /// A block type picked from the palette
    NewBlock {
        #[serde(rename = "blockType")]
        block_type: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<LayoutPreset>,
    },
}

impl DragItem {
    /// Current path of a dragged existing block
    pub fn path(&self) -> Option<&Path> {
        match self {
            DragItem::Existing { path, .. } => Some(path),
            DragItem::NewBlock { .. } => None,
        }
    }

    fn description(&self) -> String {
        match self {
            DragItem::Existing { .. } => "Move block".to_string(),
            DragItem::NewBlock { block_type, .. } => format!("Add {}", block_type.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Dropped,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Top-level list of the page
    Page,
    /// One column of a layout block
    Column,
    /// The wrapper around a rendered block
    BlockWrapper,
}

/// A region under the pointer that can take a drop.
///
/// `path` is the insertion point a drop there resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZone {
    pub path: Path,
    pub kind: ZoneKind,
}

impl DropZone {
    pub fn page(index: usize) -> Self {
        Self {
            path: Path::root(index),
            kind: ZoneKind::Page,
        }
    }

    /// Zone for position `index` of column `column` of the layout at `layout`
    pub fn column(layout: &Path, column: usize, index: usize) -> Self {
        Self {
            path: layout.child(column, index),
            kind: ZoneKind::Column,
        }
    }

    pub fn block(path: Path) -> Self {
        Self {
            path,
            kind: ZoneKind::BlockWrapper,
        }
    }

    /// Whether this zone takes `item` in `mode`.
    ///
    /// Nothing is accepted in public mode, and a block can never be dropped
    /// inside itself.
    pub fn accepts(&self, mode: EditorMode, item: &DragItem) -> bool {
        if mode.is_read_only() {
            return false;
        }
        match item {
            DragItem::Existing { path, .. } => !path.is_ancestor_of(&self.path),
            DragItem::NewBlock { .. } => true,
        }
    }
}

/// How a layout column renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSurface {
    /// Interactive drop target
    DropZone,
    /// Plain container, no interactivity
    Plain,
}

impl ColumnSurface {
    pub fn for_mode(mode: EditorMode) -> Self {
        if mode.is_read_only() {
            ColumnSurface::Plain
        } else {
            ColumnSurface::DropZone
        }
    }
}

/// Drag in flight
#[derive(Debug, Clone)]
pub struct DragGesture {
    pub item: DragItem,

    /// Tree before the first hover move
    start: PageContent,
    start_version: u64,
    start_dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverOutcome {
    /// The dragged block now lives at `path`
    Moved { path: Path },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropOutcome {
    /// A palette block was created
    Inserted { id: BlockId, path: Path },
    /// An existing block was released at `path`
    Placed { id: BlockId, path: Path },
    /// No zone accepted the drop
    Rejected,
}

impl EditingSession {
    /// Start dragging `item`
    pub fn begin_drag(&mut self, item: DragItem) -> Result<(), EditorError> {
        if self.mode.is_read_only() {
            return Err(EditorError::ReadOnly);
        }
        if self.gesture.is_some() {
            return Err(EditorError::DragInProgress);
        }

        if let DragItem::Existing { id, path } = &item {
            let node = resolve(self.document.content(), path)?;
            if &node.id != id {
                return Err(EditorError::DragSourceMismatch(id.to_string()));
            }
        }

        debug!(session = %self.id, item = ?item, "Drag started");
        self.history.begin_batch(Some(item.description()));
        self.gesture = Some(DragGesture {
            item,
            start: self.document.content().clone(),
            start_version: self.document.version,
            start_dirty: self.document.is_dirty(),
        });
        self.last_phase = DragPhase::Dragging;
        Ok(())
    }

    /// Pointer entered the position `target`
    pub fn hover(&mut self, target: &Path) -> Result<HoverOutcome, EditorError> {
        let Some(gesture) = &self.gesture else {
            return Err(EditorError::NoActiveDrag);
        };
        let DragItem::Existing { id, path } = &gesture.item else {
            return Ok(HoverOutcome::Unchanged);
        };
        if path == target || path.is_ancestor_of(target) {
            return Ok(HoverOutcome::Unchanged);
        }
        let (id, from) = (id.clone(), path.clone());

        let next = match try_move_by_path(self.document.content(), &from, target) {
            Ok(next) => next,
            Err(error) => {
                debug!(%from, to = %target, %error, "Skipping hover on unresolved path");
                return Ok(HoverOutcome::Unchanged);
            }
        };

        let landed = find_path_by_id(&next, &id).unwrap_or_else(|| target.clone());
        self.commit(next, None);
        self.remember_path(landed.clone());
        Ok(HoverOutcome::Moved { path: landed })
    }

    /// Release over `zones`, ordered innermost first
    pub fn drop(&mut self, zones: &[DropZone]) -> Result<DropOutcome, EditorError> {
        let Some(gesture) = self.gesture.take() else {
            return Err(EditorError::NoActiveDrag);
        };

        let mode = self.mode;
        let mut outcome = DropOutcome::Rejected;
        for zone in zones.iter().filter(|zone| zone.accepts(mode, &gesture.item)) {
            match self.place(&gesture.item, zone) {
                Ok(placed) => {
                    outcome = placed;
                    break;
                }
                Err(error) => debug!(zone = %zone.path, %error, "Drop zone no longer resolves"),
            }
        }

        if outcome == DropOutcome::Rejected {
            self.finish_cancelled(gesture);
        } else {
            self.history.end_batch();
            self.last_phase = DragPhase::Dropped;
        }

        debug!(session = %self.id, outcome = ?outcome, "Drag finished");
        Ok(outcome)
    }

    fn place(&mut self, item: &DragItem, zone: &DropZone) -> Result<DropOutcome, PathError> {
        match item {
            DragItem::NewBlock { block_type, preset } => {
                let node = BlockNode::new(
                    block_type.clone(),
                    &self.config.block_defaults,
                    preset.as_ref(),
                );
                let id = node.id.clone();
                let next = try_insert_by_path(self.document.content(), node, &zone.path)?;
                let path = find_path_by_id(&next, &id).unwrap_or_else(|| zone.path.clone());
                self.commit(next, None);
                Ok(DropOutcome::Inserted { id, path })
            }

            DragItem::Existing { id, path } => {
                if path != &zone.path {
                    let next = try_move_by_path(self.document.content(), path, &zone.path)?;
                    self.commit(next, None);
                }
                let path = find_path_by_id(self.document.content(), id)
                    .unwrap_or_else(|| zone.path.clone());
                Ok(DropOutcome::Placed {
                    id: id.clone(),
                    path,
                })
            }
        }
    }

    /// End the drag without a drop
    pub fn cancel_drag(&mut self) -> Result<(), EditorError> {
        let Some(gesture) = self.gesture.take() else {
            return Err(EditorError::NoActiveDrag);
        };
        self.finish_cancelled(gesture);
        Ok(())
    }

    pub(crate) fn abandon_drag(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            self.finish_cancelled(gesture);
        }
    }

    fn finish_cancelled(&mut self, gesture: DragGesture) {
        match self.config.cancel_policy {
            CancelPolicy::Revert => self.history.discard_batch(),
            CancelPolicy::KeepPreview => {
                self.history.end_batch();
            }
        }

        // Reverted, or the preview came back to where it started
        let unchanged = self.document.content() == &gesture.start;
        if unchanged || self.config.cancel_policy == CancelPolicy::Revert {
            self.document
                .restore(gesture.start, gesture.start_version, gesture.start_dirty);
            if !unchanged {
                self.reconcile();
            }
        }
        self.last_phase = DragPhase::Cancelled;
    }

    fn remember_path(&mut self, landed: Path) {
        if let Some(DragGesture {
            item: DragItem::Existing { path, .. },
            ..
        }) = &mut self.gesture
        {
            *path = landed;
        }
    }

    pub fn drag_phase(&self) -> DragPhase {
        if self.gesture.is_some() {
            DragPhase::Dragging
        } else {
            self.last_phase
        }
    }

    pub fn dragged_item(&self) -> Option<&DragItem> {
        self.gesture.as_ref().map(|g| &g.item)
    }

    /// How layout columns render in the current mode
    pub fn surface_for_column(&self) -> ColumnSurface {
        ColumnSurface::for_mode(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::document::Document;
    use kendr_blocks::ContentRegion;

    const PAGE: &str = r#"[
        { "id": "A", "type": "text", "data": {} },
        { "id": "B", "type": "text", "data": {} },
        { "id": "C", "type": "text", "data": {} },
        { "id": "cols", "type": "layout", "data": {
            "preset": "50-50",
            "columns": [ [ { "id": "x", "type": "text", "data": {} } ], [] ]
        } }
    ]"#;

    fn session_with(policy: CancelPolicy) -> EditingSession {
        let document = Document::from_json(ContentRegion::Page, PAGE).unwrap();
        let config = EditorConfig {
            cancel_policy: policy,
            ..EditorConfig::default()
        };
        EditingSession::with_config("s", document, config)
    }

    fn session() -> EditingSession {
        session_with(CancelPolicy::KeepPreview)
    }

    fn top_ids(session: &EditingSession) -> Vec<&str> {
        session.content().iter().map(|n| n.id.as_str()).collect()
    }

    fn existing(id: &str, path: Path) -> DragItem {
        DragItem::Existing {
            id: BlockId::from(id),
            path,
        }
    }

    #[test]
    fn test_hover_moves_and_tracks_path() {
        let mut session = session();
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        assert_eq!(session.drag_phase(), DragPhase::Dragging);

        let outcome = session.hover(&Path::root(2)).unwrap();
        assert_eq!(
            outcome,
            HoverOutcome::Moved {
                path: Path::root(2)
            }
        );
        assert_eq!(top_ids(&session), vec!["B", "C", "A", "cols"]);
        assert_eq!(session.dragged_item().and_then(DragItem::path), Some(&Path::root(2)));

        // Same location again is skipped
        assert_eq!(
            session.hover(&Path::root(2)).unwrap(),
            HoverOutcome::Unchanged
        );
    }

    #[test]
    fn test_whole_gesture_is_one_undo_step() {
        let mut session = session();
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        session.hover(&Path::root(1)).unwrap();
        session.hover(&Path::root(2)).unwrap();
        let outcome = session.drop(&[DropZone::page(2)]).unwrap();

        assert!(matches!(outcome, DropOutcome::Placed { ref path, .. } if path == &Path::root(2)));
        assert_eq!(session.drag_phase(), DragPhase::Dropped);
        assert_eq!(session.history().undo_levels(), 1);
        assert_eq!(session.history().undo_description(), Some("Move block"));

        session.undo().unwrap();
        assert_eq!(top_ids(&session), vec!["A", "B", "C", "cols"]);
    }

    #[test]
    fn test_inner_column_zone_wins() {
        let mut session = session();
        session
            .begin_drag(DragItem::NewBlock {
                block_type: BlockType::Image,
                preset: None,
            })
            .unwrap();

        let layout = Path::root(3);
        let zones = [DropZone::column(&layout, 1, 0), DropZone::block(layout.clone())];
        let outcome = session.drop(&zones).unwrap();

        let DropOutcome::Inserted { id, path } = outcome else {
            panic!("expected an insert");
        };
        assert_eq!(path, layout.child(1, 0));
        let columns = session.content().nodes()[3].columns().unwrap();
        assert_eq!(columns[1][0].id, id);
        assert_eq!(columns[1][0].block_type, BlockType::Image);
        assert_eq!(session.content().len(), 4);
    }

    #[test]
    fn test_stale_zone_passes_drop_outward() {
        let mut session = session();
        session
            .begin_drag(DragItem::NewBlock {
                block_type: BlockType::Text,
                preset: None,
            })
            .unwrap();

        // "A" is not a layout, so its column zone cannot take the block
        let zones = [DropZone::column(&Path::root(0), 0, 0), DropZone::page(1)];
        let outcome = session.drop(&zones).unwrap();

        assert!(matches!(outcome, DropOutcome::Inserted { ref path, .. } if path == &Path::root(1)));
        assert_eq!(session.content().len(), 5);
        assert_eq!(session.drag_phase(), DragPhase::Dropped);
    }

    #[test]
    fn test_cannot_drop_into_own_subtree() {
        let mut session = session();
        session.begin_drag(existing("cols", Path::root(3))).unwrap();

        let inner = DropZone::column(&Path::root(3), 1, 0);
        assert!(!inner.accepts(EditorMode::Edit, session.dragged_item().unwrap()));
        assert_eq!(
            session.hover(&inner.path).unwrap(),
            HoverOutcome::Unchanged
        );

        let outcome = session.drop(&[inner, DropZone::page(0)]).unwrap();
        assert!(matches!(outcome, DropOutcome::Placed { ref path, .. } if path == &Path::root(0)));
        assert_eq!(top_ids(&session)[0], "cols");
    }

    #[test]
    fn test_rejected_drop_keeps_preview_by_default() {
        let mut session = session();
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        session.hover(&Path::root(2)).unwrap();

        assert_eq!(session.drop(&[]).unwrap(), DropOutcome::Rejected);
        assert_eq!(session.drag_phase(), DragPhase::Cancelled);
        assert_eq!(top_ids(&session), vec!["B", "C", "A", "cols"]);
        assert_eq!(session.history().undo_levels(), 1);
    }

    #[test]
    fn test_cancel_with_revert_policy() {
        let mut session = session_with(CancelPolicy::Revert);
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        session.hover(&Path::root(2)).unwrap();

        session.cancel_drag().unwrap();
        assert_eq!(session.drag_phase(), DragPhase::Cancelled);
        assert_eq!(top_ids(&session), vec!["A", "B", "C", "cols"]);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_revert_restores_clean_document() {
        let mut session = session_with(CancelPolicy::Revert);
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        session.hover(&Path::root(2)).unwrap();
        assert!(session.document().is_dirty());

        session.cancel_drag().unwrap();
        assert!(!session.document().is_dirty());
        assert_eq!(session.document().version, 0);
    }

    #[test]
    fn test_preview_back_at_start_leaves_document_clean() {
        let mut session = session();
        session.begin_drag(existing("A", Path::root(0))).unwrap();
        session.hover(&Path::root(2)).unwrap();
        session.hover(&Path::root(0)).unwrap();

        assert_eq!(session.drop(&[]).unwrap(), DropOutcome::Rejected);
        assert_eq!(top_ids(&session), vec!["A", "B", "C", "cols"]);
        assert!(!session.document().is_dirty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_palette_hover_is_inert() {
        let mut session = session();
        session
            .begin_drag(DragItem::NewBlock {
                block_type: BlockType::Text,
                preset: None,
            })
            .unwrap();

        assert_eq!(
            session.hover(&Path::root(0)).unwrap(),
            HoverOutcome::Unchanged
        );
        assert_eq!(session.content().len(), 4);
    }

    #[test]
    fn test_public_mode_zones_are_inert() {
        let mut session = session();
        let item = DragItem::NewBlock {
            block_type: BlockType::Text,
            preset: None,
        };
        assert_eq!(session.surface_for_column(), ColumnSurface::DropZone);

        session.set_mode(EditorMode::Public);
        assert_eq!(session.surface_for_column(), ColumnSurface::Plain);
        assert!(!DropZone::page(0).accepts(EditorMode::Public, &item));
        assert!(matches!(
            session.begin_drag(item),
            Err(EditorError::ReadOnly)
        ));
    }

    #[test]
    fn test_stale_drag_source_is_refused() {
        let mut session = session();
        assert!(matches!(
            session.begin_drag(existing("B", Path::root(0))),
            Err(EditorError::DragSourceMismatch(_))
        ));
        assert!(matches!(
            session.begin_drag(existing("A", Path::root(9))),
            Err(EditorError::Path(_))
        ));
        assert!(matches!(session.hover(&Path::root(0)), Err(EditorError::NoActiveDrag)));
    }

    #[test]
    fn test_edits_blocked_while_dragging() {
        let mut session = session();
        session.begin_drag(existing("A", Path::root(0))).unwrap();

        assert!(matches!(
            session.begin_drag(existing("B", Path::root(1))),
            Err(EditorError::DragInProgress)
        ));
        assert!(matches!(session.undo(), Err(EditorError::DragInProgress)));
    }

    #[test]
    fn test_drag_item_wire_format() {
        let item: DragItem =
            serde_json::from_str(r#"{ "kind": "new_block", "blockType": "layout", "preset": "100" }"#)
                .unwrap();
        assert_eq!(
            item,
            DragItem::NewBlock {
                block_type: BlockType::Layout,
                preset: Some(LayoutPreset::new("100")),
            }
        );
    }
}
