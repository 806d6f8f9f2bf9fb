//! # Block Node Model
//!
//! The recursive data shape behind every page, header and footer.
//!
//! ```text
//! PageContent
//!   └─ BlockNode { id, type, data }
//!        └─ data.columns (layout only)
//!             └─ Column ── BlockNode ...
//! ```
//!
//! `data` is a free-form map whose shape depends on the block type. Layout
//! blocks additionally carry a typed [`LayoutData`]; on the wire its `preset`
//! and `columns` keys sit next to the other keys of `data`.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::visitor::{self, Visitor};
use crate::Path;

/// Opaque, never-reused block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block type tag
///
/// The set is closed for dispatch purposes; tags the editor doesn't know are
/// kept verbatim in [`BlockType::Unknown`] so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Hero,
    Text,
    Image,
    Button,
    Layout,
    Categories,
    CatalogGrid,
    Features,
    Gallery,
    Form,
    Video,
    Spacer,
    Divider,
    Testimonials,
    Unknown(String),
}

/// Palette grouping for block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Content,
    Media,
    Commerce,
    Structure,
    Other,
}

impl BlockType {
    /// Every known block type, in palette order
    pub const KNOWN: [BlockType; 14] = [
        BlockType::Hero,
        BlockType::Text,
        BlockType::Image,
        BlockType::Button,
        BlockType::Layout,
        BlockType::Categories,
        BlockType::CatalogGrid,
        BlockType::Features,
        BlockType::Gallery,
        BlockType::Form,
        BlockType::Video,
        BlockType::Spacer,
        BlockType::Divider,
        BlockType::Testimonials,
    ];

    /// Wire tag
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Hero => "hero",
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Button => "button",
            BlockType::Layout => "layout",
            BlockType::Categories => "categories",
            BlockType::CatalogGrid => "catalog_grid",
            BlockType::Features => "features",
            BlockType::Gallery => "gallery",
            BlockType::Form => "form",
            BlockType::Video => "video",
            BlockType::Spacer => "spacer",
            BlockType::Divider => "divider",
            BlockType::Testimonials => "testimonials",
            BlockType::Unknown(tag) => tag,
        }
    }

    /// Human-readable name for the block palette
    pub fn label(&self) -> &str {
        match self {
            BlockType::Hero => "Hero banner",
            BlockType::Text => "Text",
            BlockType::Image => "Image",
            BlockType::Button => "Button",
            BlockType::Layout => "Columns",
            BlockType::Categories => "Categories",
            BlockType::CatalogGrid => "Product grid",
            BlockType::Features => "Features",
            BlockType::Gallery => "Gallery",
            BlockType::Form => "Form",
            BlockType::Video => "Video",
            BlockType::Spacer => "Spacer",
            BlockType::Divider => "Divider",
            BlockType::Testimonials => "Testimonials",
            BlockType::Unknown(tag) => tag,
        }
    }

    pub fn category(&self) -> BlockCategory {
        match self {
            BlockType::Hero
            | BlockType::Text
            | BlockType::Button
            | BlockType::Features
            | BlockType::Form
            | BlockType::Testimonials => BlockCategory::Content,
            BlockType::Image | BlockType::Gallery | BlockType::Video => BlockCategory::Media,
            BlockType::Categories | BlockType::CatalogGrid => BlockCategory::Commerce,
            BlockType::Layout | BlockType::Spacer | BlockType::Divider => BlockCategory::Structure,
            BlockType::Unknown(_) => BlockCategory::Other,
        }
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, BlockType::Layout)
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "hero" => BlockType::Hero,
            "text" => BlockType::Text,
            "image" => BlockType::Image,
            "button" => BlockType::Button,
            "layout" => BlockType::Layout,
            "categories" => BlockType::Categories,
            "catalog_grid" => BlockType::CatalogGrid,
            "features" => BlockType::Features,
            "gallery" => BlockType::Gallery,
            "form" => BlockType::Form,
            "video" => BlockType::Video,
            "spacer" => BlockType::Spacer,
            "divider" => BlockType::Divider,
            "testimonials" => BlockType::Testimonials,
            _ => BlockType::Unknown(tag),
        }
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        BlockType::from(tag.to_string())
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column arrangement tag such as `"50-50"` or `"33-33-33"`
///
/// Purely descriptive of proportions; only the number of parts matters to
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutPreset(String);

impl LayoutPreset {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Even split for `count` columns
    pub fn for_columns(count: usize) -> Self {
        match count {
            0 | 1 => Self::new("100"),
            2 => Self::new("50-50"),
            3 => Self::new("33-33-33"),
            4 => Self::new("25-25-25-25"),
            n => {
                let share = (100 / n).to_string();
                Self(vec![share; n].join("-"))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of columns this preset describes (at least one)
    pub fn column_count(&self) -> usize {
        self.0.split('-').filter(|part| !part.trim().is_empty()).count().max(1)
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        Self::new("50-50")
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One column container of a layout block
pub type Column = Vec<BlockNode>;

/// Typed part of a layout block's payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutData {
    pub preset: LayoutPreset,
    pub columns: Vec<Column>,
}

impl LayoutData {
    /// Layout with one empty column per preset part
    pub fn empty(preset: LayoutPreset) -> Self {
        let columns = vec![Vec::new(); preset.column_count()];
        Self { preset, columns }
    }

    /// Switch to `preset`, adding empty columns or folding surplus ones.
    ///
    /// Blocks from removed columns are appended, in order, to the last
    /// remaining column. No block is ever dropped.
    pub fn reshape(&mut self, preset: LayoutPreset) {
        let count = preset.column_count();

        if self.columns.len() > count {
            let overflow: Vec<BlockNode> = self.columns.drain(count..).flatten().collect();
            self.columns[count - 1].extend(overflow);
        } else {
            self.columns.resize_with(count, Vec::new);
        }

        self.preset = preset;
    }

    /// Total number of blocks directly inside the columns
    pub fn block_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

/// Type-specific block payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockData {
    pub fields: Map<String, Value>,

    /// Present for layout blocks only
    pub layout: Option<LayoutData>,
}

/// Keys owned by [`LayoutData`] inside a layout's `data`
pub const LAYOUT_KEYS: [&str; 2] = ["preset", "columns"];

impl BlockData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            layout: None,
        }
    }

    pub fn layout(preset: LayoutPreset) -> Self {
        Self {
            fields: Map::new(),
            layout: Some(LayoutData::empty(preset)),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn columns(&self) -> Option<&[Column]> {
        self.layout.as_ref().map(|layout| layout.columns.as_slice())
    }

    /// Split a raw `data` object into free-form fields and typed layout data
    pub fn from_wire(
        block_type: &BlockType,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        if !block_type.is_layout() {
            return Ok(Self::from_fields(fields));
        }

        let preset = match fields.remove("preset") {
            Some(value) => Some(serde_json::from_value::<LayoutPreset>(value)?),
            None => None,
        };
        let columns = match fields.remove("columns") {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value::<Vec<Column>>(value)?),
        };

        let layout = match (preset, columns) {
            (Some(preset), Some(columns)) => LayoutData { preset, columns },
            (Some(preset), None) => LayoutData::empty(preset),
            (None, Some(columns)) => LayoutData {
                preset: LayoutPreset::for_columns(columns.len()),
                columns,
            },
            (None, None) => LayoutData::empty(LayoutPreset::default()),
        };

        Ok(Self {
            fields,
            layout: Some(layout),
        })
    }
}

impl Serialize for BlockData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            if self.layout.is_some() && LAYOUT_KEYS.contains(&key.as_str()) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if let Some(layout) = &self.layout {
            map.serialize_entry("preset", &layout.preset)?;
            map.serialize_entry("columns", &layout.columns)?;
        }
        map.end()
    }
}

/// A single block on a page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireBlockNode")]
pub struct BlockNode {
    pub id: BlockId,
    pub block_type: BlockType,
    pub data: BlockData,
}

impl BlockNode {
    pub fn with_data(id: impl Into<BlockId>, block_type: BlockType, data: BlockData) -> Self {
        Self {
            id: id.into(),
            block_type,
            data,
        }
    }

    pub fn is_layout(&self) -> bool {
        self.data.layout.is_some()
    }

    /// Columns of a layout node
    pub fn columns(&self) -> Option<&[Column]> {
        self.data.columns()
    }
}

impl Serialize for BlockNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("BlockNode", 3)?;
        node.serialize_field("id", &self.id)?;
        node.serialize_field("type", &self.block_type)?;
        node.serialize_field("data", &self.data)?;
        node.end()
    }
}

#[derive(Deserialize)]
struct WireBlockNode {
    id: BlockId,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

impl TryFrom<WireBlockNode> for BlockNode {
    type Error = BlockError;

    fn try_from(wire: WireBlockNode) -> Result<Self, Self::Error> {
        let data = BlockData::from_wire(&wire.block_type, wire.data.unwrap_or_default())
            .map_err(|source| BlockError::InvalidLayout {
                id: wire.id.clone(),
                source,
            })?;

        Ok(Self {
            id: wire.id,
            block_type: wire.block_type,
            data,
        })
    }
}

/// Wire-format problems in block JSON
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Invalid layout data for block {id}: {source}")]
    InvalidLayout {
        id: BlockId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid page content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Block id {0} is used more than once")]
    DuplicateId(BlockId),
}

/// Which top-level list of a site a [`PageContent`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentRegion {
    #[default]
    Page,
    Header,
    Footer,
}

/// Ordered top-level list of blocks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContent(Vec<BlockNode>);

impl PageContent {
    pub fn new(nodes: Vec<BlockNode>) -> Self {
        Self(nodes)
    }

    pub fn nodes(&self) -> &[BlockNode] {
        &self.0
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<BlockNode> {
        &mut self.0
    }

    pub fn into_nodes(self) -> Vec<BlockNode> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockNode> {
        self.0.iter()
    }

    /// Parse page content from its JSON document form.
    ///
    /// Fails if two blocks anywhere in the tree share an id.
    pub fn from_json(json: &str) -> Result<Self, BlockError> {
        let content: Self = serde_json::from_str(json)?;
        match visitor::repeated_id(&content) {
            Some(id) => Err(BlockError::DuplicateId(id)),
            None => Ok(content),
        }
    }

    pub fn to_json(&self) -> Result<String, BlockError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of blocks at every depth
    pub fn total_blocks(&self) -> usize {
        visitor::count_nodes(self)
    }

    /// Walk the tree with `visitor`
    pub fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_content(self);
    }

    /// Paths of all blocks in document order
    pub fn paths(&self) -> Vec<Path> {
        visitor::collect_paths(self)
    }
}

impl From<Vec<BlockNode>> for PageContent {
    fn from(nodes: Vec<BlockNode>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for &'a PageContent {
    type Item = &'a BlockNode;
    type IntoIter = std::slice::Iter<'a, BlockNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
