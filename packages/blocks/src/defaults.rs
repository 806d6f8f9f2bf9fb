//! Default payloads for freshly created blocks

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::block::{BlockData, BlockId, BlockNode, BlockType, LayoutPreset};

pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/static/placeholders/image.svg";

/// Site-wide knobs for new block payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefaults {
    /// Image URL used by hero, image and gallery placeholders
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// Preset used for layouts created without an explicit one
    #[serde(default)]
    pub default_preset: LayoutPreset,
}

fn default_placeholder_image() -> String {
    DEFAULT_PLACEHOLDER_IMAGE.to_string()
}

impl Default for BlockDefaults {
    fn default() -> Self {
        Self {
            placeholder_image: default_placeholder_image(),
            default_preset: LayoutPreset::default(),
        }
    }
}

/// Build the default `data` for a new block of `block_type`.
///
/// Layouts get one empty column per part of `preset` (or of the configured
/// default preset). Unknown types get an empty payload.
pub fn create_default_data(
    block_type: &BlockType,
    defaults: &BlockDefaults,
    preset: Option<&LayoutPreset>,
) -> BlockData {
    let image = defaults.placeholder_image.as_str();

    let fields = match block_type {
        BlockType::Hero => json!({
            "title": "Welcome to our store",
            "subtitle": "Tell visitors what makes you different",
            "image": image,
            "buttonText": "Shop now",
            "buttonLink": "/catalog",
            "align": "center"
        }),
        BlockType::Text => json!({
            "content": "Add your text here",
            "align": "left"
        }),
        BlockType::Image => json!({
            "src": image,
            "alt": "",
            "caption": ""
        }),
        BlockType::Button => json!({
            "text": "Click me",
            "link": "#",
            "variant": "primary"
        }),
        BlockType::Layout => {
            let preset = preset.unwrap_or(&defaults.default_preset).clone();
            return BlockData::layout(preset).with_field("gap", json!(24));
        }
        BlockType::Categories => json!({
            "title": "Categories",
            "limit": 6,
            "showImages": true
        }),
        BlockType::CatalogGrid => json!({
            "title": "Products",
            "categoryId": null,
            "perRow": 4,
            "limit": 8
        }),
        BlockType::Features => json!({
            "title": "Why choose us",
            "items": [
                { "icon": "truck", "title": "Fast delivery", "text": "Orders ship within 24 hours" },
                { "icon": "shield", "title": "Secure payment", "text": "Your data stays protected" },
                { "icon": "refresh", "title": "Easy returns", "text": "30 days to change your mind" }
            ]
        }),
        BlockType::Gallery => json!({
            "images": [image, image, image],
            "perRow": 3
        }),
        BlockType::Form => json!({
            "title": "Contact us",
            "fields": [
                { "name": "name", "label": "Name", "type": "text", "required": true },
                { "name": "email", "label": "Email", "type": "email", "required": true },
                { "name": "message", "label": "Message", "type": "textarea", "required": false }
            ],
            "submitText": "Send"
        }),
        BlockType::Video => json!({
            "url": "",
            "autoplay": false
        }),
        BlockType::Spacer => json!({ "height": 48 }),
        BlockType::Divider => json!({ "style": "solid" }),
        BlockType::Testimonials => json!({
            "title": "What our customers say",
            "items": []
        }),
        BlockType::Unknown(_) => Value::Null,
    };

    BlockData::from_fields(into_map(fields))
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl BlockNode {
    /// New block with a fresh id and the default payload for its type
    pub fn new(block_type: BlockType, defaults: &BlockDefaults, preset: Option<&LayoutPreset>) -> Self {
        let data = create_default_data(&block_type, defaults, preset);
        Self {
            id: BlockId::generate(),
            block_type,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_uses_placeholder_image() {
        let defaults = BlockDefaults {
            placeholder_image: "https://cdn.example.com/hero.jpg".to_string(),
            ..BlockDefaults::default()
        };

        let data = create_default_data(&BlockType::Hero, &defaults, None);
        assert_eq!(data.field_str("image"), Some("https://cdn.example.com/hero.jpg"));
        assert!(data.layout.is_none());
    }

    #[test]
    fn test_layout_columns_follow_preset() {
        let defaults = BlockDefaults::default();

        let three = create_default_data(
            &BlockType::Layout,
            &defaults,
            Some(&LayoutPreset::new("33-33-33")),
        );
        assert_eq!(three.columns().unwrap().len(), 3);
        assert!(three.columns().unwrap().iter().all(Vec::is_empty));

        let fallback = create_default_data(&BlockType::Layout, &defaults, None);
        assert_eq!(fallback.layout.unwrap().preset, LayoutPreset::new("50-50"));
    }

    #[test]
    fn test_unknown_type_gets_empty_payload() {
        let data = create_default_data(&BlockType::from("countdown"), &BlockDefaults::default(), None);
        assert_eq!(data, BlockData::new());
    }

    #[test]
    fn test_every_known_type_has_a_payload() {
        let defaults = BlockDefaults::default();
        for block_type in BlockType::KNOWN.iter() {
            let data = create_default_data(block_type, &defaults, None);
            assert!(
                !data.fields.is_empty() || data.layout.is_some(),
                "{block_type} has no default data"
            );
        }
    }

    #[test]
    fn test_new_nodes_get_distinct_ids() {
        let defaults = BlockDefaults::default();
        let a = BlockNode::new(BlockType::Text, &defaults, None);
        let b = BlockNode::new(BlockType::Text, &defaults, None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.data, b.data);
    }
}
