use kendr_blocks::BlockDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::EditorError;

pub const DEFAULT_CONFIG_NAME: &str = "kendr.editor.json";

/// What happens to the live tree when a drag ends without a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelPolicy {
    /// Keep whatever the hover preview left behind
    #[default]
    KeepPreview,
    /// Restore the tree from before the drag
    Revert,
}

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept per session (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub cancel_policy: CancelPolicy,

    /// Payload defaults for blocks dropped from the palette
    #[serde(default)]
    pub block_defaults: BlockDefaults,
}

fn default_history_limit() -> usize {
    100
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            // Return default config if none exists
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            cancel_policy: CancelPolicy::default(),
            block_defaults: BlockDefaults::default(),
        }
    }
}
