use kendr_blocks::{BlockId, ContentRegion, Path};
use kendr_editor::{
    Document, DragItem, DropZone, EditingSession, EditorConfig, EditorMode, Mutation,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Parse error: {}", e)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Editing session exposed to the browser.
///
/// Paths, mutations, drag items and drop zones cross the boundary as JSON
/// strings.
#[wasm_bindgen]
pub struct Editor {
    session: EditingSession,
}

#[wasm_bindgen]
impl Editor {
    /// Open page content (a JSON array of blocks)
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(content: &str) -> Result<Editor, JsValue> {
        let session = EditingSession::from_json("wasm", content).map_err(js_error)?;
        Ok(Editor { session })
    }

    /// Open page content with an editor config (`kendr.editor.json` contents)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(content: &str, config: &str) -> Result<Editor, JsValue> {
        let config = EditorConfig::from_json(config).map_err(js_error)?;
        let document = Document::from_json(ContentRegion::Page, content)
            .map_err(js_error)?;
        Ok(Editor {
            session: EditingSession::with_config("wasm", document, config),
        })
    }

    /// Current page content as JSON
    pub fn content(&self) -> Result<String, JsValue> {
        to_json(self.session.content())
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.session.document().version as f64
    }

    /// Apply a mutation; returns `{ version, created? }`
    pub fn apply(&mut self, mutation: &str) -> Result<String, JsValue> {
        let mutation: Mutation = parse_json(mutation)?;
        let result = self.session.apply(mutation).map_err(js_error)?;
        to_json(&result)
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.session.undo().map_err(js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.session.redo().map_err(js_error)
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Select the block at `path`; returns the selection as JSON
    pub fn select(&mut self, path: &str) -> Result<String, JsValue> {
        let path: Path = parse_json(path)?;
        let selection = self.session.select(&path).map_err(js_error)?;
        to_json(selection)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Current selection as JSON, `null` when nothing is selected
    pub fn selection(&self) -> Result<String, JsValue> {
        to_json(&self.session.selection())
    }

    #[wasm_bindgen(js_name = toggleCollapsed)]
    pub fn toggle_collapsed(&mut self, id: &str) -> bool {
        self.session.toggle_collapsed(&BlockId::from(id))
    }

    #[wasm_bindgen(js_name = isCollapsed)]
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.session.is_collapsed(&BlockId::from(id))
    }

    /// Switch to `"edit"`, `"preview"` or `"public"`
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: EditorMode =
            serde_json::from_value(serde_json::Value::from(mode)).map_err(js_error)?;
        self.session.set_mode(mode);
        Ok(())
    }

    /// `"drop_zone"` or `"plain"`
    #[wasm_bindgen(js_name = columnSurface)]
    pub fn column_surface(&self) -> Result<String, JsValue> {
        to_json(&self.session.surface_for_column())
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, item: &str) -> Result<(), JsValue> {
        let item: DragItem = parse_json(item)?;
        self.session.begin_drag(item).map_err(js_error)
    }

    /// Pointer entered `path`; returns the hover outcome as JSON
    pub fn hover(&mut self, path: &str) -> Result<String, JsValue> {
        let path: Path = parse_json(path)?;
        let outcome = self.session.hover(&path).map_err(js_error)?;
        to_json(&outcome)
    }

    /// Release over `zones` (JSON array, innermost first)
    pub fn drop(&mut self, zones: &str) -> Result<String, JsValue> {
        let zones: Vec<DropZone> = parse_json(zones)?;
        let outcome = self.session.drop(&zones).map_err(js_error)?;
        to_json(&outcome)
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) -> Result<(), JsValue> {
        self.session.cancel_drag().map_err(js_error)
    }

    #[wasm_bindgen(js_name = dragPhase)]
    pub fn drag_phase(&self) -> Result<String, JsValue> {
        to_json(&self.session.drag_phase())
    }

    #[wasm_bindgen(getter, js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.session.document().is_dirty()
    }

    #[wasm_bindgen(getter, js_name = isSaving)]
    pub fn is_saving(&self) -> bool {
        self.session.document().is_saving()
    }

    /// Start a save done by the host; returns the version to pass back
    #[wasm_bindgen(js_name = beginSave)]
    pub fn begin_save(&mut self) -> f64 {
        self.session.begin_save() as f64
    }

    #[wasm_bindgen(js_name = finishSave)]
    pub fn finish_save(&mut self, version: f64, success: bool) -> Result<(), JsValue> {
        self.session
            .finish_save(version as u64, success)
            .map_err(js_error)
    }
}
