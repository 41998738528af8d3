//! JavaScript bindings for the editor widgets.
//!
//! Annotations cross the boundary as JSON text in the store's wire format.

use chronicle_core::{Annotation, SectionId};
use wasm_bindgen::prelude::*;

use crate::editor::BrowserEditor;

#[wasm_bindgen]
pub struct ChronicleEditor {
    editor: BrowserEditor,
}

#[wasm_bindgen]
impl ChronicleEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(endpoint: &str, container_id: &str) -> Result<ChronicleEditor, JsError> {
        let mut editor = BrowserEditor::new(endpoint, container_id)?;
        editor.attach().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(ChronicleEditor { editor })
    }

    /// Fetch sections, annotations and label specs.
    pub fn start(&self) {
        self.editor.load_corpus();
    }

    #[wasm_bindgen(js_name = loadSection)]
    pub fn load_section(&self, section_id: &str) {
        self.editor.load_section(SectionId::from(section_id));
    }

    /// Register a callback invoked with no arguments after every change.
    /// It may call back into the editor.
    #[wasm_bindgen(js_name = onUpdate)]
    pub fn on_update(&self, callback: js_sys::Function) {
        self.editor.set_on_update(move || {
            let _ = callback.call0(&JsValue::NULL);
        });
    }

    /// Current selection, span annotation and linked entities as JSON.
    #[wasm_bindgen(js_name = selectionReport)]
    pub fn selection_report(&self) -> Result<String, JsError> {
        self.editor
            .with_state(|state| serde_json::to_string(&state.report()))
            .map_err(Into::into)
    }

    pub fn annotations(&self) -> Result<String, JsError> {
        self.editor
            .with_state(|state| serde_json::to_string(state.annotations()))
            .map_err(Into::into)
    }

    pub fn sections(&self) -> Result<String, JsError> {
        self.editor
            .with_state(|state| serde_json::to_string(state.sections()))
            .map_err(Into::into)
    }

    /// Label spec as JSON; an empty spec for unknown labels.
    pub fn spec(&self, label: &str) -> Result<String, JsError> {
        self.editor
            .with_state(|state| serde_json::to_string(state.spec(label)))
            .map_err(Into::into)
    }

    /// Existing annotations with this label as JSON.
    pub fn existing(&self, label: &str) -> Result<String, JsError> {
        self.editor
            .with_state(|state| serde_json::to_string(&state.existing(label)))
            .map_err(Into::into)
    }

    #[wasm_bindgen(js_name = annotationsAdded)]
    pub fn annotations_added(&self, json: &str, clear_selection: bool) -> Result<(), JsError> {
        let added: Vec<Annotation> = serde_json::from_str(json)?;
        self.editor.annotations_added(&added, clear_selection);
        Ok(())
    }

    #[wasm_bindgen(js_name = annotationRemoved)]
    pub fn annotation_removed(&self, json: &str) -> Result<bool, JsError> {
        let annotation: Annotation = serde_json::from_str(json)?;
        Ok(self.editor.annotation_removed(&annotation))
    }
}
