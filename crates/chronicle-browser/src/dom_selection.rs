//! Reading the browser selection and projecting spans back onto the DOM.
//!
//! `read_raw_selection` turns the live `Selection` into the pure descriptor
//! the core normalizes. `DomSelection` implements `SelectionPlatform`: it
//! toggles the `selected` class on reading spans and drives the native
//! selection with `setBaseAndExtent` / `removeAllRanges`.

use chronicle_core::{PlatformError, RawSelection, SelectionPlatform, SelectionPoint, TokenId};
use wasm_bindgen::JsCast;

use crate::render::{READING_CLASS, SELECTED_CLASS};

/// Is the element a reading span?
pub fn is_reading(element: &web_sys::Element) -> bool {
    element.class_list().contains(READING_CLASS)
}

/// Token id of a reading span, `None` for anything else.
pub fn reading_id(element: &web_sys::Element) -> Option<TokenId> {
    if is_reading(element) {
        TokenId::parse(&element.id())
    } else {
        None
    }
}

fn is_bare_whitespace(node: &web_sys::Node) -> bool {
    node.node_type() == web_sys::Node::TEXT_NODE
        && node
            .text_content()
            .is_some_and(|t| !t.is_empty() && t.trim().is_empty())
}

/// Classify one selection endpoint.
pub fn classify_point(node: &web_sys::Node) -> SelectionPoint {
    if is_bare_whitespace(node) {
        let data = node.dyn_ref::<web_sys::CharacterData>();
        let prev = data
            .and_then(|d| d.previous_element_sibling())
            .and_then(|e| reading_id(&e));
        let next = data
            .and_then(|d| d.next_element_sibling())
            .and_then(|e| reading_id(&e));
        return SelectionPoint::Gap { prev, next };
    }

    let element = match node.dyn_ref::<web_sys::Element>() {
        Some(element) => Some(element.clone()),
        None => node.parent_element(),
    };
    element
        .and_then(|e| reading_id(&e))
        .map(SelectionPoint::Reading)
        .unwrap_or(SelectionPoint::Outside)
}

/// Describe the live selection for normalization.
pub fn read_raw_selection(selection: &web_sys::Selection) -> RawSelection {
    let text: String = selection.to_string().into();
    let (Some(anchor), Some(focus)) = (selection.anchor_node(), selection.focus_node()) else {
        return RawSelection::empty();
    };

    let raw = RawSelection {
        anchor: classify_point(&anchor),
        focus: classify_point(&focus),
        text_empty: text.is_empty(),
    };
    tracing::trace!(
        target: "chronicle::dom",
        anchor = ?raw.anchor,
        focus = ?raw.focus,
        text_empty = raw.text_empty,
        "read browser selection"
    );
    raw
}

/// The window's selection object.
pub fn native_selection() -> Option<web_sys::Selection> {
    web_sys::window()?.get_selection().ok()?
}

/// DOM-backed selection platform.
pub struct DomSelection {
    document: web_sys::Document,
}

impl DomSelection {
    pub fn new() -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;
        Ok(Self { document })
    }

    pub fn for_document(document: web_sys::Document) -> Self {
        Self { document }
    }

    fn reading_element(&self, id: TokenId) -> Option<web_sys::Element> {
        self.document
            .get_element_by_id(&id.to_string())
            .filter(is_reading)
    }
}

impl SelectionPlatform for DomSelection {
    fn clear_marks(&mut self) {
        let readings = self.document.get_elements_by_class_name(READING_CLASS);
        for i in 0..readings.length() {
            if let Some(element) = readings.item(i) {
                let _ = element.class_list().remove_1(SELECTED_CLASS);
            }
        }
    }

    fn mark(&mut self, id: TokenId) {
        match self.reading_element(id) {
            Some(element) => {
                let _ = element.class_list().add_1(SELECTED_CLASS);
            }
            None => tracing::warn!(target: "chronicle::dom", %id, "reading not rendered"),
        }
    }

    fn extend_native(&mut self, start: TokenId, end: TokenId) -> Result<(), PlatformError> {
        let selection = native_selection().ok_or("no selection object")?;
        let start_text = self
            .reading_element(start)
            .and_then(|e| e.first_child())
            .ok_or_else(|| format!("reading {start} has no text"))?;
        let end_text = self
            .reading_element(end)
            .and_then(|e| e.first_child())
            .ok_or_else(|| format!("reading {end} has no text"))?;
        let end_len = end_text
            .text_content()
            .map(|t| t.encode_utf16().count())
            .unwrap_or(0);

        selection
            .set_base_and_extent(&start_text, 0, &end_text, end_len as u32)
            .map_err(|e| format!("set_base_and_extent failed: {:?}", e))?;
        Ok(())
    }

    fn collapse_native(&mut self) {
        if let Some(selection) = native_selection() {
            let _ = selection.remove_all_ranges();
        }
    }
}
