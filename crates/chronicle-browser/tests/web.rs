//! WASM browser tests for chronicle-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use chronicle_browser::{
    Annotation, BrowserEditor, DomSelection, EditorState, LoadTicket, RawSelection, ReadingToken,
    SELECTED_CLASS, SectionId, SelectionPhase, SelectionPlatform, SelectionPoint, TokenId,
    classify_point, read_raw_selection, render_readings,
};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn fixture_tokens() -> Vec<ReadingToken> {
    vec![
        ReadingToken::new(0, "the"),
        ReadingToken::new(1, "king"),
        ReadingToken::new(2, "of"),
        ReadingToken::new(3, "Egypt"),
    ]
}

const FIXTURE_CLASS: &str = "test-fixture";

/// Render the fixture into a fresh container attached to the body. Earlier
/// containers are removed so reading ids stay unique.
fn mount(id: &str) -> web_sys::Element {
    let doc = document();
    let stale = doc.get_elements_by_class_name(FIXTURE_CLASS);
    while let Some(old) = stale.item(0) {
        old.remove();
    }
    let container = doc.create_element("div").unwrap();
    container.set_id(id);
    container.set_class_name(FIXTURE_CLASS);
    doc.body().unwrap().append_child(&container).unwrap();
    render_readings(&container, &fixture_tokens()).unwrap();
    container
}

fn loaded_state() -> EditorState {
    let mut state = EditorState::new();
    let ticket: LoadTicket = state.begin_section_load(SectionId::from("1"));
    state.finish_section_load(ticket, fixture_tokens());
    state.set_annotations(vec![Annotation::anchored(
        5,
        "person",
        TokenId(1),
        TokenId(3),
    )]);
    state
}

fn reading(id: u64) -> web_sys::Element {
    document().get_element_by_id(&format!("r{id}")).unwrap()
}

fn text_of(id: u64) -> web_sys::Node {
    reading(id).first_child().unwrap()
}

/// Whitespace node directly after reading `id`.
fn gap_after(id: u64) -> web_sys::Node {
    reading(id).next_sibling().unwrap()
}

fn select(anchor: &web_sys::Node, anchor_offset: u32, focus: &web_sys::Node, focus_offset: u32) {
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection
        .set_base_and_extent(anchor, anchor_offset, focus, focus_offset)
        .unwrap();
}

fn fire(event: &str) {
    let event = web_sys::Event::new(event).unwrap();
    document().dispatch_event(&event).unwrap();
}

fn live_raw() -> RawSelection {
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    read_raw_selection(&selection)
}

// === Rendering ===

#[wasm_bindgen_test]
fn test_render_readings_structure() {
    let container = mount("render-test");
    let spans = container.get_elements_by_class_name("reading");
    assert_eq!(spans.length(), 4);
    assert_eq!(container.text_content().unwrap(), "the king of Egypt");
    assert_eq!(reading(3).id(), "r3");
}

// === Endpoint classification ===

#[wasm_bindgen_test]
fn test_classify_points() {
    mount("classify-test");
    assert_eq!(
        classify_point(&text_of(2)),
        SelectionPoint::Reading(TokenId(2))
    );
    assert_eq!(
        classify_point(&gap_after(1)),
        SelectionPoint::Gap {
            prev: Some(TokenId(1)),
            next: Some(TokenId(2)),
        }
    );
    let body: web_sys::Node = document().body().unwrap().unchecked_into();
    assert_eq!(classify_point(&body), SelectionPoint::Outside);
}

// === Selection through the DOM ===

#[wasm_bindgen_test]
fn test_forward_and_backward_drag_agree() {
    mount("drag-test");

    select(&text_of(1), 1, &text_of(3), 2);
    let forward = live_raw();
    select(&text_of(3), 2, &text_of(1), 1);
    let backward = live_raw();

    for raw in [forward, backward] {
        let mut state = loaded_state();
        let mut platform = DomSelection::new().unwrap();
        assert_eq!(state.select(&raw, &mut platform), SelectionPhase::Annotated);
        let sel = state.selection().unwrap();
        assert_eq!(sel.start, TokenId(1));
        assert_eq!(sel.end, TokenId(3));
        assert_eq!(state.span_annotation().unwrap().id, 5);
    }
}

#[wasm_bindgen_test]
fn test_whitespace_endpoints_snap_inward() {
    mount("gap-test");
    // From the space before "king" to the space after "of".
    select(&gap_after(0), 0, &gap_after(2), 1);

    let mut state = loaded_state();
    let mut platform = DomSelection::new().unwrap();
    state.select(&live_raw(), &mut platform);
    let sel = state.selection().unwrap();
    assert_eq!((sel.start, sel.end), (TokenId(1), TokenId(2)));
    assert_eq!(sel.text, "king of");
}

#[wasm_bindgen_test]
fn test_projection_marks_and_collapses() {
    mount("marks-test");
    select(&text_of(3), 3, &text_of(1), 0);

    let mut state = loaded_state();
    let mut platform = DomSelection::new().unwrap();
    state.select(&live_raw(), &mut platform);

    for id in 0..4 {
        let marked = reading(id).class_list().contains(SELECTED_CLASS);
        assert_eq!(marked, (1..=3).contains(&id), "reading r{id}");
    }

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    assert_eq!(selection.range_count(), 0);
}

#[wasm_bindgen_test]
fn test_selection_outside_readings_clears_marks() {
    let container = mount("outside-test");
    let mut state = loaded_state();
    let mut platform = DomSelection::new().unwrap();

    select(&text_of(0), 0, &text_of(1), 2);
    state.select(&live_raw(), &mut platform);
    assert!(reading(0).class_list().contains(SELECTED_CLASS));

    let outside = document().create_element("p").unwrap();
    outside.set_class_name(FIXTURE_CLASS);
    outside.set_text_content(Some("not a reading"));
    container.after_with_node_1(&outside).unwrap();
    select(&outside.first_child().unwrap(), 0, &text_of(1), 2);

    assert_eq!(
        state.select(&live_raw(), &mut platform),
        SelectionPhase::NoSelection
    );
    assert_eq!(document().get_elements_by_class_name(SELECTED_CLASS).length(), 0);
    outside.remove();
}

#[wasm_bindgen_test]
fn test_extend_native_covers_whole_readings() {
    mount("extend-test");
    let mut platform = DomSelection::new().unwrap();
    platform.extend_native(TokenId(1), TokenId(2)).unwrap();

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    assert_eq!(String::from(selection.to_string()), "king of");
    platform.collapse_native();
}

// === Event wiring ===

#[wasm_bindgen_test]
fn test_gesture_ending_outside_container_is_handled() {
    mount("listener-test");
    let mut editor = BrowserEditor::new("http://localhost:3000", "listener-test").unwrap();
    editor.attach().unwrap();
    editor.show_readings(SectionId::from("1"), fixture_tokens());
    editor.annotations_added(
        &[Annotation::anchored(5, "person", TokenId(1), TokenId(3))],
        false,
    );

    // Released over the document, not the text container.
    select(&text_of(3), 2, &text_of(1), 1);
    fire("mouseup");
    assert_eq!(editor.phase(), SelectionPhase::Annotated);
    assert!(reading(2).class_list().contains(SELECTED_CLASS));

    let outside = document().create_element("p").unwrap();
    outside.set_class_name(FIXTURE_CLASS);
    outside.set_text_content(Some("not a reading"));
    document().body().unwrap().append_child(&outside).unwrap();

    select(&text_of(1), 1, &outside.first_child().unwrap(), 3);
    fire("mouseup");
    assert_eq!(editor.phase(), SelectionPhase::NoSelection);
    assert!(editor.with_state(|s| s.selection().is_none()));
    assert_eq!(document().get_elements_by_class_name(SELECTED_CLASS).length(), 0);
}

#[wasm_bindgen_test]
fn test_keyboard_selection_is_handled() {
    mount("keyboard-test");
    let mut editor = BrowserEditor::new("http://localhost:3000", "keyboard-test").unwrap();
    editor.attach().unwrap();
    editor.show_readings(SectionId::from("1"), fixture_tokens());

    select(&text_of(0), 0, &text_of(1), 2);
    fire("keyup");
    assert_eq!(editor.phase(), SelectionPhase::Unannotated);
    assert_eq!(
        editor.with_state(|s| s.selection().map(|sel| sel.text.clone())),
        Some("the king".to_string())
    );
}
