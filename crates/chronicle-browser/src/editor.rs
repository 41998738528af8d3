//! Browser host for an `EditorState`.
//!
//! `BrowserEditor` owns the state for the page's lifetime, wires the
//! document's pointer and keyboard events to selection handling and runs
//! store loads on the local executor. Widgets read through
//! [`BrowserEditor::with_state`] and write through the two entry points.

use std::cell::RefCell;
use std::rc::Rc;

use chronicle_core::{
    Annotation, EditorState, Notifier, PlatformError, ReadingToken, SectionId, SelectionPhase,
    clear_projection,
};
use chronicle_store::{
    AnnotationStore, HttpStore, StoreError, apply_corpus, apply_section_text, fetch_corpus,
};
use gloo_events::EventListener;

use crate::dom_selection::{DomSelection, native_selection, read_raw_selection};
use crate::render::render_readings;

/// Blocking notification through `window.alert`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

type UpdateCallback = Box<dyn Fn()>;

struct Inner {
    state: RefCell<EditorState>,
    store: HttpStore,
    container_id: String,
    on_update: RefCell<Option<UpdateCallback>>,
}

impl Inner {
    /// Run the update callback with nothing borrowed, so it may read the
    /// state and call the entry points. Notifications raised while it runs
    /// are dropped.
    fn notify(&self) {
        let Some(callback) = self.on_update.borrow_mut().take() else {
            return;
        };
        callback();
        let mut slot = self.on_update.borrow_mut();
        if slot.is_none() {
            *slot = Some(callback);
        }
    }

    fn container(&self) -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(&self.container_id)
    }

    fn render(&self) {
        let Some(container) = self.container() else {
            tracing::warn!(target: "chronicle::editor", id = %self.container_id, "text container missing");
            return;
        };
        let state = self.state.borrow();
        if let Err(e) = render_readings(&container, state.readings().tokens()) {
            tracing::warn!(target: "chronicle::editor", error = %e, "render failed");
        }
    }

    fn handle_selection_change(&self) {
        let Some(selection) = native_selection() else {
            return;
        };
        let raw = read_raw_selection(&selection);
        if raw.text_empty {
            return;
        }

        let mut platform = match DomSelection::new() {
            Ok(platform) => platform,
            Err(e) => {
                tracing::warn!(target: "chronicle::editor", error = %e, "no DOM for selection");
                return;
            }
        };
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::debug!(target: "chronicle::editor", "state busy, selection event skipped");
            return;
        };
        let phase = state.select(&raw, &mut platform);
        drop(state);
        tracing::debug!(target: "chronicle::editor", ?phase, "selection changed");
        self.notify();
    }

    fn annotations_added(&self, added: &[Annotation], clear_selection: bool) {
        self.state
            .borrow_mut()
            .annotations_added(added, clear_selection);
        if clear_selection {
            if let Ok(mut platform) = DomSelection::new() {
                clear_projection(&mut platform);
            }
        }
        self.notify();
    }

    fn annotation_removed(&self, annotation: &Annotation) -> bool {
        let changed = self.state.borrow_mut().annotation_removed(annotation);
        if changed {
            self.notify();
        }
        changed
    }
}

pub struct BrowserEditor {
    inner: Rc<Inner>,
    listeners: Vec<EventListener>,
}

impl BrowserEditor {
    /// Create an editor talking to the store at `endpoint` and rendering
    /// readings into the element with id `container_id`.
    pub fn new(endpoint: &str, container_id: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self {
            inner: Rc::new(Inner {
                state: RefCell::new(EditorState::new()),
                store: HttpStore::new(endpoint)?,
                container_id: container_id.into(),
                on_update: RefCell::new(None),
            }),
            listeners: Vec::new(),
        })
    }

    /// Listen for finished selection gestures anywhere in the document.
    ///
    /// A drag may start in the readings and end outside the text container;
    /// the endpoints decide whether the selection counts.
    pub fn attach(&mut self) -> Result<(), PlatformError> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;

        self.listeners.clear();
        for event in ["mouseup", "keyup"] {
            let inner = Rc::clone(&self.inner);
            self.listeners
                .push(EventListener::new(&document, event, move |_| {
                    inner.handle_selection_change()
                }));
        }
        Ok(())
    }

    /// Called after every change. Read the state through
    /// [`BrowserEditor::with_state`].
    pub fn set_on_update(&self, callback: impl Fn() + 'static) {
        *self.inner.on_update.borrow_mut() = Some(Box::new(callback));
    }

    /// Read-only access for widgets.
    pub fn with_state<R>(&self, f: impl FnOnce(&EditorState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Load sections, annotations and label specs.
    pub fn load_corpus(&self) {
        let inner = Rc::clone(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            let load = fetch_corpus(&inner.store).await;
            apply_corpus(&mut inner.state.borrow_mut(), load, &AlertNotifier);
            inner.notify();
        });
    }

    /// Load and render one section's readings.
    ///
    /// A later call supersedes this one even if its response arrives first.
    pub fn load_section(&self, section: SectionId) {
        let ticket = self.inner.state.borrow_mut().begin_section_load(section);
        let inner = Rc::clone(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            let result = inner.store.lemma_readings(ticket.section()).await;
            let applied = apply_section_text(
                &mut inner.state.borrow_mut(),
                ticket,
                result,
                &AlertNotifier,
            );
            if applied {
                inner.render();
                inner.notify();
            }
        });
    }

    /// Render readings that did not come from the store, such as text
    /// embedded in the page. Supersedes any section load in flight.
    pub fn show_readings(&self, section: SectionId, tokens: Vec<ReadingToken>) {
        let ticket = self.inner.state.borrow_mut().begin_section_load(section);
        self.inner
            .state
            .borrow_mut()
            .finish_section_load(ticket, tokens);
        self.inner.render();
        self.inner.notify();
    }

    /// Widget entry point: new or edited annotations.
    pub fn annotations_added(&self, added: &[Annotation], clear_selection: bool) {
        self.inner.annotations_added(added, clear_selection);
    }

    /// Widget entry point: an annotation was deleted.
    pub fn annotation_removed(&self, annotation: &Annotation) -> bool {
        self.inner.annotation_removed(annotation)
    }

    pub fn phase(&self) -> SelectionPhase {
        self.inner.state.borrow().phase()
    }
}
