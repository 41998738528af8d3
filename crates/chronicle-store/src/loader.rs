//! Feeding store responses into an `EditorState`.
//!
//! Fetching and applying are separate so that hosts which share the state
//! between event handlers (the browser) never hold it across an await. The
//! three corpus lists are independent and each is applied on its own; a
//! failed fetch leaves the matching part of the state as it was.

use chronicle_core::{
    Annotation, AnnotationSpec, EditorState, LoadError, LoadTicket, Notice, Notifier, ReadingToken,
    Section, SectionId,
};

use crate::client::AnnotationStore;

/// Results of the three corpus fetches.
#[derive(Debug)]
pub struct CorpusLoad {
    pub sections: Result<Vec<Section>, LoadError>,
    pub annotations: Result<Vec<Annotation>, LoadError>,
    pub labels: Result<Vec<AnnotationSpec>, LoadError>,
}

/// Fetch sections, annotations and label specs concurrently.
pub async fn fetch_corpus<S: AnnotationStore>(store: &S) -> CorpusLoad {
    let (sections, annotations, labels) = futures_util::future::join3(
        store.sections(),
        store.annotations(),
        store.annotation_labels(),
    )
    .await;
    CorpusLoad {
        sections,
        annotations,
        labels,
    }
}

/// Apply a corpus load, reporting each failure. Returns the failure count.
pub fn apply_corpus(state: &mut EditorState, load: CorpusLoad, notifier: &dyn Notifier) -> usize {
    let mut failures = 0;

    match load.sections {
        Ok(sections) => {
            tracing::info!(target: "chronicle::load", count = sections.len(), "sections loaded");
            state.set_sections(sections);
        }
        Err(e) => {
            report_failure(&e, notifier);
            failures += 1;
        }
    }

    match load.annotations {
        Ok(annotations) => {
            tracing::info!(
                target: "chronicle::load",
                count = annotations.len(),
                "annotations loaded"
            );
            state.set_annotations(annotations);
        }
        Err(e) => {
            report_failure(&e, notifier);
            failures += 1;
        }
    }

    match load.labels {
        Ok(specs) => {
            tracing::info!(target: "chronicle::load", count = specs.len(), "annotation specs loaded");
            state.set_specs(specs);
        }
        Err(e) => {
            report_failure(&e, notifier);
            failures += 1;
        }
    }

    failures
}

/// Apply the readings fetched under `ticket`.
///
/// Returns `true` if the readings replaced the current text. Stale tickets
/// and failures leave the state untouched.
pub fn apply_section_text(
    state: &mut EditorState,
    ticket: LoadTicket,
    result: Result<Vec<ReadingToken>, LoadError>,
    notifier: &dyn Notifier,
) -> bool {
    match result {
        Ok(readings) => {
            let section = ticket.section().clone();
            let count = readings.len();
            let applied = state.finish_section_load(ticket, readings);
            if applied {
                tracing::info!(target: "chronicle::load", %section, count, "section text loaded");
            }
            applied
        }
        Err(e) if state.is_current(&ticket) => {
            report_failure(&e, notifier);
            false
        }
        Err(e) => {
            tracing::debug!(
                target: "chronicle::load",
                section = %ticket.section(),
                error = %e,
                "ignoring failure of superseded section load"
            );
            false
        }
    }
}

/// Route a failure by its notice policy.
pub fn report_failure(error: &LoadError, notifier: &dyn Notifier) {
    match error.kind().notice() {
        Notice::Alert => {
            tracing::error!(target: "chronicle::load", error = %error, "load failed");
            notifier.alert(&error.user_message());
        }
        Notice::Log => {
            tracing::warn!(target: "chronicle::load", error = %error, "load failed");
        }
    }
}

/// Fetch and apply the corpus in one go.
pub async fn load_corpus<S: AnnotationStore>(
    store: &S,
    state: &mut EditorState,
    notifier: &dyn Notifier,
) -> usize {
    let load = fetch_corpus(store).await;
    apply_corpus(state, load, notifier)
}

/// Fetch and apply one section's readings.
pub async fn load_section<S: AnnotationStore>(
    store: &S,
    state: &mut EditorState,
    section: SectionId,
    notifier: &dyn Notifier,
) -> bool {
    let ticket = state.begin_section_load(section);
    let result = store.lemma_readings(ticket.section()).await;
    apply_section_text(state, ticket, result, notifier)
}
