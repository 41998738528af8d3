//! Editor state owned by a single controller.
//!
//! `EditorState` holds the session-wide corpus (sections, annotations, label
//! specs), the readings of the loaded section and everything derived from the
//! active selection. Widgets read it through the query methods and change it
//! only through [`EditorState::annotations_added`] and
//! [`EditorState::annotation_removed`].

use serde::Serialize;

use crate::index::{SelectionEntities, existing_for_label, find_span_annotation, selection_entities};
use crate::merge::{apply_removal, apply_upserts};
use crate::platform::SelectionPlatform;
use crate::selection::{
    RawSelection, Readings, Selection, SelectionPhase, clear_projection, normalize_selection,
    project_selection,
};
use crate::types::{Annotation, AnnotationSpec, ReadingToken, Section, SectionId, SpecRegistry};

/// Tag for one in-flight section text load.
///
/// Only the most recently issued ticket can complete a load; responses for
/// older tickets are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    section: SectionId,
}

impl LoadTicket {
    pub fn section(&self) -> &SectionId {
        &self.section
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Serializable view of the derived selection state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionReport {
    pub phase: SelectionPhase,
    pub selection: Option<Selection>,
    pub span_annotation: Option<Annotation>,
    pub entities: SelectionEntities,
}

#[derive(Debug, Default)]
pub struct EditorState {
    sections: Vec<Section>,
    annotations: Vec<Annotation>,
    specs: SpecRegistry,

    readings: Readings,
    current_section: Option<SectionId>,
    generation: u64,

    selection: Option<Selection>,
    span_annotation: Option<Annotation>,
    entities: SelectionEntities,
    phase: SelectionPhase,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Queries ===

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selection_entities(&self) -> &SelectionEntities {
        &self.entities
    }

    /// The annotation anchored to the active selection, if any.
    pub fn span_annotation(&self) -> Option<&Annotation> {
        self.span_annotation.as_ref()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Label spec, empty for unknown labels.
    pub fn spec(&self, label: &str) -> &AnnotationSpec {
        self.specs.get(label)
    }

    /// Existing annotations with this label, e.g. for suggestion lists.
    pub fn existing(&self, label: &str) -> Vec<&Annotation> {
        existing_for_label(&self.annotations, label)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn current_section(&self) -> Option<&SectionId> {
        self.current_section.as_ref()
    }

    pub fn report(&self) -> SelectionReport {
        SelectionReport {
            phase: self.phase,
            selection: self.selection.clone(),
            span_annotation: self.span_annotation.clone(),
            entities: self.entities.clone(),
        }
    }

    // === Widget entry points ===

    /// Fold new or edited annotations into the corpus.
    ///
    /// With `clear_selection` the active selection is consumed; otherwise it
    /// stays and its entities are recomputed against the new corpus.
    pub fn annotations_added(&mut self, added: &[Annotation], clear_selection: bool) {
        self.annotations = apply_upserts(&self.annotations, added);
        tracing::debug!(
            target: "chronicle::state",
            count = added.len(),
            total = self.annotations.len(),
            clear_selection,
            "annotations added"
        );
        if clear_selection {
            self.reset_selection();
        } else {
            self.refresh_entities();
        }
    }

    /// Drop an annotation from the corpus.
    ///
    /// Returns `false`, leaving all state untouched, if no annotation had
    /// that id.
    pub fn annotation_removed(&mut self, annotation: &Annotation) -> bool {
        let remaining = apply_removal(&self.annotations, annotation.id);
        if remaining.len() == self.annotations.len() {
            return false;
        }
        self.annotations = remaining;
        tracing::debug!(
            target: "chronicle::state",
            id = annotation.id,
            total = self.annotations.len(),
            "annotation removed"
        );
        self.refresh_entities();
        true
    }

    // === Host transitions ===

    /// React to a selection change.
    ///
    /// An empty raw selection is ignored. Otherwise the selection is
    /// normalized, projected onto the platform and looked up in the corpus.
    pub fn select<P: SelectionPlatform + ?Sized>(
        &mut self,
        raw: &RawSelection,
        platform: &mut P,
    ) -> SelectionPhase {
        if raw.text_empty {
            return self.phase;
        }
        self.phase = SelectionPhase::Pending;

        match normalize_selection(raw, &self.readings) {
            Some(selection) => {
                self.phase = SelectionPhase::Resolved;
                project_selection(platform, &self.readings, &selection);
                self.selection = Some(selection);
                self.refresh_entities();
            }
            None => {
                clear_projection(platform);
                self.reset_selection();
            }
        }
        self.phase
    }

    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
    }

    /// Replace the whole annotation corpus.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.refresh_entities();
    }

    pub fn set_specs(&mut self, specs: Vec<AnnotationSpec>) {
        self.specs = SpecRegistry::new(specs);
    }

    /// Start loading a section's readings. Supersedes any earlier ticket.
    pub fn begin_section_load(&mut self, section: SectionId) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
            section,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Complete a section load. Stale tickets are discarded and `false` is
    /// returned; otherwise the readings are replaced and the selection reset.
    pub fn finish_section_load(&mut self, ticket: LoadTicket, readings: Vec<ReadingToken>) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(
                target: "chronicle::state",
                section = %ticket.section,
                stale = ticket.generation,
                current = self.generation,
                "discarding stale section text"
            );
            return false;
        }
        self.readings = Readings::new(readings);
        self.current_section = Some(ticket.section);
        self.reset_selection();
        true
    }

    fn reset_selection(&mut self) {
        self.selection = None;
        self.span_annotation = None;
        self.entities.clear();
        self.phase = SelectionPhase::NoSelection;
    }

    fn refresh_entities(&mut self) {
        let Some(selection) = &self.selection else {
            return;
        };
        // TODO: a span can carry several reference annotations; only the first is consulted.
        self.span_annotation =
            find_span_annotation(&self.annotations, selection.start, selection.end).cloned();
        self.entities = match &self.span_annotation {
            Some(span) => selection_entities(&self.annotations, span),
            None => SelectionEntities::new(),
        };
        self.phase = if self.span_annotation.is_some() {
            SelectionPhase::Annotated
        } else {
            SelectionPhase::Unannotated
        };
    }
}
