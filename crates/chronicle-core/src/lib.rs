//! chronicle-core: selection and annotation reconciliation without framework dependencies.
//!
//! This crate provides:
//! - `types` - readings, links, annotations and label specs as served by the store
//! - `selection` - span normalization from raw selections to whole readings
//! - `index` - span annotation and linked entity lookups
//! - `merge` - copy-on-write upsert and removal by id
//! - `state` - `EditorState`, the controller-owned application state
//! - `platform` - traits the UI layer implements for highlighting and alerts

pub mod error;
pub mod index;
pub mod merge;
pub mod platform;
pub mod selection;
pub mod state;
pub mod types;

pub use error::{LoadError, LoadKind, Notice};
pub use index::{
    SelectionEntities, existing_for_label, find_span_annotation, is_anchored_to, linked_role,
    selection_entities,
};
pub use merge::{apply_removal, apply_upserts};
pub use platform::{LogNotifier, MarkSet, Notifier, PlatformError, SelectionPlatform};
pub use selection::{
    RawSelection, Readings, Selection, SelectionPhase, SelectionPoint, clear_projection,
    normalize_selection, project_selection,
};
pub use smol_str::SmolStr;
pub use state::{EditorState, LoadTicket, SelectionReport};
pub use types::{
    Annotation, AnnotationSpec, Link, LinkType, ReadingToken, Section, SectionId, SpecRegistry,
    TokenId,
};
