//! Annotation lookups over the in-memory corpus.
//!
//! Span annotations carry a `BEGIN` and an `END` link to reading positions.
//! Reference annotations point at a span annotation's id under a role type.
//! Both lookups are first-match: at most one span annotation per span is
//! assumed, and a later entity for the same role replaces an earlier one.

use std::collections::BTreeMap;

use crate::types::{Annotation, LinkType, TokenId};

/// Entities attached to the active span annotation, keyed by role.
pub type SelectionEntities = BTreeMap<LinkType, Annotation>;

/// Is `annotation` anchored to exactly `start..=end`?
///
/// Both the `BEGIN` and the `END` link must be present. Readings past the
/// link target range never match.
pub fn is_anchored_to(annotation: &Annotation, start: TokenId, end: TokenId) -> bool {
    let (Some(start), Some(end)) = (start.as_target(), end.as_target()) else {
        return false;
    };
    annotation.has_link(&LinkType::Begin, start) && annotation.has_link(&LinkType::End, end)
}

/// First annotation anchored to the span `start..=end`.
pub fn find_span_annotation(
    annotations: &[Annotation],
    start: TokenId,
    end: TokenId,
) -> Option<&Annotation> {
    annotations.iter().find(|a| is_anchored_to(a, start, end))
}

/// Role under which `annotation` links to `ref_id`: the type of its first
/// link targeting that id.
pub fn linked_role(annotation: &Annotation, ref_id: i64) -> Option<&LinkType> {
    annotation
        .links
        .iter()
        .find(|l| l.target == ref_id)
        .map(|l| &l.link_type)
}

/// Every annotation linked to `span`, keyed by role. Last match per role wins.
pub fn selection_entities(annotations: &[Annotation], span: &Annotation) -> SelectionEntities {
    let mut entities = SelectionEntities::new();
    for annotation in annotations {
        if let Some(role) = linked_role(annotation, span.id) {
            if let Some(previous) = entities.insert(role.clone(), annotation.clone()) {
                tracing::debug!(
                    target: "chronicle::index",
                    %role,
                    replaced = previous.id,
                    by = annotation.id,
                    "multiple entities for one role, keeping the last"
                );
            }
        }
    }
    entities
}

/// All annotations with exactly this label.
pub fn existing_for_label<'a>(annotations: &'a [Annotation], label: &str) -> Vec<&'a Annotation> {
    annotations.iter().filter(|a| a.label == label).collect()
}
