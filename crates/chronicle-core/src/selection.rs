//! Span normalization: raw text selections to whole-reading spans.
//!
//! The platform layer describes the live selection as a pair of
//! [`SelectionPoint`]s. Normalization snaps whitespace endpoints onto the
//! neighbouring readings, orders the endpoints by document position and
//! extracts the covered text. Highlighting the covered readings is a separate
//! projection step, see [`project_selection`].

use std::collections::HashMap;

use serde::Serialize;

use crate::platform::SelectionPlatform;
use crate::types::{ReadingToken, TokenId};

/// Separator rendered between adjacent readings.
pub const READING_SEPARATOR: &str = " ";

/// Where one end of a raw selection landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionPoint {
    /// Inside the text of a reading element.
    Reading(TokenId),
    /// On a bare whitespace node between elements. `prev` and `next` are the
    /// neighbouring siblings, present only if they are readings.
    Gap {
        prev: Option<TokenId>,
        next: Option<TokenId>,
    },
    /// Anywhere that is not reading content.
    Outside,
}

/// A raw selection as reported by the platform, anchor first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSelection {
    pub anchor: SelectionPoint,
    pub focus: SelectionPoint,
    /// The platform's selected text is empty (collapsed caret, stray click).
    pub text_empty: bool,
}

impl RawSelection {
    pub fn new(anchor: SelectionPoint, focus: SelectionPoint) -> Self {
        Self {
            anchor,
            focus,
            text_empty: false,
        }
    }

    /// A raw selection between two readings.
    pub fn between(anchor: TokenId, focus: TokenId) -> Self {
        Self::new(SelectionPoint::Reading(anchor), SelectionPoint::Reading(focus))
    }

    pub fn empty() -> Self {
        Self {
            anchor: SelectionPoint::Outside,
            focus: SelectionPoint::Outside,
            text_empty: true,
        }
    }
}

/// A normalized selection: `start` never comes after `end`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub text: String,
    #[serde(serialize_with = "serialize_token_ref")]
    pub start: TokenId,
    #[serde(serialize_with = "serialize_token_ref")]
    pub end: TokenId,
}

fn serialize_token_ref<S: serde::Serializer>(id: &TokenId, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(id)
}

/// Lifecycle of the active selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SelectionPhase {
    #[default]
    NoSelection,
    /// A raw selection arrived and has not been resolved yet.
    Pending,
    /// Resolved to a span, annotation lookup not done yet.
    Resolved,
    /// Resolved, and a span annotation anchors exactly this span.
    Annotated,
    /// Resolved, and nothing anchors this span.
    Unannotated,
}

/// The readings of the currently loaded section, in document order.
#[derive(Clone, Debug, Default)]
pub struct Readings {
    tokens: Vec<ReadingToken>,
    positions: HashMap<TokenId, usize>,
}

impl Readings {
    pub fn new(tokens: Vec<ReadingToken>) -> Self {
        let positions = tokens
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id, idx))
            .collect();
        Self { tokens, positions }
    }

    /// Document position of a reading, if it is rendered.
    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: TokenId) -> Option<&ReadingToken> {
        self.position(id).map(|idx| &self.tokens[idx])
    }

    /// Readings from `start` to `end` inclusive, empty if either is unknown
    /// or they are out of order.
    pub fn span(&self, start: TokenId, end: TokenId) -> &[ReadingToken] {
        match (self.position(start), self.position(end)) {
            (Some(s), Some(e)) if s <= e => &self.tokens[s..=e],
            _ => &[],
        }
    }

    /// Display text of a span, readings joined by their separators.
    pub fn span_text(&self, start: TokenId, end: TokenId) -> String {
        self.span(start, end)
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(READING_SEPARATOR)
    }

    pub fn tokens(&self) -> &[ReadingToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Order key for a raw point. Readings sit on odd slots, the gaps around
    /// them on the even slots either side.
    fn point_key(&self, point: &SelectionPoint) -> Option<usize> {
        match point {
            SelectionPoint::Reading(id) => self.position(*id).map(|p| p * 2 + 1),
            SelectionPoint::Gap { prev: Some(id), .. } => self.position(*id).map(|p| p * 2 + 2),
            SelectionPoint::Gap {
                prev: None,
                next: Some(id),
            } => self.position(*id).map(|p| p * 2),
            SelectionPoint::Gap {
                prev: None,
                next: None,
            }
            | SelectionPoint::Outside => None,
        }
    }
}

/// Snap the start side of a selection onto a reading.
fn resolve_start(point: &SelectionPoint) -> Option<TokenId> {
    match point {
        SelectionPoint::Reading(id) => Some(*id),
        SelectionPoint::Gap { next, .. } => *next,
        SelectionPoint::Outside => None,
    }
}

/// Snap the end side of a selection onto a reading.
fn resolve_end(point: &SelectionPoint) -> Option<TokenId> {
    match point {
        SelectionPoint::Reading(id) => Some(*id),
        SelectionPoint::Gap { prev, .. } => *prev,
        SelectionPoint::Outside => None,
    }
}

/// Normalize a raw selection into a span over whole readings.
///
/// Returns `None` when either endpoint does not resolve to a rendered
/// reading. Backward selections normalize identically to forward ones.
/// The empty-text check is the caller's business, see
/// [`EditorState::select`](crate::state::EditorState::select).
pub fn normalize_selection(raw: &RawSelection, readings: &Readings) -> Option<Selection> {
    let anchor_key = readings.point_key(&raw.anchor)?;
    let focus_key = readings.point_key(&raw.focus)?;

    let (first, last) = if anchor_key <= focus_key {
        (&raw.anchor, &raw.focus)
    } else {
        (&raw.focus, &raw.anchor)
    };

    let a = resolve_start(first).filter(|id| readings.contains(*id))?;
    let b = resolve_end(last).filter(|id| readings.contains(*id))?;

    let (start, end) = if readings.position(a)? <= readings.position(b)? {
        (a, b)
    } else {
        (b, a)
    };

    tracing::trace!(
        target: "chronicle::selection",
        anchor = ?raw.anchor,
        focus = ?raw.focus,
        %start,
        %end,
        "normalized selection"
    );

    Some(Selection {
        text: readings.span_text(start, end),
        start,
        end,
    })
}

/// Project a normalized selection onto the platform.
///
/// Extends the native selection to whole readings, replaces the `selected`
/// markers with the covered span and finally collapses the native selection.
pub fn project_selection<P: SelectionPlatform + ?Sized>(
    platform: &mut P,
    readings: &Readings,
    selection: &Selection,
) {
    if let Err(e) = platform.extend_native(selection.start, selection.end) {
        tracing::debug!(
            target: "chronicle::selection",
            error = %e,
            "could not extend native selection"
        );
    }

    platform.clear_marks();
    for token in readings.span(selection.start, selection.end) {
        platform.mark(token.id);
    }
    platform.collapse_native();
}

/// Remove every `selected` marker.
pub fn clear_projection<P: SelectionPlatform + ?Sized>(platform: &mut P) {
    platform.clear_marks();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MarkSet;

    fn fixture() -> Readings {
        Readings::new(vec![
            ReadingToken::new(0, "the"),
            ReadingToken::new(1, "king"),
            ReadingToken::new(2, "of"),
            ReadingToken::new(3, "Egypt"),
        ])
    }

    fn r(n: u64) -> TokenId {
        TokenId(n)
    }

    #[test]
    fn test_forward_and_backward_agree() {
        let readings = fixture();
        for (a, b) in [(0, 1), (0, 3), (1, 3), (2, 3)] {
            let fwd = normalize_selection(&RawSelection::between(r(a), r(b)), &readings).unwrap();
            let bwd = normalize_selection(&RawSelection::between(r(b), r(a)), &readings).unwrap();
            assert_eq!(fwd, bwd);
            assert_eq!(fwd.start, r(a));
            assert_eq!(fwd.end, r(b));
        }
    }

    #[test]
    fn test_single_reading() {
        let sel = normalize_selection(&RawSelection::between(r(2), r(2)), &fixture()).unwrap();
        assert_eq!(sel.start, r(2));
        assert_eq!(sel.end, r(2));
        assert_eq!(sel.text, "of");
    }

    #[test]
    fn test_text_covers_whole_readings() {
        let sel = normalize_selection(&RawSelection::between(r(3), r(1)), &fixture()).unwrap();
        assert_eq!(sel.text, "king of Egypt");
    }

    #[test]
    fn test_whitespace_start_snaps_forward() {
        // Drag starts on the space between "the" and "king".
        let raw = RawSelection::new(
            SelectionPoint::Gap {
                prev: Some(r(0)),
                next: Some(r(1)),
            },
            SelectionPoint::Reading(r(2)),
        );
        let sel = normalize_selection(&raw, &fixture()).unwrap();
        assert_eq!((sel.start, sel.end), (r(1), r(2)));
    }

    #[test]
    fn test_whitespace_end_snaps_backward() {
        // Backward drag: anchor on the space after "of", focus inside "king".
        let raw = RawSelection::new(
            SelectionPoint::Gap {
                prev: Some(r(2)),
                next: Some(r(3)),
            },
            SelectionPoint::Reading(r(1)),
        );
        let sel = normalize_selection(&raw, &fixture()).unwrap();
        assert_eq!((sel.start, sel.end), (r(1), r(2)));
    }

    #[test]
    fn test_gap_without_reading_neighbour_fails() {
        let raw = RawSelection::new(
            SelectionPoint::Gap {
                prev: Some(r(3)),
                next: None,
            },
            SelectionPoint::Reading(r(3)),
        );
        // The later point is the reading, the gap after r3 is the end side
        // and snaps back onto r3.
        let sel = normalize_selection(&raw, &fixture()).unwrap();
        assert_eq!((sel.start, sel.end), (r(3), r(3)));

        let raw = RawSelection::new(
            SelectionPoint::Reading(r(1)),
            SelectionPoint::Gap {
                prev: None,
                next: Some(r(0)),
            },
        );
        // The gap before r0 is the start side, snapping forward onto r0.
        let sel = normalize_selection(&raw, &fixture()).unwrap();
        assert_eq!((sel.start, sel.end), (r(0), r(1)));

        let raw = RawSelection::new(
            SelectionPoint::Gap {
                prev: None,
                next: None,
            },
            SelectionPoint::Reading(r(1)),
        );
        assert!(normalize_selection(&raw, &fixture()).is_none());
    }

    #[test]
    fn test_outside_yields_none() {
        let readings = fixture();
        let raw = RawSelection::new(SelectionPoint::Outside, SelectionPoint::Reading(r(1)));
        assert!(normalize_selection(&raw, &readings).is_none());
        let raw = RawSelection::new(SelectionPoint::Outside, SelectionPoint::Outside);
        assert!(normalize_selection(&raw, &readings).is_none());
    }

    #[test]
    fn test_unrendered_reading_yields_none() {
        let raw = RawSelection::between(r(1), r(40));
        assert!(normalize_selection(&raw, &fixture()).is_none());
    }

    #[test]
    fn test_projection_marks_span_inclusive() {
        let readings = fixture();
        let mut marks = MarkSet::default();
        marks.mark(r(0));

        let sel = normalize_selection(&RawSelection::between(r(3), r(1)), &readings).unwrap();
        project_selection(&mut marks, &readings, &sel);

        assert_eq!(marks.marked(), vec![r(1), r(2), r(3)]);
        assert_eq!(marks.native_extent(), None);
        assert_eq!(marks.extend_calls(), 1);
    }

    #[test]
    fn test_clear_projection() {
        let readings = fixture();
        let mut marks = MarkSet::default();
        let sel = normalize_selection(&RawSelection::between(r(0), r(1)), &readings).unwrap();
        project_selection(&mut marks, &readings, &sel);
        clear_projection(&mut marks);
        assert!(marks.marked().is_empty());
    }

    #[test]
    fn test_readings_span_out_of_order_is_empty() {
        let readings = fixture();
        assert!(readings.span(r(3), r(1)).is_empty());
        assert_eq!(readings.span(r(1), r(1)).len(), 1);
    }

    #[test]
    fn test_selection_serializes_reading_ids() {
        let sel = normalize_selection(&RawSelection::between(r(1), r(3)), &fixture()).unwrap();
        let json = serde_json::to_value(&sel).unwrap();
        assert_eq!(json["start"], "r1");
        assert_eq!(json["end"], "r3");
    }
}
