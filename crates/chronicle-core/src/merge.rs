//! Folding created, edited and deleted annotations back into the corpus.
//!
//! Both operations are copy-on-write: the input list is never touched.

use crate::types::Annotation;

/// Insert-or-replace by id.
///
/// Existing entries keep their position; unseen ids are appended in the
/// order given. Applying the same annotation twice leaves one entry, with
/// the later values.
pub fn apply_upserts(current: &[Annotation], incoming: &[Annotation]) -> Vec<Annotation> {
    let mut annotations = current.to_vec();
    for anno in incoming {
        match annotations.iter().position(|x| x.id == anno.id) {
            // The links may have changed, replace wholesale.
            Some(idx) => annotations[idx] = anno.clone(),
            None => annotations.push(anno.clone()),
        }
    }
    annotations
}

/// Remove every entry with `id`.
///
/// When nothing matched the result has the input's length and content;
/// callers compare lengths and skip dependent updates in that case.
pub fn apply_removal(current: &[Annotation], id: i64) -> Vec<Annotation> {
    current.iter().filter(|x| x.id != id).cloned().collect()
}
