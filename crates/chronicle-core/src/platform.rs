//! Platform abstraction traits for selection and notification.
//!
//! These traits define the interface between the reconciliation engine and
//! platform-specific implementations (browser DOM, headless tools, tests).
//! The engine decides what is selected; the platform shows it.

use std::collections::BTreeSet;

use crate::types::TokenId;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Platform-specific selection display.
///
/// The browser implementation toggles the `selected` class on reading spans
/// and drives the DOM Selection API.
pub trait SelectionPlatform {
    /// Remove the `selected` marker from every reading.
    fn clear_marks(&mut self);

    /// Add the `selected` marker to one reading.
    fn mark(&mut self, id: TokenId);

    /// Stretch the native selection from the start of `start`'s text to the
    /// end of `end`'s text.
    fn extend_native(&mut self, start: TokenId, end: TokenId) -> Result<(), PlatformError>;

    /// Drop the native selection so no handles remain visible.
    fn collapse_native(&mut self);
}

/// Blocking, user-facing failure notification.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Notifier that only logs. Used by headless tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::error!(target: "chronicle::notify", "{message}");
    }
}

/// In-memory selection platform.
///
/// Records markers and the native extent without any UI.
#[derive(Debug, Default, Clone)]
pub struct MarkSet {
    marked: BTreeSet<TokenId>,
    native: Option<(TokenId, TokenId)>,
    extend_calls: usize,
}

impl MarkSet {
    /// Marked readings in position order.
    pub fn marked(&self) -> Vec<TokenId> {
        self.marked.iter().copied().collect()
    }

    pub fn is_marked(&self, id: TokenId) -> bool {
        self.marked.contains(&id)
    }

    /// Current native extent, `None` once collapsed.
    pub fn native_extent(&self) -> Option<(TokenId, TokenId)> {
        self.native
    }

    pub fn extend_calls(&self) -> usize {
        self.extend_calls
    }
}

impl SelectionPlatform for MarkSet {
    fn clear_marks(&mut self) {
        self.marked.clear();
    }

    fn mark(&mut self, id: TokenId) {
        self.marked.insert(id);
    }

    fn extend_native(&mut self, start: TokenId, end: TokenId) -> Result<(), PlatformError> {
        self.extend_calls += 1;
        self.native = Some((start, end));
        Ok(())
    }

    fn collapse_native(&mut self) {
        self.native = None;
    }
}
