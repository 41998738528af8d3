//! Load failures and how loudly each one is reported.

use miette::Diagnostic;
use thiserror::Error;

/// Which collaborator fetch failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Sections,
    Annotations,
    Labels,
    SectionText,
}

/// How a load failure reaches the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Blocking notification.
    Alert,
    /// Log only; the user recovers by navigating again.
    Log,
}

impl LoadKind {
    pub fn notice(self) -> Notice {
        match self {
            LoadKind::Sections | LoadKind::Annotations | LoadKind::Labels => Notice::Alert,
            LoadKind::SectionText => Notice::Log,
        }
    }

    /// Prefix of the user-facing message.
    pub fn describe(self) -> &'static str {
        match self {
            LoadKind::Sections => "Error loading sections!",
            LoadKind::Annotations => "Error loading annotations!",
            LoadKind::Labels => "Error loading annotation specs!",
            LoadKind::SectionText => "Error loading section text!",
        }
    }
}

impl std::fmt::Display for LoadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadKind::Sections => "sections",
            LoadKind::Annotations => "annotations",
            LoadKind::Labels => "annotation labels",
            LoadKind::SectionText => "section text",
        };
        f.write_str(name)
    }
}

/// A collaborator fetch that produced no usable data.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum LoadError {
    /// The store answered with an `{"error": ...}` document.
    #[error("store reported an error loading {kind}: {message}")]
    #[diagnostic(code(chronicle::load::remote))]
    Remote { kind: LoadKind, message: String },

    /// The request never produced a response body.
    #[error("request for {kind} failed")]
    #[diagnostic(code(chronicle::load::transport))]
    Transport {
        kind: LoadKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The body was not the expected document.
    #[error("could not decode {kind}")]
    #[diagnostic(code(chronicle::load::decode))]
    Decode {
        kind: LoadKind,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> LoadKind {
        match self {
            LoadError::Remote { kind, .. }
            | LoadError::Transport { kind, .. }
            | LoadError::Decode { kind, .. } => *kind,
        }
    }

    /// Short text for notifications.
    pub fn message(&self) -> String {
        match self {
            LoadError::Remote { message, .. } => message.clone(),
            LoadError::Transport { source, .. } => source.to_string(),
            LoadError::Decode { source, .. } => source.to_string(),
        }
    }

    /// Message shown in a blocking notification.
    pub fn user_message(&self) -> String {
        format!("{} {}", self.kind().describe(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_policy() {
        assert_eq!(LoadKind::Sections.notice(), Notice::Alert);
        assert_eq!(LoadKind::Annotations.notice(), Notice::Alert);
        assert_eq!(LoadKind::Labels.notice(), Notice::Alert);
        assert_eq!(LoadKind::SectionText.notice(), Notice::Log);
    }

    #[test]
    fn test_user_message() {
        let err = LoadError::Remote {
            kind: LoadKind::Annotations,
            message: "boom".into(),
        };
        assert_eq!(err.kind(), LoadKind::Annotations);
        assert_eq!(err.user_message(), "Error loading annotations! boom");
    }
}
