//! Error types for the template editor core.
//!
//! None of these are fatal. Callers log them or hand them to the host; the
//! document always stays editable.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main error type for editor operations.
#[derive(Debug, Error, Diagnostic)]
pub enum EditorError {
    /// No active selection at capture time, or stale node references at restore time.
    #[error("selection unavailable: {0}")]
    #[diagnostic(code(stencil::selection_unavailable))]
    SelectionUnavailable(String),

    /// Drop payload was not a serialized variable descriptor.
    #[error("drag payload is not a variable descriptor")]
    #[diagnostic(code(stencil::malformed_drag_payload))]
    MalformedDragPayload(#[source] serde_json::Error),

    /// Pointer coordinates did not map to an insertion point.
    #[error("drop position ({x}, {y}) does not resolve to a document position")]
    #[diagnostic(code(stencil::unresolvable_drop_position))]
    UnresolvableDropPosition { x: f64, y: f64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidTemplateText(#[from] InvalidTemplateText),

    #[error("invalid editor configuration")]
    #[diagnostic(code(stencil::config))]
    Config(#[source] serde_json::Error),
}

/// Raw template text rejected by the content validator.
///
/// Carries the offending text so the host can point at the problem; it never
/// attempts a repair.
#[derive(Debug, Error, Diagnostic)]
#[error("template text contains {kind}")]
#[diagnostic(
    code(stencil::invalid_template_text),
    help("remove markup and unsupported characters, then try again")
)]
pub struct InvalidTemplateText {
    pub kind: InvalidContentKind,
    #[source_code]
    pub src: String,
    #[label("here")]
    pub span: SourceSpan,
}

/// What the validator found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidContentKind {
    Markup,
    DisallowedChar(char),
}

impl std::fmt::Display for InvalidContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidContentKind::Markup => write!(f, "markup"),
            InvalidContentKind::DisallowedChar(c) => {
                write!(f, "disallowed character {:?} (U+{:04X})", c, *c as u32)
            }
        }
    }
}
