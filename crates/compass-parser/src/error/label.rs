//! Spans of the session document that a diagnostic points at.

use crate::span::Span;

/// What a labeled span contributes to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// The table or value that caused the problem.
    Culprit,
    /// A related location, e.g. the first definition of a duplicated id.
    Context,
}

/// A message attached to a span of the session document.
#[derive(Debug, Clone)]
pub struct Label {
    role: LabelRole,
    span: Span,
    message: String,
}

impl Label {
    pub fn new(role: LabelRole, span: Span, message: impl Into<String>) -> Self {
        Self {
            role,
            span,
            message: message.into(),
        }
    }

    pub fn role(&self) -> LabelRole {
        self.role
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
