//! A single problem found while loading a session document.

use std::fmt;

use crate::{
    error::{
        Severity,
        error_code::ErrorCode,
        label::{Label, LabelRole},
    },
    span::Span,
};

/// A coded message pointing into the session document.
///
/// Every diagnostic carries an [`ErrorCode`]; the code decides whether it
/// rejects a diagram or is only reported.
///
/// ```text
/// error[E201]: `r1` refers to unknown element `c9`
///   --> session.toml:24:1
///    |
/// 24 | target = { element = "c9" }
///    |          ^^^^^^^^^^^^^^^^^^ not defined in submission 3
///    |
///    = help: relationships only connect elements of one diagram
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: ErrorCode,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// ```
    /// # use compass_parser::error::{Diagnostic, ErrorCode};
    /// # use compass_parser::Span;
    /// let diag = Diagnostic::new(ErrorCode::E203, "invalid attribute label `+`")
    ///     .with_label(Span::new(0..10), "in this class")
    ///     .with_help("write attributes as `name: type`");
    ///
    /// assert!(diag.severity().rejects_diagram());
    /// ```
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Points at the offending part of the document.
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labeled(LabelRole::Culprit, span, message)
    }

    /// Points at related context, such as an earlier definition.
    pub fn with_context(self, span: Span, message: impl Into<String>) -> Self {
        self.labeled(LabelRole::Context, span, message)
    }

    fn labeled(mut self, role: LabelRole, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(role, span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity(), self.code, self.message)
    }
}

impl std::error::Error for Diagnostic {}
