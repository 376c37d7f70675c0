//! Error codes for the session document diagnostics.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Document errors (TOML syntax and schema)
//! - `E2xx` - Diagram structure errors
//! - `E3xx` - Feedback problems

use std::fmt;

use crate::error::Severity;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Errors (E1xx)
    // =========================================================================
    /// Invalid session document.
    ///
    /// The document is not valid TOML, or a table is missing a required key
    /// or carries a value of the wrong type.
    E100,

    // =========================================================================
    // Diagram Errors (E2xx)
    // =========================================================================
    /// Duplicate element id.
    ///
    /// Element ids must be unique within one diagram.
    E200,

    /// Unknown relationship endpoint.
    ///
    /// A relationship or control flow refers to an element that does not
    /// exist, or to an element that cannot be connected.
    E201,

    /// Unknown or invalid owner.
    ///
    /// The `owner` of an element does not exist or cannot contain it.
    E202,

    /// Invalid member label.
    ///
    /// An attribute or method label does not follow the
    /// `[visibility] name[(parameters)][: type]` form.
    E203,

    /// Element kind not allowed.
    ///
    /// The element cannot appear in a diagram of this kind, e.g. a class in
    /// an activity diagram.
    E204,

    /// Duplicate submission.
    ///
    /// Two diagrams in the document share a submission id.
    E205,

    // =========================================================================
    // Feedback (E3xx)
    // =========================================================================
    /// Feedback for an unknown element.
    ///
    /// The feedback is ignored.
    E300,

    /// Repeated feedback.
    ///
    /// An element received feedback more than once; the last entry wins.
    E301,

    /// Non-finite credits.
    ///
    /// Feedback credits of `nan` or `inf` cannot be scored, so the diagram
    /// is rejected.
    E302,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Unknown and repeated feedback only warn; every other code rejects what
    /// it points at.
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::E300 | ErrorCode::E301 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "invalid session document",
            ErrorCode::E200 => "duplicate element id",
            ErrorCode::E201 => "unknown relationship endpoint",
            ErrorCode::E202 => "invalid owner",
            ErrorCode::E203 => "invalid member label",
            ErrorCode::E204 => "element kind not allowed",
            ErrorCode::E205 => "duplicate submission",
            ErrorCode::E300 => "feedback for unknown element",
            ErrorCode::E301 => "repeated feedback",
            ErrorCode::E302 => "non-finite credits",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
