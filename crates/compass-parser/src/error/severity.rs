//! How serious a diagnostic is.

use std::fmt;

/// Whether a diagnostic rejects the diagram it was found in.
///
/// Severities are ordered: `Warning < Error`, so the worst severity of a
/// set of diagnostics is their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Reported while the diagram still loads, e.g. feedback for an element
    /// that does not exist.
    Warning,

    /// The diagram is not added to the session.
    Error,
}

impl Severity {
    /// Returns `true` when the diagram carrying this diagnostic is dropped.
    pub const fn rejects_diagram(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// The lowercase word used in rendered diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
