//! Collector for accumulating diagnostics while a diagram is elaborated.
//!
//! The [`DiagnosticCollector`] lets the loader report every problem of a
//! diagram instead of stopping at the first one.

use crate::error::{Diagnostic, ParseError, Severity};

/// A collector for accumulating diagnostics of one diagram.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    worst: Option<Severity>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.worst = self.worst.max(Some(diagnostic.severity()));
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.worst.is_some_and(Severity::rejects_diagram)
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise returns the warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_returns_warnings() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::new(ErrorCode::E300, "warning 1"));
        collector.emit(Diagnostic::new(ErrorCode::E301, "warning 2"));

        assert!(!collector.has_errors());
        assert_eq!(collector.finish().unwrap().len(), 2);
    }

    #[test]
    fn test_collector_finish_with_errors() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(
            Diagnostic::new(ErrorCode::E200, "test error")
                .with_label(Span::new(10..20), "here"),
        );
        collector.emit(Diagnostic::new(ErrorCode::E300, "test warning"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[0].message(), "test error");
    }
}
