//! Loaded session contents.

use indexmap::IndexMap;

use compass_core::{diagram::Diagram, feedback::Feedback, identifier::Id};

use crate::error::{Diagnostic, ParseError};

/// A diagram together with the tutor feedback recorded for it.
#[derive(Debug)]
pub struct ParsedDiagram {
    diagram: Diagram,
    feedback: IndexMap<Id, Feedback>,
}

impl ParsedDiagram {
    pub(crate) fn new(diagram: Diagram, feedback: IndexMap<Id, Feedback>) -> Self {
        Self { diagram, feedback }
    }

    pub fn submission_id(&self) -> u64 {
        self.diagram.submission_id()
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Feedback by external element id, in document order.
    pub fn feedback(&self) -> &IndexMap<Id, Feedback> {
        &self.feedback
    }

    /// Returns `true` if a tutor graded this diagram.
    pub fn is_assessed(&self) -> bool {
        !self.feedback.is_empty()
    }

    pub fn into_parts(self) -> (Diagram, IndexMap<Id, Feedback>) {
        (self.diagram, self.feedback)
    }
}

/// A diagram of the document that could not be loaded.
#[derive(Debug)]
pub struct DiagramFailure {
    submission_id: u64,
    error: ParseError,
}

impl DiagramFailure {
    pub(crate) fn new(submission_id: u64, error: ParseError) -> Self {
        Self {
            submission_id,
            error,
        }
    }

    pub fn submission_id(&self) -> u64 {
        self.submission_id
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }
}

/// Everything loaded from one session document.
///
/// Diagrams are converted independently: a broken diagram ends up in
/// [`failures`](Self::failures) while the others still load.
#[derive(Debug, Default)]
pub struct ParsedSession {
    diagrams: Vec<ParsedDiagram>,
    failures: Vec<DiagramFailure>,
    warnings: Vec<Diagnostic>,
}

impl ParsedSession {
    pub(crate) fn push_diagram(&mut self, diagram: ParsedDiagram) {
        self.diagrams.push(diagram);
    }

    pub(crate) fn push_failure(&mut self, failure: DiagramFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = Diagnostic>) {
        self.warnings.extend(warnings);
    }

    pub fn diagrams(&self) -> &[ParsedDiagram] {
        &self.diagrams
    }

    pub fn failures(&self) -> &[DiagramFailure] {
        &self.failures
    }

    /// Non-fatal diagnostics of the loaded diagrams.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<ParsedDiagram>, Vec<DiagramFailure>, Vec<Diagnostic>) {
        (self.diagrams, self.failures, self.warnings)
    }
}
