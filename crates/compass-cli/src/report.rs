//! The TOML assessment report written by the CLI.

use std::io;

use serde::Serialize;
use thiserror::Error;

use compass::{CompassError, score::CompassResult, session::SessionStatistics};

/// Report-related errors for CLI
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<ReportError> for CompassError {
    fn from(err: ReportError) -> Self {
        CompassError::Io(io::Error::other(err.to_string()))
    }
}

/// Step of the run in which a submission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Cluster,
    Feedback,
    Assess,
}

#[derive(Debug, Serialize)]
struct DiagramReport {
    submission_id: u64,
    manually_assessed: bool,
    entities_covered: usize,
    total_elements: usize,
    points: f64,
    confidence: f64,
    coverage: f64,
}

#[derive(Debug, Serialize)]
struct FailureReport {
    submission_id: u64,
    stage: Stage,
    message: String,
}

/// Suggested assessments of one run.
///
/// Plain values come first so that the TOML output keeps them above the
/// tables.
#[derive(Debug, Serialize)]
pub struct Report {
    exercise_id: u64,
    next_models: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<SessionStatistics>,
    diagrams: Vec<DiagramReport>,
    failures: Vec<FailureReport>,
}

impl Report {
    pub fn new(exercise_id: u64) -> Self {
        Self {
            exercise_id,
            next_models: Vec::new(),
            statistics: None,
            diagrams: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn push_result(
        &mut self,
        submission_id: u64,
        manually_assessed: bool,
        result: &CompassResult,
    ) {
        self.diagrams.push(DiagramReport {
            submission_id,
            manually_assessed,
            entities_covered: result.entities_covered(),
            total_elements: result.total_elements(),
            points: result.points(),
            confidence: result.confidence(),
            coverage: result.coverage(),
        });
    }

    pub fn push_failure(&mut self, submission_id: u64, stage: Stage, message: impl Into<String>) {
        self.failures.push(FailureReport {
            submission_id,
            stage,
            message: message.into(),
        });
    }

    pub fn set_next_models(&mut self, next_models: Vec<u64>) {
        self.next_models = next_models;
    }

    pub fn set_statistics(&mut self, statistics: SessionStatistics) {
        self.statistics = Some(statistics);
    }

    pub fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Serializes the report as a TOML document.
    pub fn to_toml(&self) -> Result<String, ReportError> {
        Ok(toml::to_string(self)?)
    }
}
