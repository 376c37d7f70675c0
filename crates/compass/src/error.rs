//! Error types for Compass operations.
//!
//! This module provides the main error type [`CompassError`] which wraps
//! the error conditions of loading, clustering and scoring.

use std::io;

use thiserror::Error;

use compass_core::{error::DiagramError, identifier::Id};
use compass_parser::error::ParseError;

/// The main error type for Compass operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the loader's diagnostics together with the
/// document source, so callers can render labeled snippets.
#[derive(Debug, Error)]
pub enum CompassError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Equality threshold must lie strictly between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("Automatic feedback confidence must lie between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("Unknown submission {0}")]
    UnknownSubmission(u64),

    #[error("Submission {0} was already added to the session")]
    DuplicateSubmission(u64),

    #[error("Element `{element}` of submission {submission_id} was never analyzed")]
    UntaggedElement { submission_id: u64, element: Id },

    #[error("Invalid diagram: {0}")]
    Diagram(#[from] DiagramError),

    #[error("Grading session state is poisoned")]
    SessionPoisoned,
}

impl CompassError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
