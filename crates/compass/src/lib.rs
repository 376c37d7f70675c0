//! Compass - Automatic assessment of UML student models.
//!
//! Elements of all submitted diagrams of an exercise are clustered by
//! structural similarity. Once a tutor grades one element of a cluster, the
//! grade is suggested for every equivalent element in the other submissions,
//! together with a confidence and the share of the diagram it covers.
//!
//! The usual entry point is a [`session::GradingSession`] per exercise. The
//! building blocks it wires together are public as well:
//!
//! - [`model_index::ModelIndex`] clusters elements as they arrive.
//! - [`similarity_detector::SimilarityDetector`] tags a diagram's elements
//!   with cluster ids and contexts.
//! - [`assessment::AssessmentIndex`] remembers tutor scores per cluster.
//! - [`controller::AutomaticAssessmentController`] moves scores between
//!   diagrams and that memory.

pub mod assessment;
pub mod config;
pub mod controller;
pub mod model_index;
pub mod session;
pub mod similarity_detector;

mod error;

pub use compass_core::{
    context, diagram, element, error::DiagramError, feedback, identifier, score, similarity,
};
pub use compass_parser::{DiagramFailure, ParsedDiagram, ParsedSession};

pub use error::CompassError;

use log::{debug, info};

/// Loads a TOML session document.
///
/// Diagrams with structural problems do not fail the whole document; they
/// are reported in [`ParsedSession::failures`].
///
/// # Errors
///
/// Returns [`CompassError::Parse`] when the document is not valid TOML or
/// does not follow the session schema.
///
/// # Examples
///
/// ```
/// let source = r#"
/// [[diagrams]]
/// submission_id = 1
/// kind = "ActivityDiagram"
///
/// [[diagrams.elements]]
/// type = "Activity"
/// id = "a1"
/// name = "checkout"
/// "#;
///
/// let session = compass::parse(source)?;
/// assert_eq!(session.diagrams().len(), 1);
/// # Ok::<(), compass::CompassError>(())
/// ```
pub fn parse(source: &str) -> Result<ParsedSession, CompassError> {
    info!("Parsing session document");

    let session = compass_parser::parse_session(source)
        .map_err(|err| CompassError::new_parse_error(err, source))?;

    debug!(
        diagrams = session.diagrams().len(),
        failures = session.failures().len();
        "Session document parsed"
    );
    Ok(session)
}
