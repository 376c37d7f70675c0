//! CLI logic for the Compass assessment tool.
//!
//! This module loads a session document, replays the recorded tutor
//! feedback through a grading session and writes the suggested assessments
//! as a TOML report.

pub mod error_adapter;

mod args;
mod config;
mod report;

pub use args::Args;

use std::fs;

use log::{error, info, warn};

use compass::{CompassError, ParsedSession, session::GradingSession};
use compass_parser::error::Diagnostic;

use error_adapter::{diagnostic_reportables, render};
use report::{Report, Stage};

/// Run the Compass CLI application
///
/// This function loads the session document, clusters every submission,
/// absorbs the feedback recorded for graded submissions and writes the
/// resulting suggestions to the output file.
///
/// Submissions that cannot be loaded or scored are listed in the report;
/// they do not fail the run.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CompassError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Documents that are not valid TOML or break the session schema
pub fn run(args: &Args) -> Result<(), CompassError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing session"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let parsed = compass::parse(&source)?;
    report_diagnostics(&parsed, &source);

    let session = GradingSession::new(args.exercise_id, &app_config)?;
    let mut report = Report::new(args.exercise_id);

    let (diagrams, load_failures, _) = parsed.into_parts();
    for failure in &load_failures {
        report.push_failure(
            failure.submission_id(),
            Stage::Load,
            failure.error().to_string(),
        );
    }

    let mut graded = Vec::new();
    let mut models = Vec::with_capacity(diagrams.len());
    for parsed in diagrams {
        let submission_id = parsed.submission_id();
        let (diagram, feedback) = parsed.into_parts();
        if !feedback.is_empty() {
            graded.push((submission_id, feedback));
        }
        models.push(diagram);
    }

    for failure in session.add_models(models)? {
        report.push_failure(
            failure.submission_id(),
            Stage::Cluster,
            failure.error().to_string(),
        );
    }

    for (submission_id, feedback) in &graded {
        match session.add_feedback(*submission_id, feedback) {
            Ok(_) => {}
            Err(CompassError::SessionPoisoned) => return Err(CompassError::SessionPoisoned),
            Err(err) => {
                warn!(submission_id = *submission_id, error:% = err; "Feedback rejected");
                report.push_failure(*submission_id, Stage::Feedback, err.to_string());
            }
        }
    }

    let (results, assess_failures) = session.assess_all()?.into_parts();
    for (submission_id, result) in &results {
        report.push_result(*submission_id, session.is_assessed(*submission_id)?, result);
    }
    for failure in &assess_failures {
        report.push_failure(
            failure.submission_id(),
            Stage::Assess,
            failure.error().to_string(),
        );
    }

    report.set_next_models(session.next_batch_to_assess()?);
    report.set_statistics(session.statistics()?);
    session.close()?;

    fs::write(&args.output, report.to_toml()?)?;

    info!(
        output_file = args.output,
        diagrams = report.diagram_count(),
        failures = report.failure_count();
        "Report exported successfully"
    );

    Ok(())
}

/// Logs rejected diagrams and warnings of the loaded document.
fn report_diagnostics(parsed: &ParsedSession, source: &str) {
    for failure in parsed.failures() {
        log_diagnostics(failure.error().diagnostics(), source);
    }
    log_diagnostics(parsed.warnings(), source);
}

fn log_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    for (diagnostic, reportable) in diagnostics
        .iter()
        .zip(diagnostic_reportables(diagnostics, source))
    {
        if diagnostic.severity().rejects_diagram() {
            error!("{}", render(&reportable));
        } else {
            warn!("{}", render(&reportable));
        }
    }
}
