//! Rendering of Compass errors and loader diagnostics through miette.
//!
//! A [`CompassError::Parse`] may carry several diagnostics; each becomes its
//! own [`Reportable`] so that every snippet is drawn separately. Diagnostics
//! that did not fail the run (rejected submissions, warnings) go through the
//! same path via [`diagnostic_reportables`].

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, Severity as MietteSeverity,
    SourceCode, SourceSpan,
};

use compass::CompassError;
use compass_parser::{
    Span,
    error::{Diagnostic, LabelRole, Severity},
};

/// One error report ready for miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A loader diagnostic together with the document it points into.
    Diagnostic {
        diagnostic: &'a Diagnostic,
        source: &'a str,
    },
    /// An error without a source location.
    Error(&'a CompassError),
}

fn error_code(err: &CompassError) -> Option<&'static str> {
    let code = match err {
        CompassError::Io(_) => "compass::io",
        CompassError::Parse { .. } => return None,
        CompassError::InvalidThreshold(_) | CompassError::InvalidConfidence(_) => "compass::config",
        CompassError::UnknownSubmission(_) | CompassError::DuplicateSubmission(_) => {
            "compass::submission"
        }
        CompassError::UntaggedElement { .. } => "compass::analysis",
        CompassError::Diagram(_) => "compass::diagram",
        CompassError::SessionPoisoned => "compass::session",
    };
    Some(code)
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic { diagnostic, .. } => f.write_str(diagnostic.message()),
            Reportable::Error(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic { .. } => None,
            Reportable::Error(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic { diagnostic, .. } => Some(Box::new(diagnostic.code())),
            Reportable::Error(err) => {
                error_code(err).map(|code| Box::new(code) as Box<dyn fmt::Display + 'a>)
            }
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        let severity = match self {
            Reportable::Diagnostic { diagnostic, .. } => match diagnostic.severity() {
                Severity::Error => MietteSeverity::Error,
                Severity::Warning => MietteSeverity::Warning,
            },
            Reportable::Error(_) => MietteSeverity::Error,
        };
        Some(severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic { diagnostic, .. } => diagnostic
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>),
            Reportable::Error(
                CompassError::InvalidThreshold(_) | CompassError::InvalidConfidence(_),
            ) => Some(Box::new(
                "check the [compass] section of the configuration file",
            )),
            Reportable::Error(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Reportable::Diagnostic { source, .. } => Some(source as &dyn SourceCode),
            Reportable::Error(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Reportable::Diagnostic { diagnostic, .. } = self else {
            return None;
        };
        if diagnostic.labels().is_empty() {
            return None;
        }

        Some(Box::new(diagnostic.labels().iter().map(|label| {
            let message = Some(label.message().to_string());
            let span = source_span(label.span());
            match label.role() {
                LabelRole::Culprit => LabeledSpan::new_primary_with_span(message, span),
                LabelRole::Context => LabeledSpan::new_with_span(message, span),
            }
        })))
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits an error into one report per diagnostic.
///
/// Only [`CompassError::Parse`] can yield more than one report.
pub fn to_reportables(err: &CompassError) -> Vec<Reportable<'_>> {
    match err {
        CompassError::Parse { err, src } => diagnostic_reportables(err.diagnostics(), src),
        _ => vec![Reportable::Error(err)],
    }
}

/// Pairs loose diagnostics of a session document with its source.
pub fn diagnostic_reportables<'a>(
    diagnostics: &'a [Diagnostic],
    source: &'a str,
) -> Vec<Reportable<'a>> {
    diagnostics
        .iter()
        .map(|diagnostic| Reportable::Diagnostic { diagnostic, source })
        .collect()
}

/// Draws a report with miette's graphical handler.
///
/// Falls back to the plain message if the snippet cannot be drawn.
pub fn render(reportable: &Reportable<'_>) -> String {
    let mut out = String::new();
    match GraphicalReportHandler::new().render_report(&mut out, reportable) {
        Ok(()) => out,
        Err(_) => reportable.to_string(),
    }
}
