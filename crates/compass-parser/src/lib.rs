//! # Compass Parser
//!
//! Loader for Compass session documents. A session document is a TOML file
//! listing the student diagrams of one exercise together with the tutor
//! feedback already given on them.
//!
//! ## Usage
//!
//! ```
//! # use compass_parser::{parse_session, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         [[diagrams]]
//!         submission_id = 1
//!         kind = "ClassDiagram"
//!
//!         [[diagrams.elements]]
//!         type = "Class"
//!         id = "c1"
//!         name = "Pizza"
//!         attributes = [{ id = "a1", label = "+ size: int" }]
//!
//!         [[diagrams.feedback]]
//!         element = "a1"
//!         credits = 0.5
//!     "#;
//!
//!     let session = parse_session(source)?;
//!     assert_eq!(session.diagrams().len(), 1);
//!     assert_eq!(session.diagrams()[0].diagram().len(), 2);
//!     Ok(())
//! }
//! ```

mod document;
mod elaborate;
pub mod error;
pub mod member;
mod session;
mod span;

pub use session::{DiagramFailure, ParsedDiagram, ParsedSession};
pub use span::Span;

use log::debug;

use error::{Diagnostic, ErrorCode, ParseError};

/// Parse a session document.
///
/// The pipeline has two steps:
///
/// 1. **Read** - Deserialize the TOML document into its schema
/// 2. **Elaborate** - Build one [`Diagram`](compass_core::diagram::Diagram)
///    per `[[diagrams]]` table and resolve feedback targets
///
/// # Errors
///
/// Returns [`ParseError`] (code `E100`) when the document is not valid TOML
/// or does not match the schema. Problems inside a single diagram do not
/// fail the call; they are reported in [`ParsedSession::failures`].
pub fn parse_session(source: &str) -> Result<ParsedSession, ParseError> {
    debug!(bytes = source.len(); "Reading session document");
    let document = toml::from_str(source).map_err(|err| document_error(&err))?;

    Ok(elaborate::elaborate(document))
}

fn document_error(err: &toml::de::Error) -> ParseError {
    let diagnostic = Diagnostic::new(ErrorCode::E100, err.message().trim_end())
        .with_help("see the session document format in the README");

    match err.span() {
        Some(span) => diagnostic.with_label(Span::from(span), "here").into(),
        None => diagnostic.into(),
    }
}
