//! Error and diagnostic system for the session document loader.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors per diagram
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single coded error or warning message with labeled source locations
//! and optional help text. Multiple diagnostics are wrapped in [`ParseError`]
//! when a document or a single diagram in it cannot be loaded.
//!
//! # Example
//!
//! ```
//! # use compass_parser::error::{Diagnostic, ErrorCode};
//! # use compass_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::new(ErrorCode::E200, "element `c1` is defined multiple times")
//!     .with_label(span, "duplicate definition")
//!     .with_context(original_span, "first defined here")
//!     .with_help("element ids must be unique within a diagram");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelRole};
pub use parse_error::ParseError;
pub use severity::Severity;
