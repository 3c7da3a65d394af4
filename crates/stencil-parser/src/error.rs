//! Error and diagnostic system for the Stencil parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Element locations for each finding
//! - Severity levels
//! - Diagnostic collector for accumulating findings without aborting
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with an optional error code, the location of the
//! offending element, and help text. Only document-level failures abort
//! parsing; those are wrapped in [`ParseError`]. Element-level findings are
//! returned alongside the parsed document.
//!
//! # Example
//!
//! ```
//! # use stencil_parser::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("element has no `type`")
//!     .with_code(ErrorCode::E101)
//!     .with_location("layers[0].elements[3]")
//!     .with_help("every element needs a kind such as `text` or `group`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
pub use severity::Severity;
