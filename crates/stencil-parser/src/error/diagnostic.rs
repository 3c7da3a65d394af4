//! The core diagnostic type for the Stencil error system.
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! error code, the location of the element it concerns, and help text.

use std::fmt;

use serde::Serialize;

use crate::error::{ErrorCode, Severity};

/// A diagnostic message tied to a place in the structure file.
///
/// Locations use JSON path notation rooted at the document, such as
/// `layers[0].elements[2].children[1]`, or an element id for findings
/// produced after parsing.
///
/// # Example
///
/// ```text
/// warning[E102]: unknown element type `MeshItem`
///   at layers[0].elements[4]
///   = help: the element is kept with kind `other`
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
    /// Byte offset into the source text, for document-level failures.
    #[serde(skip)]
    offset: Option<usize>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use stencil_parser::error::{Diagnostic, ErrorCode};
    /// let diag = Diagnostic::error("duplicate id `text_1a2b`")
    ///     .with_code(ErrorCode::I001)
    ///     .with_location("text_1a2b");
    /// assert_eq!(diag.to_string(), "error[I001]: duplicate id `text_1a2b`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the location, if any.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Get the byte offset into the source text, if known.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the byte offset into the source text.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location: None,
            help: None,
            offset: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
