//! Error types for Stencil operations.
//!
//! This module provides the main error type [`StencilError`] which wraps
//! the failures that can stop a detection or planning run. Problems inside a
//! document are never errors; they are reported as diagnostics.

use std::io;

use thiserror::Error;

use stencil_parser::ParseError;

/// The main error type for Stencil operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// diagnostics so callers can render them with context.
#[derive(Debug, Error)]
pub enum StencilError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StencilError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
