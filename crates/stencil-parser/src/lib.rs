//! # Stencil Parser
//!
//! Parser for structure files produced by a design-document extractor. This
//! crate turns the extractor's JSON into a [`Document`] with canonical
//! geometry, structural paths, stable ids and parent links.
//!
//! ## Usage
//!
//! ```
//! # use stencil_parser::{parse, ParseConfig, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"{
//!         "document": { "name": "invite", "width": 800, "height": 600 },
//!         "layers": [{
//!             "name": "Layer 1",
//!             "elements": [{
//!                 "type": "text",
//!                 "content": "Hello",
//!                 "bounds": { "left": 10, "top": 10, "width": 100, "height": 20 }
//!             }]
//!         }]
//!     }"#;
//!
//!     let parsed = parse(source, ParseConfig::default())?;
//!     assert_eq!(parsed.document.element_count(), 1);
//!     assert!(parsed.diagnostics.is_empty());
//!     Ok(())
//! }
//! ```

mod element;
pub mod error;
mod header;
mod tree;

use log::{debug, info, trace, warn};
use serde_json::Value;

use stencil_core::{
    element::Document,
    identity::{IdMode, IdReassign, IdentityGenerator},
};

pub use error::{Diagnostic, ErrorCode, ParseError, Severity};

use error::DiagnosticCollector;

/// Options controlling id assignment during parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseConfig {
    /// Strategy for generated ids.
    pub id_mode: IdMode,
    /// Whether extractor-supplied ids are kept.
    pub reassign: IdReassign,
}

impl ParseConfig {
    pub fn new(id_mode: IdMode, reassign: IdReassign) -> Self {
        Self { id_mode, reassign }
    }
}

/// A parsed document together with every non-fatal finding.
#[derive(Debug)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_error())
            .count()
    }

    /// Number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_warning())
            .count()
    }
}

/// Parse a structure file into a [`Document`].
///
/// The pipeline runs in three steps:
///
/// 1. **Decode** - Read the JSON and the document header
/// 2. **Collect** - Read layer trees and link the flat element list
/// 3. **Finalize** - Assign structural paths, ids and parent ids
///
/// Only an undecodable file ([`ErrorCode::E001`]) or an unusable root
/// ([`ErrorCode::E002`]) fail the parse. Malformed elements are skipped or
/// repaired and reported in [`Parsed::diagnostics`].
pub fn parse(source: &str, config: ParseConfig) -> Result<Parsed, ParseError> {
    info!("Parsing structure file");

    // Step 1: Decode
    let root: Value = serde_json::from_str(source).map_err(|err| {
        let diagnostic = Diagnostic::error(format!("structure file is not valid JSON: {err}"))
            .with_code(ErrorCode::E001)
            .with_help("the extractor output must be a single JSON object");
        match byte_offset(source, err.line(), err.column()) {
            Some(offset) => diagnostic.with_offset(offset),
            None => diagnostic,
        }
    })?;
    let root = root.as_object().ok_or_else(|| {
        Diagnostic::error("document root must be an object")
            .with_code(ErrorCode::E002)
            .with_location("$")
    })?;
    if !root.contains_key("layers") && !root.contains_key("elements") {
        return Err(Diagnostic::error("document has neither `layers` nor `elements`")
            .with_code(ErrorCode::E002)
            .with_location("$")
            .with_help("add a `layers` array of layer objects or a flat `elements` array")
            .into());
    }

    let mut collector = DiagnosticCollector::new();
    let header = header::read_header(root);
    trace!(header:?; "Document header");

    // Step 2: Collect
    let layers = tree::collect_layers(root, &header, &mut collector);

    let artboard_size = match header.artboard_size() {
        Some(size) => size,
        None => {
            let size = tree::extent(&layers);
            collector.emit(
                Diagnostic::warning("document declares no artboard size")
                    .with_code(ErrorCode::E003)
                    .with_location("document")
                    .with_help(format!(
                        "using the element extent {}x{}",
                        size.width(),
                        size.height()
                    )),
            );
            size
        }
    };

    // Step 3: Finalize
    let mut generator = IdentityGenerator::new(config.id_mode);
    let layers = tree::finalize(layers, config.reassign, &mut generator);
    let document = Document::new(header.name(), artboard_size, layers);

    if collector.has_errors() {
        warn!("Malformed elements were skipped; see diagnostics");
    }

    let diagnostics = collector.finish();
    debug!(
        elements = document.element_count(),
        diagnostics = diagnostics.len();
        "Structure parsed"
    );

    Ok(Parsed {
        document,
        diagnostics,
    })
}

/// Converts a 1-based line and column into a byte offset within `source`.
fn byte_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(source.len()))
}
