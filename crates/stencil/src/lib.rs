//! Stencil - semantic variable detection for design-document templates.
//!
//! Stencil reads the element tree of a design document, decides which
//! elements hold replaceable content, names them, and plans how rows of data
//! map onto them for batch generation.

pub mod batch;
pub mod config;
pub mod detect;
pub mod hints;
pub mod integrity;
pub mod naming;
pub mod pattern;
pub mod report;

mod candidate;
mod detection;
mod error;

pub use stencil_core::{element, geometry, semantic, variable};
pub use stencil_parser::{Diagnostic, ErrorCode, Parsed, Severity};

pub use detection::Detection;
pub use error::StencilError;

use log::{debug, info};

use stencil_core::{element::Document, variable::VariableRecord};
use stencil_parser::ParseConfig;

use batch::{BatchPlan, BatchPlanner, Mapping, Row};
use config::AppConfig;
use hints::{Hints, HintsFile};

/// Builder for detecting variables and planning batches.
///
/// # Examples
///
/// ```rust
/// use stencil::{TemplateBuilder, config::AppConfig, hints::Hints};
///
/// let source = r#"{
///     "document": { "name": "card", "width": 400, "height": 300 },
///     "elements": [
///         { "id": "t1", "type": "text", "content": "13812345678",
///           "bounds": { "left": 20, "top": 20, "width": 160, "height": 24 } }
///     ]
/// }"#;
///
/// let builder = TemplateBuilder::new(AppConfig::default());
/// let parsed = builder.parse(source).expect("Failed to parse");
/// let detection = builder.detect(parsed, &Hints::new());
///
/// assert_eq!(detection.variables().variables[0].variable_key, "phone_0");
/// ```
#[derive(Default)]
pub struct TemplateBuilder {
    config: AppConfig,
}

impl TemplateBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a structure file into a document.
    ///
    /// Element-level problems are returned as diagnostics alongside the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Parse` when the source is not JSON or has no
    /// document root.
    pub fn parse(&self, source: &str) -> Result<Parsed, StencilError> {
        info!("Parsing structure");

        let parse_config = ParseConfig::new(
            self.config.identity().mode(),
            self.config.identity().reassign(),
        );
        let parsed = stencil_parser::parse(source, parse_config)
            .map_err(|err| StencilError::new_parse_error(err, source))?;

        debug!(
            elements = parsed.document.element_count(),
            errors = parsed.error_count(),
            warnings = parsed.warning_count();
            "Structure parsed"
        );
        Ok(parsed)
    }

    /// Parse a hierarchy classifier response.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Json` when the source is not a prediction list.
    pub fn parse_hints(&self, source: &str) -> Result<Hints, StencilError> {
        let file: HintsFile = serde_json::from_str(source)?;
        let hints = Hints::from_predictions(file.into_predictions());
        debug!(hints = hints.len(); "Hints loaded");
        Ok(hints)
    }

    /// Run detection over a parsed document.
    pub fn detect(&self, parsed: Parsed, hints: &Hints) -> Detection {
        detection::run(parsed.document, parsed.diagnostics, hints, &self.config)
    }

    /// Plan a batch against a document and its detected variables.
    pub fn plan(
        &self,
        document: &Document,
        variables: &[VariableRecord],
        mapping: &Mapping,
        rows: &[Row],
    ) -> BatchPlan {
        BatchPlanner::new(document, variables, self.config.batch()).plan(mapping, rows)
    }
}
