//! Collector for accumulating diagnostics during parsing.
//!
//! Element-level problems never abort a parse. The [`DiagnosticCollector`]
//! gathers them so they can be returned next to the document.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics during a processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// The diagnostic is logged at the matching level as it is recorded.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
            log::error!(location = diagnostic.location().unwrap_or_default(); "{diagnostic}");
        } else {
            log::warn!(location = diagnostic.location().unwrap_or_default(); "{diagnostic}");
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return every diagnostic in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
