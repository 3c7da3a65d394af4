//! Serializable outputs of a detection pass.
//!
//! Each report is independently serializable to camelCase JSON:
//!
//! - [`VariableReport`]: `{variables, variableMap, totalVariables, byType}`
//! - [`PatternReport`]: `{patterns, summary}`
//! - [`IntegrityOutput`]: `{integrityCheck, validationReport}`

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use stencil_core::variable::VariableRecord;
use stencil_parser::{Diagnostic, ErrorCode};

use crate::{integrity::IntegrityReport, pattern::PatternMatch};

/// Every detected variable, with lookups by key and counts by type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableReport {
    pub variables: Vec<VariableRecord>,
    #[serde(default)]
    pub variable_map: IndexMap<String, VariableRecord>,
    #[serde(default)]
    pub total_variables: usize,
    #[serde(default)]
    pub by_type: IndexMap<String, usize>,
}

impl VariableReport {
    /// Builds the report from records in document order.
    pub fn new(variables: Vec<VariableRecord>) -> Self {
        let mut by_type: IndexMap<String, usize> = IndexMap::new();
        for record in &variables {
            *by_type
                .entry(record.variable_type.as_str().to_string())
                .or_default() += 1;
        }
        let variable_map = variables
            .iter()
            .map(|record| (record.variable_key.clone(), record.clone()))
            .collect();
        Self {
            total_variables: variables.len(),
            variables,
            variable_map,
            by_type,
        }
    }

    pub fn get(&self, key: &str) -> Option<&VariableRecord> {
        self.variables.iter().find(|record| record.variable_key == key)
    }
}

/// Every pattern match with a summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternReport {
    pub patterns: Vec<PatternMatch>,
    pub summary: PatternSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub total_matches: usize,
    pub by_pattern: IndexMap<&'static str, usize>,
    pub repeat_groups: Vec<RepeatGroup>,
    pub unmatched_containers: usize,
}

/// A pattern that matched more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatGroup {
    pub pattern_id: &'static str,
    pub count: usize,
}

impl PatternReport {
    pub fn new(patterns: Vec<PatternMatch>, unmatched_containers: usize) -> Self {
        let mut by_pattern: IndexMap<&'static str, usize> = IndexMap::new();
        for pattern in &patterns {
            *by_pattern.entry(pattern.pattern_id).or_default() += 1;
        }
        let repeat_groups = by_pattern
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(&pattern_id, &count)| RepeatGroup { pattern_id, count })
            .collect();
        Self {
            summary: PatternSummary {
                total_matches: patterns.len(),
                by_pattern,
                repeat_groups,
                unmatched_containers,
            },
            patterns,
        }
    }
}

/// Integrity findings together with the merged validation report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityOutput {
    pub integrity_check: IntegrityReport,
    pub validation_report: ValidationReport,
}

/// Every diagnostic raised while parsing and checking a document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let errors = diagnostics
            .iter()
            .filter(|d| d.severity().is_error())
            .count();
        Self {
            valid: errors == 0,
            errors,
            warnings: diagnostics.len() - errors,
            diagnostics,
        }
    }
}

/// Converts integrity findings into diagnostics.
pub(crate) fn integrity_diagnostics(report: &IntegrityReport) -> Vec<Diagnostic> {
    let duplicates = report.id_check.duplicates.iter().map(|duplicate| {
        Diagnostic::error(format!(
            "duplicate id `{}` on {} elements",
            duplicate.id,
            duplicate.indices.len()
        ))
        .with_code(ErrorCode::I001)
        .with_location(duplicate.id.clone())
        .with_help("regenerate ids with `reassign = \"all\"`")
    });
    let hierarchy = report.hierarchy_check.issues.iter().map(|issue| {
        Diagnostic::error(issue.issue.clone())
            .with_code(ErrorCode::I002)
            .with_location(issue.element_id.clone())
    });
    let bounds = report.bounds_check.out_of_bounds.iter().map(|id| {
        Diagnostic::warning("element lies outside the artboard")
            .with_code(ErrorCode::I003)
            .with_location(id.clone())
    });
    duplicates.chain(hierarchy).chain(bounds).collect()
}
