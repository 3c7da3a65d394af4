//! The detection pipeline.
//!
//! A pass runs over one parsed document and produces every report:
//!
//! 1. Tag every element ([`crate::detect`]).
//! 2. Select variables and merge hierarchy hints.
//! 3. Match container patterns and order repeat groups.
//! 4. Assign variable keys.
//! 5. Check integrity and merge every diagnostic.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use stencil_core::{
    element::{Document, Element},
    variable::VariableRecord,
};
use stencil_parser::{Diagnostic, ErrorCode};

use crate::{
    candidate::{self, Candidate},
    config::AppConfig,
    detect,
    hints::Hints,
    integrity,
    naming::NameRegistry,
    pattern::{self, PatternMatch, Placed, matcher},
    report::{self, IntegrityOutput, PatternReport, ValidationReport, VariableReport},
};

/// Everything a detection pass produces.
///
/// Serializes as `{variables, patterns, integrity}`. The annotated document
/// is kept for batch planning but not serialized.
#[derive(Debug, Serialize)]
pub struct Detection {
    #[serde(skip)]
    document: Document,
    variables: VariableReport,
    patterns: PatternReport,
    integrity: IntegrityOutput,
}

impl Detection {
    /// The document with every element's tag set.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn variables(&self) -> &VariableReport {
        &self.variables
    }

    pub fn patterns(&self) -> &PatternReport {
        &self.patterns
    }

    pub fn integrity(&self) -> &IntegrityOutput {
        &self.integrity
    }
}

/// Runs a full pass over a parsed document.
///
/// `diagnostics` are the parser's findings; they are merged into the
/// validation report.
pub(crate) fn run(
    document: Document,
    diagnostics: Vec<Diagnostic>,
    hints: &Hints,
    config: &AppConfig,
) -> Detection {
    info!(elements = document.element_count(), hints = hints.len(); "Detecting variables");
    let document = detect::annotate(document);

    let (variables, patterns, pattern_diagnostics) = {
        let candidates = candidate::collect(&document, hints, config.hints().min_confidence());
        debug!(candidates = candidates.len(); "Variables selected");

        let scan = matcher::scan(&document, &candidates);
        let placed = pattern::arrange(scan.matches, config.patterns().row_tolerance());
        debug!(matches = placed.len(), unmatched = scan.unmatched; "Patterns matched");

        let (records, patterns) = name(&candidates, &placed);
        (
            VariableReport::new(records),
            PatternReport::new(patterns, scan.unmatched),
            repeat_diagnostics(&placed),
        )
    };

    let check = integrity::check(&document, config.integrity().margin());
    let mut merged = diagnostics;
    merged.extend(report::integrity_diagnostics(&check));
    merged.extend(pattern_diagnostics);
    let validation = ValidationReport::new(merged);

    info!(
        variables = variables.total_variables,
        patterns = patterns.summary.total_matches,
        errors = validation.errors,
        warnings = validation.warnings;
        "Detection complete"
    );

    Detection {
        document,
        variables,
        patterns,
        integrity: IntegrityOutput {
            integrity_check: check,
            validation_report: validation,
        },
    }
}

/// Assigns keys and builds the records.
///
/// Pattern fields are named first, in repeat order. Every other candidate
/// gets a standalone key in document order.
fn name(candidates: &[Candidate<'_>], placed: &[Placed<'_>]) -> (Vec<VariableRecord>, Vec<PatternMatch>) {
    let mut names = NameRegistry::new();
    let mut keys: HashMap<usize, String> = HashMap::new();

    for placement in placed {
        let definition = placement.definition();
        let repeat_index = placement.is_indexed().then_some(placement.repeat_index);
        for &(field, index) in &placement.raw.fields {
            keys.insert(index, names.field(definition.prefix, repeat_index, field));
        }
    }

    let records: Vec<VariableRecord> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let key = match keys.remove(&index) {
                Some(key) => key,
                None => names.standalone(candidate.tag.primary_type()),
            };
            record(candidate, key)
        })
        .collect();

    let patterns = placed
        .iter()
        .map(|placement| {
            let fields: IndexMap<String, VariableRecord> = placement
                .raw
                .fields
                .iter()
                .map(|&(field, index)| (field.as_str().to_string(), records[index].clone()))
                .collect();
            PatternMatch {
                pattern_id: placement.definition().id,
                label: placement.definition().label,
                group_id: placement.raw.group.id().to_string(),
                fields,
                repeat_index: placement.repeat_index,
                repeat_total: placement.repeat_total,
                confidence: placement.raw.confidence,
            }
        })
        .collect();

    (records, patterns)
}

fn record(candidate: &Candidate<'_>, variable_key: String) -> VariableRecord {
    let element = candidate.element;
    VariableRecord {
        element_id: element.id().to_string(),
        element_path: element.path().clone(),
        variable_key,
        variable_type: candidate.tag.primary_type(),
        variable_label: candidate.tag.primary_label().to_string(),
        confidence: candidate.tag.confidence(),
        current_value: current_value(element),
        position: element.position(),
        size: element.size(),
        hierarchy_role: candidate.role,
    }
}

/// Text content for text elements, the element name otherwise.
fn current_value(element: &Element) -> String {
    element
        .content()
        .or_else(|| element.name())
        .unwrap_or_default()
        .to_string()
}

/// Reports each non-repeatable pattern that matched more than once.
fn repeat_diagnostics(placed: &[Placed<'_>]) -> Vec<Diagnostic> {
    placed
        .iter()
        .filter(|placement| {
            placement.repeat_index == 0
                && placement.is_indexed()
                && !placement.definition().repeatable
        })
        .map(|placement| {
            Diagnostic::warning(format!(
                "pattern `{}` is not repeatable but matched {} times",
                placement.definition().id,
                placement.repeat_total
            ))
            .with_code(ErrorCode::P001)
            .with_location(placement.raw.group.id())
            .with_help("fields are named with repeat indices")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use stencil_core::{
        element::{ElementKind, ElementPath, Layer},
        geometry::{Bounds, Size},
        semantic::TypeKey,
        variable::HierarchyRole,
    };

    use super::*;
    use crate::hints::Hint;

    fn text(id: &str, content: &str, path: ElementPath, y: f32) -> Element {
        Element::new(id, ElementKind::Text, Bounds::from_edges(10.0, y, 200.0, y + 30.0), path)
            .with_content(content)
    }

    fn contact_group(id: &str, layer_index: usize, y: f32) -> Element {
        let path = ElementPath::root(0).child(layer_index);
        Element::new(id, ElementKind::Group, Bounds::from_edges(0.0, y, 300.0, y + 100.0), path.clone())
            .with_children(vec![
                text(&format!("{id}_phone"), "13812345678", path.child(0), y)
                    .with_parent_id(Some(id.to_string())),
                text(&format!("{id}_mail"), "hi@example.com", path.child(1), y + 40.0)
                    .with_parent_id(Some(id.to_string())),
            ])
    }

    fn document(elements: Vec<Element>) -> Document {
        Document::new("test", Size::new(1000.0, 1000.0), vec![Layer::new("Layer 1", elements)])
    }

    #[test]
    fn test_standalone_keys() {
        let doc = document(vec![
            text("a", "张三", ElementPath::root(0).child(0), 0.0),
            text("b", "李四", ElementPath::root(0).child(1), 50.0),
        ]);
        let detection = run(doc, Vec::new(), &Hints::new(), &AppConfig::default());
        let keys: Vec<_> = detection
            .variables()
            .variables
            .iter()
            .map(|r| r.variable_key.as_str())
            .collect();

        assert_eq!(keys, ["name_0", "name_1"]);
        assert_eq!(detection.variables().variables[0].current_value, "张三");
        assert!(detection.integrity().validation_report.valid);
    }

    #[test]
    fn test_singleton_pattern_keys() {
        let doc = document(vec![contact_group("card", 0, 0.0)]);
        let detection = run(doc, Vec::new(), &Hints::new(), &AppConfig::default());

        let pattern = &detection.patterns().patterns[0];
        assert_eq!(pattern.pattern_id, "CONTACT_INFO");
        assert_eq!(pattern.repeat_total, 1);
        assert_eq!(pattern.fields["phone"].variable_key, "contact.phone");
        assert_eq!(pattern.fields["email"].variable_key, "contact.email");
        assert!(detection.variables().variable_map.contains_key("contact.phone"));
    }

    #[test]
    fn test_repeated_singleton_pattern_is_indexed_and_reported() {
        let doc = document(vec![
            contact_group("first", 0, 0.0),
            contact_group("second", 1, 500.0),
        ]);
        let detection = run(doc, Vec::new(), &Hints::new(), &AppConfig::default());

        let keys: Vec<_> = detection
            .patterns()
            .patterns
            .iter()
            .map(|p| p.fields["phone"].variable_key.as_str())
            .collect();
        assert_eq!(keys, ["contact_0.phone", "contact_1.phone"]);

        let validation = &detection.integrity().validation_report;
        assert!(validation.valid);
        assert_eq!(validation.warnings, 1);
        assert_eq!(validation.diagnostics[0].code(), Some(ErrorCode::P001));
    }

    #[test]
    fn test_hints_exclude_and_annotate() {
        let doc = document(vec![
            text("bg", "张三", ElementPath::root(0).child(0), 0.0),
            text("body", "李四", ElementPath::root(0).child(1), 50.0),
        ]);
        let mut hints = Hints::new();
        hints.insert("bg", Hint::new(HierarchyRole::Decoration, 0.9));
        hints.insert("body", Hint::new(HierarchyRole::ContentPrimary, 0.8));

        let detection = run(doc, Vec::new(), &hints, &AppConfig::default());
        let variables = &detection.variables().variables;

        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].element_id, "body");
        assert_eq!(variables[0].variable_key, "name_0");
        assert_eq!(variables[0].hierarchy_role, Some(HierarchyRole::ContentPrimary));
    }

    #[test]
    fn test_parser_diagnostics_are_merged() {
        let doc = document(vec![text("a", "hello", ElementPath::root(0).child(0), 5000.0)]);
        let parsed = vec![Diagnostic::warning("unknown element type").with_code(ErrorCode::E102)];
        let detection = run(doc, parsed, &Hints::new(), &AppConfig::default());
        let validation = &detection.integrity().validation_report;

        let codes: Vec<_> = validation.diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, [Some(ErrorCode::E102), Some(ErrorCode::I003)]);
        assert_eq!(validation.warnings, 2);
        assert_eq!(detection.variables().by_type.get("text"), Some(&1));
        assert_eq!(detection.variables().variables[0].variable_type, TypeKey::Text);
    }
}
