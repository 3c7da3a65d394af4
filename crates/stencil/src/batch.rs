//! Batch mapping plans.
//!
//! A plan says, for every data row, which element each mapped variable
//! resolves to and what value it receives. Planning never modifies the
//! document; applying a plan is left to the caller.
//!
//! Resolution tries two strategies in order:
//!
//! 1. Content: the first text element, in document order, whose leading
//!    characters equal the variable's recorded value.
//! 2. Path: the element at the variable's recorded structural path. When that
//!    is a container, the content match is retried inside it.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace};
use serde::Serialize;
use serde_json::Value;

use stencil_core::{
    element::{Document, Element, ElementKind},
    variable::VariableRecord,
};

use crate::config::BatchConfig;

/// One data row: column name to cell value.
pub type Row = IndexMap<String, String>;

/// Variable key to column name.
pub type Mapping = IndexMap<String, String>;

/// How a field found its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedBy {
    Content,
    Path,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub field: String,
    pub value: String,
    pub element_id: String,
    pub resolved_by: ResolvedBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failed {
    pub field: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub field: String,
    pub reason: String,
}

/// The plan for a single row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPlan {
    pub row_index: usize,
    pub file_name: String,
    pub success: Vec<Resolved>,
    pub failed: Vec<Failed>,
    pub skipped: Vec<Skipped>,
}

impl MappingPlan {
    /// A row succeeds when no field failed. Skipped fields do not count.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Plans for every row with aggregate counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlan {
    pub success_count: usize,
    pub failed_count: usize,
    pub files: Vec<MappingPlan>,
}

/// Resolves variables against a document for many rows.
pub struct BatchPlanner<'a> {
    document: &'a Document,
    variables: HashMap<&'a str, &'a VariableRecord>,
    config: &'a BatchConfig,
}

impl<'a> BatchPlanner<'a> {
    pub fn new(document: &'a Document, variables: &'a [VariableRecord], config: &'a BatchConfig) -> Self {
        Self {
            document,
            variables: variables
                .iter()
                .map(|record| (record.variable_key.as_str(), record))
                .collect(),
            config,
        }
    }

    /// Plans every row. Rows are independent; one row's failures never
    /// affect another.
    pub fn plan(&self, mapping: &Mapping, rows: &[Row]) -> BatchPlan {
        info!(rows = rows.len(), fields = mapping.len(); "Planning batch");
        let files: Vec<MappingPlan> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.plan_row(index, mapping, row))
            .collect();
        let success_count = files.iter().filter(|plan| plan.is_success()).count();
        let plan = BatchPlan {
            success_count,
            failed_count: files.len() - success_count,
            files,
        };
        info!(success = plan.success_count, failed = plan.failed_count; "Batch planned");
        plan
    }

    /// Plans one row. `index` is zero-based.
    pub fn plan_row(&self, index: usize, mapping: &Mapping, row: &Row) -> MappingPlan {
        let mut plan = MappingPlan {
            row_index: index,
            file_name: self.file_name(index, row),
            success: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        };

        for (field, column) in mapping {
            let Some(record) = self.variables.get(field.as_str()) else {
                plan.skipped.push(Skipped {
                    field: field.clone(),
                    reason: "unknown variable".to_string(),
                });
                continue;
            };
            let Some(value) = row.get(column).filter(|value| !value.trim().is_empty()) else {
                plan.skipped.push(Skipped {
                    field: field.clone(),
                    reason: "no value".to_string(),
                });
                continue;
            };

            match self.resolve(record) {
                Some((element, resolved_by)) => {
                    trace!(field = field.as_str(), element = element.id(), by:? = resolved_by; "Field resolved");
                    plan.success.push(Resolved {
                        field: field.clone(),
                        value: value.clone(),
                        element_id: element.id().to_string(),
                        resolved_by,
                    });
                }
                None => {
                    trace!(field = field.as_str(); "Field not found");
                    plan.failed.push(Failed {
                        field: field.clone(),
                        error: "not found".to_string(),
                    });
                }
            }
        }

        debug!(
            row = index,
            success = plan.success.len(),
            failed = plan.failed.len(),
            skipped = plan.skipped.len();
            "Row planned"
        );
        plan
    }

    /// Finds the element a variable refers to.
    pub fn resolve(&self, record: &VariableRecord) -> Option<(&'a Element, ResolvedBy)> {
        let expected = normalize(&record.current_value, self.config.match_length());

        if !expected.is_empty() {
            let by_content = self
                .document
                .elements()
                .find(|element| self.matches_content(element, &expected));
            if let Some(element) = by_content {
                return Some((element, ResolvedBy::Content));
            }
        }

        let at_path = self.document.element_at(&record.element_path)?;
        if !at_path.kind().is_container() {
            return Some((at_path, ResolvedBy::Path));
        }
        if expected.is_empty() {
            return None;
        }
        at_path
            .descendants()
            .find(|element| self.matches_content(element, &expected))
            .map(|element| (element, ResolvedBy::Path))
    }

    fn matches_content(&self, element: &Element, expected: &str) -> bool {
        element.kind() == ElementKind::Text
            && element
                .content()
                .is_some_and(|content| normalize(content, self.config.match_length()) == expected)
    }

    fn file_name(&self, index: usize, row: &Row) -> String {
        self.config
            .file_name_column()
            .and_then(|column| row.get(column))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("output_{}", index + 1), str::to_string)
    }
}

/// Trims and keeps the first `length` characters.
fn normalize(text: &str, length: usize) -> String {
    text.trim().chars().take(length).collect()
}

/// Reads rows from a JSON array of flat objects.
///
/// Numbers and booleans are stringified, and nulls are dropped so they read
/// as missing values.
pub fn rows_from_json(source: &str) -> Result<Vec<Row>, serde_json::Error> {
    let raw: Vec<IndexMap<String, Value>> = serde_json::from_str(source)?;
    Ok(raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .filter_map(|(column, value)| {
                    let cell = match value {
                        Value::Null => return None,
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    Some((column, cell))
                })
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use stencil_core::{
        element::{ElementPath, Layer},
        geometry::{Bounds, Point, Size},
        semantic::TypeKey,
    };

    use super::*;

    fn text(id: &str, content: &str, path: ElementPath) -> Element {
        Element::new(id, ElementKind::Text, Bounds::from_edges(0.0, 0.0, 100.0, 20.0), path)
            .with_content(content)
    }

    fn record(key: &str, value: &str, path: ElementPath) -> VariableRecord {
        VariableRecord {
            element_id: "old".to_string(),
            element_path: path,
            variable_key: key.to_string(),
            variable_type: TypeKey::Name,
            variable_label: TypeKey::Name.label().to_string(),
            confidence: 0.85,
            current_value: value.to_string(),
            position: Point::default(),
            size: Size::default(),
            hierarchy_role: None,
        }
    }

    fn document(elements: Vec<Element>) -> Document {
        Document::new("t", Size::new(500.0, 500.0), vec![Layer::new("Layer 1", elements)])
    }

    fn row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn mapping(pairs: &[(&str, &str)]) -> Mapping {
        row(pairs)
    }

    #[test]
    fn test_content_match_wins() {
        let doc = document(vec![
            text("other", "李四", ElementPath::root(0).child(0)),
            text("target", "  张三 ", ElementPath::root(0).child(1)),
        ]);
        let records = [record("guest_0.name", "张三", ElementPath::root(0).child(0))];
        let config = BatchConfig::default();
        let planner = BatchPlanner::new(&doc, &records, &config);

        let (element, by) = planner.resolve(&records[0]).unwrap();
        assert_eq!(element.id(), "target");
        assert_eq!(by, ResolvedBy::Content);
    }

    #[test]
    fn test_content_match_uses_prefix() {
        let long = "a".repeat(40);
        let doc = document(vec![text("t", &format!("{long}tail"), ElementPath::root(0).child(0))]);
        let records = [record("text_0", &long, ElementPath::root(0).child(5))];
        let config = BatchConfig::default();
        let planner = BatchPlanner::new(&doc, &records, &config);

        assert_eq!(planner.resolve(&records[0]).unwrap().1, ResolvedBy::Content);
    }

    #[test]
    fn test_path_fallback() {
        let doc = document(vec![text("edited", "王五", ElementPath::root(0).child(0))]);
        let records = [record("name_0", "张三", ElementPath::root(0).child(0))];
        let config = BatchConfig::default();
        let planner = BatchPlanner::new(&doc, &records, &config);

        let (element, by) = planner.resolve(&records[0]).unwrap();
        assert_eq!(element.id(), "edited");
        assert_eq!(by, ResolvedBy::Path);
    }

    #[test]
    fn test_container_at_path_needs_content_match() {
        let path = ElementPath::root(0).child(0);
        let group = Element::new("g", ElementKind::Group, Bounds::default(), path.clone())
            .with_children(vec![text("inner", "张三", path.child(0))]);
        let doc = document(vec![group]);
        let config = BatchConfig::default();

        let found = [record("name_0", "张三", path.clone())];
        let planner = BatchPlanner::new(&doc, &found, &config);
        assert_eq!(planner.resolve(&found[0]).unwrap().0.id(), "inner");

        let missing = [record("name_0", "赵六", path)];
        let planner = BatchPlanner::new(&doc, &missing, &config);
        assert!(planner.resolve(&missing[0]).is_none());
    }

    #[test]
    fn test_row_outcomes() {
        let doc = document(vec![text("n", "张三", ElementPath::root(0).child(0))]);
        let records = [
            record("guest_0.name", "张三", ElementPath::root(0).child(0)),
            record("gone", "赵六", ElementPath::root(0).child(9)),
            record("blank", "张三", ElementPath::root(0).child(0)),
        ];
        let config = BatchConfig::default();
        let planner = BatchPlanner::new(&doc, &records, &config);
        let mapping = mapping(&[
            ("guest_0.name", "name"),
            ("gone", "name"),
            ("blank", "empty"),
            ("nope", "name"),
        ]);

        let plan = planner.plan_row(0, &mapping, &row(&[("name", "李雷"), ("empty", " ")]));

        assert_eq!(plan.file_name, "output_1");
        assert_eq!(plan.success.len(), 1);
        assert_eq!(plan.success[0].value, "李雷");
        assert_eq!(plan.success[0].element_id, "n");
        assert_eq!(
            plan.failed,
            vec![Failed {
                field: "gone".to_string(),
                error: "not found".to_string(),
            }]
        );
        let reasons: Vec<_> = plan.skipped.iter().map(|s| s.reason.as_str()).collect();
        assert_eq!(reasons, ["no value", "unknown variable"]);
        assert!(!plan.is_success());
    }

    #[test]
    fn test_plan_counts_and_file_names() {
        let doc = document(vec![text("n", "张三", ElementPath::root(0).child(0))]);
        let records = [record("name_0", "张三", ElementPath::root(0).child(0))];
        let config = BatchConfig::new(30, Some("file".to_string()));
        let planner = BatchPlanner::new(&doc, &records, &config);
        let mapping = mapping(&[("name_0", "name")]);
        let rows = [
            row(&[("name", "李雷"), ("file", "lilei")]),
            row(&[("name", "韩梅梅")]),
        ];

        let plan = planner.plan(&mapping, &rows);

        assert_eq!(plan.success_count, 2);
        assert_eq!(plan.failed_count, 0);
        assert_eq!(plan.files[0].file_name, "lilei");
        assert_eq!(plan.files[1].file_name, "output_2");
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(r#"[{"name": "张三", "age": 30, "note": null}]"#).unwrap();
        assert_eq!(rows[0]["name"], "张三");
        assert_eq!(rows[0]["age"], "30");
        assert!(!rows[0].contains_key("note"));
    }
}
