//! Structural integrity checks over a parsed document.
//!
//! Three independent checks run over every element: id uniqueness, parent
//! references, and placement against the artboard. Findings are returned as
//! data and never repaired.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use stencil_core::{
    element::Document,
    geometry::{Bounds, Size},
};

/// The combined result of every integrity check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub id_check: IdCheck,
    pub hierarchy_check: HierarchyCheck,
    pub bounds_check: BoundsCheck,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCheck {
    pub unique: bool,
    pub total_ids: usize,
    pub duplicates: Vec<DuplicateId>,
}

/// An id carried by more than one element.
///
/// `indices` are positions in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub id: String,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyCheck {
    pub valid: bool,
    pub issues: Vec<HierarchyIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyIssue {
    pub element_id: String,
    pub issue: String,
}

/// Element ids grouped by how much of each element lies on the artboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsCheck {
    pub out_of_bounds: Vec<String>,
    pub partially_visible: Vec<String>,
    pub fully_visible: Vec<String>,
    pub artboard_size: Size,
}

/// Where an element sits relative to the artboard and its margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    Partial,
    Outside,
}

/// Classifies `bounds` against the artboard grown by `margin`.
///
/// Touching the edge of the band still counts as visible.
///
/// # Examples
///
/// ```
/// # use stencil::integrity::{visibility, Visibility};
/// # use stencil_core::geometry::{Bounds, Size};
/// let artboard = Size::new(100.0, 100.0);
/// let inside = Bounds::from_edges(10.0, 10.0, 50.0, 50.0);
/// let straddling = Bounds::from_edges(80.0, 10.0, 150.0, 50.0);
/// let outside = Bounds::from_edges(200.0, 10.0, 250.0, 50.0);
///
/// assert_eq!(visibility(inside, artboard, 10.0), Visibility::Full);
/// assert_eq!(visibility(straddling, artboard, 10.0), Visibility::Partial);
/// assert_eq!(visibility(outside, artboard, 10.0), Visibility::Outside);
/// ```
pub fn visibility(bounds: Bounds, artboard: Size, margin: f32) -> Visibility {
    let band = Bounds::from_edges(0.0, 0.0, artboard.width(), artboard.height()).expand(margin);
    if bounds.is_disjoint(band) {
        Visibility::Outside
    } else if bounds.is_within(band) {
        Visibility::Full
    } else {
        Visibility::Partial
    }
}

/// Runs every check over the document.
pub fn check(document: &Document, margin: f32) -> IntegrityReport {
    let report = IntegrityReport {
        id_check: check_ids(document),
        hierarchy_check: check_hierarchy(document),
        bounds_check: check_bounds(document, margin),
    };
    debug!(
        duplicates = report.id_check.duplicates.len(),
        hierarchy_issues = report.hierarchy_check.issues.len(),
        out_of_bounds = report.bounds_check.out_of_bounds.len();
        "Integrity checked"
    );
    report
}

fn check_ids(document: &Document) -> IdCheck {
    let mut seen: IndexMap<&str, Vec<usize>> = IndexMap::new();
    let mut total_ids = 0;
    for (index, element) in document.elements().enumerate() {
        seen.entry(element.id()).or_default().push(index);
        total_ids += 1;
    }

    let duplicates: Vec<DuplicateId> = seen
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(id, indices)| DuplicateId {
            id: id.to_string(),
            indices,
        })
        .collect();

    IdCheck {
        unique: duplicates.is_empty(),
        total_ids,
        duplicates,
    }
}

fn check_hierarchy(document: &Document) -> HierarchyCheck {
    let ids: HashSet<&str> = document.elements().map(|element| element.id()).collect();
    let issues: Vec<HierarchyIssue> = document
        .elements()
        .filter_map(|element| {
            let parent = element.parent_id()?;
            if parent == element.id() {
                Some(HierarchyIssue {
                    element_id: element.id().to_string(),
                    issue: "element is its own parent".to_string(),
                })
            } else if !ids.contains(parent) {
                Some(HierarchyIssue {
                    element_id: element.id().to_string(),
                    issue: format!("parent `{parent}` does not exist"),
                })
            } else {
                None
            }
        })
        .collect();

    HierarchyCheck {
        valid: issues.is_empty(),
        issues,
    }
}

fn check_bounds(document: &Document, margin: f32) -> BoundsCheck {
    let artboard_size = document.artboard_size();
    let mut check = BoundsCheck {
        out_of_bounds: Vec::new(),
        partially_visible: Vec::new(),
        fully_visible: Vec::new(),
        artboard_size,
    };
    for element in document.elements() {
        let bucket = match visibility(element.bounds(), artboard_size, margin) {
            Visibility::Full => &mut check.fully_visible,
            Visibility::Partial => &mut check.partially_visible,
            Visibility::Outside => &mut check.out_of_bounds,
        };
        bucket.push(element.id().to_string());
    }
    check
}

#[cfg(test)]
mod tests {
    use stencil_core::element::{Element, ElementKind, ElementPath, Layer};

    use super::*;

    fn text(id: &str, bounds: Bounds, index: usize) -> Element {
        Element::new(id, ElementKind::Text, bounds, ElementPath::root(0).child(index))
    }

    fn document(elements: Vec<Element>) -> Document {
        Document::new(
            "test",
            Size::new(100.0, 100.0),
            vec![Layer::new("Layer 1", elements)],
        )
    }

    fn square(x: f32, y: f32) -> Bounds {
        Bounds::from_edges(x, y, x + 10.0, y + 10.0)
    }

    #[test]
    fn test_duplicate_ids_are_reported_with_indices() {
        let doc = document(vec![
            text("a", square(0.0, 0.0), 0),
            text("b", square(0.0, 0.0), 1),
            text("a", square(0.0, 0.0), 2),
        ]);
        let ids = check(&doc, 10.0).id_check;

        assert!(!ids.unique);
        assert_eq!(ids.total_ids, 3);
        assert_eq!(
            ids.duplicates,
            vec![DuplicateId {
                id: "a".to_string(),
                indices: vec![0, 2],
            }]
        );
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let doc = document(vec![
            text("a", square(0.0, 0.0), 0).with_parent_id(Some("ghost".to_string())),
            text("b", square(0.0, 0.0), 1),
        ]);
        let hierarchy = check(&doc, 10.0).hierarchy_check;

        assert!(!hierarchy.valid);
        assert_eq!(hierarchy.issues.len(), 1);
        assert_eq!(hierarchy.issues[0].element_id, "a");
        assert!(hierarchy.issues[0].issue.contains("ghost"));
    }

    #[test]
    fn test_nested_parents_are_valid() {
        let child = text("child", square(5.0, 5.0), 0).with_parent_id(Some("group".to_string()));
        let group = Element::new(
            "group",
            ElementKind::Group,
            square(0.0, 0.0),
            ElementPath::root(0).child(0),
        )
        .with_children(vec![child]);
        let hierarchy = check(&document(vec![group]), 10.0).hierarchy_check;
        assert!(hierarchy.valid);
    }

    #[test]
    fn test_bounds_buckets() {
        let doc = document(vec![
            text("inside", square(10.0, 10.0), 0),
            text("in_margin", square(-8.0, 95.0), 1),
            text("crossing", square(105.0, 50.0), 2),
            text("outside", square(150.0, 50.0), 3),
            text("above", square(20.0, -40.0), 4),
        ]);
        let bounds = check(&doc, 10.0).bounds_check;

        assert_eq!(bounds.fully_visible, vec!["inside", "in_margin"]);
        assert_eq!(bounds.partially_visible, vec!["crossing"]);
        assert_eq!(bounds.out_of_bounds, vec!["outside", "above"]);
        assert_eq!(bounds.artboard_size, Size::new(100.0, 100.0));
    }
}
