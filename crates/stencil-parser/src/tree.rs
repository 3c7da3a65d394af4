//! Assembling raw elements into layer trees and finalizing them.
//!
//! Elements arrive either nested under `layers[].elements[].children` or as a
//! flat top-level `elements` list linked by `parentId` and `layerIndex`. Both
//! forms are merged into one forest per layer before paths and ids are
//! assigned.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use serde_json::{Map, Value};

use stencil_core::{
    element::{Element, ElementPath, Layer},
    geometry::Size,
    identity::{IdReassign, IdentityGenerator},
};

use crate::{
    element::{RawElement, read_element},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    header::Header,
};

/// A layer whose elements have not been finalized yet.
#[derive(Debug)]
pub(crate) struct RawLayer {
    name: String,
    elements: Vec<RawElement>,
}

impl RawLayer {
    fn placeholder(index: usize) -> Self {
        Self {
            name: format!("Layer {}", index + 1),
            elements: Vec::new(),
        }
    }
}

/// Reads the nested layer trees, then links the flat element list into them.
pub(crate) fn collect_layers(
    root: &Map<String, Value>,
    header: &Header,
    collector: &mut DiagnosticCollector,
) -> Vec<RawLayer> {
    let mut layers = Vec::new();

    if let Some(items) = root.get("layers").and_then(Value::as_array) {
        for (index, item) in items.iter().enumerate() {
            let mut layer = RawLayer::placeholder(index);
            if let Some(name) = item.get("name").and_then(Value::as_str) {
                layer.name = name.to_string();
            }
            let elements = item
                .get("elements")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for (position, value) in elements.iter().enumerate() {
                let location = format!("layers[{index}].elements[{position}]");
                if let Some(raw) = read_element(value, location, header, collector) {
                    layer.elements.push(raw);
                }
            }
            layers.push(layer);
        }
    }

    if let Some(items) = root.get("elements").and_then(Value::as_array) {
        link_flat(items, header, &mut layers, collector);
    }

    layers
}

/// One entry of the flat list while its parent is being resolved.
struct FlatEntry {
    raw: Option<RawElement>,
    layer: u64,
    parent: Option<usize>,
}

/// Links the flat `elements` list by `parentId`.
///
/// Children attach under their parent after any nested children it already
/// has. An element whose parent is absent becomes a root of its layer and
/// keeps the dangling `parentId` for the integrity check. Cycles are broken
/// by promoting the first element reached in list order to a root.
///
/// A `layerIndex` that names a nested layer joins it. Any other values are
/// renumbered in ascending order into new layers after the nested ones, so
/// sparse or very large indices never create empty layers.
fn link_flat(
    items: &[Value],
    header: &Header,
    layers: &mut Vec<RawLayer>,
    collector: &mut DiagnosticCollector,
) {
    let mut entries: Vec<FlatEntry> = Vec::with_capacity(items.len());
    for (index, value) in items.iter().enumerate() {
        let layer = value
            .get("layerIndex")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if let Some(raw) = read_element(value, format!("elements[{index}]"), header, collector) {
            entries.push(FlatEntry {
                raw: Some(raw),
                layer,
                parent: None,
            });
        }
    }

    let mut by_id: HashMap<String, usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        if let Some(id) = entry.raw.as_ref().and_then(|raw| raw.source_id.clone()) {
            by_id.entry(id).or_insert(index);
        }
    }

    for (index, entry) in entries.iter_mut().enumerate() {
        let Some(raw) = entry.raw.as_ref() else {
            continue;
        };
        let Some(declared) = raw.declared_parent.as_deref() else {
            continue;
        };
        match by_id.get(declared) {
            Some(&parent) if parent != index => entry.parent = Some(parent),
            _ => collector.emit(
                Diagnostic::warning(format!("parent `{declared}` does not exist"))
                    .with_code(ErrorCode::E106)
                    .with_location(raw.location.clone())
                    .with_help("the element is placed at the root of its layer"),
            ),
        }
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    for (index, entry) in entries.iter().enumerate() {
        if let Some(parent) = entry.parent {
            children_of[parent].push(index);
        }
    }

    let mut roots: Vec<usize> = (0..entries.len())
        .filter(|&index| entries[index].parent.is_none())
        .collect();
    let mut visited = vec![false; entries.len()];
    for &root in &roots {
        mark_reachable(root, &children_of, &mut visited);
    }

    // Whatever is still unvisited sits on a parent cycle.
    for index in 0..entries.len() {
        if visited[index] {
            continue;
        }
        if let Some(parent) = entries[index].parent.take() {
            children_of[parent].retain(|&child| child != index);
        }
        if let Some(raw) = entries[index].raw.as_mut() {
            collector.emit(
                Diagnostic::warning("`parentId` chain forms a cycle")
                    .with_code(ErrorCode::E106)
                    .with_location(raw.location.clone())
                    .with_help("the element is placed at the root of its layer"),
            );
            raw.declared_parent = None;
        }
        mark_reachable(index, &children_of, &mut visited);
        roots.push(index);
    }
    roots.sort_unstable();

    let mut extra: BTreeMap<u64, Vec<RawElement>> = BTreeMap::new();
    for root in roots {
        let layer = entries[root].layer;
        let Some(raw) = assemble(root, &mut entries, &children_of) else {
            continue;
        };
        match usize::try_from(layer).ok().and_then(|index| layers.get_mut(index)) {
            Some(existing) => existing.elements.push(raw),
            None => extra.entry(layer).or_default().push(raw),
        }
    }

    for (declared, elements) in extra {
        let index = layers.len();
        if usize::try_from(declared).ok() != Some(index) {
            debug!(declared, index; "Renumbering flat layer index");
        }
        let mut layer = RawLayer::placeholder(index);
        layer.elements = elements;
        layers.push(layer);
    }
}

fn mark_reachable(start: usize, children_of: &[Vec<usize>], visited: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(index) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        stack.extend(children_of[index].iter().copied());
    }
}

/// Moves a flat entry and its linked descendants into one raw subtree.
fn assemble(
    index: usize,
    entries: &mut [FlatEntry],
    children_of: &[Vec<usize>],
) -> Option<RawElement> {
    let mut raw = entries[index].raw.take()?;
    for &child in &children_of[index] {
        if let Some(child) = assemble(child, entries, children_of) {
            raw.children.push(child);
        }
    }
    Some(raw)
}

/// The artboard size implied by element extents.
pub(crate) fn extent(layers: &[RawLayer]) -> Size {
    let (right, bottom) = layers
        .iter()
        .flat_map(|layer| layer.elements.iter())
        .map(RawElement::extent)
        .fold((0.0f32, 0.0f32), |acc, edge| (acc.0.max(edge.0), acc.1.max(edge.1)));
    Size::new(right, bottom)
}

/// Assigns structural paths, ids and parent ids.
///
/// Elements are visited depth-first in layer order with parents before
/// children, which fixes the order of sequential ids.
pub(crate) fn finalize(
    layers: Vec<RawLayer>,
    reassign: IdReassign,
    generator: &mut IdentityGenerator,
) -> Vec<Layer> {
    layers
        .into_iter()
        .enumerate()
        .map(|(layer_index, layer)| {
            let elements = layer
                .elements
                .into_iter()
                .enumerate()
                .map(|(index, raw)| {
                    let path = ElementPath::root(layer_index).child(index);
                    let parent = raw.declared_parent.clone();
                    finalize_element(raw, path, parent, reassign, generator)
                })
                .collect();
            Layer::new(layer.name, elements)
        })
        .collect()
}

fn finalize_element(
    raw: RawElement,
    path: ElementPath,
    parent_id: Option<String>,
    reassign: IdReassign,
    generator: &mut IdentityGenerator,
) -> Element {
    let RawElement {
        source_id,
        kind,
        name,
        content,
        bounds,
        reference_point,
        explicit_tag,
        children,
        ..
    } = raw;

    let mut element = Element::new("", kind, bounds, path.clone())
        .with_reference_point(reference_point)
        .with_parent_id(parent_id);
    if let Some(name) = name {
        element = element.with_name(name);
    }
    if let Some(content) = content {
        element = element.with_content(content);
    }
    if let Some(key) = explicit_tag {
        element = element.with_explicit_tag(key);
    }

    let id = match (reassign, &source_id) {
        (IdReassign::Missing, Some(id)) => id.clone(),
        _ => generator.generate(&element),
    };
    trace!(id = id.as_str(), path:% = path; "Element finalized");
    element.set_id(id.clone());

    let children = children
        .into_iter()
        .enumerate()
        .map(|(index, child)| {
            // A declared parent that disagrees with nesting is kept as-is.
            let parent = match child.declared_parent.as_deref() {
                Some(declared) if Some(declared) != source_id.as_deref() => declared.to_string(),
                _ => id.clone(),
            };
            finalize_element(child, path.child(index), Some(parent), reassign, generator)
        })
        .collect();
    element.with_children(children)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stencil_core::identity::IdMode;

    use super::*;
    use crate::header::read_header;

    fn collect(value: Value) -> (Vec<RawLayer>, Vec<Diagnostic>) {
        let root = value.as_object().unwrap();
        let header = read_header(root);
        let mut collector = DiagnosticCollector::new();
        let layers = collect_layers(root, &header, &mut collector);
        (layers, collector.finish())
    }

    fn flat(id: &str, parent: Option<&str>) -> Value {
        json!({
            "id": id,
            "type": "group",
            "parentId": parent,
            "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
        })
    }

    #[test]
    fn test_flat_elements_link_by_parent_id() {
        let (layers, diagnostics) = collect(json!({
            "elements": [flat("child", Some("root")), flat("root", None)]
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].elements.len(), 1);
        let root = &layers[0].elements[0];
        assert_eq!(root.source_id.as_deref(), Some("root"));
        assert_eq!(root.children[0].source_id.as_deref(), Some("child"));
    }

    #[test]
    fn test_flat_dangling_parent_becomes_root() {
        let (layers, diagnostics) = collect(json!({
            "elements": [flat("orphan", Some("ghost"))]
        }));

        assert_eq!(layers[0].elements.len(), 1);
        assert_eq!(
            layers[0].elements[0].declared_parent.as_deref(),
            Some("ghost")
        );
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E106));
    }

    #[test]
    fn test_flat_cycle_is_broken() {
        let (layers, diagnostics) = collect(json!({
            "elements": [flat("a", Some("b")), flat("b", Some("a"))]
        }));

        assert_eq!(layers[0].elements.len(), 1);
        let root = &layers[0].elements[0];
        assert_eq!(root.source_id.as_deref(), Some("a"));
        assert!(root.declared_parent.is_none());
        assert_eq!(root.children[0].source_id.as_deref(), Some("b"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E106));
    }

    fn on_layer(id: &str, layer: u64) -> Value {
        let mut element = flat(id, None);
        element["layerIndex"] = json!(layer);
        element
    }

    #[test]
    fn test_flat_layer_index_creates_layers() {
        let (layers, _) = collect(json!({ "elements": [on_layer("x", 2)] }));

        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "Layer 1");
        assert_eq!(layers[0].elements[0].source_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_flat_sparse_layer_indices_are_compacted() {
        let (layers, diagnostics) = collect(json!({
            "layers": [{ "name": "Main", "elements": [] }],
            "elements": [
                on_layer("far", u64::MAX),
                on_layer("main", 0),
                on_layer("mid", 7),
                on_layer("mid_2", 7),
            ]
        }));

        assert!(diagnostics.is_empty());
        let ids: Vec<Vec<&str>> = layers
            .iter()
            .map(|layer| {
                layer
                    .elements
                    .iter()
                    .filter_map(|raw| raw.source_id.as_deref())
                    .collect()
            })
            .collect();
        assert_eq!(ids, vec![vec!["main"], vec!["mid", "mid_2"], vec!["far"]]);
        assert_eq!(layers[0].name, "Main");
        assert_eq!(layers[2].name, "Layer 3");
    }

    #[test]
    fn test_nested_parent_mismatch_keeps_declared_parent() {
        let (layers, _) = collect(json!({
            "layers": [{
                "elements": [{
                    "id": "g1",
                    "type": "group",
                    "bounds": { "left": 0, "top": 0, "right": 100, "bottom": 100 },
                    "children": [
                        { "id": "a", "type": "text", "content": "a", "parentId": "g1", "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 } },
                        { "id": "b", "type": "text", "content": "b", "parentId": "g9", "bounds": { "left": 0, "top": 20, "right": 10, "bottom": 30 } },
                        { "id": "c", "type": "text", "content": "c", "bounds": { "left": 0, "top": 40, "right": 10, "bottom": 50 } }
                    ]
                }]
            }]
        }));

        let mut generator = IdentityGenerator::new(IdMode::Sequential);
        let layers = finalize(layers, IdReassign::Missing, &mut generator);
        let children = layers[0].elements()[0].children();

        assert_eq!(children[0].parent_id(), Some("g1"));
        assert_eq!(children[1].parent_id(), Some("g9"));
        assert_eq!(children[2].parent_id(), Some("g1"));
    }

    #[test]
    fn test_finalize_assigns_paths_and_parents() {
        let (layers, _) = collect(json!({
            "layers": [{
                "name": "Main",
                "elements": [{
                    "type": "group",
                    "bounds": { "left": 0, "top": 0, "right": 100, "bottom": 100 },
                    "children": [
                        { "type": "text", "content": "a", "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 } },
                        { "id": "keep", "type": "text", "content": "b", "bounds": { "left": 0, "top": 20, "right": 10, "bottom": 30 } }
                    ]
                }]
            }]
        }));

        let mut generator = IdentityGenerator::new(IdMode::Sequential);
        let layers = finalize(layers, IdReassign::Missing, &mut generator);
        let group = &layers[0].elements()[0];

        assert_eq!(layers[0].name(), "Main");
        assert_eq!(group.id(), "group_0");
        assert!(group.parent_id().is_none());
        assert_eq!(group.children()[0].id(), "text_0");
        assert_eq!(group.children()[0].path().to_string(), "0/0/0");
        assert_eq!(group.children()[0].parent_id(), Some("group_0"));
        assert_eq!(group.children()[1].id(), "keep");
        assert_eq!(group.children()[1].path().to_string(), "0/0/1");
    }

    #[test]
    fn test_finalize_reassign_all() {
        let (layers, _) = collect(json!({
            "layers": [{ "elements": [flat("given", None)] }]
        }));

        let mut generator = IdentityGenerator::new(IdMode::Sequential);
        let layers = finalize(layers, IdReassign::All, &mut generator);
        assert_eq!(layers[0].elements()[0].id(), "group_0");
    }
}
