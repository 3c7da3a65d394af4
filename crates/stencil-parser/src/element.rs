//! Reading single element objects into [`RawElement`]s.
//!
//! A raw element carries canonical geometry but no structural path or final
//! id yet; those depend on where the element lands in the tree.

use serde_json::{Map, Value};

use stencil_core::{
    element::ElementKind,
    geometry::{Bounds, Point, ReferencePoint, Size, normalize},
    semantic::TypeKey,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    header::{Header, number, rect_array},
};

/// Name prefixes that mark an author-supplied type override.
const TAG_PREFIXES: [&str; 2] = ["$", "var:"];

/// An element read from JSON, before paths and ids are assigned.
#[derive(Debug, Clone)]
pub(crate) struct RawElement {
    pub location: String,
    pub source_id: Option<String>,
    pub kind: ElementKind,
    pub name: Option<String>,
    pub content: Option<String>,
    pub bounds: Bounds,
    pub reference_point: ReferencePoint,
    pub declared_parent: Option<String>,
    pub explicit_tag: Option<TypeKey>,
    pub children: Vec<RawElement>,
}

impl RawElement {
    /// Largest right and bottom edge over this element and its subtree.
    pub fn extent(&self) -> (f32, f32) {
        self.children
            .iter()
            .map(RawElement::extent)
            .fold((self.bounds.right(), self.bounds.bottom()), |acc, child| {
                (acc.0.max(child.0), acc.1.max(child.1))
            })
    }
}

/// Reads one element and its nested `children`.
///
/// Returns `None` when the element must be dropped: it is not an object or
/// has no `type`. Every other problem is repaired and reported.
pub(crate) fn read_element(
    value: &Value,
    location: String,
    header: &Header,
    collector: &mut DiagnosticCollector,
) -> Option<RawElement> {
    let Some(object) = value.as_object() else {
        collector.emit(
            Diagnostic::error("element is not an object")
                .with_code(ErrorCode::E100)
                .with_location(location),
        );
        return None;
    };

    let Some(type_name) = object.get("type").and_then(Value::as_str) else {
        collector.emit(
            Diagnostic::error("element has no `type`")
                .with_code(ErrorCode::E101)
                .with_location(location)
                .with_help("the element and its children are skipped"),
        );
        return None;
    };

    let kind = read_kind(type_name, object, &location, collector);
    let reference_point = object
        .get("referencePoint")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let bounds = match read_bounds(object, reference_point, header) {
        Some(bounds) => bounds,
        None => {
            collector.emit(
                Diagnostic::warning("element has no usable geometry")
                    .with_code(ErrorCode::E103)
                    .with_location(location.clone())
                    .with_help("expected `bounds`, `geometricBounds`, or `position` with `size`"),
            );
            Bounds::default()
        }
    };

    let name = string_field(object, "name");
    let explicit_tag = name
        .as_deref()
        .and_then(|name| read_explicit_tag(name, &location, collector))
        .or_else(|| read_prefix_mark(object, &location, collector));

    let source_id = string_field(object, "id").filter(|id| !id.trim().is_empty());
    let children = read_children(object, source_id.as_deref(), &location, header, collector);

    Some(RawElement {
        source_id,
        kind,
        name,
        content: string_field(object, "content"),
        bounds,
        reference_point,
        declared_parent: string_field(object, "parentId"),
        explicit_tag,
        children,
        location,
    })
}

fn read_kind(
    type_name: &str,
    object: &Map<String, Value>,
    location: &str,
    collector: &mut DiagnosticCollector,
) -> ElementKind {
    let kind = type_name.parse().unwrap_or_else(|_| {
        collector.emit(
            Diagnostic::warning(format!("unknown element type `{type_name}`"))
                .with_code(ErrorCode::E102)
                .with_location(location)
                .with_help("the element is kept with kind `other`"),
        );
        ElementKind::Other
    });
    let clipped = object
        .get("clipped")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    match kind {
        ElementKind::Group if clipped => ElementKind::ClipGroup,
        kind => kind,
    }
}

/// Reads nested children, checking each declared `parentId` against nesting.
fn read_children(
    object: &Map<String, Value>,
    parent_source_id: Option<&str>,
    location: &str,
    header: &Header,
    collector: &mut DiagnosticCollector,
) -> Vec<RawElement> {
    let Some(items) = object.get("children").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut children = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let child_location = format!("{location}.children[{index}]");
        let Some(mut child) = read_element(item, child_location, header, collector) else {
            continue;
        };
        let mismatch = child
            .declared_parent
            .as_deref()
            .filter(|declared| Some(*declared) != parent_source_id);
        if let Some(declared) = mismatch {
            collector.emit(
                Diagnostic::warning(format!(
                    "`parentId` `{declared}` disagrees with the enclosing element"
                ))
                .with_code(ErrorCode::E105)
                .with_location(child.location.clone())
                .with_help("nesting decides the path and the declared `parentId` is kept"),
            );
        }
        children.push(child);
    }
    children
}

/// Reads geometry from the first usable source.
///
/// Sources, in order: a canonical `bounds` object, a native
/// `geometricBounds` array, or `position` with `size`.
fn read_bounds(
    object: &Map<String, Value>,
    reference_point: ReferencePoint,
    header: &Header,
) -> Option<Bounds> {
    if let Some(bounds) = object.get("bounds").and_then(bounds_object) {
        return Some(bounds);
    }
    if let Some(native) = object.get("geometricBounds").and_then(rect_array) {
        return Some(normalize(
            native,
            header.native_artboard(),
            header.convention(),
        ));
    }
    let position = object.get("position").and_then(point_object)?;
    let size = object.get("size").and_then(size_object)?;
    Some(from_anchor(position, size, reference_point))
}

fn bounds_object(value: &Value) -> Option<Bounds> {
    let object = value.as_object()?;
    let field = |key: &str| object.get(key).and_then(number);

    let left = field("left")?;
    let top = field("top")?;
    let right = field("right").or_else(|| field("width").map(|w| left + w))?;
    let bottom = field("bottom").or_else(|| field("height").map(|h| top + h))?;
    Some(Bounds::from_edges(left, top, right, bottom))
}

fn point_object(value: &Value) -> Option<Point> {
    let object = value.as_object()?;
    let x = object.get("x").and_then(number)?;
    let y = object.get("y").and_then(number)?;
    Some(Point::new(x, y))
}

fn size_object(value: &Value) -> Option<Size> {
    let object = value.as_object()?;
    let width = object.get("width").and_then(number)?;
    let height = object.get("height").and_then(number)?;
    Some(Size::new(width, height))
}

/// Positions are reported at the element's reference point.
fn from_anchor(position: Point, size: Size, reference_point: ReferencePoint) -> Bounds {
    let (fx, fy) = reference_point.factors();
    let top_left = Point::new(
        position.x() - size.width() * fx,
        position.y() - size.height() * fy,
    );
    Bounds::new_from_top_left(top_left, size)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Resolves a `$key` or `var:key` element name to a type key.
///
/// The full suffix is tried first, then its last `_`-separated segment, so
/// `$guest_photo` resolves to `photo`.
fn read_explicit_tag(
    name: &str,
    location: &str,
    collector: &mut DiagnosticCollector,
) -> Option<TypeKey> {
    let trimmed = name.trim();
    let suffix = TAG_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))?;

    let resolved = resolve_key(suffix);
    if resolved.is_none() {
        collector.emit(
            Diagnostic::warning(format!("`{trimmed}` does not name a known type"))
                .with_code(ErrorCode::E104)
                .with_location(location)
                .with_help("the element is classified heuristically"),
        );
    }
    resolved
}

/// Reads `prefixMark.type`, the extractor's own reading of a name prefix.
///
/// Consulted only when the name itself carries no usable tag.
fn read_prefix_mark(
    object: &Map<String, Value>,
    location: &str,
    collector: &mut DiagnosticCollector,
) -> Option<TypeKey> {
    let declared = object.get("prefixMark")?.get("type")?.as_str()?.trim();
    if declared.is_empty() {
        return None;
    }

    let resolved = resolve_key(declared);
    if resolved.is_none() {
        collector.emit(
            Diagnostic::warning(format!("`prefixMark.type` `{declared}` does not name a known type"))
                .with_code(ErrorCode::E104)
                .with_location(location)
                .with_help("the element is classified heuristically"),
        );
    }
    resolved
}

fn resolve_key(key: &str) -> Option<TypeKey> {
    key.parse::<TypeKey>().ok().or_else(|| {
        key.rsplit_once('_')
            .and_then(|(_, last)| last.parse::<TypeKey>().ok())
    })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use serde_json::json;

    use super::*;
    use crate::header::read_header;

    fn y_down_header() -> Header {
        read_header(json!({ "document": { "width": 800, "height": 600 } }).as_object().unwrap())
    }

    fn read(value: Value) -> (Option<RawElement>, Vec<Diagnostic>) {
        let mut collector = DiagnosticCollector::new();
        let raw = read_element(&value, "elements[0]".to_string(), &y_down_header(), &mut collector);
        (raw, collector.finish())
    }

    #[test]
    fn test_read_text_with_bounds_width() {
        let (raw, diagnostics) = read(json!({
            "id": "t1",
            "type": "TextFrame",
            "content": "张三",
            "bounds": { "left": 10, "top": 20, "width": 60, "height": 24 }
        }));
        let raw = raw.unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(raw.kind, ElementKind::Text);
        assert_eq!(raw.source_id.as_deref(), Some("t1"));
        assert_eq!(raw.content.as_deref(), Some("张三"));
        assert_approx_eq!(f32, raw.bounds.right(), 70.0);
        assert_approx_eq!(f32, raw.bounds.bottom(), 44.0);
    }

    #[test]
    fn test_read_geometric_bounds_y_up() {
        let header = read_header(
            json!({ "document": { "artboardRect": [0, 600, 800, 0] } })
                .as_object()
                .unwrap(),
        );
        let mut collector = DiagnosticCollector::new();
        let raw = read_element(
            &json!({ "type": "path", "geometricBounds": [100, 550, 300, 500] }),
            "elements[0]".to_string(),
            &header,
            &mut collector,
        )
        .unwrap();

        assert_approx_eq!(f32, raw.bounds.top(), 50.0);
        assert_approx_eq!(f32, raw.bounds.height(), 50.0);
        assert_approx_eq!(f32, raw.bounds.width(), 200.0);
    }

    #[test]
    fn test_read_position_uses_reference_point() {
        let (raw, _) = read(json!({
            "type": "image",
            "referencePoint": "center",
            "position": { "x": 100, "y": 100 },
            "size": { "width": 40, "height": 20 }
        }));
        let raw = raw.unwrap();

        assert_eq!(raw.reference_point, ReferencePoint::Center);
        assert_approx_eq!(f32, raw.bounds.left(), 80.0);
        assert_approx_eq!(f32, raw.bounds.top(), 90.0);
    }

    #[test]
    fn test_read_not_an_object() {
        let (raw, diagnostics) = read(json!(42));
        assert!(raw.is_none());
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
        assert!(diagnostics[0].severity().is_error());
    }

    #[test]
    fn test_read_missing_type_skips_subtree() {
        let (raw, diagnostics) = read(json!({
            "children": [{ "type": "text", "bounds": { "left": 0, "top": 0, "right": 1, "bottom": 1 } }]
        }));
        assert!(raw.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_read_unknown_kind_and_missing_geometry() {
        let (raw, diagnostics) = read(json!({ "type": "MeshItem" }));
        let raw = raw.unwrap();

        assert_eq!(raw.kind, ElementKind::Other);
        assert_eq!(raw.bounds, Bounds::default());
        let codes: Vec<_> = diagnostics.iter().filter_map(Diagnostic::code).collect();
        assert_eq!(codes, vec![ErrorCode::E102, ErrorCode::E103]);
        assert!(diagnostics.iter().all(|d| d.severity().is_warning()));
    }

    #[test]
    fn test_read_clipped_group() {
        let (raw, _) = read(json!({
            "type": "GroupItem",
            "clipped": true,
            "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
        }));
        assert_eq!(raw.unwrap().kind, ElementKind::ClipGroup);
    }

    #[test]
    fn test_read_explicit_tags() {
        let mut collector = DiagnosticCollector::new();
        assert_eq!(read_explicit_tag("$name", "x", &mut collector), Some(TypeKey::Name));
        assert_eq!(read_explicit_tag("var:avatar", "x", &mut collector), Some(TypeKey::Avatar));
        assert_eq!(read_explicit_tag("$guest_photo", "x", &mut collector), Some(TypeKey::Photo));
        assert_eq!(
            read_explicit_tag("$event_title", "x", &mut collector),
            Some(TypeKey::EventTitle)
        );
        assert_eq!(read_explicit_tag("Group 12", "x", &mut collector), None);
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_read_unknown_explicit_tag_warns() {
        let mut collector = DiagnosticCollector::new();
        assert_eq!(read_explicit_tag("$sparkle", "x", &mut collector), None);
        let diagnostics = collector.finish();
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_prefix_mark_type_tags_element() {
        let (raw, diagnostics) = read(json!({
            "type": "TextFrame",
            "name": "headline",
            "content": "欢迎",
            "prefixMark": { "type": "event_title", "replaceable": true },
            "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(raw.unwrap().explicit_tag, Some(TypeKey::EventTitle));
    }

    #[test]
    fn test_name_tag_wins_over_prefix_mark() {
        let (raw, _) = read(json!({
            "type": "TextFrame",
            "name": "$phone",
            "prefixMark": { "type": "email" },
            "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
        }));
        assert_eq!(raw.unwrap().explicit_tag, Some(TypeKey::Phone));

        let (raw, diagnostics) = read(json!({
            "type": "TextFrame",
            "prefixMark": { "type": "sparkle" },
            "bounds": { "left": 0, "top": 0, "right": 10, "bottom": 10 }
        }));
        assert_eq!(raw.unwrap().explicit_tag, None);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_read_nested_parent_mismatch() {
        let (raw, diagnostics) = read(json!({
            "id": "g1",
            "type": "group",
            "bounds": { "left": 0, "top": 0, "right": 100, "bottom": 100 },
            "children": [
                { "type": "text", "parentId": "g1", "bounds": { "left": 0, "top": 0, "right": 1, "bottom": 1 } },
                { "type": "text", "parentId": "g9", "bounds": { "left": 0, "top": 0, "right": 1, "bottom": 1 } }
            ]
        }));
        let raw = raw.unwrap();

        assert_eq!(raw.children.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E105));
        assert_eq!(diagnostics[0].location(), Some("elements[0].children[1]"));
        assert_eq!(raw.children[1].declared_parent.as_deref(), Some("g9"));
    }

    #[test]
    fn test_extent_covers_children() {
        let (raw, _) = read(json!({
            "type": "group",
            "bounds": { "left": 0, "top": 0, "right": 50, "bottom": 50 },
            "children": [
                { "type": "text", "bounds": { "left": 0, "top": 0, "right": 90, "bottom": 20 } }
            ]
        }));
        let (right, bottom) = raw.unwrap().extent();
        assert_approx_eq!(f32, right, 90.0);
        assert_approx_eq!(f32, bottom, 50.0);
    }
}
