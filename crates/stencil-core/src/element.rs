//! The extracted element tree.
//!
//! A [`Document`] is a forest with one tree per [`Layer`]. Each [`Element`]
//! carries canonical geometry (see [`crate::geometry`]), its position in the
//! tree as an [`ElementPath`], and optionally the [`VariableTag`] assigned by
//! detection.
//!
//! Trees are built once per source document and treated as immutable
//! snapshots. Stages that annotate a tree consume it and return a new one.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

use crate::{
    geometry::{Bounds, Point, ReferencePoint, Size},
    semantic::{TypeKey, VariableTag},
};

/// The closed set of element kinds a design document contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    ImageEmbedded,
    ImageLinked,
    Path,
    CompoundPath,
    Group,
    ClipGroup,
    Symbol,
    Other,
}

impl ElementKind {
    /// Returns the lowercase name used in ids and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ImageEmbedded => "image_embedded",
            Self::ImageLinked => "image_linked",
            Self::Path => "path",
            Self::CompoundPath => "compound_path",
            Self::Group => "group",
            Self::ClipGroup => "clip_group",
            Self::Symbol => "symbol",
            Self::Other => "other",
        }
    }

    /// Groups and clip groups hold child elements that can form patterns.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Group | Self::ClipGroup)
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::ImageEmbedded | Self::ImageLinked)
    }

    pub fn is_shape(self) -> bool {
        matches!(self, Self::Path | Self::CompoundPath)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element kind `{0}`")]
pub struct ParseElementKindError(String);

impl FromStr for ElementKind {
    type Err = ParseElementKindError;

    /// Accepts canonical names as well as the item class names design tools
    /// export (`TextFrame`, `PlacedItem`, `RasterItem`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "text" | "textframe" => Self::Text,
            "image_embedded" | "image" | "rasteritem" => Self::ImageEmbedded,
            "image_linked" | "placeditem" => Self::ImageLinked,
            "path" | "pathitem" => Self::Path,
            "compound_path" | "compoundpathitem" => Self::CompoundPath,
            "group" | "groupitem" => Self::Group,
            "clip_group" | "clipgroup" => Self::ClipGroup,
            "symbol" | "symbolitem" => Self::Symbol,
            "other" => Self::Other,
            _ => return Err(ParseElementKindError(s.to_string())),
        };
        Ok(kind)
    }
}

/// Structural address of an element: the layer index followed by child
/// indices, rendered as `"layer/child/child"`.
///
/// # Examples
///
/// ```
/// # use stencil_core::element::ElementPath;
/// let path = ElementPath::root(1).child(0).child(3);
/// assert_eq!(path.to_string(), "1/0/3");
/// assert_eq!("1/0/3".parse::<ElementPath>().unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    /// Path of a layer itself.
    pub fn root(layer: usize) -> Self {
        Self(vec![layer])
    }

    /// Returns the path of the `index`-th child of this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn layer(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Child indices below the layer.
    pub fn child_indices(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Number of child steps below the layer.
    pub fn depth(&self) -> usize {
        self.child_indices().len()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// Error returned when a path string contains a non-numeric segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid element path `{0}`")]
pub struct ParseElementPathError(String);

impl FromStr for ElementPath {
    type Err = ParseElementPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseElementPathError(s.to_string()));
        }
        trimmed
            .split('/')
            .map(|segment| segment.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ParseElementPathError(s.to_string()))
    }
}

impl Serialize for ElementPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// One node of the extracted document tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: String,
    kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    bounds: Bounds,
    reference_point: ReferencePoint,
    parent_id: Option<String>,
    path: ElementPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    explicit_name_tag: Option<TypeKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable: Option<VariableTag>,
    children: Vec<Element>,
}

impl Element {
    /// Creates a leaf element with top-left reference point and no parent.
    pub fn new(id: impl Into<String>, kind: ElementKind, bounds: Bounds, path: ElementPath) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            content: None,
            bounds,
            reference_point: ReferencePoint::default(),
            parent_id: None,
            path,
            explicit_name_tag: None,
            variable: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_reference_point(mut self, reference_point: ReferencePoint) -> Self {
        self.reference_point = reference_point;
        self
    }

    pub fn with_parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_explicit_tag(mut self, key: TypeKey) -> Self {
        self.explicit_name_tag = Some(key);
        self
    }

    pub fn with_variable(mut self, variable: Option<VariableTag>) -> Self {
        self.variable = variable;
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the id, used when ids are (re)generated after construction.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn size(&self) -> Size {
        self.bounds.to_size()
    }

    pub fn reference_point(&self) -> ReferencePoint {
        self.reference_point
    }

    /// The element's position at its reference point.
    pub fn position(&self) -> Point {
        self.bounds.anchor(self.reference_point)
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    pub fn explicit_name_tag(&self) -> Option<TypeKey> {
        self.explicit_name_tag
    }

    pub fn variable(&self) -> Option<&VariableTag> {
        self.variable.as_ref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Consumes the element, applying `f` to it and then to every descendant,
    /// parents before children.
    pub fn map_tree<F>(mut self, f: &mut F) -> Self
    where
        F: FnMut(Element) -> Element,
    {
        let children = std::mem::take(&mut self.children);
        let mut mapped = f(self);
        mapped.children = children.into_iter().map(|child| child.map_tree(f)).collect();
        mapped
    }

    /// Depth-first, pre-order iterator over this element and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A top-level layer holding one ordered list of root elements.
#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    name: String,
    elements: Vec<Element>,
}

impl Layer {
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// A parsed design document: the artboard size and the layer forest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    name: String,
    artboard_size: Size,
    layers: Vec<Layer>,
}

impl Document {
    pub fn new(name: impl Into<String>, artboard_size: Size, layers: Vec<Layer>) -> Self {
        Self {
            name: name.into(),
            artboard_size,
            layers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical size of the active artboard.
    pub fn artboard_size(&self) -> Size {
        self.artboard_size
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Iterates every element in layer order, then document order within a
    /// layer (depth-first, parents before children).
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.layers
            .iter()
            .flat_map(|layer| layer.elements.iter())
            .flat_map(Element::descendants)
    }

    /// Total number of elements across all layers.
    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Resolves a structural path by walking layer and child indices.
    pub fn element_at(&self, path: &ElementPath) -> Option<&Element> {
        let layer = self.layers.get(path.layer()?)?;
        let (first, rest) = path.child_indices().split_first()?;
        let mut element = layer.elements.get(*first)?;
        for index in rest {
            element = element.children.get(*index)?;
        }
        Some(element)
    }

    /// Consumes the document, applying `f` to every element, parents first.
    pub fn map_elements<F>(self, mut f: F) -> Self
    where
        F: FnMut(Element) -> Element,
    {
        let layers = self
            .layers
            .into_iter()
            .map(|layer| Layer {
                name: layer.name,
                elements: layer
                    .elements
                    .into_iter()
                    .map(|element| element.map_tree(&mut f))
                    .collect(),
            })
            .collect();
        Self {
            name: self.name,
            artboard_size: self.artboard_size,
            layers,
        }
    }
}
