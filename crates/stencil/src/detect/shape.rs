//! Shape classification for path and compound path elements.
//!
//! Most vector shapes are decoration. A shape is tagged only when its name
//! says what it is or its geometry is unmistakable, and it becomes a variable
//! only in the first case.

use stencil_core::{
    element::Element,
    geometry::Size,
    semantic::{Tag, TypeKey},
};

const NAME_HINTS: &[(&str, TypeKey)] = &[
    ("divider", TypeKey::Line),
    ("line", TypeKey::Line),
    ("分割线", TypeKey::Line),
    ("circle", TypeKey::Circle),
    ("dot", TypeKey::Circle),
    ("圆", TypeKey::Circle),
    ("background", TypeKey::Background),
    ("bg", TypeKey::Background),
    ("背景", TypeKey::Background),
];

const NAME_HINT_CONFIDENCE: f32 = 0.9;
const GEOMETRY_CONFIDENCE: f32 = 0.8;

/// Aspect ratio beyond which a thin shape reads as a rule line.
const LINE_RATIO: f32 = 10.0;
const LINE_MAX_THICKNESS: f32 = 5.0;
/// Share of the artboard area a background must cover.
const BACKGROUND_COVERAGE: f32 = 0.9;

/// Returns the type named by a shape's element name, if any.
pub(crate) fn name_hint(element: &Element) -> Option<TypeKey> {
    let lowered = element.name()?.to_lowercase();
    NAME_HINTS
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, key)| *key)
}

/// Classifies a shape against the artboard it sits on.
pub(crate) fn classify(element: &Element, artboard: Size) -> Vec<Tag> {
    let mut hits = Vec::new();
    if let Some(key) = name_hint(element) {
        hits.push(Tag::new(key, NAME_HINT_CONFIDENCE));
    }

    let size = element.size();
    let thin_side = size.width().min(size.height());
    let extreme = size
        .aspect_ratio()
        .is_some_and(|ratio| ratio >= LINE_RATIO || ratio <= 1.0 / LINE_RATIO);
    let hairline = size.height() == 0.0 && size.width() > 0.0;
    if (extreme || hairline) && thin_side <= LINE_MAX_THICKNESS {
        hits.push(Tag::new(TypeKey::Line, GEOMETRY_CONFIDENCE));
    }

    let artboard_area = artboard.width() * artboard.height();
    if artboard_area > 0.0
        && size.width() * size.height() >= artboard_area * BACKGROUND_COVERAGE
    {
        hits.push(Tag::new(TypeKey::Background, GEOMETRY_CONFIDENCE));
    }
    hits
}
