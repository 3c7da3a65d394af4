//! Multi-tag detection.
//!
//! Every element is classified independently into zero or more tags, which
//! are condensed into a [`VariableTag`]. An explicit name tag short-circuits
//! the heuristics.

mod image;
mod shape;
mod text;

use log::{debug, trace};

use stencil_core::{
    element::{Document, Element, ElementKind},
    geometry::Size,
    semantic::VariableTag,
};

/// Classifies a single element.
///
/// Returns `None` for elements with nothing to detect: containers, symbols,
/// blank text and untagged shapes.
///
/// # Examples
///
/// ```
/// # use stencil::detect::classify;
/// # use stencil_core::element::{Element, ElementKind, ElementPath};
/// # use stencil_core::geometry::{Bounds, Size};
/// # use stencil_core::semantic::TypeKey;
/// let phone = Element::new(
///     "text_1",
///     ElementKind::Text,
///     Bounds::from_edges(0.0, 0.0, 200.0, 30.0),
///     ElementPath::root(0).child(0),
/// )
/// .with_content("13812345678");
///
/// let tag = classify(&phone, Size::new(1080.0, 1920.0)).unwrap();
/// assert_eq!(tag.primary_type(), TypeKey::Phone);
/// ```
pub fn classify(element: &Element, artboard: Size) -> Option<VariableTag> {
    if let Some(key) = element.explicit_name_tag() {
        return Some(VariableTag::explicit(key));
    }

    let hits = match element.kind() {
        ElementKind::Text => text::classify(element.content().unwrap_or_default()),
        ElementKind::ImageEmbedded | ElementKind::ImageLinked => {
            image::classify(element.name(), element.size())
        }
        ElementKind::Path | ElementKind::CompoundPath => shape::classify(element, artboard),
        ElementKind::Group | ElementKind::ClipGroup | ElementKind::Symbol | ElementKind::Other => {
            Vec::new()
        }
    };
    VariableTag::from_hits(&hits)
}

/// Returns true when a tagged element should be exposed as a variable.
///
/// Shapes qualify only through an explicit tag or a name hint; geometry alone
/// marks them as decoration.
pub(crate) fn is_variable(element: &Element) -> bool {
    if element.explicit_name_tag().is_some() {
        return true;
    }
    if element.variable().is_none() {
        return false;
    }
    match element.kind() {
        ElementKind::Text | ElementKind::ImageEmbedded | ElementKind::ImageLinked => true,
        ElementKind::Path | ElementKind::CompoundPath => shape::name_hint(element).is_some(),
        ElementKind::Group | ElementKind::ClipGroup | ElementKind::Symbol | ElementKind::Other => {
            false
        }
    }
}

/// Returns a copy of the document with every element's tag set.
pub fn annotate(document: Document) -> Document {
    let artboard = document.artboard_size();
    let mut tagged = 0usize;
    let document = document.map_elements(|element| {
        let tag = classify(&element, artboard);
        if let Some(tag) = &tag {
            tagged += 1;
            trace!(
                id = element.id(),
                primary:% = tag.primary_type(),
                confidence = tag.confidence();
                "Element tagged"
            );
        }
        element.with_variable(tag)
    });
    debug!(tagged; "Detection finished");
    document
}

#[cfg(test)]
mod tests {
    use stencil_core::{
        element::{ElementPath, Layer},
        geometry::Bounds,
        semantic::TypeKey,
    };

    use super::*;

    fn element(kind: ElementKind, index: usize) -> Element {
        Element::new(
            format!("e{index}"),
            kind,
            Bounds::from_edges(0.0, 0.0, 100.0, 80.0),
            ElementPath::root(0).child(index),
        )
    }

    #[test]
    fn test_explicit_tag_short_circuits() {
        let text = element(ElementKind::Text, 0)
            .with_content("13812345678")
            .with_explicit_tag(TypeKey::Name);
        let tag = classify(&text, Size::new(1000.0, 1000.0)).unwrap();

        assert_eq!(tag.primary_type(), TypeKey::Name);
        assert_eq!(tag.all_tags(), &[TypeKey::Name]);
    }

    #[test]
    fn test_containers_are_not_classified() {
        let group = element(ElementKind::Group, 0);
        assert!(classify(&group, Size::new(1000.0, 1000.0)).is_none());
    }

    #[test]
    fn test_annotate_and_variable_selection() {
        let document = Document::new(
            "doc",
            Size::new(1000.0, 1000.0),
            vec![Layer::new(
                "Layer 1",
                vec![
                    element(ElementKind::Text, 0).with_content("张三"),
                    element(ElementKind::Text, 1).with_content("  "),
                    element(ElementKind::Path, 2),
                    element(ElementKind::Path, 3).with_name("divider"),
                    Element::new(
                        "rule",
                        ElementKind::Path,
                        Bounds::from_edges(0.0, 0.0, 500.0, 2.0),
                        ElementPath::root(0).child(4),
                    ),
                ],
            )],
        );

        let document = annotate(document);
        let elements: Vec<_> = document.elements().collect();

        assert_eq!(
            elements[0].variable().map(VariableTag::primary_type),
            Some(TypeKey::Name)
        );
        assert!(elements[1].variable().is_none());
        assert!(elements[2].variable().is_none());
        assert_eq!(
            elements[4].variable().map(VariableTag::primary_type),
            Some(TypeKey::Line)
        );

        let selected: Vec<bool> = elements.iter().map(|e| is_variable(e)).collect();
        assert_eq!(selected, vec![true, false, false, true, false]);
    }
}
