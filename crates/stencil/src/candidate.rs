//! Selection of the elements that become variables.

use log::trace;

use stencil_core::{
    element::{Document, Element},
    semantic::VariableTag,
    variable::HierarchyRole,
};

use crate::{detect, hints::Hints};

/// A tagged element chosen as a variable, borrowed from an annotated
/// document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub element: &'a Element,
    pub tag: &'a VariableTag,
    pub role: Option<HierarchyRole>,
}

/// Collects variable candidates in document order.
///
/// Confident background and decoration hints drop an element unless it
/// carries an explicit tag.
pub(crate) fn collect<'a>(
    document: &'a Document,
    hints: &Hints,
    min_confidence: f32,
) -> Vec<Candidate<'a>> {
    document
        .elements()
        .filter(|element| detect::is_variable(element))
        .filter_map(|element| {
            let tag = element.variable()?;
            let explicit = element.explicit_name_tag().is_some();
            if hints.excludes(element.id(), explicit, min_confidence) {
                trace!(id = element.id(); "Excluded by hierarchy hint");
                return None;
            }
            Some(Candidate {
                element,
                tag,
                role: hints.accepted_role(element.id(), min_confidence),
            })
        })
        .collect()
}
