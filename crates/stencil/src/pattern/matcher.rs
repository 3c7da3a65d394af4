//! Container-local pattern matching.

use std::collections::HashMap;

use log::trace;

use stencil_core::{
    element::{Document, Element, ElementPath},
    semantic::TypeKey,
};

use crate::{
    candidate::Candidate,
    pattern::catalog::{CATALOG, Layout, PatternDefinition},
};

/// A container that matched a definition, before repeat ordering and naming.
#[derive(Debug, Clone)]
pub(crate) struct RawMatch<'a> {
    pub definition: &'static PatternDefinition,
    pub group: &'a Element,
    /// Bound fields in definition order, as indices into the candidate list.
    pub fields: Vec<(TypeKey, usize)>,
    pub confidence: f32,
}

/// Result of scanning every container in a document.
#[derive(Debug, Default)]
pub(crate) struct Scan<'a> {
    pub matches: Vec<RawMatch<'a>>,
    /// Containers with tagged children that matched no definition.
    pub unmatched: usize,
}

/// Tests every container against the catalog.
///
/// Only a container's direct children take part. Each container matches at
/// most one definition: the first in catalog order whose requirements hold.
pub(crate) fn scan<'a>(document: &'a Document, candidates: &[Candidate<'a>]) -> Scan<'a> {
    let by_path: HashMap<&ElementPath, usize> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (candidate.element.path(), index))
        .collect();

    let mut scan = Scan::default();
    for container in document.elements().filter(|e| e.kind().is_container()) {
        let mut by_type: HashMap<TypeKey, Vec<usize>> = HashMap::new();
        for child in container.children() {
            if let Some(&index) = by_path.get(child.path()) {
                by_type
                    .entry(candidates[index].tag.primary_type())
                    .or_default()
                    .push(index);
            }
        }
        if by_type.is_empty() {
            continue;
        }

        match CATALOG
            .iter()
            .find_map(|definition| try_match(definition, container, &by_type))
        {
            Some(raw) => {
                trace!(
                    group = container.id(),
                    pattern = raw.definition.id,
                    confidence = raw.confidence;
                    "Container matched"
                );
                scan.matches.push(raw);
            }
            None => scan.unmatched += 1,
        }
    }
    scan
}

fn try_match<'a>(
    definition: &'static PatternDefinition,
    container: &'a Element,
    by_type: &HashMap<TypeKey, Vec<usize>>,
) -> Option<RawMatch<'a>> {
    let first = |key: &TypeKey| by_type.get(key).and_then(|indices| indices.first().copied());

    let mut fields = Vec::with_capacity(definition.required.len() + definition.optional.len());
    for key in definition.required {
        fields.push((*key, first(key)?));
    }
    let optional_hits = definition
        .optional
        .iter()
        .filter_map(|key| first(key).map(|index| (*key, index)))
        .collect::<Vec<_>>();

    let present = definition.required.len() + optional_hits.len();
    if definition.min_fields.is_some_and(|min_fields| present < min_fields) {
        return None;
    }

    let layout_bonus = definition
        .layout
        .is_some_and(|layout| layout_holds(layout, container.children()));
    let score = definition.required.len() * 2 + optional_hits.len() + usize::from(layout_bonus);
    let confidence = score as f32 / definition.max_score() as f32;

    fields.extend(optional_hits);
    Some(RawMatch {
        definition,
        group: container,
        fields,
        confidence,
    })
}

/// Checks a layout hint against the spread of child positions.
///
/// Fewer than two children always satisfy the hint.
pub(crate) fn layout_holds(layout: Layout, children: &[Element]) -> bool {
    if children.len() < 2 {
        return true;
    }
    let xs: Vec<f32> = children.iter().map(|c| c.position().x()).collect();
    let ys: Vec<f32> = children.iter().map(|c| c.position().y()).collect();
    let (var_x, var_y) = (variance(&xs), variance(&ys));
    match layout {
        Layout::Vertical => var_y > var_x,
        Layout::Horizontal => var_x > var_y,
    }
}

fn variance(values: &[f32]) -> f32 {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n
}
