//! Composite pattern detection.
//!
//! A pattern is a container whose direct children carry a known set of tags,
//! such as a guest card made of an avatar, a name and a title. Matching runs
//! in three steps:
//!
//! 1. [`matcher`] tests every container against the [`catalog`].
//! 2. [`repeat`] orders matches of the same pattern into a repeat group.
//! 3. The namer turns the bound fields into keyed records.

pub mod catalog;
pub(crate) mod matcher;
pub(crate) mod repeat;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use stencil_core::{geometry::Point, variable::VariableRecord};

use catalog::PatternDefinition;
use matcher::RawMatch;

/// A container that matched a catalog pattern.
///
/// Every required key of the definition is present in `fields`, keyed by the
/// type key's name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub pattern_id: &'static str,
    pub label: &'static str,
    pub group_id: String,
    pub fields: IndexMap<String, VariableRecord>,
    pub repeat_index: usize,
    pub repeat_total: usize,
    pub confidence: f32,
}

/// A raw match placed in its repeat group.
#[derive(Debug, Clone)]
pub(crate) struct Placed<'a> {
    pub raw: RawMatch<'a>,
    pub repeat_index: usize,
    pub repeat_total: usize,
}

impl Placed<'_> {
    pub fn definition(&self) -> &'static PatternDefinition {
        self.raw.definition
    }

    /// Whether fields are named with the repeat index.
    pub fn is_indexed(&self) -> bool {
        self.repeat_total > 1
    }
}

/// Groups matches by pattern and assigns repeat indices.
///
/// Groups appear in order of their first match in the document, and each
/// group is listed in repeat order.
pub(crate) fn arrange<'a>(matches: Vec<RawMatch<'a>>, row_tolerance: f32) -> Vec<Placed<'a>> {
    let mut groups: IndexMap<&'static str, Vec<RawMatch<'a>>> = IndexMap::new();
    for raw in matches {
        groups.entry(raw.definition.id).or_default().push(raw);
    }

    let mut placed = Vec::new();
    for (pattern_id, group) in groups {
        let total = group.len();
        if total > 1 {
            if group[0].definition.repeatable {
                debug!(pattern = pattern_id, count = total; "Repeat group");
            } else {
                warn!(pattern = pattern_id, count = total; "Pattern is not repeatable but matched more than once");
            }
        }

        let anchors: Vec<(Point, &str)> = group
            .iter()
            .map(|raw| (raw.group.position(), raw.group.id()))
            .collect();
        let indices = repeat::repeat_indices(&anchors, row_tolerance);

        let mut ordered: Vec<(usize, RawMatch<'a>)> = indices.into_iter().zip(group).collect();
        ordered.sort_by_key(|(index, _)| *index);
        placed.extend(ordered.into_iter().map(|(repeat_index, raw)| Placed {
            raw,
            repeat_index,
            repeat_total: total,
        }));
    }
    placed
}
