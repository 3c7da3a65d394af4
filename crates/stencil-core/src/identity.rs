//! Element id generation.
//!
//! Two strategies are available through [`IdMode`]:
//!
//! - [`IdMode::ContentHash`] derives the id from kind, geometry, layer,
//!   structural path and leading text content. Re-parsing an unchanged
//!   document yields identical ids.
//! - [`IdMode::Sequential`] numbers elements per kind in visiting order.
//!
//! A generator is scoped to one detection pass and passed explicitly, so
//! concurrent passes never share counters. Hash collisions are not resolved
//! here; the integrity checker reports them as duplicate ids.

use std::collections::HashMap;

use serde::Deserialize;

use crate::element::{Element, ElementKind};

/// Number of leading content characters that contribute to a content hash.
const CONTENT_PREFIX_CHARS: usize = 20;

/// Id generation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdMode {
    #[default]
    ContentHash,
    Sequential,
}

/// Which elements receive a generated id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdReassign {
    /// Keep extractor-supplied ids; generate only where none was given.
    #[default]
    Missing,
    /// Ignore extractor-supplied ids and generate every id.
    All,
}

/// DJB2 string hash masked to 31 bits, over UTF-16 code units.
///
/// # Examples
///
/// ```
/// # use stencil_core::identity::djb2;
/// assert_eq!(djb2(""), 5381);
/// assert_eq!(djb2("a"), 5381 * 33 + 97);
/// ```
pub fn djb2(input: &str) -> u32 {
    input.encode_utf16().fold(5381u32, |hash, unit| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(unit)) & 0x7FFF_FFFF
    })
}

/// Builds the hash key for an element.
///
/// The key joins kind, rounded position, rounded size, layer index, path and,
/// for text, the first characters of content.
fn hash_key(element: &Element) -> String {
    let position = element.position();
    let size = element.size();
    let layer = element.path().layer().unwrap_or(0);
    let content: String = match element.kind() {
        ElementKind::Text => element
            .content()
            .unwrap_or_default()
            .chars()
            .take(CONTENT_PREFIX_CHARS)
            .collect(),
        _ => String::new(),
    };
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        element.kind().as_str(),
        position.x().round() as i64,
        position.y().round() as i64,
        size.width().round() as i64,
        size.height().round() as i64,
        layer,
        element.path(),
        content
    )
}

/// Request-scoped id generator.
///
/// # Examples
///
/// ```
/// # use stencil_core::element::{Element, ElementKind, ElementPath};
/// # use stencil_core::geometry::Bounds;
/// # use stencil_core::identity::{IdMode, IdentityGenerator};
/// let element = Element::new(
///     "",
///     ElementKind::Text,
///     Bounds::from_edges(0.0, 0.0, 80.0, 20.0),
///     ElementPath::root(0).child(0),
/// )
/// .with_content("Hello");
///
/// let mut first = IdentityGenerator::new(IdMode::ContentHash);
/// let mut second = IdentityGenerator::new(IdMode::ContentHash);
/// assert_eq!(first.generate(&element), second.generate(&element));
///
/// let mut sequential = IdentityGenerator::new(IdMode::Sequential);
/// assert_eq!(sequential.generate(&element), "text_0");
/// assert_eq!(sequential.generate(&element), "text_1");
/// ```
#[derive(Debug, Default)]
pub struct IdentityGenerator {
    mode: IdMode,
    counters: HashMap<ElementKind, usize>,
}

impl IdentityGenerator {
    pub fn new(mode: IdMode) -> Self {
        Self {
            mode,
            counters: HashMap::new(),
        }
    }

    pub fn mode(&self) -> IdMode {
        self.mode
    }

    /// Produces an id for `element` according to the configured mode.
    pub fn generate(&mut self, element: &Element) -> String {
        let kind = element.kind().as_str();
        match self.mode {
            IdMode::ContentHash => format!("{kind}_{:x}", djb2(&hash_key(element))),
            IdMode::Sequential => {
                let counter = self.counters.entry(element.kind()).or_insert(0);
                let id = format!("{kind}_{counter}");
                *counter += 1;
                id
            }
        }
    }

    /// Clears sequential counters at the start of a new pass.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}
