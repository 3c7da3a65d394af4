//! The static catalog of composite patterns.
//!
//! Definitions are tested in catalog order and the first match wins, so more
//! specific patterns come first.

use std::fmt;

use serde::Serialize;

use stencil_core::semantic::{Category, TypeKey};

/// Expected arrangement of a pattern's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Children are stacked; y varies more than x.
    Vertical,
    /// Children sit side by side; x varies more than y.
    Horizontal,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Vertical => write!(f, "vertical"),
            Layout::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// A named composite of tagged children.
///
/// `prefix` is the stem used in variable keys, so a guest card's name field
/// becomes `guest.name` or `guest_0.name`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDefinition {
    pub id: &'static str,
    pub prefix: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub required: &'static [TypeKey],
    pub optional: &'static [TypeKey],
    pub repeatable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_fields: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl PatternDefinition {
    /// Highest score a match of this definition can reach.
    pub fn max_score(&self) -> usize {
        self.required.len() * 2 + self.optional.len() + usize::from(self.layout.is_some())
    }
}

pub static CATALOG: [PatternDefinition; 8] = [
    PatternDefinition {
        id: "GUEST_CARD",
        prefix: "guest",
        label: "Guest Card",
        category: Category::Person,
        required: &[TypeKey::Avatar, TypeKey::Name],
        optional: &[TypeKey::Title, TypeKey::Text, TypeKey::Phone],
        repeatable: true,
        min_fields: None,
        layout: Some(Layout::Vertical),
    },
    PatternDefinition {
        id: "CONTACT_INFO",
        prefix: "contact",
        label: "Contact Info",
        category: Category::Contact,
        required: &[TypeKey::Phone],
        optional: &[
            TypeKey::Email,
            TypeKey::Wechat,
            TypeKey::Address,
            TypeKey::Name,
            TypeKey::Qrcode,
        ],
        repeatable: false,
        min_fields: Some(2),
        layout: None,
    },
    PatternDefinition {
        id: "SPEAKER_CARD",
        prefix: "speaker",
        label: "Speaker Card",
        category: Category::Person,
        required: &[TypeKey::Name, TypeKey::Title],
        optional: &[TypeKey::Avatar, TypeKey::Text],
        repeatable: true,
        min_fields: None,
        layout: Some(Layout::Vertical),
    },
    PatternDefinition {
        id: "SCHEDULE_ITEM",
        prefix: "schedule",
        label: "Schedule Item",
        category: Category::Temporal,
        required: &[TypeKey::Time],
        optional: &[TypeKey::Text, TypeKey::Name, TypeKey::Title],
        repeatable: true,
        min_fields: Some(2),
        layout: Some(Layout::Horizontal),
    },
    PatternDefinition {
        id: "EVENT_INFO",
        prefix: "event",
        label: "Event Info",
        category: Category::Event,
        required: &[TypeKey::EventTitle],
        optional: &[
            TypeKey::Date,
            TypeKey::Time,
            TypeKey::Address,
            TypeKey::Slogan,
        ],
        repeatable: false,
        min_fields: Some(2),
        layout: Some(Layout::Vertical),
    },
    PatternDefinition {
        id: "PRODUCT_CARD",
        prefix: "product",
        label: "Product Card",
        category: Category::Commerce,
        required: &[TypeKey::Photo, TypeKey::Price],
        optional: &[TypeKey::Text, TypeKey::Percent],
        repeatable: true,
        min_fields: None,
        layout: Some(Layout::Vertical),
    },
    PatternDefinition {
        id: "PRICE_TAG",
        prefix: "price_tag",
        label: "Price Tag",
        category: Category::Commerce,
        required: &[TypeKey::Price],
        optional: &[TypeKey::Percent, TypeKey::Text],
        repeatable: true,
        min_fields: Some(2),
        layout: Some(Layout::Horizontal),
    },
    PatternDefinition {
        id: "SPONSOR",
        prefix: "sponsor",
        label: "Sponsor",
        category: Category::Media,
        required: &[TypeKey::Logo],
        optional: &[TypeKey::Text],
        repeatable: true,
        min_fields: Some(2),
        layout: None,
    },
];

/// Looks up a definition by id.
pub fn find(id: &str) -> Option<&'static PatternDefinition> {
    CATALOG.iter().find(|definition| definition.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_ids_and_prefixes_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|d| d.id).collect();
        let prefixes: HashSet<_> = CATALOG.iter().map(|d| d.prefix).collect();
        assert_eq!(ids.len(), CATALOG.len());
        assert_eq!(prefixes.len(), CATALOG.len());
    }

    #[test]
    fn test_required_and_optional_do_not_overlap() {
        for definition in &CATALOG {
            for key in definition.required {
                assert!(
                    !definition.optional.contains(key),
                    "{} lists {key} twice",
                    definition.id
                );
            }
        }
    }

    #[test]
    fn test_max_score() {
        let guest = find("GUEST_CARD").unwrap();
        assert_eq!(guest.max_score(), 2 * 2 + 3 + 1);
        let contact = find("CONTACT_INFO").unwrap();
        assert_eq!(contact.max_score(), 2 + 5);
        assert!(find("NOPE").is_none());
    }
}
