//! Semantic labels attached to elements.
//!
//! A [`TypeKey`] names the kind of content an element holds. The detector
//! produces one or more [`Tag`]s per element and condenses them into a
//! [`VariableTag`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of content an element holds.
///
/// The set is closed; every classifier returns one of these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKey {
    // Text
    Date,
    Time,
    Phone,
    Email,
    Price,
    Percent,
    Title,
    Wechat,
    Address,
    Name,
    EventTitle,
    Slogan,
    Text,
    // Image
    Avatar,
    Qrcode,
    Banner,
    Logo,
    Photo,
    // Shape
    Line,
    Circle,
    Background,
}

impl TypeKey {
    /// Every type key, in declaration order.
    pub const ALL: [TypeKey; 21] = [
        TypeKey::Date,
        TypeKey::Time,
        TypeKey::Phone,
        TypeKey::Email,
        TypeKey::Price,
        TypeKey::Percent,
        TypeKey::Title,
        TypeKey::Wechat,
        TypeKey::Address,
        TypeKey::Name,
        TypeKey::EventTitle,
        TypeKey::Slogan,
        TypeKey::Text,
        TypeKey::Avatar,
        TypeKey::Qrcode,
        TypeKey::Banner,
        TypeKey::Logo,
        TypeKey::Photo,
        TypeKey::Line,
        TypeKey::Circle,
        TypeKey::Background,
    ];

    /// Returns the snake_case key used in variable names and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Price => "price",
            Self::Percent => "percent",
            Self::Title => "title",
            Self::Wechat => "wechat",
            Self::Address => "address",
            Self::Name => "name",
            Self::EventTitle => "event_title",
            Self::Slogan => "slogan",
            Self::Text => "text",
            Self::Avatar => "avatar",
            Self::Qrcode => "qrcode",
            Self::Banner => "banner",
            Self::Logo => "logo",
            Self::Photo => "photo",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Background => "background",
        }
    }

    /// Returns a human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Price => "Price",
            Self::Percent => "Percentage",
            Self::Title => "Job Title",
            Self::Wechat => "WeChat",
            Self::Address => "Address",
            Self::Name => "Name",
            Self::EventTitle => "Event Title",
            Self::Slogan => "Slogan",
            Self::Text => "Text",
            Self::Avatar => "Avatar",
            Self::Qrcode => "QR Code",
            Self::Banner => "Banner",
            Self::Logo => "Logo",
            Self::Photo => "Photo",
            Self::Line => "Line",
            Self::Circle => "Circle",
            Self::Background => "Background",
        }
    }

    /// Returns the category this key belongs to.
    pub fn category(self) -> Category {
        match self {
            Self::Name | Self::Title | Self::Avatar => Category::Person,
            Self::Phone | Self::Email | Self::Wechat | Self::Qrcode => Category::Contact,
            Self::Date | Self::Time => Category::Temporal,
            Self::Price | Self::Percent => Category::Commerce,
            Self::Address => Category::Location,
            Self::EventTitle | Self::Slogan => Category::Event,
            Self::Text => Category::Text,
            Self::Banner | Self::Logo | Self::Photo => Category::Media,
            Self::Line | Self::Circle | Self::Background => Category::Decoration,
        }
    }

    /// Returns true for keys produced by the shape classifier.
    pub fn is_decorative(self) -> bool {
        self.category() == Category::Decoration
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`TypeKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type key `{0}`")]
pub struct ParseTypeKeyError(String);

impl FromStr for TypeKey {
    type Err = ParseTypeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        TypeKey::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == key)
            .ok_or_else(|| ParseTypeKeyError(s.to_string()))
    }
}

/// Coarse grouping of type keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Person,
    Contact,
    Temporal,
    Commerce,
    Location,
    Event,
    Text,
    Media,
    Decoration,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Contact => "contact",
            Self::Temporal => "temporal",
            Self::Commerce => "commerce",
            Self::Location => "location",
            Self::Event => "event",
            Self::Text => "text",
            Self::Media => "media",
            Self::Decoration => "decoration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classifier hit: a type key with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tag {
    pub key: TypeKey,
    pub confidence: f32,
}

impl Tag {
    pub fn new(key: TypeKey, confidence: f32) -> Self {
        Self { key, confidence }
    }
}

/// The condensed detection result for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableTag {
    primary_type: TypeKey,
    primary_label: String,
    category: Category,
    all_tags: Vec<TypeKey>,
    confidence: f32,
}

impl VariableTag {
    /// Builds a tag from classifier hits listed in rule-priority order.
    ///
    /// The first hit with the strictly highest confidence becomes primary,
    /// so earlier rules win ties. `all_tags` keeps every hit sorted by
    /// descending confidence, preserving rule order among equals. Returns
    /// `None` when there are no hits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stencil_core::semantic::{Tag, TypeKey, VariableTag};
    /// let tag = VariableTag::from_hits(&[
    ///     Tag::new(TypeKey::Title, 0.85),
    ///     Tag::new(TypeKey::Name, 0.85),
    /// ])
    /// .unwrap();
    /// assert_eq!(tag.primary_type(), TypeKey::Title);
    /// assert_eq!(tag.all_tags(), &[TypeKey::Title, TypeKey::Name]);
    /// ```
    pub fn from_hits(hits: &[Tag]) -> Option<Self> {
        let mut best: Option<Tag> = None;
        for hit in hits {
            match best {
                Some(current) if hit.confidence <= current.confidence => {}
                _ => best = Some(*hit),
            }
        }
        let best = best?;

        let mut ordered: Vec<Tag> = hits.to_vec();
        ordered.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Some(Self {
            primary_type: best.key,
            primary_label: best.key.label().to_string(),
            category: best.key.category(),
            all_tags: ordered.into_iter().map(|tag| tag.key).collect(),
            confidence: best.confidence.clamp(0.0, 1.0),
        })
    }

    /// Builds a tag for an author-supplied override, with full confidence.
    pub fn explicit(key: TypeKey) -> Self {
        Self {
            primary_type: key,
            primary_label: key.label().to_string(),
            category: key.category(),
            all_tags: vec![key],
            confidence: 1.0,
        }
    }

    pub fn primary_type(&self) -> TypeKey {
        self.primary_type
    }

    pub fn primary_label(&self) -> &str {
        &self.primary_label
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Every matched key, highest confidence first.
    pub fn all_tags(&self) -> &[TypeKey] {
        &self.all_tags
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}
