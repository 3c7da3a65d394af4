//! The externally visible, flattened form of a detected variable.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    element::ElementPath,
    geometry::{Point, Size},
    semantic::TypeKey,
};

/// Structural role assigned to an element by an external hierarchy classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyRole {
    Background,
    Decoration,
    ContentContainer,
    ContentPrimary,
    ContentSecondary,
    Navigation,
    Branding,
    Interactive,
}

impl HierarchyRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Decoration => "decoration",
            Self::ContentContainer => "content_container",
            Self::ContentPrimary => "content_primary",
            Self::ContentSecondary => "content_secondary",
            Self::Navigation => "navigation",
            Self::Branding => "branding",
            Self::Interactive => "interactive",
        }
    }

    /// Roles whose elements are layout furniture rather than content.
    pub fn is_non_content(self) -> bool {
        matches!(self, Self::Background | Self::Decoration)
    }
}

impl fmt::Display for HierarchyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`HierarchyRole`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hierarchy role `{0}`")]
pub struct ParseHierarchyRoleError(String);

impl FromStr for HierarchyRole {
    type Err = ParseHierarchyRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s.trim().to_ascii_lowercase().as_str() {
            "background" => Self::Background,
            "decoration" => Self::Decoration,
            "content_container" => Self::ContentContainer,
            "content_primary" => Self::ContentPrimary,
            "content_secondary" => Self::ContentSecondary,
            "navigation" => Self::Navigation,
            "branding" => Self::Branding,
            "interactive" => Self::Interactive,
            _ => return Err(ParseHierarchyRoleError(s.to_string())),
        };
        Ok(role)
    }
}

/// One detected variable, as exposed to downstream tools.
///
/// `variable_key` is unique within a detection pass. It only stays equal
/// across passes when ids are content-hashed and the document is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub element_id: String,
    pub element_path: ElementPath,
    pub variable_key: String,
    pub variable_type: TypeKey,
    pub variable_label: String,
    pub confidence: f32,
    pub current_value: String,
    pub position: Point,
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_role: Option<HierarchyRole>,
}
