//! Error codes for the Stencil diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document errors
//! - `E1xx` - Element errors
//! - `I0xx` - Integrity findings
//! - `P0xx` - Pattern findings

use std::fmt;

use serde::{Serialize, Serializer};

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Errors (E0xx)
    // =========================================================================
    /// Invalid JSON.
    ///
    /// The structure file could not be decoded as JSON at all.
    E001,

    /// Invalid document root.
    ///
    /// The root is not an object, or it carries neither `layers` nor
    /// `elements`.
    E002,

    /// Missing artboard size.
    ///
    /// The document declares no usable width and height. The size is taken
    /// from the extent of the elements instead.
    E003,

    // =========================================================================
    // Element Errors (E1xx)
    // =========================================================================
    /// Element is not an object.
    E100,

    /// Missing element type.
    ///
    /// The element and its subtree are skipped.
    E101,

    /// Unknown element type.
    ///
    /// The element is kept with kind `other`.
    E102,

    /// Missing geometry.
    ///
    /// None of `bounds`, `geometricBounds` or `position`/`size` is usable.
    /// The element is kept with empty bounds.
    E103,

    /// Unknown explicit tag.
    ///
    /// The element name carries a `$` or `var:` prefix that does not name
    /// a known type key. The tag is ignored.
    E104,

    /// Parent mismatch.
    ///
    /// A nested element declares a `parentId` other than its container.
    /// Nesting decides the structural path; the declared `parentId` is kept.
    E105,

    /// Unresolvable parent.
    ///
    /// A flat element points at a parent that does not exist or that would
    /// form a cycle. The element is placed at the root of its layer.
    E106,

    // =========================================================================
    // Integrity Findings (I0xx)
    // =========================================================================
    /// Duplicate element id.
    I001,

    /// Missing parent.
    ///
    /// An element's `parentId` names no element in the document.
    I002,

    /// Element out of bounds.
    ///
    /// The element lies entirely outside the artboard and its margin.
    I003,

    // =========================================================================
    // Pattern Findings (P0xx)
    // =========================================================================
    /// Repeated singleton pattern.
    ///
    /// A pattern that is not marked repeatable matched more than once. The
    /// matches receive indexed names.
    P001,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::I001 => "I001",
            ErrorCode::I002 => "I002",
            ErrorCode::I003 => "I003",
            ErrorCode::P001 => "P001",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "invalid JSON",
            ErrorCode::E002 => "invalid document root",
            ErrorCode::E003 => "missing artboard size",
            ErrorCode::E100 => "element is not an object",
            ErrorCode::E101 => "missing element type",
            ErrorCode::E102 => "unknown element type",
            ErrorCode::E103 => "missing geometry",
            ErrorCode::E104 => "unknown explicit tag",
            ErrorCode::E105 => "parent mismatch",
            ErrorCode::E106 => "unresolvable parent",
            ErrorCode::I001 => "duplicate element id",
            ErrorCode::I002 => "missing parent",
            ErrorCode::I003 => "element out of bounds",
            ErrorCode::P001 => "repeated singleton pattern",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
