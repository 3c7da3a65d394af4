//! Geometric primitives and the artboard normalizer.
//!
//! Design tools report element geometry in their own coordinate conventions.
//! This module converts that geometry into a single canonical space that the
//! rest of Stencil works in.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canonical space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An edge-defined bounding box whose width and height are derived
//! - [`ReferencePoint`] - One of the nine anchors used to place an element
//! - [`NativeRect`] / [`AxisConvention`] - Geometry as the design tool reports it
//! - [`normalize`] - Conversion from native geometry to canonical [`Bounds`]
//!
//! # Coordinate System
//!
//! Canonical geometry is relative to the active artboard:
//!
//! ```text
//!   artboard (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner of the artboard
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward, regardless of the native convention

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Replaces non-finite values with zero.
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// A 2D point in canonical artboard space.
///
/// # Examples
///
/// ```
/// # use stencil_core::geometry::Point;
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x(), 10.0);
/// assert_eq!(p.y(), 20.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size. Negative and non-finite dimensions are clamped to zero.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
        }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns true if either dimension is zero
    pub fn is_empty(self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Returns width divided by height, or `None` for a zero height.
    pub fn aspect_ratio(self) -> Option<f32> {
        if self.height > 0.0 {
            Some(self.width / self.height)
        } else {
            None
        }
    }
}

/// A rectangular bounding box in canonical space.
///
/// Bounds are stored as edges. Width and height are derived, so
/// `right - left == width` and `bottom - top == height` always hold and are
/// never negative.
///
/// # Examples
///
/// ```
/// # use stencil_core::geometry::Bounds;
/// let bounds = Bounds::from_edges(10.0, 20.0, 110.0, 70.0);
/// assert_eq!(bounds.width(), 100.0);
/// assert_eq!(bounds.height(), 50.0);
///
/// // Inverted edges collapse to an empty box at the left/top edge
/// let collapsed = Bounds::from_edges(10.0, 20.0, 5.0, 10.0);
/// assert_eq!(collapsed.width(), 0.0);
/// assert_eq!(collapsed.right(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Bounds {
    /// Creates bounds from the four edges, clamping malformed input.
    ///
    /// Non-finite edges become zero and a negative extent collapses to zero.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let left = finite_or_zero(left);
        let top = finite_or_zero(top);
        let width = (finite_or_zero(right) - left).max(0.0);
        let height = (finite_or_zero(bottom) - top).max(0.0);
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Creates bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self::from_edges(
            top_left.x,
            top_left.y,
            top_left.x + size.width,
            top_left.y + size.height,
        )
    }

    /// Returns the left edge
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the top edge
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right edge
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom edge
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.right - self.left
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.bottom - self.top
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Returns the top-left corner as a Point
    pub fn top_left(self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Returns the point at the given anchor of these bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stencil_core::geometry::{Bounds, ReferencePoint};
    /// let bounds = Bounds::from_edges(0.0, 0.0, 100.0, 40.0);
    /// let center = bounds.anchor(ReferencePoint::Center);
    /// assert_eq!(center.x(), 50.0);
    /// assert_eq!(center.y(), 20.0);
    /// ```
    pub fn anchor(self, reference: ReferencePoint) -> Point {
        let (fx, fy) = reference.factors();
        Point::new(
            self.left + self.width() * fx,
            self.top + self.height() * fy,
        )
    }

    /// Returns true if these bounds lie entirely inside `other`, edges included.
    pub fn is_within(self, other: Bounds) -> bool {
        self.left >= other.left
            && self.top >= other.top
            && self.right <= other.right
            && self.bottom <= other.bottom
    }

    /// Returns true if these bounds lie entirely outside `other` on either axis.
    ///
    /// Touching edges do not count as outside.
    pub fn is_disjoint(self, other: Bounds) -> bool {
        self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom
    }

    /// Grows the bounds by `margin` on every side.
    pub fn expand(self, margin: f32) -> Self {
        Self::from_edges(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Bounds", 6)?;
        state.serialize_field("left", &self.left)?;
        state.serialize_field("top", &self.top)?;
        state.serialize_field("right", &self.right)?;
        state.serialize_field("bottom", &self.bottom)?;
        state.serialize_field("width", &self.width())?;
        state.serialize_field("height", &self.height())?;
        state.end()
    }
}

/// One of the nine anchors an element position can refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferencePoint {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ReferencePoint {
    /// Returns the `(refX, refY)` factors of this anchor, each in `{0, 0.5, 1}`.
    pub fn factors(self) -> (f32, f32) {
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::Top => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::Left => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::Right => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::Bottom => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }

    /// Returns the kebab-case name of this anchor.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top",
            Self::TopRight => "top-right",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottom-left",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for ReferencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a reference point name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reference point `{0}`")]
pub struct ParseReferencePointError(String);

impl FromStr for ReferencePoint {
    type Err = ParseReferencePointError;

    /// Accepts kebab, snake, camel and upper-case spellings such as
    /// `top-left`, `top_left`, `topLeft` and `TOPLEFT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let point = match folded.as_str() {
            "topleft" => Self::TopLeft,
            "top" | "topcenter" => Self::Top,
            "topright" => Self::TopRight,
            "left" | "middleleft" => Self::Left,
            "center" | "middle" => Self::Center,
            "right" | "middleright" => Self::Right,
            "bottomleft" => Self::BottomLeft,
            "bottom" | "bottomcenter" => Self::Bottom,
            "bottomright" => Self::BottomRight,
            _ => return Err(ParseReferencePointError(s.to_string())),
        };
        Ok(point)
    }
}

/// Direction of the Y axis in a native coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisConvention {
    /// Y grows upward; a box's `top` is numerically greater than its `bottom`.
    #[default]
    YUp,
    /// Y grows downward, as in canonical space.
    YDown,
}

/// A rectangle exactly as a design tool reports it.
///
/// No ordering is assumed between the edges; [`normalize`] interprets them
/// according to an [`AxisConvention`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NativeRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NativeRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rectangle from a `[left, top, right, bottom]` array.
    pub fn from_array(edges: [f32; 4]) -> Self {
        Self::new(edges[0], edges[1], edges[2], edges[3])
    }

    /// Returns the canonical size of this rectangle when used as an artboard.
    pub fn artboard_size(self, convention: AxisConvention) -> Size {
        normalize(self, self, convention).to_size()
    }
}

/// Converts native geometry into artboard-relative, Y-down [`Bounds`].
///
/// `artboard` is the active artboard in the same native space as `native`.
/// Malformed input is clamped, never propagated: non-finite coordinates become
/// zero and inverted boxes collapse to zero size.
///
/// # Examples
///
/// ```
/// # use stencil_core::geometry::{normalize, AxisConvention, NativeRect};
/// // An Illustrator-style artboard: origin at the top-left, Y growing upward.
/// let artboard = NativeRect::new(0.0, 0.0, 800.0, -600.0);
/// let item = NativeRect::new(100.0, -50.0, 300.0, -150.0);
///
/// let bounds = normalize(item, artboard, AxisConvention::YUp);
/// assert_eq!(bounds.top(), 50.0);
/// assert_eq!(bounds.bottom(), 150.0);
/// assert_eq!(bounds.height(), 100.0);
/// ```
pub fn normalize(native: NativeRect, artboard: NativeRect, convention: AxisConvention) -> Bounds {
    let left = native.left - artboard.left;
    let right = native.right - artboard.left;
    let (top, bottom) = match convention {
        AxisConvention::YUp => (artboard.top - native.top, artboard.top - native.bottom),
        AxisConvention::YDown => (native.top - artboard.top, native.bottom - artboard.top),
    };
    Bounds::from_edges(left, top, right, bottom)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_bounds_from_edges_derives_size() {
        let bounds = Bounds::from_edges(10.0, 20.0, 60.0, 100.0);
        assert_approx_eq!(f32, bounds.width(), 50.0);
        assert_approx_eq!(f32, bounds.height(), 80.0);
        assert_approx_eq!(f32, bounds.right() - bounds.left(), bounds.width());
    }

    #[test]
    fn test_bounds_clamps_nan_and_negative() {
        let bounds = Bounds::from_edges(f32::NAN, 5.0, 10.0, -5.0);
        assert_approx_eq!(f32, bounds.left(), 0.0);
        assert_approx_eq!(f32, bounds.width(), 10.0);
        assert_approx_eq!(f32, bounds.height(), 0.0);
        assert_approx_eq!(f32, bounds.bottom(), 5.0);
    }

    #[test]
    fn test_size_clamps() {
        let size = Size::new(-3.0, f32::INFINITY);
        assert_approx_eq!(f32, size.width(), 0.0);
        assert_approx_eq!(f32, size.height(), 0.0);
        assert!(size.is_empty());
        assert!(size.aspect_ratio().is_none());
    }

    #[test]
    fn test_anchor_all_reference_points() {
        let bounds = Bounds::from_edges(10.0, 20.0, 110.0, 60.0);
        let cases = [
            (ReferencePoint::TopLeft, 10.0, 20.0),
            (ReferencePoint::Top, 60.0, 20.0),
            (ReferencePoint::TopRight, 110.0, 20.0),
            (ReferencePoint::Left, 10.0, 40.0),
            (ReferencePoint::Center, 60.0, 40.0),
            (ReferencePoint::Right, 110.0, 40.0),
            (ReferencePoint::BottomLeft, 10.0, 60.0),
            (ReferencePoint::Bottom, 60.0, 60.0),
            (ReferencePoint::BottomRight, 110.0, 60.0),
        ];
        for (reference, x, y) in cases {
            let point = bounds.anchor(reference);
            assert_approx_eq!(f32, point.x(), x);
            assert_approx_eq!(f32, point.y(), y);
        }
    }

    #[test]
    fn test_reference_point_from_str_spellings() {
        assert_eq!("top-left".parse::<ReferencePoint>(), Ok(ReferencePoint::TopLeft));
        assert_eq!("TOPLEFT".parse::<ReferencePoint>(), Ok(ReferencePoint::TopLeft));
        assert_eq!("bottom_right".parse::<ReferencePoint>(), Ok(ReferencePoint::BottomRight));
        assert_eq!("center".parse::<ReferencePoint>(), Ok(ReferencePoint::Center));
        assert!("upper-left".parse::<ReferencePoint>().is_err());
    }

    #[test]
    fn test_normalize_y_up() {
        let artboard = NativeRect::new(100.0, 500.0, 900.0, -100.0);
        let item = NativeRect::new(150.0, 450.0, 250.0, 400.0);
        let bounds = normalize(item, artboard, AxisConvention::YUp);

        assert_approx_eq!(f32, bounds.left(), 50.0);
        assert_approx_eq!(f32, bounds.top(), 50.0);
        assert_approx_eq!(f32, bounds.width(), 100.0);
        assert_approx_eq!(f32, bounds.height(), 50.0);
    }

    #[test]
    fn test_normalize_y_down() {
        let artboard = NativeRect::new(10.0, 10.0, 210.0, 110.0);
        let item = NativeRect::new(20.0, 30.0, 40.0, 60.0);
        let bounds = normalize(item, artboard, AxisConvention::YDown);

        assert_approx_eq!(f32, bounds.left(), 10.0);
        assert_approx_eq!(f32, bounds.top(), 20.0);
        assert_approx_eq!(f32, bounds.bottom(), 50.0);
    }

    #[test]
    fn test_artboard_size() {
        let artboard = NativeRect::new(0.0, 1920.0, 1080.0, 0.0);
        let size = artboard.artboard_size(AxisConvention::YUp);
        assert_approx_eq!(f32, size.width(), 1080.0);
        assert_approx_eq!(f32, size.height(), 1920.0);
    }

    #[test]
    fn test_bounds_containment() {
        let artboard = Bounds::from_edges(0.0, 0.0, 100.0, 100.0);
        assert!(Bounds::from_edges(0.0, 0.0, 100.0, 100.0).is_within(artboard));
        assert!(Bounds::from_edges(200.0, 10.0, 220.0, 20.0).is_disjoint(artboard));
        assert!(!Bounds::from_edges(90.0, 10.0, 120.0, 20.0).is_disjoint(artboard));
        assert!(!Bounds::from_edges(90.0, 10.0, 120.0, 20.0).is_within(artboard));
    }
}
