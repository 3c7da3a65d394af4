//! Document header: name, artboard and native coordinate convention.

use serde_json::{Map, Value};

use stencil_core::geometry::{AxisConvention, NativeRect, Size};

const DEFAULT_NAME: &str = "untitled";

/// Document-level settings needed to interpret element geometry.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    name: String,
    width: Option<f32>,
    height: Option<f32>,
    artboard: Option<NativeRect>,
    convention: AxisConvention,
}

impl Header {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared artboard size, if the document carries one.
    ///
    /// Explicit `width`/`height` win over the size of `artboardRect`.
    pub fn artboard_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                Some(Size::new(width, height))
            }
            _ => self
                .artboard
                .map(|rect| rect.artboard_size(self.convention))
                .filter(|size| !size.is_empty()),
        }
    }

    /// The native artboard rectangle used to normalize `geometricBounds`.
    ///
    /// Without an `artboardRect` the artboard is anchored at the native
    /// origin: its top-left for Y-down, its bottom-left for Y-up.
    pub fn native_artboard(&self) -> NativeRect {
        if let Some(rect) = self.artboard {
            return rect;
        }
        let width = self.width.unwrap_or_default();
        let height = self.height.unwrap_or_default();
        match self.convention {
            AxisConvention::YDown => NativeRect::new(0.0, 0.0, width, height),
            AxisConvention::YUp => NativeRect::new(0.0, height, width, 0.0),
        }
    }

    pub fn convention(&self) -> AxisConvention {
        self.convention
    }
}

/// Reads the header from the `document` object, falling back to root keys.
pub(crate) fn read_header(root: &Map<String, Value>) -> Header {
    let document = root.get("document").and_then(Value::as_object);
    let lookup = |key: &str| {
        document
            .and_then(|doc| doc.get(key))
            .or_else(|| root.get(key))
    };

    let name = lookup("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_NAME)
        .to_string();
    let width = lookup("width").and_then(number);
    let height = lookup("height").and_then(number);
    let artboard = lookup("artboardRect").and_then(rect_array);

    let convention = match lookup("coordinateSystem").and_then(Value::as_str) {
        Some(system) => parse_convention(system).unwrap_or_else(|| default_convention(artboard)),
        None => default_convention(artboard),
    };

    Header {
        name,
        width,
        height,
        artboard,
        convention,
    }
}

/// Extractors that report an artboard rectangle work in Y-up page space.
fn default_convention(artboard: Option<NativeRect>) -> AxisConvention {
    if artboard.is_some() {
        AxisConvention::YUp
    } else {
        AxisConvention::YDown
    }
}

fn parse_convention(system: &str) -> Option<AxisConvention> {
    let normalized: String = system
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "yup" => Some(AxisConvention::YUp),
        "ydown" => Some(AxisConvention::YDown),
        _ => None,
    }
}

/// Reads a finite JSON number as `f32`.
pub(crate) fn number(value: &Value) -> Option<f32> {
    value
        .as_f64()
        .map(|n| n as f32)
        .filter(|n| n.is_finite())
}

/// Reads a `[left, top, right, bottom]` array.
pub(crate) fn rect_array(value: &Value) -> Option<NativeRect> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    let mut edges = [0.0f32; 4];
    for (edge, item) in edges.iter_mut().zip(items) {
        *edge = number(item)?;
    }
    Some(NativeRect::from_array(edges))
}
