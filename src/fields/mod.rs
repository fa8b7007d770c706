//! # Field Schema
//!
//! Declares the parameters an effect can be configured with, the way a host
//! UI presents them: one labelled field per value, in a fixed order, each with
//! a default. Pixel fields accept either absolute pixels (`"80px"`) or a
//! percentage of an image dimension (`"2%"`), resolved per photo.

pub mod length;
pub mod schema;
pub mod settings;

pub use length::{Dimensions, Length, Reference};
pub use schema::{FieldDef, FieldKind, FieldSchema, ParamValue};
pub use settings::Settings;

// Field labels, in declaration order
pub const ACTION: &str = "Action";
pub const HORIZONTAL_OFFSET: &str = "Horizontal Offset";
pub const VERTICAL_OFFSET: &str = "Vertical Offset";
pub const COLOR: &str = "Color";
pub const BORDER_COLOR: &str = "Border Color";
pub const SHADOW_COLOR: &str = "Shadow Color";
pub const CAPTION: &str = "Caption";
pub const CHARCOAL_RADIUS: &str = "Charcoal Radius";
pub const CONTRAST_FACTOR: &str = "Contrast Factor";
pub const CONTRAST_TRESHOLD: &str = "Contrast Treshold";
pub const BLUR_RADIUS: &str = "Blur Radius";
pub const BLUR_SIGMA: &str = "Blur Sigma";
pub const BLUR_ANGLE: &str = "Blur Angle";
pub const PAINT_RADIUS: &str = "Paint Radius";
pub const SHARPEN_RADIUS: &str = "Sharpen Radius";
pub const SHARPEN_SIGMA: &str = "Sharpen Sigma";
pub const SKETCH_RADIUS: &str = "Sketch Radius";
pub const SKETCH_SIGMA: &str = "Sketch Sigma";
pub const SKETCH_ANGLE: &str = "Sketch Angle";
pub const UNSHARP_RADIUS: &str = "Unsharp Radius";
pub const UNSHARP_SIGMA: &str = "Unsharp Sigma";
pub const WAVE_HEIGHT: &str = "Wave Height";
pub const WAVE_LENGTH: &str = "Wave Length";

/// Effect selected when nothing else is configured
pub const DEFAULT_EFFECT: &str = "Polaroid";

/// Template placeholder name for a field label
///
/// `"Blur Radius"` becomes `blur_radius`.
pub fn field_key(label: &str) -> String {
    label
        .trim()
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}
