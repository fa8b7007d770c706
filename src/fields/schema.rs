use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ConfigError, Result};
use crate::fields::length::{Dimensions, Length, Reference};
use crate::fields::*;

/// Pixel presets offered next to offset fields
pub const SMALL_PIXELS: &[&str] = &["1px", "2px", "5px", "10px", "1%", "2%", "5%"];

/// Caption presets built from photo info variables
pub const STAMPS: &[&str] = &[
    "<filename>",
    "<folder>/<filename>",
    "<width>x<height>",
    "<filename> (<width>x<height>)",
];

/// A resolved parameter, ready for template substitution
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// The widget kind of a field and the rules for parsing its raw value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Choice { choices: Vec<String> },
    Pixel { reference: Reference, choices: Vec<String> },
    Color,
    Text { choices: Vec<String> },
    Slider { min: f64, max: f64 },
}

/// Declaration of a single configurable field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub label: String,
    pub default: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn choice<S: Into<String>>(label: &str, default: S, choices: Vec<String>) -> Self {
        Self::new(label, default, FieldKind::Choice { choices })
    }

    pub fn pixel(label: &str, default: &str, reference: Reference) -> Self {
        Self::new(label, default, FieldKind::Pixel { reference, choices: Vec::new() })
    }

    pub fn color(label: &str, default: &str) -> Self {
        Self::new(label, default, FieldKind::Color)
    }

    pub fn text(label: &str, default: &str, choices: &[&str]) -> Self {
        let choices = choices.iter().map(|c| c.to_string()).collect();
        Self::new(label, default, FieldKind::Text { choices })
    }

    pub fn slider(label: &str, default: f64, min: f64, max: f64) -> Self {
        Self::new(label, default.to_string(), FieldKind::Slider { min, max })
    }

    fn new<S: Into<String>>(label: &str, default: S, kind: FieldKind) -> Self {
        Self {
            label: label.to_string(),
            default: default.into(),
            kind,
        }
    }

    fn with_choices(mut self, presets: &[&str]) -> Self {
        if let FieldKind::Pixel { choices, .. } = &mut self.kind {
            *choices = presets.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// Placeholder name of this field inside command templates
    pub fn key(&self) -> String {
        field_key(&self.label)
    }

    /// Parse a raw value entered for this field
    ///
    /// Pixel fields resolve relative lengths against `dims`; sliders are
    /// clamped to their range.
    pub fn parse(&self, raw: &str, dims: Dimensions) -> Result<ParamValue> {
        let invalid = || ConfigError::InvalidValue {
            key: self.label.clone(),
            value: raw.to_string(),
        };

        let value = match &self.kind {
            FieldKind::Pixel { reference, .. } => {
                let length: Length = raw.parse().map_err(|_| invalid())?;
                ParamValue::Number(length.resolve(dims.reference(*reference)))
            }
            FieldKind::Slider { min, max } => {
                let n: f64 = raw.trim().parse().map_err(|_| invalid())?;
                if !n.is_finite() {
                    return Err(invalid().into());
                }
                ParamValue::Number(n.clamp(*min, *max))
            }
            FieldKind::Choice { choices } => {
                if !choices.iter().any(|c| c == raw) {
                    return Err(invalid().into());
                }
                ParamValue::Text(raw.to_string())
            }
            FieldKind::Color => {
                if !is_color(raw.trim()) {
                    return Err(invalid().into());
                }
                ParamValue::Text(raw.trim().to_string())
            }
            FieldKind::Text { .. } => ParamValue::Text(raw.to_string()),
        };
        Ok(value)
    }
}

/// ImageMagick color syntax: `#RGB` style hex, `rgb(..)` style functions or a
/// plain color name such as `gray50`
fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8 | 12 | 16) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    match value.split_once('(') {
        Some((name, args)) => {
            let args = match args.strip_suffix(')') {
                Some(args) => args,
                None => return false,
            };
            !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphabetic())
                && args
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '%' | ' '))
        }
        None => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()),
    }
}

/// Ordered field declarations for the ImageMagick action
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<FieldDef>,
}

impl FieldSchema {
    /// Build the field list, offering `effect_names` as the action choices
    pub fn new(effect_names: Vec<String>) -> Self {
        use Reference::{Diagonal, Height, Width};

        let fields = vec![
            FieldDef::choice(ACTION, DEFAULT_EFFECT, effect_names),
            FieldDef::pixel(HORIZONTAL_OFFSET, "2%", Width).with_choices(SMALL_PIXELS),
            FieldDef::pixel(VERTICAL_OFFSET, "2%", Height).with_choices(SMALL_PIXELS),
            FieldDef::color(COLOR, "#FF0000"),
            FieldDef::color(BORDER_COLOR, "#FFFFFF"),
            FieldDef::color(SHADOW_COLOR, "#000000"),
            FieldDef::text(CAPTION, "", STAMPS),
            FieldDef::pixel(CHARCOAL_RADIUS, "0.5%", Diagonal),
            FieldDef::slider(CONTRAST_FACTOR, 100.0, 0.0, 100.0),
            FieldDef::slider(CONTRAST_TRESHOLD, 50.0, 0.0, 100.0),
            FieldDef::pixel(BLUR_RADIUS, "80px", Diagonal),
            FieldDef::pixel(BLUR_SIGMA, "3px", Diagonal),
            FieldDef::slider(BLUR_ANGLE, 120.0, 0.0, 359.0),
            FieldDef::pixel(PAINT_RADIUS, "0.5%", Diagonal),
            FieldDef::pixel(SHARPEN_RADIUS, "0px", Diagonal),
            FieldDef::pixel(SHARPEN_SIGMA, "3px", Diagonal),
            FieldDef::pixel(SKETCH_RADIUS, "0px", Diagonal),
            FieldDef::pixel(SKETCH_SIGMA, "20px", Diagonal),
            FieldDef::slider(SKETCH_ANGLE, 120.0, 0.0, 359.0),
            FieldDef::pixel(UNSHARP_RADIUS, "0px", Diagonal),
            FieldDef::pixel(UNSHARP_SIGMA, "3px", Diagonal),
            FieldDef::pixel(WAVE_HEIGHT, "0px", Diagonal),
            FieldDef::pixel(WAVE_LENGTH, "3px", Diagonal),
        ];

        Self { fields }
    }

    /// Replace defaults with configured overrides
    pub fn with_defaults(mut self, overrides: &BTreeMap<String, String>) -> Result<Self> {
        for (label, value) in overrides {
            let field = self
                .fields
                .iter_mut()
                .find(|f| &f.label == label)
                .ok_or_else(|| ConfigError::UnknownField { label: label.clone() })?;
            field.default = value.clone();
        }
        Ok(self)
    }

    pub fn get(&self, label: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.label == label)
    }

    /// Declaration index of a field
    pub fn position(&self, label: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.label == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
