//! Per-effect values computed from the resolved fields and the image size.

use std::collections::HashMap;

use crate::error::{ConfigError, Result};
use crate::fields::{Dimensions, ParamValue};

/// Adds or rewrites entries of the value map before substitution
pub type DeriveFn = fn(&mut HashMap<String, ParamValue>, Dimensions) -> Result<()>;

/// Keys written by [`bullet`]
pub const BULLET_KEYS: &[&str] = &["border", "blur1", "shade", "blur2"];

/// Keys written by [`polaroid`]
pub const POLAROID_KEYS: &[&str] = &["caption_cli"];

/// Bevelled "bullet" look: border, blurs and shade scale with the image
pub fn bullet(values: &mut HashMap<String, ParamValue>, dims: Dimensions) -> Result<()> {
    let d = dims.diagonal();
    values.insert("border".to_string(), ParamValue::Number(d / 3.0));
    values.insert("blur1".to_string(), ParamValue::Number(d / 7.0));
    values.insert(
        "shade".to_string(),
        ParamValue::Text(format!("{}x{}", (d + 105.0) as i64, (d + 15.0) as i64)),
    );
    values.insert("blur2".to_string(), ParamValue::Number(d / 12.0));
    Ok(())
}

/// Caption flags for `+polaroid`, empty when there is no caption
pub fn polaroid(values: &mut HashMap<String, ParamValue>, _dims: Dimensions) -> Result<()> {
    let caption = values
        .get("caption")
        .and_then(ParamValue::as_str)
        .unwrap_or_default();

    let fragment = if caption.trim().is_empty() {
        String::new()
    } else {
        format!("-caption \"{}\" -gravity center", escape_double_quoted(caption))
    };
    values.insert("caption_cli".to_string(), ParamValue::Text(fragment));
    Ok(())
}

/// The contrast slider runs 0-100, `-sigmoidal-contrast` expects roughly 0-10
pub fn sigmoidal_contrast(values: &mut HashMap<String, ParamValue>, _dims: Dimensions) -> Result<()> {
    let factor = values
        .get("contrast_factor")
        .and_then(ParamValue::as_f64)
        .ok_or_else(|| ConfigError::MissingKey {
            key: "contrast_factor".to_string(),
        })?;
    values.insert("contrast_factor".to_string(), ParamValue::Number(factor / 10.0));
    Ok(())
}

/// Escape text for use inside a double-quoted shell word
fn escape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
