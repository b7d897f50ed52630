//! Lenient deserializers for design geometry.
//!
//! Designs come out of an editor and a database, so numbers show up as JSON
//! numbers, numeric strings, or occasionally garbage. Nothing here rejects
//! a design: unusable values turn into the field default, negative sizes
//! clamp to zero and oversized ones clamp to [`MAX_LENGTH_MM`] or
//! [`MAX_FONT_SIZE_PX`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) const DEFAULT_LABEL_WIDTH_MM: f32 = 50.0;
pub(crate) const DEFAULT_LABEL_HEIGHT_MM: f32 = 30.0;

/// Longest label or element side, in mm.
pub const MAX_LENGTH_MM: f32 = 2000.0;

/// Largest font size, in canvas pixels.
pub const MAX_FONT_SIZE_PX: f32 = 1000.0;

/// Interpret a JSON value as a finite number.
pub(crate) fn number_from_value(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().replace(',', ".").parse::<f32>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Any number; garbage becomes `0.0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(number_from_value(&v).unwrap_or(0.0))
}

/// A length: garbage becomes `0.0`, clamped to `[0, MAX_LENGTH_MM]`.
pub(crate) fn length<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(number_from_value(&v).unwrap_or(0.0).clamp(0.0, MAX_LENGTH_MM))
}

pub(crate) fn label_width<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(positive_or(&v, DEFAULT_LABEL_WIDTH_MM).min(MAX_LENGTH_MM))
}

pub(crate) fn label_height<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(positive_or(&v, DEFAULT_LABEL_HEIGHT_MM).min(MAX_LENGTH_MM))
}

fn positive_or(value: &Value, default: f32) -> f32 {
    match number_from_value(value) {
        Some(n) if n > 0.0 => n,
        _ => default,
    }
}

/// Font sizes fall back to `default_font_size` when unusable.
pub(crate) fn font_size<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(positive_or(&v, super::default_font_size()).min(MAX_FONT_SIZE_PX))
}

pub(crate) fn min_font_size<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(positive_or(&v, super::default_min_font_size()).min(MAX_FONT_SIZE_PX))
}

pub(crate) fn logo_percent<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(positive_or(&v, super::default_logo_percent()))
}

pub(crate) fn integer<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(number_from_value(&v).map(|n| n.round() as i32).unwrap_or(0))
}

/// Booleans that may arrive as `"true"`, `1`, `"0"`...
///
/// Unrecognized values keep `default`.
fn flag_from_value(value: &Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(default),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(flag_from_value(&v, false))
}

pub(crate) fn flag_default_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(flag_from_value(&v, true))
}

/// Strings that may arrive as numbers or `null`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_to_string(&v))
}

/// Stringify a JSON scalar the way a spreadsheet cell would read.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
