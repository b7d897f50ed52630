//! Color parsing for design and element paint fields.
//!
//! Accepted forms: `#RGB`, `#RRGGBB`, `#RRGGBBAA` (alpha ignored), a handful
//! of CSS names, and `transparent` / `none` / empty for "no paint".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Returned by [`parse_paint`] when a string is not a recognizable color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor(pub String);

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance in `[0, 1]` (Rec. 601 weights).
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Ink coverage for a monochrome target: 0.0 = white, 1.0 = black.
    pub fn intensity(&self) -> f32 {
        1.0 - self.luminance()
    }

    /// Whether a 1-bit printer should treat this color as ink.
    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }

    /// Components normalized to `[0, 1]`, as PDF color operators expect.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parse a paint value. `Ok(None)` means transparent.
pub fn parse_paint(input: &str) -> Result<Option<Rgb>, InvalidColor> {
    let s = input.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("transparent") || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex)
            .map(Some)
            .ok_or_else(|| InvalidColor(input.to_string()));
    }

    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Rgb::BLACK,
        "white" => Rgb::WHITE,
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "blue" => Rgb::new(0, 0, 255),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return Err(InvalidColor(input.to_string())),
    };
    Ok(Some(named))
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let digits: Vec<u8> = hex
                .chars()
                .filter_map(|c| c.to_digit(16))
                .map(|d| (d * 17) as u8)
                .collect();
            Some(Rgb::new(digits[0], digits[1], digits[2]))
        }
        6 | 8 => Some(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

// ============================================================================
// SERDE
// ============================================================================

/// A paint field: `None` is transparent.
///
/// Deserialization never fails; strings that are not colors keep the
/// field's default, which the caller supplies through [`Paint::or`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paint {
    value: Option<Option<Rgb>>,
}

impl Paint {
    pub const fn solid(rgb: Rgb) -> Self {
        Self {
            value: Some(Some(rgb)),
        }
    }

    pub const fn transparent() -> Self {
        Self { value: Some(None) }
    }

    /// Resolve the paint, falling back to `default` when the source value
    /// was missing or unparseable.
    pub fn or(&self, default: Option<Rgb>) -> Option<Rgb> {
        self.value.unwrap_or(default)
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let value = match raw {
            serde_json::Value::String(s) => match parse_paint(&s) {
                Ok(paint) => Some(paint),
                Err(InvalidColor(bad)) => {
                    log::debug!("ignoring unparseable color {:?}", bad);
                    None
                }
            },
            serde_json::Value::Null => Some(None),
            _ => None,
        };
        Ok(Self { value })
    }
}

impl Serialize for Paint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Some(Some(rgb)) => serializer.serialize_str(&rgb.to_hex()),
            Some(None) => serializer.serialize_str("transparent"),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_paint("#000"), Ok(Some(Rgb::BLACK)));
        assert_eq!(parse_paint("#fff"), Ok(Some(Rgb::WHITE)));
        assert_eq!(parse_paint("#ff8000"), Ok(Some(Rgb::new(255, 128, 0))));
        assert_eq!(parse_paint("#FF800080"), Ok(Some(Rgb::new(255, 128, 0))));
    }

    #[test]
    fn test_transparent_forms() {
        assert_eq!(parse_paint(""), Ok(None));
        assert_eq!(parse_paint("transparent"), Ok(None));
        assert_eq!(parse_paint("NONE"), Ok(None));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_paint("#12").is_err());
        assert!(parse_paint("#gggggg").is_err());
        assert!(parse_paint("chartreuse-ish").is_err());
    }

    #[test]
    fn test_darkness() {
        assert!(Rgb::BLACK.is_dark());
        assert!(!Rgb::WHITE.is_dark());
        assert!(Rgb::new(0, 0, 255).is_dark());
        assert!(!Rgb::new(255, 255, 0).is_dark());
    }

    #[test]
    fn test_paint_deserialize_keeps_default_on_garbage() {
        let paint: Paint = serde_json::from_str("\"not a color\"").unwrap();
        assert_eq!(paint.or(Some(Rgb::BLACK)), Some(Rgb::BLACK));

        let paint: Paint = serde_json::from_str("\"transparent\"").unwrap();
        assert_eq!(paint.or(Some(Rgb::BLACK)), None);

        let paint: Paint = serde_json::from_str("\"#ffffff\"").unwrap();
        assert_eq!(paint.or(None), Some(Rgb::WHITE));
    }
}
