//! Font metric sources.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use thiserror::Error;

use super::{FontMetrics, TextStyle};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("invalid font data: {0}")]
    Invalid(String),
}

// ============================================================================
// BUILTIN HELVETICA
// ============================================================================

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Metrics of the PDF base-14 Helvetica family.
///
/// The document renderer draws with the builtin Helvetica, so measuring
/// with the same advance table keeps auto-fit honest without shipping font
/// files. Characters outside ASCII get a typical lowercase or uppercase width.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    fn advance(c: char, bold: bool) -> u16 {
        let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
        match c as u32 {
            32..=126 => table[(c as u32 - 32) as usize],
            _ if c.is_uppercase() => 722,
            _ => 556,
        }
    }
}

impl FontMetrics for BuiltinMetrics {
    fn text_width(&self, text: &str, size: f32, style: TextStyle) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| Self::advance(c, style.bold) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

// ============================================================================
// TRUETYPE
// ============================================================================

/// Metrics (and glyph outlines) from TrueType/OpenType font data.
#[derive(Clone)]
pub struct TtfMetrics {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl std::fmt::Debug for TtfMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfMetrics")
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

impl TtfMetrics {
    /// Load a regular face and an optional bold face.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, FontError> {
        let regular =
            FontArc::try_from_vec(regular).map_err(|e| FontError::Invalid(e.to_string()))?;
        let bold = bold
            .map(|bytes| FontArc::try_from_vec(bytes).map_err(|e| FontError::Invalid(e.to_string())))
            .transpose()?;
        Ok(Self { regular, bold })
    }

    /// Face for a style; bold falls back to regular.
    pub fn font(&self, style: TextStyle) -> &FontArc {
        match (&self.bold, style.bold) {
            (Some(bold), true) => bold,
            _ => &self.regular,
        }
    }

    /// `ab_glyph` scales by the font's full height; font sizes are em sizes.
    pub fn px_scale(font: &FontArc, size: f32) -> PxScale {
        let upem = font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * font.height_unscaled() / upem)
    }
}

impl FontMetrics for TtfMetrics {
    fn text_width(&self, text: &str, size: f32, style: TextStyle) -> f32 {
        let font = self.font(style);
        let scaled = font.as_scaled(Self::px_scale(font, size));

        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_ascii() {
        assert_eq!(HELVETICA.len(), 126 - 32 + 1);
        assert_eq!(HELVETICA_BOLD.len(), 126 - 32 + 1);
        assert_eq!(BuiltinMetrics::advance(' ', false), 278);
        assert_eq!(BuiltinMetrics::advance('A', false), 667);
        assert_eq!(BuiltinMetrics::advance('W', false), 944);
        assert_eq!(BuiltinMetrics::advance('m', true), 889);
        assert_eq!(BuiltinMetrics::advance('~', false), 584);
    }

    #[test]
    fn test_width_scales_linearly() {
        let m = BuiltinMetrics;
        let w10 = m.text_width("Hola", 10.0, TextStyle::REGULAR);
        let w20 = m.text_width("Hola", 20.0, TextStyle::REGULAR);
        assert!((w20 - 2.0 * w10).abs() < 1e-4);
        // H(722) o(556) l(222) a(556) = 2056
        assert!((w10 - 20.56).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_wider() {
        let m = BuiltinMetrics;
        assert!(
            m.text_width("etiqueta", 12.0, TextStyle::BOLD)
                > m.text_width("etiqueta", 12.0, TextStyle::REGULAR)
        );
    }

    #[test]
    fn test_non_ascii_fallback() {
        assert_eq!(BuiltinMetrics::advance('ñ', false), 556);
        assert_eq!(BuiltinMetrics::advance('Ñ', false), 722);
    }

    #[test]
    fn test_invalid_ttf_rejected() {
        assert!(TtfMetrics::from_bytes(vec![0, 1, 2, 3], None).is_err());
    }
}
