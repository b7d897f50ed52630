//! # Text Measurement and Layout
//!
//! Word wrapping and auto-fit sizing over pluggable font metrics.
//!
//! Metrics are unit-agnostic: a width measured at size `s` is in the same
//! unit as `s`. The printer renderer measures in dots, the document and
//! preview renderers in canvas pixels; each converts its box first.
//!
//! | Metrics | Source |
//! |---------|--------|
//! | [`BuiltinMetrics`] | Helvetica / Helvetica-Bold advance widths (no font files) |
//! | [`TtfMetrics`] | a caller-supplied TrueType font via `ab_glyph` |

mod autofit;
mod metrics;

pub use autofit::{AUTO_FIT_STEP, AutoFit, calc_auto_fit_font_size, calc_auto_fit_with_step};
pub use metrics::{BuiltinMetrics, FontError, TtfMetrics};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Style bits that change glyph advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
}

impl TextStyle {
    pub const REGULAR: TextStyle = TextStyle { bold: false };
    pub const BOLD: TextStyle = TextStyle { bold: true };
}

/// Font measurement used by wrapping and auto-fit.
pub trait FontMetrics: Send + Sync {
    /// Advance width of `text` set at `size`.
    fn text_width(&self, text: &str, size: f32, style: TextStyle) -> f32;

    /// Distance between baselines at `size`.
    fn line_height(&self, size: f32) -> f32 {
        size * LINE_HEIGHT_FACTOR
    }
}

/// Greedy word wrap.
///
/// Words are appended to the current line until the measured width would
/// exceed `max_width`; a word wider than the box gets a line of its own.
/// Explicit `\n` starts a new paragraph, and blank paragraphs are kept as
/// empty lines.
pub fn wrap_text(
    metrics: &dyn FontMetrics,
    text: &str,
    size: f32,
    style: TextStyle,
    max_width: f32,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if metrics.text_width(&candidate, size, style) > max_width && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Wrapped text ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub line_height: f32,
}

impl TextLayout {
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Wrap `text` into a box of `max_width` at a fixed size.
pub fn layout_text(
    metrics: &dyn FontMetrics,
    text: &str,
    size: f32,
    style: TextStyle,
    max_width: f32,
) -> TextLayout {
    TextLayout {
        lines: wrap_text(metrics, text, size, style, max_width),
        font_size: size,
        line_height: metrics.line_height(size),
    }
}
