//! # ZPL Text Commands
//!
//! Text is printed with the scalable font `0` inside a field block, which
//! lets the printer wrap and justify within a fixed width.
//!
//! ```text
//! ^FO40,32
//! ^A0N,24,24                 font 0, orientation, height, width (dots)
//! ^FB320,2,0,C,0             block width, max lines, spacing, justify, indent
//! ^FDLine one\&Line two^FS   \& is a hard line break inside a block
//! ```

use super::commands::{Orientation, escape_field_data};

/// Field block justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

impl Justify {
    pub fn code(&self) -> char {
        match self {
            Justify::Left => 'L',
            Justify::Center => 'C',
            Justify::Right => 'R',
        }
    }
}

/// Smallest `^A0` height or width the printer accepts, in dots.
pub const MIN_FONT_DOTS: u32 = 10;

/// Largest `^A0` height or width the printer accepts, in dots.
pub const MAX_FONT_DOTS: u32 = 32000;

/// # Scalable Font (^A0)
///
/// `height` and `width` are in dots; equal values give the font's natural
/// proportions. Both are clamped to the printer's 10-32000 range.
pub fn scalable_font(orientation: Orientation, height: u32, width: u32) -> String {
    format!(
        "^A0{},{},{}",
        orientation.code(),
        height.clamp(MIN_FONT_DOTS, MAX_FONT_DOTS),
        width.clamp(MIN_FONT_DOTS, MAX_FONT_DOTS)
    )
}

/// # Field Block (^FB)
///
/// `max_lines` is at least 1; text beyond it overprints the last line.
pub fn field_block(width: u32, max_lines: u32, justify: Justify) -> String {
    format!("^FB{},{},0,{},0", width.max(1), max_lines.max(1), justify.code())
}

/// # Text Field Data
///
/// Escapes command characters and turns newlines into `\&` block breaks.
pub fn text_field_data(text: &str) -> String {
    let escaped = escape_field_data(text).replace("\r\n", "\n");
    format!("^FD{}^FS", escaped.replace('\n', "\\&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalable_font() {
        assert_eq!(scalable_font(Orientation::Normal, 24, 24), "^A0N,24,24");
        assert_eq!(scalable_font(Orientation::Bottom, 40, 40), "^A0B,40,40");
        assert_eq!(scalable_font(Orientation::Normal, 2, 2), "^A0N,10,10");
    }

    #[test]
    fn test_field_block() {
        assert_eq!(field_block(320, 2, Justify::Center), "^FB320,2,0,C,0");
        assert_eq!(field_block(0, 0, Justify::Right), "^FB1,1,0,R,0");
    }

    #[test]
    fn test_text_field_data_line_breaks() {
        assert_eq!(text_field_data("Uno\nDos"), "^FDUno\\&Dos^FS");
        assert_eq!(text_field_data("A\r\nB"), "^FDA\\&B^FS");
        assert_eq!(text_field_data("50% ^off~"), "^FD50%  off ^FS");
    }
}
