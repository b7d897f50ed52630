//! # ZPL Graphics Commands
//!
//! | Command | Shape |
//! |---------|-------|
//! | `^GB` | box, filled when the border is as thick as the box is small |
//! | `^GC` | circle |
//! | `^GE` | ellipse |
//! | `^GD` | diagonal line |
//! | `^GFA` | bitmap graphic field, ASCII hex |
//!
//! All sizes are in dots. Each builder emits the shape command only; the
//! caller adds `^FO` before and `^FS` after.

use crate::render::dither::MonoBitmap;

/// Line color parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineColor {
    #[default]
    Black,
    White,
}

impl LineColor {
    pub fn code(&self) -> char {
        match self {
            LineColor::Black => 'B',
            LineColor::White => 'W',
        }
    }
}

/// Diagonal direction for `^GD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    /// `/`: bottom-left to top-right.
    Right,
    /// `\`: top-left to bottom-right.
    Left,
}

/// # Graphic Box (^GB)
///
/// A border of `thickness` dots; a box whose thickness reaches half its
/// smaller side prints solid. `rounding` is 0 (square) to 8.
pub fn graphic_box(width: u32, height: u32, thickness: u32, color: LineColor, rounding: u8) -> String {
    let thickness = thickness.max(1);
    // the printer rejects a box smaller than its border
    let width = width.max(thickness);
    let height = height.max(thickness);
    format!(
        "^GB{},{},{},{},{}",
        width,
        height,
        thickness,
        color.code(),
        rounding.min(8)
    )
}

/// A solid box.
pub fn filled_box(width: u32, height: u32, color: LineColor, rounding: u8) -> String {
    let thickness = width.min(height).max(1);
    graphic_box(width, height, thickness, color, rounding)
}

/// # Graphic Circle (^GC)
pub fn graphic_circle(diameter: u32, thickness: u32, color: LineColor) -> String {
    let diameter = diameter.clamp(3, 4095);
    format!("^GC{},{},{}", diameter, thickness.clamp(1, diameter), color.code())
}

/// # Graphic Ellipse (^GE)
pub fn graphic_ellipse(width: u32, height: u32, thickness: u32, color: LineColor) -> String {
    let width = width.clamp(3, 4095);
    let height = height.clamp(3, 4095);
    format!(
        "^GE{},{},{},{}",
        width,
        height,
        thickness.clamp(1, width.min(height)),
        color.code()
    )
}

/// # Graphic Diagonal Line (^GD)
pub fn graphic_diagonal(width: u32, height: u32, thickness: u32, color: LineColor, lean: Lean) -> String {
    let lean = match lean {
        Lean::Right => 'R',
        Lean::Left => 'L',
    };
    format!(
        "^GD{},{},{},{},{}",
        width.max(3),
        height.max(3),
        thickness.max(1),
        color.code(),
        lean
    )
}

/// # Graphic Field (^GFA)
///
/// ```text
/// ^GFA,{total bytes},{total bytes},{bytes per row},{hex data}
/// ```
pub fn graphic_field(bitmap: &MonoBitmap) -> String {
    let total = bitmap.data.len();
    format!(
        "^GFA,{},{},{},{}",
        total,
        total,
        bitmap.width_bytes,
        bitmap.to_hex()
    )
}
