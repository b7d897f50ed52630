//! Unit conventions shared by the renderers.
//!
//! | Unit | Used by | Per millimetre |
//! |------|---------|----------------|
//! | canvas px | designs (`font_size`), auto-fit | 96 / 25.4 |
//! | point | PDF documents | 72 / 25.4 |
//! | dot | printers | 8, 12 or 24 (see [`crate::printer::Dpi`]) |
//! | device px | preview | chosen per panel |
//!
//! One canvas pixel is 0.75 pt.

/// Canvas (CSS) pixels per millimetre.
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// PDF points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// PDF points per canvas pixel.
pub const PT_PER_PX: f32 = 0.75;

#[inline]
pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_MM
}

#[inline]
pub fn px_to_mm(px: f32) -> f32 {
    px / PX_PER_MM
}

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

#[inline]
pub fn px_to_pt(px: f32) -> f32 {
    px * PT_PER_PX
}
