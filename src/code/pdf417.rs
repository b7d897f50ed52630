//! PDF417 stacked code.
//!
//! Tries a few fixed grid sizes, smallest first, and keeps the first one
//! the encoder can seal. Rows are drawn three times as tall as a module
//! is wide.

use image::GrayImage;
use pdf417::{END_PATTERN, PDF417, PDF417Encoder, START_PATTERN};

use super::{BLACK, SynthesisError, WHITE};

/// (rows, data columns) grids in order of preference.
const GRIDS: [(u8, u8); 4] = [(10, 4), (20, 6), (30, 8), (45, 12)];

/// Row height in modules.
const ROW_ASPECT: u32 = 3;

/// A sealed PDF417 symbol as a module matrix.
#[derive(Debug, Clone)]
pub struct Pdf417Matrix {
    pub width: usize,
    pub rows: usize,
    bits: Vec<bool>,
}

impl Pdf417Matrix {
    pub fn is_dark(&self, x: usize, row: usize) -> bool {
        self.bits[row * self.width + x]
    }

    pub fn to_image(&self, module_px: u32) -> GrayImage {
        let row_px = module_px * ROW_ASPECT;
        GrayImage::from_fn(
            self.width as u32 * module_px,
            self.rows as u32 * row_px,
            |x, y| {
                if self.is_dark((x / module_px) as usize, (y / row_px) as usize) {
                    BLACK
                } else {
                    WHITE
                }
            },
        )
    }
}

fn symbol_width(cols: u8) -> usize {
    // start + left indicator + data + right indicator + end
    START_PATTERN.size() as usize + 17 + cols as usize * 17 + 17 + END_PATTERN.size() as usize
}

pub fn encode(content: &str) -> Result<Pdf417Matrix, SynthesisError> {
    for (rows, cols) in GRIDS {
        let mut codewords = vec![0u16; rows as usize * cols as usize];
        let Some((level, filled)) = PDF417Encoder::new(&mut codewords, false)
            .append_ascii(content)
            .fit_seal()
        else {
            continue;
        };

        let width = symbol_width(cols);
        let mut bits = vec![false; width * rows as usize];
        for (slot, bit) in bits.iter_mut().zip(PDF417::new(filled, rows, cols, level).bits()) {
            *slot = bit;
        }
        log::debug!("pdf417: {} bytes in {}x{} grid", content.len(), rows, cols);
        return Ok(Pdf417Matrix {
            width,
            rows: rows as usize,
            bits,
        });
    }

    Err(SynthesisError::Encode {
        symbology: "pdf417",
        content: content.chars().take(32).collect(),
        reason: "content too long".into(),
    })
}
