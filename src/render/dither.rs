//! # Ordered Dithering for Graphic Fields
//!
//! Label printers print black or nothing. Photos and logos placed on a
//! label go out as a `^GFA` graphic field, a packed 1-bit bitmap, so
//! continuous tone is simulated with a Bayer 8x8 threshold screen.
//!
//! ```text
//! Grayscale:    White    Light    Medium    Dark    Black
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! For each dot `(x, y)` the source is sampled, transparent pixels are
//! composited over white, and the dot prints when its darkness exceeds
//! `(BAYER8[y mod 8][x mod 8] + 0.5) / 64`.
//!
//! ## Usage Example
//!
//! ```
//! use etiqueta::render::dither;
//!
//! let row = vec![true, true, false, false, true, false, true, false];
//! assert_eq!(dither::pack_row(&row), vec![0b11001010]);
//! ```

use image::imageops::FilterType;
use image::{DynamicImage, Rgba};

/// Bayer 8x8 dithering matrix (values 0-63, each exactly once).
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold in (0, 1) for a dot position; never exactly 0 or 1, so pure
/// black always prints and pure white never does.
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    (BAYER8[y & 7][x & 7] as f32 + 0.5) / 64.0
}

/// `darkness`: 0.0 = white, 1.0 = black.
#[inline]
pub fn should_print(x: usize, y: usize, darkness: f32) -> bool {
    darkness > threshold(x, y)
}

/// Pack dots MSB-first; the last byte is padded with white.
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// A packed 1-bit bitmap, rows of `width_bytes` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    pub width: u32,
    pub height: u32,
    pub width_bytes: usize,
    pub data: Vec<u8>,
}

impl MonoBitmap {
    /// Dither from a darkness function.
    pub fn from_fn<F>(width: u32, height: u32, darkness: F) -> Self
    where
        F: Fn(u32, u32) -> f32,
    {
        let width_bytes = (width as usize).div_ceil(8);
        let mut data = Vec::with_capacity(width_bytes * height as usize);
        let mut row = Vec::with_capacity(width as usize);
        for y in 0..height {
            row.clear();
            row.extend((0..width).map(|x| should_print(x as usize, y as usize, darkness(x, y))));
            data.extend(pack_row(&row));
        }
        Self {
            width,
            height,
            width_bytes,
            data,
        }
    }

    /// Scale `image` to exactly `width x height` dots and dither it.
    pub fn from_image(image: &DynamicImage, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let scaled = image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8();
        Self::from_fn(width, height, |x, y| darkness(scaled.get_pixel(x, y)))
    }

    /// Uppercase hex, one row after another (the `^GFA` ASCII payload).
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.data.len() * 2);
        for byte in &self.data {
            out.push_str(&format!("{:02X}", byte));
        }
        out
    }
}

/// Darkness of a pixel composited over white.
fn darkness(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, a] = pixel.0;
    let alpha = a as f32 / 255.0;
    let luma = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0;
    let over_white = luma * alpha + (1.0 - alpha);
    1.0 - over_white
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 64];
        for row in &BAYER8 {
            for &val in row {
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_extremes() {
        for y in 0..16 {
            for x in 0..16 {
                assert!(should_print(x, y, 1.0));
                assert!(!should_print(x, y, 0.0));
            }
        }
    }

    #[test]
    fn test_pack_row_padding() {
        assert_eq!(pack_row(&[true, true, true, true]), vec![0xF0]);
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_black_image_is_solid() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let bitmap = MonoBitmap::from_image(&img, 12, 2);
        assert_eq!(bitmap.width_bytes, 2);
        assert_eq!(bitmap.data, vec![0xFF, 0xF0, 0xFF, 0xF0]);
        assert_eq!(bitmap.to_hex(), "FFF0FFF0");
    }

    #[test]
    fn test_transparent_is_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let bitmap = MonoBitmap::from_image(&img, 8, 8);
        assert!(bitmap.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_gray_prints_about_half() {
        let bitmap = MonoBitmap::from_fn(8, 8, |_, _| 0.5);
        let dots: u32 = bitmap.data.iter().map(|b| b.count_ones()).sum();
        assert!((28..=36).contains(&dots), "got {}", dots);
    }
}
