//! USPS POSTNET and PLANET height-modulated codes.
//!
//! Each digit is five bars. POSTNET uses two tall bars per digit, PLANET
//! is its inverse (three tall). A check digit brings the digit sum to a
//! multiple of ten and a tall frame bar closes each end.

use image::GrayImage;

use super::{BLACK, SynthesisError, WHITE};

/// POSTNET patterns, `true` = tall bar.
const POSTNET: [[bool; 5]; 10] = [
    [true, true, false, false, false],
    [false, false, false, true, true],
    [false, false, true, false, true],
    [false, false, true, true, false],
    [false, true, false, false, true],
    [false, true, false, true, false],
    [false, true, true, false, false],
    [true, false, false, false, true],
    [true, false, false, true, false],
    [true, false, true, false, false],
];

/// Short bars are this fraction of the full height.
const SHORT_BAR: f32 = 0.4;

/// Bar heights for `content` (digits only; spaces and dashes ignored).
pub fn encode(content: &str, planet: bool) -> Result<Vec<bool>, SynthesisError> {
    let symbology = if planet { "planet" } else { "postnet" };
    let digits: Vec<u32> = content
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .ok_or_else(|| SynthesisError::Encode {
            symbology,
            content: content.to_string(),
            reason: "digits only".into(),
        })?;
    if digits.is_empty() {
        return Err(SynthesisError::EmptyContent);
    }

    let check = check_digit(&digits);
    let mut bars = vec![true];
    for d in digits.iter().copied().chain(std::iter::once(check)) {
        bars.extend(POSTNET[d as usize].iter().map(|&tall| tall != planet));
    }
    bars.push(true);
    Ok(bars)
}

pub(crate) fn check_digit(digits: &[u32]) -> u32 {
    (10 - digits.iter().sum::<u32>() % 10) % 10
}

/// Bars are one module wide with a one-module gap, bottom-aligned.
pub fn to_image(bars: &[bool], module_px: u32, height: u32) -> GrayImage {
    let width = (bars.len() as u32 * 2).saturating_sub(1) * module_px;
    let short_top = height - ((height as f32 * SHORT_BAR).round() as u32).max(1);
    GrayImage::from_fn(width, height, |x, y| {
        let module = x / module_px;
        if module % 2 == 1 {
            return WHITE;
        }
        let tall = bars[(module / 2) as usize];
        if tall || y >= short_top { BLACK } else { WHITE }
    })
}
