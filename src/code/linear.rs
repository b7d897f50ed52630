//! One-dimensional symbologies via `barcoders`.
//!
//! Content is normalized before encoding: retail codes take their data
//! digits (the encoder appends the check digit), Codabar gets `A`/`B`
//! guards when missing, ITF is left-padded to an even length.

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code11::Code11;
use barcoders::sym::code39::Code39;
use barcoders::sym::code93::Code93;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean_supp::EANSUPP;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;
use image::GrayImage;

use super::{BLACK, Symbology, SynthesisError, WHITE};

/// Code 128 character set B selector.
const CODE128_SET_B: char = '\u{0181}';

/// Encode to modules (1 = bar, 0 = space).
pub fn encode(symbology: Symbology, content: &str) -> Result<Vec<u8>, SynthesisError> {
    let fail = |reason: String| SynthesisError::Encode {
        symbology: symbology.name(),
        content: content.to_string(),
        reason,
    };
    let content = content.trim();

    let modules = match symbology {
        Symbology::Code128 => Code128::new(format!("{}{}", CODE128_SET_B, content))
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Gs1_128 => {
            // AI parentheses are human-readable only
            let data: String = content.chars().filter(|c| !matches!(c, '(' | ')')).collect();
            Code128::new(format!("{}{}", CODE128_SET_B, data))
                .map(|b| b.encode())
                .map_err(|e| fail(e.to_string()))?
        }
        Symbology::Code39 => Code39::new(content.to_ascii_uppercase())
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Code93 => Code93::new(content.to_ascii_uppercase())
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Code11 => Code11::new(content)
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Codabar => Codabar::new(codabar_guarded(content))
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Ean13 => EAN13::new(retail_digits(content, 12).map_err(&fail)?)
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::UpcA => {
            let digits = retail_digits(content, 11).map_err(&fail)?;
            EAN13::new(format!("0{}", digits))
                .map(|b| b.encode())
                .map_err(|e| fail(e.to_string()))?
        }
        Symbology::Ean8 => EAN8::new(retail_digits(content, 7).map_err(&fail)?)
            .map(|b| b.encode())
            .map_err(|e| fail(e.to_string()))?,
        Symbology::Ean5 | Symbology::Ean2 => {
            let len = if symbology == Symbology::Ean5 { 5 } else { 2 };
            let digits = exact_digits(content, len).map_err(&fail)?;
            EANSUPP::new(digits)
                .map(|b| b.encode())
                .map_err(|e| fail(e.to_string()))?
        }
        Symbology::Itf => {
            let digits = only_digits(content).map_err(&fail)?;
            let even = if digits.len() % 2 == 1 {
                format!("0{}", digits)
            } else {
                digits
            };
            TF::interleaved(even)
                .map(|b| b.encode())
                .map_err(|e| fail(e.to_string()))?
        }
        Symbology::Itf14 => {
            let digits = retail_digits(content, 13).map_err(&fail)?;
            let full = format!("{}{}", digits, gs1_check_digit(&digits));
            TF::interleaved(full)
                .map(|b| b.encode())
                .map_err(|e| fail(e.to_string()))?
        }
        Symbology::Pdf417 | Symbology::Postnet | Symbology::Planet => {
            return Err(fail("not a linear symbology".into()));
        }
    };

    if modules.is_empty() {
        return Err(fail("encoder produced no modules".into()));
    }
    Ok(modules)
}

/// Bars at `module_px` per module, `height` pixels tall.
pub fn to_image(modules: &[u8], module_px: u32, height: u32) -> GrayImage {
    let width = modules.len() as u32 * module_px;
    GrayImage::from_fn(width, height, |x, _| {
        if modules[(x / module_px) as usize] == 1 {
            BLACK
        } else {
            WHITE
        }
    })
}

fn only_digits(content: &str) -> Result<String, String> {
    if content.is_empty() || !content.chars().all(|c| c.is_ascii_digit()) {
        return Err("digits only".to_string());
    }
    Ok(content.to_string())
}

fn exact_digits(content: &str, len: usize) -> Result<String, String> {
    let digits = only_digits(content)?;
    if digits.len() != len {
        return Err(format!("expected {} digits, got {}", len, digits.len()));
    }
    Ok(digits)
}

/// Data digits of a retail code; a trailing check digit is dropped and
/// re-computed by the encoder.
fn retail_digits(content: &str, data_len: usize) -> Result<String, String> {
    let digits = only_digits(content)?;
    match digits.len() {
        n if n == data_len => Ok(digits),
        n if n == data_len + 1 => Ok(digits[..data_len].to_string()),
        n => Err(format!(
            "expected {} or {} digits, got {}",
            data_len,
            data_len + 1,
            n
        )),
    }
}

/// GS1 mod-10 check digit (weights 3,1 from the right).
pub(crate) fn gs1_check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { d })
        .sum();
    (10 - sum % 10) % 10
}

fn codabar_guarded(content: &str) -> String {
    let upper = content.to_ascii_uppercase();
    let is_guard = |c: Option<char>| matches!(c, Some('A'..='D'));
    if is_guard(upper.chars().next()) && is_guard(upper.chars().last()) && upper.len() > 1 {
        upper
    } else {
        format!("A{}B", upper)
    }
}
