//! Advisory content validation.
//!
//! Editors call this to flag content a scanner is likely to reject. The
//! verdict never blocks generation.

use serde::Serialize;

use super::BarcodeFormat;
use super::linear::gs1_check_digit;

/// Verdict with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: "OK".to_string(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

const CODE39_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 -.$/+%";

pub fn validate_barcode(format: BarcodeFormat, content: &str) -> Validation {
    if content.is_empty() {
        return Validation::invalid("content is empty");
    }

    match format {
        BarcodeFormat::Ean13 => digits_with_check(content, 12, "EAN-13"),
        BarcodeFormat::Ean8 => digits_with_check(content, 7, "EAN-8"),
        BarcodeFormat::UpcA => digits_with_check(content, 11, "UPC-A"),
        BarcodeFormat::Itf14 => digits_with_check(content, 13, "ITF-14"),
        BarcodeFormat::UpcE => digit_lengths(content, &[6, 7, 8], "UPC-E"),
        BarcodeFormat::Ean5 => digit_lengths(content, &[5], "EAN-5"),
        BarcodeFormat::Ean2 => digit_lengths(content, &[2], "EAN-2"),
        BarcodeFormat::Postnet => digit_lengths(content, &[5, 9, 11], "POSTNET"),
        BarcodeFormat::Planet => digit_lengths(content, &[11, 13], "PLANET"),
        BarcodeFormat::Itf => {
            if !is_digits(content) {
                Validation::invalid("ITF accepts digits only")
            } else if content.len() % 2 != 0 {
                Validation::invalid("ITF needs an even number of digits")
            } else {
                Validation::ok()
            }
        }
        BarcodeFormat::Codabar => {
            let upper = content.to_ascii_uppercase();
            let guard = |c: Option<char>| matches!(c, Some('A'..='D'));
            if upper.len() >= 2 && guard(upper.chars().next()) && guard(upper.chars().last()) {
                Validation::ok()
            } else {
                Validation::invalid("Codabar must start and end with A, B, C or D")
            }
        }
        BarcodeFormat::Code39 | BarcodeFormat::Code93 => {
            match content.chars().find(|c| !CODE39_CHARSET.contains(*c)) {
                Some(c) => Validation::invalid(format!(
                    "{} does not support {:?} (A-Z 0-9 space - . $ / + %)",
                    format, c
                )),
                None => Validation::ok(),
            }
        }
        _ => Validation::ok(),
    }
}

fn is_digits(content: &str) -> bool {
    !content.is_empty() && content.chars().all(|c| c.is_ascii_digit())
}

fn digit_lengths(content: &str, lengths: &[usize], label: &str) -> Validation {
    if !is_digits(content) {
        return Validation::invalid(format!("{} accepts digits only", label));
    }
    if !lengths.contains(&content.len()) {
        let allowed: Vec<String> = lengths.iter().map(|n| n.to_string()).collect();
        return Validation::invalid(format!(
            "{} needs {} digits, got {}",
            label,
            allowed.join(" or "),
            content.len()
        ));
    }
    Validation::ok()
}

/// `data_len` digits, or `data_len + 1` with a correct check digit.
fn digits_with_check(content: &str, data_len: usize, label: &str) -> Validation {
    let verdict = digit_lengths(content, &[data_len, data_len + 1], label);
    if !verdict.valid || content.len() == data_len {
        return verdict;
    }
    let expected = gs1_check_digit(&content[..data_len]);
    let actual = content[data_len..].parse::<u32>().unwrap_or(u32::MAX);
    if expected == actual {
        Validation::ok()
    } else {
        Validation::invalid(format!(
            "{} check digit should be {}, got {}",
            label, expected, actual
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ean13() {
        assert!(validate_barcode(BarcodeFormat::Ean13, "590123412345").valid);
        assert!(validate_barcode(BarcodeFormat::Ean13, "5901234123457").valid);
        let bad = validate_barcode(BarcodeFormat::Ean13, "5901234123458");
        assert!(!bad.valid);
        assert_eq!(bad.message, "EAN-13 check digit should be 7, got 8");
        assert!(!validate_barcode(BarcodeFormat::Ean13, "59012341234").valid);
        assert!(!validate_barcode(BarcodeFormat::Ean13, "59012341234A").valid);
    }

    #[test]
    fn test_upc_and_itf14() {
        assert!(validate_barcode(BarcodeFormat::UpcA, "036000291452").valid);
        assert!(!validate_barcode(BarcodeFormat::UpcA, "036000291453").valid);
        assert!(validate_barcode(BarcodeFormat::Itf14, "10012345678902").valid);
    }

    #[test]
    fn test_length_windows() {
        assert!(validate_barcode(BarcodeFormat::Postnet, "12345").valid);
        assert!(validate_barcode(BarcodeFormat::Postnet, "123456789").valid);
        assert!(!validate_barcode(BarcodeFormat::Postnet, "1234").valid);
        assert!(validate_barcode(BarcodeFormat::Planet, "1234567890123").valid);
        assert!(!validate_barcode(BarcodeFormat::Ean2, "1").valid);
        assert!(validate_barcode(BarcodeFormat::UpcE, "0123456").valid);
    }

    #[test]
    fn test_itf_even() {
        assert!(validate_barcode(BarcodeFormat::Itf, "1234").valid);
        assert!(!validate_barcode(BarcodeFormat::Itf, "123").valid);
    }

    #[test]
    fn test_codabar_markers() {
        assert!(validate_barcode(BarcodeFormat::Codabar, "A1234B").valid);
        assert!(!validate_barcode(BarcodeFormat::Codabar, "1234").valid);
    }

    #[test]
    fn test_code39_charset() {
        assert!(validate_barcode(BarcodeFormat::Code39, "ABC-123 $").valid);
        let v = validate_barcode(BarcodeFormat::Code93, "abc");
        assert!(!v.valid);
        assert!(v.message.contains("'a'"));
    }

    #[test]
    fn test_others_need_content() {
        assert!(validate_barcode(BarcodeFormat::Code128, "anything at all").valid);
        assert!(!validate_barcode(BarcodeFormat::Code128, "").valid);
    }
}
