//! # ZPL Barcode Commands
//!
//! Printers encode barcodes natively, so only the symbology command and
//! the field data are sent.
//!
//! ## Supported Symbologies
//!
//! | Format | Command | Notes |
//! |--------|---------|-------|
//! | Code 128 | `^BC` | mode N |
//! | GS1-128 | `^BC` | mode D (UCC/EAN) |
//! | Code 39 | `^B3` | |
//! | Code 93 | `^BA` | |
//! | Code 11 | `^B1` | |
//! | Codabar | `^BK` | |
//! | MSI | `^BM` | |
//! | EAN-13 | `^BE` | |
//! | EAN-8 | `^B8` | |
//! | UPC-A | `^BU` | |
//! | UPC-E | `^B9` | |
//! | EAN-2/5 | `^BS` | UPC/EAN extension |
//! | ITF / ITF-14 | `^B2` | ITF-14 adds the mod-10 check digit |
//! | Data Matrix | `^BX` | ECC 200 |
//! | PDF417 | `^B7` | |
//! | Aztec | `^BO` | |
//! | POSTNET / PLANET | `^BZ` | |
//! | QR | `^BQ` | model 2 |
//!
//! ## Usage
//!
//! ```
//! use etiqueta::code::BarcodeFormat;
//! use etiqueta::protocol::barcode::{self, SymbolParams};
//! use etiqueta::protocol::commands::Orientation;
//!
//! let params = SymbolParams::new(Orientation::Normal, 80, 2, true);
//! assert_eq!(barcode::symbol(BarcodeFormat::Code128, &params), "^BCN,80,Y,N,N");
//! ```

use super::commands::{Orientation, hex_field_data};
use crate::code::{BarcodeFormat, QrErrorLevel};

/// # Bar Code Field Defaults (^BY)
///
/// `module` is the narrow bar width in dots (1-10); the wide-to-narrow
/// ratio is fixed at 3.
pub fn bar_defaults(module: u32, height: u32) -> String {
    format!("^BY{},3,{}", module.clamp(1, 10), height.max(1))
}

/// Parameters shared by all symbology commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolParams {
    pub orientation: Orientation,
    /// Bar height in dots (row height for PDF417).
    pub height: u32,
    /// Module size in dots (Data Matrix element, Aztec magnification).
    pub module: u32,
    /// Print the human-readable interpretation line.
    pub interpretation: bool,
}

impl SymbolParams {
    pub fn new(orientation: Orientation, height: u32, module: u32, interpretation: bool) -> Self {
        Self {
            orientation,
            height,
            module,
            interpretation,
        }
    }
}

/// The symbology command for `format`.
///
/// 2D symbologies never print an interpretation line.
pub fn symbol(format: BarcodeFormat, params: &SymbolParams) -> String {
    let o = params.orientation.code();
    let h = params.height.max(1);
    let m = params.module.clamp(1, 10);
    let f = if params.interpretation && !format.is_two_dimensional() {
        'Y'
    } else {
        'N'
    };

    match format {
        BarcodeFormat::Code128 => format!("^BC{},{},{},N,N", o, h, f),
        BarcodeFormat::Gs1_128 => format!("^BC{},{},{},N,N,D", o, h, f),
        BarcodeFormat::Code39 => format!("^B3{},N,{},{},N", o, h, f),
        BarcodeFormat::Code93 => format!("^BA{},{},{},N,N", o, h, f),
        BarcodeFormat::Code11 => format!("^B1{},N,{},{},N", o, h, f),
        BarcodeFormat::Codabar => format!("^BK{},N,{},{},N,A,A", o, h, f),
        BarcodeFormat::Msi => format!("^BM{},B,{},{},N,N", o, h, f),
        BarcodeFormat::Ean13 => format!("^BE{},{},{},N", o, h, f),
        BarcodeFormat::Ean8 => format!("^B8{},{},{},N", o, h, f),
        BarcodeFormat::UpcA => format!("^BU{},{},{},N,Y", o, h, f),
        BarcodeFormat::UpcE => format!("^B9{},{},{},N,Y", o, h, f),
        BarcodeFormat::Ean5 | BarcodeFormat::Ean2 => format!("^BS{},{},{}", o, h, f),
        BarcodeFormat::Itf => format!("^B2{},{},{},N,N", o, h, f),
        BarcodeFormat::Itf14 => format!("^B2{},{},{},N,Y", o, h, f),
        BarcodeFormat::DataMatrix => format!("^BX{},{},200", o, m),
        BarcodeFormat::Pdf417 => format!("^B7{},{},0,,,N", o, h),
        BarcodeFormat::Aztec => format!("^BO{},{},N", o, m),
        BarcodeFormat::Postnet => format!("^BZ{},{},{},N,0", o, h, f),
        BarcodeFormat::Planet => format!("^BZ{},{},{},N,1", o, h, f),
    }
}

/// # QR Code (^BQ)
///
/// Model 2; `magnification` is dots per module, clamped to 1-10.
pub fn qr_code(orientation: Orientation, magnification: u32) -> String {
    format!("^BQ{},2,{}", orientation.code(), magnification.clamp(1, 10))
}

/// QR field data: `{ECL}A,{content}` (error level, automatic input mode).
///
/// The content is kept exact, hex-escaped like [`field_data`](super::commands::field_data).
pub fn qr_field_data(level: QrErrorLevel, content: &str) -> String {
    match hex_field_data(content) {
        Some(escaped) => format!("^FH^FD{}A,{}^FS", level.letter(), escaped),
        None => format!("^FD{}A,{}^FS", level.letter(), content),
    }
}

/// QR magnification that fits `modules` plus a 4-module quiet zone on
/// each side into `side` dots.
pub fn qr_magnification(side: u32, modules: u32) -> u32 {
    (side / (modules + 8)).clamp(1, 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(interpretation: bool) -> SymbolParams {
        SymbolParams::new(Orientation::Normal, 80, 3, interpretation)
    }

    #[test]
    fn test_bar_defaults() {
        assert_eq!(bar_defaults(2, 80), "^BY2,3,80");
        assert_eq!(bar_defaults(0, 0), "^BY1,3,1");
        assert_eq!(bar_defaults(30, 10), "^BY10,3,10");
    }

    #[test]
    fn test_linear_symbols() {
        assert_eq!(symbol(BarcodeFormat::Code128, &params(true)), "^BCN,80,Y,N,N");
        assert_eq!(symbol(BarcodeFormat::Code128, &params(false)), "^BCN,80,N,N,N");
        assert_eq!(symbol(BarcodeFormat::Gs1_128, &params(true)), "^BCN,80,Y,N,N,D");
        assert_eq!(symbol(BarcodeFormat::Code39, &params(true)), "^B3N,N,80,Y,N");
        assert_eq!(symbol(BarcodeFormat::Ean13, &params(true)), "^BEN,80,Y,N");
        assert_eq!(symbol(BarcodeFormat::Itf14, &params(false)), "^B2N,80,N,N,Y");
        assert_eq!(symbol(BarcodeFormat::Planet, &params(true)), "^BZN,80,Y,N,1");
    }

    #[test]
    fn test_two_dimensional_never_interpreted() {
        assert_eq!(symbol(BarcodeFormat::DataMatrix, &params(true)), "^BXN,3,200");
        assert_eq!(symbol(BarcodeFormat::Pdf417, &params(true)), "^B7N,80,0,,,N");
        assert_eq!(symbol(BarcodeFormat::Aztec, &params(true)), "^BON,3,N");
    }

    #[test]
    fn test_every_format_has_a_command() {
        for format in BarcodeFormat::ALL {
            assert!(symbol(format, &params(true)).starts_with("^B"));
        }
    }

    #[test]
    fn test_qr() {
        assert_eq!(qr_code(Orientation::Rotated, 4), "^BQR,2,4");
        assert_eq!(qr_code(Orientation::Normal, 40), "^BQN,2,10");
        assert_eq!(qr_field_data(QrErrorLevel::M, "ABC123"), "^FDMA,ABC123^FS");
        assert_eq!(qr_field_data(QrErrorLevel::H, "a^b"), "^FH^FDHA,a_5Eb^FS");
        assert_eq!(
            qr_field_data(QrErrorLevel::Q, "linea 1\r\nlinea_2"),
            "^FH^FDQA,linea 1_0D_0Alinea_5F2^FS"
        );
    }

    #[test]
    fn test_qr_magnification() {
        // 21 modules + 8 quiet = 29
        assert_eq!(qr_magnification(160, 21), 5);
        assert_eq!(qr_magnification(10, 21), 1);
        assert_eq!(qr_magnification(2000, 21), 10);
    }
}
