//! # Barcode and QR Synthesis
//!
//! Turns a symbology plus content into a raster that the document and
//! preview renderers place in an element box. The printer renderer does
//! not rasterize codes (printers encode natively) but shares the format
//! table and validation defined here.
//!
//! ## Formats
//!
//! | Group | Formats (encoder name) |
//! |-------|------------------------|
//! | General 1D | CODE128 (`code128`), CODE39 (`code39`), CODE93 (`code93`), CODE11 (`code11`), CODABAR (`rationalizedCodabar`), MSI (`msi`) |
//! | Retail 1D | EAN13 (`ean13`), EAN8 (`ean8`), UPC (`upca`), UPCE (`upce`), EAN5 (`ean5`), EAN2 (`ean2`) |
//! | Supply chain | ITF14 (`itf14`), ITF (`interleaved2of5`), GS1_128 (`gs1-128`) |
//! | 2D | DATAMATRIX (`datamatrix`), PDF417 (`pdf417`), AZTEC (`azteccode`) |
//! | Postal | POSTNET (`postnet`), PLANET (`planet`) |
//!
//! Encoder names without a raster encoder here (`msi`, `upce`, `datamatrix`,
//! `azteccode`) fall back to Code 128 so a label still renders.

mod linear;
mod pdf417;
mod postal;
mod qr;
mod validate;

pub use qr::{LogoOverlay, QrConfig, QrLogo, qr_module_count};
pub use validate::{Validation, validate_barcode};

use image::imageops;
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from barcode/QR synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("nothing to encode")]
    EmptyContent,

    #[error("{symbology} cannot encode {content:?}: {reason}")]
    Encode {
        symbology: &'static str,
        content: String,
        reason: String,
    },

    #[error("QR logo: {0}")]
    Logo(String),
}

pub(crate) const BLACK: Luma<u8> = Luma([0]);
pub(crate) const WHITE: Luma<u8> = Luma([255]);

// ============================================================================
// QR ERROR LEVEL
// ============================================================================

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum QrErrorLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl QrErrorLevel {
    pub fn letter(&self) -> char {
        match self {
            QrErrorLevel::L => 'L',
            QrErrorLevel::M => 'M',
            QrErrorLevel::Q => 'Q',
            QrErrorLevel::H => 'H',
        }
    }

    pub(crate) fn to_ec_level(self) -> qrcode::EcLevel {
        match self {
            QrErrorLevel::L => qrcode::EcLevel::L,
            QrErrorLevel::M => qrcode::EcLevel::M,
            QrErrorLevel::Q => qrcode::EcLevel::Q,
            QrErrorLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl<'de> Deserialize<'de> for QrErrorLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = crate::design::de::text(deserializer)?;
        Ok(match raw.trim().to_ascii_uppercase().as_str() {
            "L" => QrErrorLevel::L,
            "Q" => QrErrorLevel::Q,
            "H" => QrErrorLevel::H,
            _ => QrErrorLevel::M,
        })
    }
}

// ============================================================================
// BARCODE FORMATS
// ============================================================================

/// Every symbology a design may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Code93,
    Code11,
    Codabar,
    Msi,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Ean5,
    Ean2,
    Itf14,
    Itf,
    Gs1_128,
    DataMatrix,
    Pdf417,
    Aztec,
    Postnet,
    Planet,
}

impl BarcodeFormat {
    pub const ALL: [BarcodeFormat; 20] = [
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Code11,
        BarcodeFormat::Codabar,
        BarcodeFormat::Msi,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
        BarcodeFormat::Ean5,
        BarcodeFormat::Ean2,
        BarcodeFormat::Itf14,
        BarcodeFormat::Itf,
        BarcodeFormat::Gs1_128,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::Pdf417,
        BarcodeFormat::Aztec,
        BarcodeFormat::Postnet,
        BarcodeFormat::Planet,
    ];

    /// Canonical format name as stored in designs.
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "CODE128",
            BarcodeFormat::Code39 => "CODE39",
            BarcodeFormat::Code93 => "CODE93",
            BarcodeFormat::Code11 => "CODE11",
            BarcodeFormat::Codabar => "CODABAR",
            BarcodeFormat::Msi => "MSI",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Ean8 => "EAN8",
            BarcodeFormat::UpcA => "UPC",
            BarcodeFormat::UpcE => "UPCE",
            BarcodeFormat::Ean5 => "EAN5",
            BarcodeFormat::Ean2 => "EAN2",
            BarcodeFormat::Itf14 => "ITF14",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::Gs1_128 => "GS1_128",
            BarcodeFormat::DataMatrix => "DATAMATRIX",
            BarcodeFormat::Pdf417 => "PDF417",
            BarcodeFormat::Aztec => "AZTEC",
            BarcodeFormat::Postnet => "POSTNET",
            BarcodeFormat::Planet => "PLANET",
        }
    }

    /// Encoder identifier (fixed mapping table).
    pub fn encoder_name(&self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "code128",
            BarcodeFormat::Code39 => "code39",
            BarcodeFormat::Code93 => "code93",
            BarcodeFormat::Code11 => "code11",
            BarcodeFormat::Codabar => "rationalizedCodabar",
            BarcodeFormat::Msi => "msi",
            BarcodeFormat::Ean13 => "ean13",
            BarcodeFormat::Ean8 => "ean8",
            BarcodeFormat::UpcA => "upca",
            BarcodeFormat::UpcE => "upce",
            BarcodeFormat::Ean5 => "ean5",
            BarcodeFormat::Ean2 => "ean2",
            BarcodeFormat::Itf14 => "itf14",
            BarcodeFormat::Itf => "interleaved2of5",
            BarcodeFormat::Gs1_128 => "gs1-128",
            BarcodeFormat::DataMatrix => "datamatrix",
            BarcodeFormat::Pdf417 => "pdf417",
            BarcodeFormat::Aztec => "azteccode",
            BarcodeFormat::Postnet => "postnet",
            BarcodeFormat::Planet => "planet",
        }
    }

    /// Lenient lookup: case, `-`, `_` and spaces are ignored; `UPCA` is an
    /// alias of `UPC`. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<BarcodeFormat> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        if key == "UPCA" {
            return Some(BarcodeFormat::UpcA);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name().replace('_', "") == key)
    }

    pub fn is_two_dimensional(&self) -> bool {
        matches!(
            self,
            BarcodeFormat::DataMatrix | BarcodeFormat::Pdf417 | BarcodeFormat::Aztec
        )
    }

    pub fn is_postal(&self) -> bool {
        matches!(self, BarcodeFormat::Postnet | BarcodeFormat::Planet)
    }

    /// Raster encoder actually used; unsupported encoders map to Code 128.
    pub fn symbology(&self) -> Symbology {
        match self {
            BarcodeFormat::Code128 => Symbology::Code128,
            BarcodeFormat::Code39 => Symbology::Code39,
            BarcodeFormat::Code93 => Symbology::Code93,
            BarcodeFormat::Code11 => Symbology::Code11,
            BarcodeFormat::Codabar => Symbology::Codabar,
            BarcodeFormat::Ean13 => Symbology::Ean13,
            BarcodeFormat::Ean8 => Symbology::Ean8,
            BarcodeFormat::UpcA => Symbology::UpcA,
            BarcodeFormat::Ean5 => Symbology::Ean5,
            BarcodeFormat::Ean2 => Symbology::Ean2,
            BarcodeFormat::Itf14 => Symbology::Itf14,
            BarcodeFormat::Itf => Symbology::Itf,
            BarcodeFormat::Gs1_128 => Symbology::Gs1_128,
            BarcodeFormat::Pdf417 => Symbology::Pdf417,
            BarcodeFormat::Postnet => Symbology::Postnet,
            BarcodeFormat::Planet => Symbology::Planet,
            BarcodeFormat::Msi
            | BarcodeFormat::UpcE
            | BarcodeFormat::DataMatrix
            | BarcodeFormat::Aztec => Symbology::Code128,
        }
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for BarcodeFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = crate::design::de::text(deserializer)?;
        Ok(Self::from_name(&raw).unwrap_or_else(|| {
            if !raw.trim().is_empty() {
                log::warn!("unknown barcode format {:?}, using CODE128", raw);
            }
            BarcodeFormat::Code128
        }))
    }
}

impl Serialize for BarcodeFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// Encoders with a raster implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Code128,
    Code39,
    Code93,
    Code11,
    Codabar,
    Ean13,
    Ean8,
    UpcA,
    Ean5,
    Ean2,
    Itf14,
    Itf,
    Gs1_128,
    Pdf417,
    Postnet,
    Planet,
}

impl Symbology {
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Code128 => "code128",
            Symbology::Code39 => "code39",
            Symbology::Code93 => "code93",
            Symbology::Code11 => "code11",
            Symbology::Codabar => "codabar",
            Symbology::Ean13 => "ean13",
            Symbology::Ean8 => "ean8",
            Symbology::UpcA => "upca",
            Symbology::Ean5 => "ean5",
            Symbology::Ean2 => "ean2",
            Symbology::Itf14 => "itf14",
            Symbology::Itf => "interleaved2of5",
            Symbology::Gs1_128 => "gs1-128",
            Symbology::Pdf417 => "pdf417",
            Symbology::Postnet => "postnet",
            Symbology::Planet => "planet",
        }
    }
}

// ============================================================================
// RASTERS
// ============================================================================

/// A synthesized code: black on white, tightly cropped (no quiet zone).
#[derive(Debug, Clone)]
pub struct CodeRaster {
    pub image: GrayImage,
    /// Width in modules (QR/PDF417 columns, 1D bars+spaces).
    pub modules: u32,
    /// Human-readable text to print under the bars, if any.
    pub caption: Option<String>,
    /// Encoder that produced the raster.
    pub symbology: &'static str,
    /// QR logo, drawn over `image` after it.
    pub logo: Option<LogoOverlay>,
}

impl CodeRaster {
    /// RGBA copy with the logo stamped in.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = DynamicImage::ImageLuma8(self.image.clone()).to_rgba8();
        if let Some(logo) = &self.logo {
            imageops::overlay(&mut out, &logo.image, logo.x as i64, logo.y as i64);
        }
        out
    }
}

/// Options for [`generate_barcode`].
#[derive(Debug, Clone)]
pub struct BarcodeConfig {
    pub format: BarcodeFormat,
    /// Pixels per module.
    pub module_px: u32,
    /// Bar height in pixels (1D only).
    pub height_px: u32,
    pub show_text: bool,
}

impl BarcodeConfig {
    pub fn new(format: BarcodeFormat) -> Self {
        Self {
            format,
            module_px: 2,
            height_px: 60,
            show_text: true,
        }
    }
}

/// Encode `content` as a barcode raster.
pub fn generate_barcode(content: &str, config: &BarcodeConfig) -> Result<CodeRaster, SynthesisError> {
    if content.trim().is_empty() {
        return Err(SynthesisError::EmptyContent);
    }
    let format = config.format;
    let symbology = format.symbology();
    if symbology == Symbology::Code128 && format != BarcodeFormat::Code128 {
        log::warn!(
            "{} ({}) has no raster encoder, rendering as Code 128",
            format,
            format.encoder_name()
        );
    }

    let module_px = config.module_px.max(1);

    let (image, modules) = match symbology {
        Symbology::Pdf417 => {
            let matrix = pdf417::encode(content)?;
            (matrix.to_image(module_px), matrix.width as u32)
        }
        Symbology::Postnet | Symbology::Planet => {
            let bars = postal::encode(content, symbology == Symbology::Planet)?;
            let height = config.height_px.max(2);
            (postal::to_image(&bars, module_px, height), (bars.len() * 2 - 1) as u32)
        }
        _ => {
            let modules = linear::encode(symbology, content)?;
            let height = config.height_px.max(1);
            (linear::to_image(&modules, module_px, height), modules.len() as u32)
        }
    };

    let caption = (config.show_text && !format.is_two_dimensional()).then(|| content.to_string());
    Ok(CodeRaster {
        image,
        modules,
        caption,
        symbology: symbology.name(),
        logo: None,
    })
}

/// Encode `content` as a QR raster.
pub fn generate_qr(content: &str, config: &QrConfig) -> Result<CodeRaster, SynthesisError> {
    qr::generate(content, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_table() {
        assert_eq!(BarcodeFormat::Codabar.encoder_name(), "rationalizedCodabar");
        assert_eq!(BarcodeFormat::Itf.encoder_name(), "interleaved2of5");
        assert_eq!(BarcodeFormat::Gs1_128.encoder_name(), "gs1-128");
        assert_eq!(BarcodeFormat::Aztec.encoder_name(), "azteccode");
        assert_eq!(BarcodeFormat::UpcA.encoder_name(), "upca");
    }

    #[test]
    fn test_from_name_is_lenient() {
        assert_eq!(BarcodeFormat::from_name("code128"), Some(BarcodeFormat::Code128));
        assert_eq!(BarcodeFormat::from_name("GS1-128"), Some(BarcodeFormat::Gs1_128));
        assert_eq!(BarcodeFormat::from_name("gs1_128"), Some(BarcodeFormat::Gs1_128));
        assert_eq!(BarcodeFormat::from_name("UPC-A"), Some(BarcodeFormat::UpcA));
        assert_eq!(BarcodeFormat::from_name("upc"), Some(BarcodeFormat::UpcA));
        assert_eq!(BarcodeFormat::from_name("Data Matrix"), Some(BarcodeFormat::DataMatrix));
        assert_eq!(BarcodeFormat::from_name("qr"), None);
    }

    #[test]
    fn test_every_format_has_a_name_roundtrip() {
        for f in BarcodeFormat::ALL {
            assert_eq!(BarcodeFormat::from_name(f.name()), Some(f));
        }
    }

    #[test]
    fn test_unknown_format_deserializes_to_code128() {
        let f: BarcodeFormat = serde_json::from_str("\"MAXICODE\"").unwrap();
        assert_eq!(f, BarcodeFormat::Code128);
    }

    #[test]
    fn test_unsupported_falls_back_to_code128() {
        for f in [
            BarcodeFormat::Msi,
            BarcodeFormat::UpcE,
            BarcodeFormat::DataMatrix,
            BarcodeFormat::Aztec,
        ] {
            assert_eq!(f.symbology(), Symbology::Code128);
        }
        let raster = generate_barcode("12345", &BarcodeConfig::new(BarcodeFormat::Msi)).unwrap();
        assert_eq!(raster.symbology, "code128");
        assert!(raster.image.width() > 0);
    }

    #[test]
    fn test_two_dimensional_never_captioned() {
        let mut config = BarcodeConfig::new(BarcodeFormat::Pdf417);
        config.show_text = true;
        let raster = generate_barcode("HELLO PDF417", &config).unwrap();
        assert_eq!(raster.symbology, "pdf417");
        assert!(raster.caption.is_none());

        // DataMatrix falls back to a 1D code but is still a 2D format
        let raster = generate_barcode("DM", &BarcodeConfig::new(BarcodeFormat::DataMatrix)).unwrap();
        assert!(raster.caption.is_none());
    }

    #[test]
    fn test_caption_follows_show_text() {
        let mut config = BarcodeConfig::new(BarcodeFormat::Code128);
        let raster = generate_barcode("ABC-123", &config).unwrap();
        assert_eq!(raster.caption.as_deref(), Some("ABC-123"));

        config.show_text = false;
        let raster = generate_barcode("ABC-123", &config).unwrap();
        assert!(raster.caption.is_none());
    }

    #[test]
    fn test_empty_content_is_an_error() {
        assert!(matches!(
            generate_barcode("  ", &BarcodeConfig::new(BarcodeFormat::Code39)),
            Err(SynthesisError::EmptyContent)
        ));
    }

    #[test]
    fn test_qr_level_deserialize() {
        let l: QrErrorLevel = serde_json::from_str("\"h\"").unwrap();
        assert_eq!(l, QrErrorLevel::H);
        let l: QrErrorLevel = serde_json::from_str("\"??\"").unwrap();
        assert_eq!(l, QrErrorLevel::M);
    }
}
