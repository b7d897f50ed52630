//! QR codes with optional centered logo.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};
use qrcode::QrCode;

use super::{BLACK, CodeRaster, QrErrorLevel, SynthesisError, WHITE};
use crate::design::image_data;

/// Pad around the logo, as a fraction of the logo side.
const LOGO_PAD_RATIO: f32 = 0.10;
const LOGO_PAD_MIN_PX: u32 = 2;

/// A logo to stamp over the middle of a QR code.
#[derive(Debug, Clone)]
pub struct QrLogo {
    /// Data URI or bare base64 PNG/JPEG.
    pub data: String,
    /// Logo side as a percentage of the QR side.
    pub size_percent: f32,
}

#[derive(Debug, Clone)]
pub struct QrConfig {
    pub error_level: QrErrorLevel,
    /// Target side in pixels; modules are whole pixels so the raster may be
    /// slightly smaller.
    pub size_px: u32,
    pub logo: Option<QrLogo>,
}

impl QrConfig {
    pub fn new(error_level: QrErrorLevel, size_px: u32) -> Self {
        Self {
            error_level,
            size_px,
            logo: None,
        }
    }

    pub fn with_logo(mut self, data: impl Into<String>, size_percent: f32) -> Self {
        self.logo = Some(QrLogo {
            data: data.into(),
            size_percent,
        });
        self
    }

    /// A logo covers modules, so it always gets the most redundancy.
    pub fn effective_level(&self) -> QrErrorLevel {
        if self.logo.is_some() {
            QrErrorLevel::H
        } else {
            self.error_level
        }
    }
}

/// Pre-rendered logo plus its placement inside the QR raster.
#[derive(Debug, Clone)]
pub struct LogoOverlay {
    pub image: RgbaImage,
    pub x: u32,
    pub y: u32,
}

fn build(content: &str, level: QrErrorLevel) -> Result<QrCode, SynthesisError> {
    QrCode::with_error_correction_level(content, level.to_ec_level()).map_err(|e| {
        SynthesisError::Encode {
            symbology: "qrcode",
            content: content.chars().take(32).collect(),
            reason: e.to_string(),
        }
    })
}

/// Modules per side (without quiet zone) at a given level.
pub fn qr_module_count(content: &str, level: QrErrorLevel) -> Result<u32, SynthesisError> {
    if content.is_empty() {
        return Err(SynthesisError::EmptyContent);
    }
    Ok(build(content, level)?.width() as u32)
}

pub(super) fn generate(content: &str, config: &QrConfig) -> Result<CodeRaster, SynthesisError> {
    if content.is_empty() {
        return Err(SynthesisError::EmptyContent);
    }
    let code = build(content, config.effective_level())?;
    let modules = code.width() as u32;
    let module_px = (config.size_px / modules).max(1);
    let side = modules * module_px;

    let mut image = GrayImage::from_pixel(side, side, WHITE);
    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            for y in qy * module_px..(qy + 1) * module_px {
                for x in qx * module_px..(qx + 1) * module_px {
                    image.put_pixel(x, y, BLACK);
                }
            }
        }
    }

    let logo = match &config.logo {
        Some(logo) => match prepare_logo(logo, side) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("{}; rendering QR without logo", e);
                None
            }
        },
        None => None,
    };

    Ok(CodeRaster {
        image,
        modules,
        caption: None,
        symbology: "qrcode",
        logo,
    })
}

/// Scale the logo to `size_percent` of `qr_side` and put it on a white pad,
/// centered.
fn prepare_logo(logo: &QrLogo, qr_side: u32) -> Result<LogoOverlay, SynthesisError> {
    let decoded =
        image_data::decode_image(&logo.data).map_err(|e| SynthesisError::Logo(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(SynthesisError::Logo("empty image".into()));
    }

    let box_side = ((qr_side as f32 * logo.size_percent / 100.0).round() as u32).clamp(1, qr_side);
    let pad = ((box_side as f32 * LOGO_PAD_RATIO).round() as u32).max(LOGO_PAD_MIN_PX);
    let inner = box_side.saturating_sub(2 * pad).max(1);

    // keep aspect ratio inside the inner square
    let scaled = decoded.resize(inner, inner, FilterType::Triangle).to_rgba8();

    let mut padded = RgbaImage::from_pixel(
        scaled.width() + 2 * pad,
        scaled.height() + 2 * pad,
        Rgba([255, 255, 255, 255]),
    );
    imageops::overlay(&mut padded, &scaled, pad as i64, pad as i64);

    let x = qr_side.saturating_sub(padded.width()) / 2;
    let y = qr_side.saturating_sub(padded.height()) / 2;
    Ok(LogoOverlay {
        image: padded,
        x,
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::image_data::png_data_uri;

    #[test]
    fn test_raster_is_whole_modules() {
        let raster = generate("https://example.com", &QrConfig::new(QrErrorLevel::M, 100)).unwrap();
        assert_eq!(raster.image.width() % raster.modules, 0);
        assert!(raster.image.width() <= 100);
        // finder pattern corner
        assert_eq!(raster.image.get_pixel(0, 0), &BLACK);
        assert!(raster.logo.is_none());
    }

    #[test]
    fn test_tiny_target_keeps_one_pixel_modules() {
        let raster = generate("hola", &QrConfig::new(QrErrorLevel::L, 3)).unwrap();
        assert_eq!(raster.image.width(), raster.modules);
    }

    #[test]
    fn test_logo_forces_level_h() {
        let config = QrConfig::new(QrErrorLevel::L, 200).with_logo("bogus", 20.0);
        assert_eq!(config.effective_level(), QrErrorLevel::H);
        let plain = qr_module_count("ETIQUETA-0001", QrErrorLevel::L).unwrap();
        let high = qr_module_count("ETIQUETA-0001", QrErrorLevel::H).unwrap();
        let raster = generate("ETIQUETA-0001", &config).unwrap();
        assert!(high >= plain);
        assert_eq!(raster.modules, high);
    }

    #[test]
    fn test_bad_logo_is_dropped() {
        let config = QrConfig::new(QrErrorLevel::M, 120).with_logo("data:image/png;base64,!!", 20.0);
        let raster = generate("X", &config).unwrap();
        assert!(raster.logo.is_none());
    }

    #[test]
    fn test_logo_centered_with_pad() {
        let logo = RgbaImage::from_pixel(10, 10, Rgba([200, 0, 0, 255]));
        let config = QrConfig::new(QrErrorLevel::M, 200).with_logo(png_data_uri(&logo), 25.0);
        let raster = generate("https://example.com/lote/42", &config).unwrap();
        let overlay = raster.logo.unwrap();
        let side = raster.image.width();

        assert_eq!(overlay.x, (side - overlay.image.width()) / 2);
        assert_eq!(overlay.y, (side - overlay.image.height()) / 2);
        // pad corner is white, middle is the logo
        assert_eq!(overlay.image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        let mid = overlay.image.width() / 2;
        assert_eq!(overlay.image.get_pixel(mid, mid).0[0], 200);
    }
}
