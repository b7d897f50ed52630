//! Embedded image payloads (`image_data`, `qr_logo_data`).
//!
//! Editors store images inline as `data:<mime>;base64,<payload>` URIs.
//! Bare base64 is accepted too.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STD};
use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageDataError {
    #[error("data URI is not base64 encoded")]
    NotBase64Uri,

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a data URI (or bare base64) into raw bytes.
pub fn decode_payload(src: &str) -> Result<Vec<u8>, ImageDataError> {
    let src = src.trim();
    let payload = match src.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or(ImageDataError::NotBase64Uri)?;
            if !meta.ends_with(";base64") {
                return Err(ImageDataError::NotBase64Uri);
            }
            data
        }
        None => src,
    };
    // line breaks sneak in when payloads are pasted
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64_STD.decode(compact)?)
}

/// Decode an embedded PNG/JPEG into pixels.
pub fn decode_image(src: &str) -> Result<DynamicImage, ImageDataError> {
    let bytes = decode_payload(src)?;
    Ok(image::load_from_memory(&bytes)?)
}

#[cfg(test)]
pub(crate) fn png_data_uri(img: &image::RgbaImage) -> String {
    use image::ImageEncoder;

    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    format!("data:image/png;base64,{}", BASE64_STD.encode(bytes))
}
