//! Image decode/encode boundary.
//!
//! Everything that turns bytes into pixels or pixels into bytes goes
//! through here. PNG output is deterministic for a given image, which the
//! gallery relies on when it compares a tile against the stored screenshot.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Decodes raw file bytes into an in-memory image.
///
/// The format is sniffed from the bytes, not from any file extension.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }

    image::load_from_memory(bytes).map_err(|e| CodecError::DecodeFailed(e.to_string()))
}

/// Encodes an image as PNG bytes.
///
/// Same image in, same bytes out.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

    Ok(png_bytes)
}

/// Encodes an image as a base64 PNG string for hosts that render previews
/// in a webview.
pub fn encode_base64_png(image: &DynamicImage) -> Result<String, CodecError> {
    let png_bytes = encode_png(image)?;
    Ok(STANDARD.encode(&png_bytes))
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("No image bytes to decode")]
    Empty,

    #[error("Image decoding failed: {0}")]
    DecodeFailed(String),

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checkerboard() -> DynamicImage {
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn encode_produces_png_magic() {
        let bytes = encode_png(&checkerboard()).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn encode_is_stable_for_same_image() {
        let img = checkerboard();
        assert_eq!(encode_png(&img).unwrap(), encode_png(&img).unwrap());
        assert_eq!(encode_png(&img).unwrap(), encode_png(&img.clone()).unwrap());
    }

    #[test]
    fn decoded_image_keeps_dimensions() {
        let bytes = encode_png(&checkerboard()).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(CodecError::DecodeFailed(_))));
    }

    #[test]
    fn decode_rejects_empty() {
        assert!(matches!(decode_image(&[]), Err(CodecError::Empty)));
    }

    #[test]
    fn base64_round_trips_to_png_bytes() {
        let img = checkerboard();
        let encoded = encode_base64_png(&img).unwrap();
        let raw = STANDARD.decode(encoded).unwrap();
        assert_eq!(raw, encode_png(&img).unwrap());
    }
}
