//! JPEG encoding with an explicit quality.
//!
//! `DynamicImage::write_to` always uses the crate's default JPEG quality, so
//! JPEG output goes through `JpegEncoder` directly.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use super::EncodeError;

/// Encode an image to JPEG bytes.
///
/// Greyscale 8-bit images are written as greyscale; everything else is
/// converted to 8-bit RGB first, since JPEG has no alpha channel.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 75: Default, matching common image libraries
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    let result = match image {
        DynamicImage::ImageLuma8(luma) => {
            encoder.write_image(luma.as_raw(), width, height, ExtendedColorType::L8)
        }
        other => {
            let rgb = other.to_rgb8();
            encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        }
    };
    result.map_err(|e| EncodeError::EncodingFailed {
        format: ImageFormat::Jpeg,
        message: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}
