//! Encoding a transformed image into the chosen container.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::{encode_jpeg, EncodeError, EncodeOptions};

/// Encode an image to bytes in `format`.
///
/// The image should already have gone through
/// [`reconcile_color`](super::reconcile_color) for this format.
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    if format == ImageFormat::Jpeg {
        return encode_jpeg(image, options.jpeg_quality);
    }

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|e| EncodeError::EncodingFailed {
            format,
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}
