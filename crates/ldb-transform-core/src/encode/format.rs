//! Output format selection and colour reconciliation.

use image::{ColorType, DynamicImage, ImageFormat};

use super::EncodeError;

/// Pick the container to write.
///
/// A non-empty source extension wins. Without one, the format detected from
/// the source bytes is reused, and PNG is the fallback.
pub fn resolve_output_format(
    extension: Option<&str>,
    detected: Option<ImageFormat>,
) -> Result<ImageFormat, EncodeError> {
    let format = match extension.filter(|ext| !ext.is_empty()) {
        Some(ext) => ImageFormat::from_extension(ext)
            .ok_or_else(|| EncodeError::UnknownExtension(ext.to_string()))?,
        None => detected.unwrap_or(ImageFormat::Png),
    };

    if !format.writing_enabled() {
        return Err(EncodeError::UnsupportedFormat(format));
    }
    Ok(format)
}

/// Whether the container can store an alpha channel.
pub fn supports_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Tiff
            | ImageFormat::WebP
            | ImageFormat::Gif
            | ImageFormat::Ico
            | ImageFormat::Tga
            | ImageFormat::Qoi
            | ImageFormat::Avif
            | ImageFormat::OpenExr
    )
}

/// Bring a transformed image back to a colour type that matches its source
/// and that the destination container can hold.
///
/// Alpha survives only when the source had it and the container stores it.
/// Greyscale sources stay greyscale. An image already in the source colour
/// type is returned untouched, keeping its bit depth.
pub fn reconcile_color(image: DynamicImage, source: ColorType, format: ImageFormat) -> DynamicImage {
    let keep_alpha = source.has_alpha() && supports_alpha(format);
    if image.color() == source && source.has_alpha() == keep_alpha {
        return image;
    }

    match (source.has_color(), keep_alpha) {
        (false, false) => DynamicImage::ImageLuma8(image.to_luma8()),
        (false, true) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        (true, false) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (true, true) => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}
