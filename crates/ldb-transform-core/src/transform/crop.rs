//! Cropping to a [`CropRectangle`] and the combined rotate-and-crop.
//!
//! # Coordinate System
//!
//! - Rectangles are in pixels of the image being cropped, origin top-left
//! - Fractional edges are snapped with [`CropRectangle::to_pixel_box`]

use image::DynamicImage;

use super::geometry::{compute_crop, CropRectangle, ImageDimensions};
use super::rotation::{apply_rotation, InterpolationFilter};

/// Crop an image to a rectangle given in its own pixel space.
///
/// The rectangle is snapped to whole pixels and clamped to the image, so the
/// result is at least 1x1 and never larger than the input.
pub fn apply_crop(image: &DynamicImage, rect: &CropRectangle) -> DynamicImage {
    let canvas = ImageDimensions {
        width: image.width(),
        height: image.height(),
    };
    let b = rect.to_pixel_box(canvas);

    // Fast path: the box covers everything
    if b.left == 0 && b.top == 0 && b.right == canvas.width && b.bottom == canvas.height {
        return image.clone();
    }

    image.crop_imm(b.left, b.top, b.width(), b.height())
}

/// Rotate an image and crop it back to the original aspect ratio.
///
/// Returns the RGBA result together with the rectangle that was cut out of
/// the expanded canvas.
pub fn rotate_and_crop(
    image: &DynamicImage,
    original: ImageDimensions,
    degrees: f64,
    filter: InterpolationFilter,
) -> (DynamicImage, CropRectangle) {
    let rotated = apply_rotation(&image.to_rgba8(), degrees, filter);
    let canvas = ImageDimensions {
        width: rotated.width(),
        height: rotated.height(),
    };
    let rect = compute_crop(original, canvas, degrees);
    let cropped = apply_crop(&DynamicImage::ImageRgba8(rotated), &rect);
    (cropped, rect)
}
