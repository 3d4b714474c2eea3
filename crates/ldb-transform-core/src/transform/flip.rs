//! Mirror transforms. No canvas change, no crop.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Axis a flip mirrors across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipAxis {
    /// Left-right: `(x, y)` moves to `(width - 1 - x, y)`.
    Horizontal,
    /// Top-bottom: `(x, y)` moves to `(x, height - 1 - y)`.
    Vertical,
}

/// Mirror an image, keeping its colour type and bit depth.
pub fn apply_flip(image: &DynamicImage, axis: FlipAxis) -> DynamicImage {
    match axis {
        FlipAxis::Horizontal => image.fliph(),
        FlipAxis::Vertical => image.flipv(),
    }
}
