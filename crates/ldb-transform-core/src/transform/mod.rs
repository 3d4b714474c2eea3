//! Geometric transforms: rotate-and-crop and flips.
//!
//! # Pipeline
//!
//! A rotation runs in three steps:
//! 1. Rotate with an expanded canvas ([`apply_rotation`])
//! 2. Compute the centred, aspect-preserving crop ([`compute_crop`])
//! 3. Cut it out ([`apply_crop`])
//!
//! Flips mirror the image in place and skip the geometry entirely.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Crop rectangles are in pixels of the rotated canvas
//! - Origin is top-left corner

mod crop;
mod flip;
mod geometry;
mod rotation;

pub use crop::{apply_crop, rotate_and_crop};
pub use flip::{apply_flip, FlipAxis};
pub use geometry::{
    compute_crop, rotated_extent, CropRectangle, ImageDimensions, PixelBox,
};
pub use rotation::{apply_rotation, compute_rotated_bounds, InterpolationFilter};
