//! Rotate-with-expand on RGBA buffers.
//!
//! The canvas grows to hold the whole rotated image and the exposed corners
//! are fully transparent. Exact quarter turns are done losslessly with
//! `image::imageops`; every other angle uses inverse mapping: for each pixel
//! of the output we find where it came from in the source and sample there.
//!
//! For a counter-clockwise rotation by θ in image coordinates (y down), the
//! inverse transform around the two centres is:
//! ```text
//! src_x = (dst_x - dst_cx) * cos(θ) - (dst_y - dst_cy) * sin(θ) + src_cx
//! src_y = (dst_x - dst_cx) * sin(θ) + (dst_y - dst_cy) * cos(θ) + src_cy
//! ```

use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Angles this close to a multiple of 90° take the lossless path.
const QUARTER_TURN_TOLERANCE: f64 = 1e-6;

/// Slack before rounding a canvas side up, so exact sides stay exact.
const CANVAS_SNAP: f64 = 1e-9;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Interpolation filter for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationFilter {
    /// Nearest source pixel, no blending.
    #[default]
    Nearest,
    /// Blend of the four nearest source pixels.
    Bilinear,
}

/// Number of counter-clockwise quarter turns, if the angle is one.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < QUARTER_TURN_TOLERANCE {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

fn canvas_side(extent: f64) -> u32 {
    let half = (extent / 2.0 - CANVAS_SNAP).ceil().max(0.0);
    ((half * 2.0) as u32).max(1)
}

/// Compute the canvas size for a rotated image.
///
/// The angle is taken modulo 360. Quarter turns keep or swap the dimensions
/// exactly. Any other angle gives the smallest even-sized pixel grid that
/// holds the rotated corners with the content centred:
/// ```text
/// new_w = 2 * ceil((w*|cos| + h*|sin|) / 2)
/// new_h = 2 * ceil((w*|sin| + h*|cos|) / 2)
/// ```
///
/// # Example
///
/// ```
/// use ldb_transform_core::transform::compute_rotated_bounds;
///
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
/// assert_eq!(compute_rotated_bounds(100, 50, -180.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    if let Some(turns) = quarter_turns(angle_degrees) {
        return if turns % 2 == 1 {
            (height, width)
        } else {
            (width, height)
        };
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    (canvas_side(w * cos + h * sin), canvas_side(w * sin + h * cos))
}

/// Rotate an image counter-clockwise about its centre, expanding the canvas.
///
/// The output has the size given by [`compute_rotated_bounds`]. Pixels that
/// fall outside the source are transparent.
pub fn apply_rotation(
    image: &RgbaImage,
    angle_degrees: f64,
    filter: InterpolationFilter,
) -> RgbaImage {
    if let Some(turns) = quarter_turns(angle_degrees) {
        // imageops turns clockwise.
        return match turns {
            0 => image.clone(),
            1 => imageops::rotate270(image),
            2 => imageops::rotate180(image),
            _ => imageops::rotate90(image),
        };
    }

    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width(), image.height(), angle_degrees);

    let angle_rad = angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |dst_x, dst_y| {
        // Work on pixel centres.
        let dx = dst_x as f64 + 0.5 - dst_cx;
        let dy = dst_y as f64 + 0.5 - dst_cy;

        let src_x = dx * cos - dy * sin + src_cx;
        let src_y = dx * sin + dy * cos + src_cy;

        match filter {
            InterpolationFilter::Nearest => sample_nearest(image, src_x, src_y),
            InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
        }
    })
}

fn sample_nearest(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    if x < 0.0 || y < 0.0 {
        return TRANSPARENT;
    }
    let (px, py) = (x.floor() as u32, y.floor() as u32);
    if px >= image.width() || py >= image.height() {
        return TRANSPARENT;
    }
    *image.get_pixel(px, py)
}

/// Sample with bilinear interpolation.
///
/// Positions outside the source footprint are transparent; inside it the
/// four neighbours are clamped to the edge.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (image.width() as f64, image.height() as f64);
    if x < 0.0 || x >= w || y < 0.0 || y >= h {
        return TRANSPARENT;
    }

    let fx = (x - 0.5).clamp(0.0, w - 1.0);
    let fy = (y - 0.5).clamp(0.0, h - 1.0);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f64 * (1.0 - tx) * (1.0 - ty)
            + p10[i] as f64 * tx * (1.0 - ty)
            + p01[i] as f64 * (1.0 - tx) * ty
            + p11[i] as f64 * tx * ty;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    Rgba(result)
}
