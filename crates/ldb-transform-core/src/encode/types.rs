//! Core types for image encoding.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Errors that can occur while choosing a format or encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The file extension does not name a known image format.
    #[error("unrecognised image extension: .{0}")]
    UnknownExtension(String),

    /// The format is known but this build cannot write it.
    #[error("writing {0:?} images is not supported")]
    UnsupportedFormat(ImageFormat),

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed.
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: ImageFormat,
        message: String,
    },
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// JPEG quality (1-100, clamped).
    pub jpeg_quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}
