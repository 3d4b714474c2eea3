//! Core types for image decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not in a format the decoder understands.
    #[error("unsupported image format in {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The image data is corrupted or incomplete.
    #[error("corrupted or incomplete image {}: {message}", .path.display())]
    CorruptedFile { path: PathBuf, message: String },

    /// The image decoded to zero width or height.
    #[error("image {} has no pixels", .path.display())]
    Empty { path: PathBuf },
}

impl DecodeError {
    pub(crate) fn from_image(path: PathBuf, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(source) => DecodeError::Io { path, source },
            image::ImageError::Unsupported(_) => DecodeError::UnsupportedFormat { path },
            other => DecodeError::CorruptedFile {
                path,
                message: other.to_string(),
            },
        }
    }
}
