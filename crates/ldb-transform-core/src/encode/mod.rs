//! Encoding transformed images for the output directory.
//!
//! This module provides functionality for:
//! - Choosing the output container from the source extension or, for
//!   extensionless files, the detected format (PNG when unknown)
//! - Reconciling the colour type with what the container can store
//! - Encoding to bytes, with configurable JPEG quality
//!
//! # Examples
//!
//! ```ignore
//! use ldb_transform_core::encode::{encode_image, resolve_output_format, EncodeOptions};
//!
//! let format = resolve_output_format(Some("jpg"), None)?;
//! let bytes = encode_image(&image, format, &EncodeOptions::default())?;
//! ```

mod format;
mod jpeg;
mod types;
mod writer;

pub use format::{reconcile_color, resolve_output_format, supports_alpha};
pub use jpeg::encode_jpeg;
pub use types::{EncodeError, EncodeOptions, DEFAULT_JPEG_QUALITY};
pub use writer::encode_image;
