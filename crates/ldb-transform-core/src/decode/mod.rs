//! Reading source images from disk.
//!
//! The decoder keeps two things the rest of the pipeline needs besides the
//! pixels: the container format the bytes were actually in (used when the
//! file has no extension) and the source colour type (used to decide whether
//! the output keeps an alpha channel).
//!
//! # Examples
//!
//! ```ignore
//! use ldb_transform_core::decode::SourceImage;
//!
//! let source = SourceImage::open("photo.png")?;
//! println!("{}x{}", source.dimensions().width, source.dimensions().height);
//! ```

mod source;
mod types;

pub use source::SourceImage;
pub use types::DecodeError;
