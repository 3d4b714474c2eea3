//! Decoding a source image file.

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};

use super::DecodeError;
use crate::transform::ImageDimensions;

/// A decoded source image and what is known about its container.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path the image was read from.
    pub path: PathBuf,
    /// Decoded pixels in their native colour type.
    pub image: DynamicImage,
    /// Format detected from the file contents, if any.
    pub format: Option<ImageFormat>,
    dimensions: ImageDimensions,
}

impl SourceImage {
    /// Read and decode an image file.
    ///
    /// The format is sniffed from the bytes, falling back to the extension.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Io` if the file cannot be read,
    /// `DecodeError::UnsupportedFormat` if no decoder recognises it,
    /// `DecodeError::CorruptedFile` if decoding fails, and
    /// `DecodeError::Empty` for a zero-sized image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let io_err = |source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let reader = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?;
        let format = reader.format();

        let image = reader
            .decode()
            .map_err(|e| DecodeError::from_image(path.to_path_buf(), e))?;

        Self::from_decoded(path.to_path_buf(), image, format)
    }

    /// Wrap an already decoded image.
    pub fn from_decoded(
        path: PathBuf,
        image: DynamicImage,
        format: Option<ImageFormat>,
    ) -> Result<Self, DecodeError> {
        let dimensions = ImageDimensions::new(image.width(), image.height())
            .ok_or_else(|| DecodeError::Empty { path: path.clone() })?;
        Ok(Self {
            path,
            image,
            format,
            dimensions,
        })
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    /// Colour type of the decoded pixels.
    pub fn color(&self) -> ColorType {
        self.image.color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 6, 4);

        let source = SourceImage::open(&path).unwrap();
        assert_eq!(source.dimensions(), ImageDimensions::new(6, 4).unwrap());
        assert_eq!(source.format, Some(ImageFormat::Png));
        assert_eq!(source.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_open_without_extension_sniffs_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 3);
        let bare = dir.path().join("image");
        std::fs::rename(&path, &bare).unwrap();

        let source = SourceImage::open(&bare).unwrap();
        assert_eq!(source.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceImage::open(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[test]
    fn test_open_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(SourceImage::open(&path).is_err());
    }

    #[test]
    fn test_open_truncated_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "t.png", 32, 32);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(SourceImage::open(&path).is_err());
    }

    #[test]
    fn test_from_decoded_rejects_empty() {
        let err = SourceImage::from_decoded(
            PathBuf::from("e.png"),
            DynamicImage::ImageRgba8(RgbaImage::new(0, 5)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Empty { .. }));
    }
}
