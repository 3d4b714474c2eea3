//! Output file naming.
//!
//! Every artifact of an invocation is named from one transform stem:
//!
//! ```text
//! {source stem}--{transform_name}[--{argument suffix}]
//! ```
//!
//! with every `.` replaced by `-`, so the only dot left in a file name is the
//! one before the extension. The image keeps the source extension (or none)
//! and the annotation is always `{stem}.json`.

use std::path::{Path, PathBuf};

/// Extension given to copied annotation sidecars.
pub const ANNOTATION_EXTENSION: &str = "json";

const STEM_SEPARATOR: &str = "--";

/// Build the transform stem.
pub fn transform_stem(source_stem: &str, transform_name: &str, suffix: Option<&str>) -> String {
    let mut stem = format!("{source_stem}{STEM_SEPARATOR}{transform_name}");
    if let Some(suffix) = suffix {
        stem.push_str(STEM_SEPARATOR);
        stem.push_str(suffix);
    }
    stem.replace('.', "-")
}

/// Split a file name into stem and extension.
///
/// A trailing dot counts as no extension; a leading dot is part of the stem.
pub fn split_file_name(path: &Path) -> (String, Option<String>) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty());
    (stem, extension)
}

/// Where one artifact pair goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub stem: String,
    pub image: PathBuf,
    pub annotation: Option<PathBuf>,
}

impl Destination {
    /// Compute paths under `output_dir` for a source image.
    pub fn new(
        output_dir: &Path,
        source: &Path,
        transform_name: &str,
        suffix: Option<&str>,
        with_annotation: bool,
    ) -> Self {
        let (source_stem, extension) = split_file_name(source);
        let stem = transform_stem(&source_stem, transform_name, suffix);

        let image_name = match &extension {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem.clone(),
        };
        let annotation = with_annotation
            .then(|| output_dir.join(format!("{stem}.{ANNOTATION_EXTENSION}")));

        Self {
            image: output_dir.join(image_name),
            annotation,
            stem,
        }
    }

    /// All paths this destination will create.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.image.as_path()).chain(self.annotation.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_with_suffix() {
        assert_eq!(transform_stem("cat", "rot", Some("45")), "cat--rot--45");
        assert_eq!(transform_stem("cat", "flip", None), "cat--flip");
    }

    #[test]
    fn test_stem_replaces_dots() {
        assert_eq!(
            transform_stem("img.v2", "rot.a", Some("12.5")),
            "img-v2--rot-a--12-5"
        );
    }

    #[test]
    fn test_distinct_arguments_distinct_stems() {
        let a = transform_stem("x", "r", Some("10-20"));
        let b = transform_stem("x", "r", Some("10-2"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(
            split_file_name(Path::new("/d/a.b.png")),
            ("a.b".to_string(), Some("png".to_string()))
        );
        assert_eq!(split_file_name(Path::new("/d/noext")), ("noext".to_string(), None));
        assert_eq!(split_file_name(Path::new("/d/trailing.")), ("trailing".to_string(), None));
        assert_eq!(split_file_name(Path::new("/d/.hidden")), (".hidden".to_string(), None));
    }

    #[test]
    fn test_destination_paths() {
        let d = Destination::new(Path::new("/out"), Path::new("/in/cat.jpg"), "rot", Some("30"), true);
        assert_eq!(d.stem, "cat--rot--30");
        assert_eq!(d.image, PathBuf::from("/out/cat--rot--30.jpg"));
        assert_eq!(d.annotation, Some(PathBuf::from("/out/cat--rot--30.json")));
        assert_eq!(d.paths().count(), 2);
    }

    #[test]
    fn test_destination_without_extension_or_annotation() {
        let d = Destination::new(Path::new("/out"), Path::new("/in/blob"), "flip", None, false);
        assert_eq!(d.image, PathBuf::from("/out/blob--flip"));
        assert_eq!(d.annotation, None);
        assert_eq!(d.paths().count(), 1);
    }
}
