//! Running one transform invocation end to end.
//!
//! 1. Arguments are checked against the transform kind (no I/O yet)
//! 2. The task record is checked against the filesystem
//! 3. Every destination path is checked to be free
//! 4. The source is decoded once, then each job is transformed, encoded and
//!    written, followed by a byte-for-byte copy of the annotation
//!
//! Files are created with exclusive-create semantics: an existing file is
//! never overwritten.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decode::SourceImage;
use crate::encode::{encode_image, reconcile_color, resolve_output_format, EncodeOptions};
use crate::error::{Result, TransformError};
use crate::kind::{TransformKind, TransformPlan};
use crate::naming::{split_file_name, Destination};
use crate::task::TaskDescriptor;
use crate::transform::{apply_flip, rotate_and_crop, CropRectangle, FlipAxis, InterpolationFilter};

/// Knobs that do not belong to the task record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub filter: InterpolationFilter,
    pub encode: EncodeOptions,
}

/// One written (image, annotation) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputArtifact {
    pub image_path: PathBuf,
    pub annotation_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRectangle>,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Rotate(f64),
    Flip(FlipAxis),
}

#[derive(Debug)]
struct Job {
    suffix: Option<String>,
    operation: Operation,
}

fn jobs_for<R: Rng + ?Sized>(plan: TransformPlan, rng: &mut R) -> Vec<Job> {
    match plan {
        TransformPlan::Rotate { angles } => angles
            .into_iter()
            .map(|angle| Job {
                suffix: Some(angle.label),
                operation: Operation::Rotate(angle.degrees),
            })
            .collect(),
        TransformPlan::RandomRotate { range } => {
            let degrees = range.sample(rng);
            info!(degrees, range = range.label(), "drew random rotation");
            vec![Job {
                suffix: Some(range.label().to_string()),
                operation: Operation::Rotate(degrees as f64),
            }]
        }
        TransformPlan::Flip(axis) => vec![Job {
            suffix: None,
            operation: Operation::Flip(axis),
        }],
    }
}

/// Apply `kind` to the task's data object and write the results.
///
/// `rng` is only drawn from by `random_rotate`, exactly once.
///
/// # Errors
///
/// - `TransformError::Usage` for bad arguments, before any file is read
/// - `TransformError::InvalidTask` for a bad record or missing inputs
/// - `TransformError::Collision` if any output name is taken, checked
///   before anything is written
/// - `TransformError::Decode`, `Encode` or `Io` for failures on the way
pub fn run_transform<R: Rng + ?Sized>(
    task: &TaskDescriptor,
    kind: TransformKind,
    rng: &mut R,
    options: &RunOptions,
) -> Result<Vec<OutputArtifact>> {
    let plan = kind.plan(&task.args)?;
    task.validate()?;

    let jobs = jobs_for(plan, rng);
    let destinations: Vec<Destination> = jobs
        .iter()
        .map(|job| {
            Destination::new(
                &task.output_dir,
                &task.data_object_path,
                &task.transform_name,
                job.suffix.as_deref(),
                task.annotation().is_some(),
            )
        })
        .collect();
    ensure_available(&destinations)?;

    let source = SourceImage::open(&task.data_object_path)?;
    let (_, extension) = split_file_name(&task.data_object_path);
    let format = resolve_output_format(extension.as_deref(), source.format)?;
    debug!(
        path = %source.path.display(),
        width = source.dimensions().width,
        height = source.dimensions().height,
        color = ?source.color(),
        ?format,
        "decoded source image"
    );

    let mut artifacts = Vec::with_capacity(jobs.len());
    for (job, destination) in jobs.iter().zip(&destinations) {
        let (image, degrees, crop) = match job.operation {
            Operation::Rotate(degrees) => {
                let (image, rect) =
                    rotate_and_crop(&source.image, source.dimensions(), degrees, options.filter);
                debug!(degrees, x1 = rect.x1, y1 = rect.y1, x2 = rect.x2, y2 = rect.y2, "crop rectangle");
                (image, Some(degrees), Some(rect))
            }
            Operation::Flip(axis) => (apply_flip(&source.image, axis), None, None),
        };

        let image = reconcile_color(image, source.color(), format);
        let bytes = encode_image(&image, format, &options.encode)?;
        write_new(&destination.image, &bytes)?;
        info!(path = %destination.image.display(), "wrote image");

        if let (Some(source_annotation), Some(target)) = (task.annotation(), &destination.annotation) {
            copy_new(source_annotation, target)?;
            info!(path = %target.display(), "copied annotation");
        }

        artifacts.push(OutputArtifact {
            image_path: destination.image.clone(),
            annotation_path: destination.annotation.clone(),
            degrees,
            crop,
        });
    }

    Ok(artifacts)
}

/// Fail if any destination exists or two destinations share a path.
fn ensure_available(destinations: &[Destination]) -> Result<()> {
    let mut seen = HashSet::new();
    for path in destinations.iter().flat_map(|d| d.paths()) {
        if !seen.insert(path) || path.symlink_metadata().is_ok() {
            return Err(TransformError::Collision {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                TransformError::Collision {
                    path: path.to_path_buf(),
                }
            } else {
                TransformError::io(path, err)
            }
        })
}

fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = create_new(path)?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|err| TransformError::io(path, err))
}

fn copy_new(source: &Path, target: &Path) -> Result<()> {
    let mut reader = File::open(source).map_err(|err| TransformError::io(source, err))?;
    let mut writer = create_new(target)?;
    io::copy(&mut reader, &mut writer).map_err(|err| TransformError::io(target, err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    const ANNOTATION: &[u8] = b"{\n  \"label\": \"cat\",\n  \"score\": 0.93\n}\n";

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("in");
            let output = dir.path().join("out");
            std::fs::create_dir(&input).unwrap();
            std::fs::create_dir(&output).unwrap();
            Self {
                _dir: dir,
                input,
                output,
            }
        }

        fn image(&self, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
            let path = self.input.join(name);
            let img = RgbImage::from_fn(width, height, |x, y| {
                Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) % 256) as u8])
            });
            img.save_with_format(&path, format).unwrap();
            path
        }

        fn annotation(&self, name: &str) -> PathBuf {
            let path = self.input.join(name);
            std::fs::write(&path, ANNOTATION).unwrap();
            path
        }

        fn task(&self, image: &Path, annotation: Option<PathBuf>, name: &str, args: &[&str]) -> TaskDescriptor {
            TaskDescriptor::new(image, annotation, &self.output, name).with_args(args.iter().copied())
        }

        fn outputs(&self) -> Vec<String> {
            let mut names: Vec<String> = std::fs::read_dir(&self.output)
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn test_rotate_writes_pair_per_angle() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 60, 40, ImageFormat::Png);
        let annotation = fx.annotation("cat.json");
        let task = fx.task(&image, Some(annotation), "rot", &["30", "-12.5"]);

        let artifacts =
            run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default()).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(
            fx.outputs(),
            [
                "cat--rot---12-5.json",
                "cat--rot---12-5.png",
                "cat--rot--30.json",
                "cat--rot--30.png",
            ]
        );
        for artifact in &artifacts {
            let written = std::fs::read(artifact.annotation_path.as_ref().unwrap()).unwrap();
            assert_eq!(written, ANNOTATION);

            let out = image::open(&artifact.image_path).unwrap();
            assert_eq!(out.color(), image::ColorType::Rgb8);
            let ratio = out.width() as f64 / out.height() as f64;
            assert!((ratio - 1.5).abs() < 0.1, "ratio {}", ratio);
        }
        assert_eq!(artifacts[0].degrees, Some(30.0));
        assert!(artifacts[0].crop.is_some());
    }

    #[test]
    fn test_rotate_default_angle_is_90() {
        let fx = Fixture::new();
        let image = fx.image("p.png", 24, 12, ImageFormat::Png);
        let task = fx.task(&image, None, "r", &[]);

        let artifacts =
            run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default()).unwrap();
        assert_eq!(fx.outputs(), ["p--r--90.png"]);
        assert_eq!(artifacts[0].annotation_path, None);
        // 12x24 canvas, largest 2:1 crop is 12x6
        let out = image::open(&artifacts[0].image_path).unwrap();
        assert_eq!(out.dimensions(), (12, 6));
    }

    #[test]
    fn test_second_run_collides() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 30, 30, ImageFormat::Png);
        let annotation = fx.annotation("cat.json");
        let task = fx.task(&image, Some(annotation), "rot", &["15"]);

        run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default()).unwrap();
        let first = std::fs::read(fx.output.join("cat--rot--15.png")).unwrap();

        let err = run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::Collision { .. }), "{err}");
        assert!(!err.is_usage());
        assert_eq!(std::fs::read(fx.output.join("cat--rot--15.png")).unwrap(), first);
    }

    #[test]
    fn test_duplicate_angles_collide_before_writing() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 30, 30, ImageFormat::Png);
        let task = fx.task(&image, None, "rot", &["5", "5"]);

        let err = run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::Collision { .. }));
        assert!(fx.outputs().is_empty());
    }

    #[test]
    fn test_random_rotate_usage_checked_before_io() {
        let fx = Fixture::new();
        let missing = fx.input.join("missing.png");
        let task = fx.task(&missing, None, "rr", &["1", "2", "3", "4"]);

        let err = run_transform(&task, TransformKind::RandomRotate, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(err.is_usage());
        assert!(matches!(err, TransformError::Usage(_)));
        assert!(fx.outputs().is_empty());
    }

    #[test]
    fn test_random_rotate_names_by_range_and_is_seeded() {
        let fx = Fixture::new();
        let image = fx.image("dog.png", 40, 30, ImageFormat::Png);

        let task_a = fx.task(&image, None, "a", &["10", "50", "5"]);
        let task_b = fx.task(&image, None, "b", &["10", "50", "5"]);
        let a = run_transform(&task_a, TransformKind::RandomRotate, &mut rng(), &RunOptions::default())
            .unwrap();
        let b = run_transform(&task_b, TransformKind::RandomRotate, &mut rng(), &RunOptions::default())
            .unwrap();

        assert_eq!(fx.outputs(), ["dog--a--10-50-5.png", "dog--b--10-50-5.png"]);
        assert_eq!(a[0].degrees, b[0].degrees);
        let degrees = a[0].degrees.unwrap();
        assert!((10.0..50.0).contains(&degrees));
        assert_eq!(degrees % 5.0, 0.0);
        assert_eq!(
            std::fs::read(&a[0].image_path).unwrap(),
            std::fs::read(&b[0].image_path).unwrap()
        );
    }

    #[test]
    fn test_flip_horizontal_mirrors_and_copies_annotation() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 9, 6, ImageFormat::Png);
        let annotation = fx.annotation("cat.json");
        let task = fx.task(&image, Some(annotation), "hflip", &[]);

        let artifacts =
            run_transform(&task, TransformKind::FlipHorizontal, &mut rng(), &RunOptions::default())
                .unwrap();
        assert_eq!(fx.outputs(), ["cat--hflip.json", "cat--hflip.png"]);
        assert_eq!(artifacts[0].degrees, None);

        let src = image::open(&image).unwrap();
        let out = image::open(&artifacts[0].image_path).unwrap();
        for (x, y, p) in src.pixels() {
            assert_eq!(out.get_pixel(8 - x, y), p);
        }
        assert_eq!(
            std::fs::read(artifacts[0].annotation_path.as_ref().unwrap()).unwrap(),
            ANNOTATION
        );
    }

    #[test]
    fn test_flip_vertical_without_annotation() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 4, 7, ImageFormat::Png);
        let task = fx.task(&image, None, "vflip", &[]);

        let artifacts =
            run_transform(&task, TransformKind::FlipVertical, &mut rng(), &RunOptions::default())
                .unwrap();
        assert_eq!(fx.outputs(), ["cat--vflip.png"]);

        let src = image::open(&image).unwrap();
        let out = image::open(&artifacts[0].image_path).unwrap();
        for (x, y, p) in src.pixels() {
            assert_eq!(out.get_pixel(x, 6 - y), p);
        }
    }

    #[test]
    fn test_flip_rejects_arguments() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 4, 4, ImageFormat::Png);
        let task = fx.task(&image, None, "f", &["x"]);
        let err = run_transform(&task, TransformKind::FlipHorizontal, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(err.is_usage());
        assert!(fx.outputs().is_empty());
    }

    #[test]
    fn test_extensionless_source_keeps_detected_format() {
        let fx = Fixture::new();
        let image = fx.image("photo.jpg", 16, 16, ImageFormat::Jpeg);
        let bare = fx.input.join("photo");
        std::fs::rename(&image, &bare).unwrap();
        let task = fx.task(&bare, None, "f", &[]);

        let artifacts =
            run_transform(&task, TransformKind::FlipVertical, &mut rng(), &RunOptions::default())
                .unwrap();
        assert_eq!(fx.outputs(), ["photo--f"]);
        let bytes = std::fs::read(&artifacts[0].image_path).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_jpeg_rotation_has_no_alpha() {
        let fx = Fixture::new();
        let image = fx.image("shot.jpg", 40, 24, ImageFormat::Jpeg);
        let task = fx.task(&image, None, "r", &["20"]);

        let artifacts =
            run_transform(&task, TransformKind::Rotate, &mut rng(), &RunOptions::default()).unwrap();
        let out = image::open(&artifacts[0].image_path).unwrap();
        assert_eq!(out.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_rgba_png_keeps_alpha() {
        let fx = Fixture::new();
        let path = fx.input.join("icon.png");
        let img = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 128]));
        DynamicImage::ImageRgba8(img).save(&path).unwrap();
        let task = fx.task(&path, None, "r", &["10"]);

        let artifacts = run_transform(
            &task,
            TransformKind::Rotate,
            &mut rng(),
            &RunOptions {
                filter: InterpolationFilter::Bilinear,
                ..Default::default()
            },
        )
        .unwrap();
        let out = image::open(&artifacts[0].image_path).unwrap();
        assert_eq!(out.color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_missing_annotation_is_task_error() {
        let fx = Fixture::new();
        let image = fx.image("cat.png", 4, 4, ImageFormat::Png);
        let task = fx.task(&image, Some(fx.input.join("nope.json")), "f", &[]);
        let err = run_transform(&task, TransformKind::FlipVertical, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidTask(_)));
        assert!(!err.is_usage());
    }

    #[test]
    fn test_corrupt_source_is_decode_error() {
        let fx = Fixture::new();
        let path = fx.input.join("bad.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        let task = fx.task(&path, None, "f", &[]);
        let err = run_transform(&task, TransformKind::FlipVertical, &mut rng(), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
        assert!(fx.outputs().is_empty());
    }
}
