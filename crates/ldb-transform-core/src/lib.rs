//! LDB Transform Core - image augmentation transforms for dataset tooling
//!
//! This crate implements the transforms a dataset tool invokes per data
//! object: rotate with the canvas cropped back to the original aspect ratio,
//! rotate by a random angle, and horizontal or vertical flips. Each
//! invocation writes a transformed image next to a byte copy of its
//! annotation, named so repeated runs never overwrite each other.

pub mod decode;
pub mod encode;
pub mod error;
pub mod kind;
pub mod naming;
pub mod runner;
pub mod task;
pub mod transform;

pub use error::{Result, TransformError};
pub use kind::{Angle, RandomRange, TransformKind, TransformPlan, UsageError};
pub use runner::{run_transform, OutputArtifact, RunOptions};
pub use task::{TaskDescriptor, TaskError};
pub use transform::{
    apply_crop, apply_flip, apply_rotation, compute_crop, compute_rotated_bounds, CropRectangle,
    FlipAxis, ImageDimensions, InterpolationFilter,
};
