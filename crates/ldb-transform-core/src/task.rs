//! The per-invocation task record.
//!
//! The calling dataset tool hands every plugin a small JSON object:
//!
//! ```text
//! {
//!   "data_object": "/path/to/image.png",
//!   "annotation": "/path/to/image.json",
//!   "output_dir": "/path/to/out",
//!   "transform_name": "rot"
//! }
//! ```
//!
//! `annotation` may be missing or `null`. Unknown keys are ignored. The
//! positional transform arguments travel separately and are attached with
//! [`TaskDescriptor::with_args`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a task record is rejected before any transform runs.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("malformed task record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("transform_name must not be empty")]
    EmptyTransformName,

    #[error("transform_name {0:?} must not contain a path separator")]
    InvalidTransformName(String),

    #[error("data object {} does not exist", .0.display())]
    MissingDataObject(PathBuf),

    #[error("annotation {} does not exist", .0.display())]
    MissingAnnotation(PathBuf),

    #[error("output directory {} does not exist", .0.display())]
    MissingOutputDir(PathBuf),

    #[error("output path {} is not a directory", .0.display())]
    OutputDirNotADirectory(PathBuf),
}

impl TaskError {
    /// Whether the record itself is wrong, as opposed to the files it names.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            TaskError::Malformed(_)
                | TaskError::EmptyTransformName
                | TaskError::InvalidTransformName(_)
        )
    }
}

/// Everything one transform invocation needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(rename = "data_object")]
    pub data_object_path: PathBuf,
    #[serde(rename = "annotation", default)]
    pub annotation_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub transform_name: String,
    #[serde(skip)]
    pub args: Vec<String>,
}

impl TaskDescriptor {
    pub fn new(
        data_object_path: impl Into<PathBuf>,
        annotation_path: Option<PathBuf>,
        output_dir: impl Into<PathBuf>,
        transform_name: impl Into<String>,
    ) -> Self {
        Self {
            data_object_path: data_object_path.into(),
            annotation_path,
            output_dir: output_dir.into(),
            transform_name: transform_name.into(),
            args: Vec::new(),
        }
    }

    /// Parse a JSON task record.
    pub fn from_json(json: &str) -> Result<Self, TaskError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Attach the positional transform arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Check the record against the filesystem.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.transform_name.is_empty() {
            return Err(TaskError::EmptyTransformName);
        }
        if self.transform_name.contains(['/', '\\']) {
            return Err(TaskError::InvalidTransformName(self.transform_name.clone()));
        }

        if !self.output_dir.exists() {
            return Err(TaskError::MissingOutputDir(self.output_dir.clone()));
        }
        if !self.output_dir.is_dir() {
            return Err(TaskError::OutputDirNotADirectory(self.output_dir.clone()));
        }
        if !self.data_object_path.is_file() {
            return Err(TaskError::MissingDataObject(self.data_object_path.clone()));
        }
        if let Some(annotation) = &self.annotation_path {
            if !annotation.is_file() {
                return Err(TaskError::MissingAnnotation(annotation.clone()));
            }
        }
        Ok(())
    }

    pub fn annotation(&self) -> Option<&Path> {
        self.annotation_path.as_deref()
    }
}
