//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::kind::UsageError;
use crate::task::TaskError;

/// Anything that aborts a transform invocation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Wrong argument count or shape. Raised before any file is touched.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The task record is malformed or names missing files.
    #[error(transparent)]
    InvalidTask(#[from] TaskError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode image: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file already exists, or two outputs of one invocation
    /// would share a name.
    #[error("refusing to overwrite {}: choose a different transform name or arguments", .path.display())]
    Collision { path: PathBuf },
}

impl TransformError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::Io {
            path: path.into(),
            source,
        }
    }

    /// Usage errors: bad arguments or a malformed task record.
    pub fn is_usage(&self) -> bool {
        match self {
            TransformError::Usage(_) => true,
            TransformError::InvalidTask(err) => err.is_usage(),
            _ => false,
        }
    }
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
