use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by the batch, the renderer and the background removers.
///
/// Only the `Root*` variants abort a run; every other variant is reported
/// against a single member and the batch moves on.
#[derive(Error, Debug)]
pub enum SilhouetteError {
    #[error("root directory not found: {path:?}")]
    RootNotFound { path: PathBuf },

    #[error("root path is not a directory: {path:?}")]
    RootNotDirectory { path: PathBuf },

    #[error("cannot read root directory {path:?}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("filesystem error: {operation} failed for {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image processing error: {operation} failed (file: {path}): {source}")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("model error: {operation} failed: {source}")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "background remover returned {}x{} for a {}x{} image",
        actual.0, actual.1, expected.0, expected.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("image operation failed: {message}")]
    ImageOps { message: String },
}

pub type Result<T> = std::result::Result<T, SilhouetteError>;

impl SilhouetteError {
    /// Fatal errors end the whole run instead of a single member.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RootNotFound { .. }
                | Self::RootNotDirectory { .. }
                | Self::RootUnreadable { .. }
        )
    }

    pub(crate) fn model<E>(operation: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Model {
            operation: operation.into(),
            source: Box::new(err),
        }
    }

    /// Model error carrying only the rendered message of `err`.
    pub(crate) fn model_message(
        operation: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Model {
            operation: operation.into(),
            source: err.to_string().into(),
        }
    }
}

/// The generic pixel helpers in `imageops_ai` report through `anyhow`.
impl From<anyhow::Error> for SilhouetteError {
    fn from(err: anyhow::Error) -> Self {
        Self::ImageOps {
            message: format!("{err:#}"),
        }
    }
}

/// Fallback for I/O errors raised without path context. Call sites that know
/// the path build `SilhouetteError::FileSystem` themselves.
impl From<std::io::Error> for SilhouetteError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "io".to_string(),
            source: err,
        }
    }
}

impl From<image::ImageError> for SilhouetteError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

impl From<ort::Error> for SilhouetteError {
    fn from(err: ort::Error) -> Self {
        Self::model("ort operation", err)
    }
}

/// Shape errors come out of tensor handling around inference, so they count
/// as model errors.
impl From<ndarray::ShapeError> for SilhouetteError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::model("tensor shape conversion", err)
    }
}
