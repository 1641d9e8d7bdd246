use std::path::PathBuf;

/// Convenience result type used across the renderer.
pub type MannequinResult<T> = Result<T, MannequinError>;

/// Top-level error taxonomy.
///
/// Every variant is run-fatal: a render either produces every requested frame or fails as a whole.
/// Missing joints are data, not errors, and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum MannequinError {
    /// The rig descriptor file is absent from the asset directory.
    #[error("rig descriptor not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The rig descriptor is present but unusable (missing `ref_size`, empty `parts`, ...).
    #[error("invalid rig descriptor: {0}")]
    ConfigInvalid(String),

    /// A sprite or background image referenced by the rig does not exist or cannot be read.
    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The pose document is unreadable or malformed.
    #[error("invalid pose data: {0}")]
    PoseDataInvalid(String),

    /// Unexpected failure while compositing a single frame.
    #[error("render job for frame {frame} failed: {msg}")]
    RenderJobFailed {
        /// Submission index of the failing job.
        frame: usize,
        /// Failure description.
        msg: String,
    },

    /// Invalid caller-provided options or buffer shapes.
    #[error("validation error: {0}")]
    Validation(String),

    /// The run was cancelled by the caller.
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MannequinError {
    /// Build a [`MannequinError::ConfigNotFound`] value.
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound(path.into())
    }

    /// Build a [`MannequinError::ConfigInvalid`] value.
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    /// Build a [`MannequinError::AssetNotFound`] value.
    pub fn asset_not_found(path: impl Into<PathBuf>) -> Self {
        Self::AssetNotFound(path.into())
    }

    /// Build a [`MannequinError::PoseDataInvalid`] value.
    pub fn pose_data(msg: impl Into<String>) -> Self {
        Self::PoseDataInvalid(msg.into())
    }

    /// Build a [`MannequinError::RenderJobFailed`] value.
    pub fn render_job(frame: usize, msg: impl Into<String>) -> Self {
        Self::RenderJobFailed {
            frame,
            msg: msg.into(),
        }
    }

    /// Build a [`MannequinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Full diagnostic text: the error plus its chain of causes, one per line.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Other(e) => format!("{e:?}"),
            _ => {
                let mut out = self.to_string();
                let mut src = std::error::Error::source(self);
                while let Some(cause) = src {
                    out.push_str("\ncaused by: ");
                    out.push_str(&cause.to_string());
                    src = cause.source();
                }
                out
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
