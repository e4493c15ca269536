//! Render error types.

use editor_scene::SceneError;
use thiserror::Error;

/// Errors surfaced by the render traversal and its backends.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No usable graphics backend (missing context, shader compile or link
    /// failure).
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected an operation.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The scene's camera node does not hold a camera.
    #[error("Scene has no camera")]
    MissingCamera,

    /// Scene lookup failed during traversal
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type alias for render operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for editor_core::Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Unavailable(reason) => editor_core::Error::RendererUnavailable(reason),
            other => editor_core::Error::Internal(other.to_string()),
        }
    }
}
