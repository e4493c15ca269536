//! Error types for geometry generation and resource loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A required shape parameter was not supplied.
    #[error("Missing shape parameter '{0}'")]
    MissingParameter(&'static str),

    /// A shape parameter was present but unusable (non-numeric, non-finite
    /// or out of range).
    #[error("Invalid shape parameter '{name}': {value:?}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Raw model data does not form whole triangle records.
    #[error("Invalid model data: {0}")]
    InvalidModelData(String),

    /// A color string could not be parsed.
    #[error("Invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
