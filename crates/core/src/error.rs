//! Error types shared across the editor.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the editor.
#[derive(Error, Debug)]
pub enum Error {
    /// The graphics backend could not be brought up (no context, shader
    /// compile or link failure). Fatal at startup.
    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// Configuration errors
    #[error("Config error in '{path}': {message}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the editor's Error type.
pub type Result<T> = std::result::Result<T, Error>;
