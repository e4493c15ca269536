//! Core utilities for the scene editor.
//!
//! This crate provides foundational types and utilities used across the editor:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timer
//! - Configuration management

mod config;
mod error;
mod logging;
mod timer;

pub use config::{CameraConfig, ControllerConfig, EditorConfig, RenderConfig};
pub use error::{Error, Result};
pub use logging::{DEFAULT_FILTER, LOG_ENV, init_logging};
pub use timer::Timer;
