//! Renderer-agnostic drawing of the scene.
//!
//! This crate turns a scene into backend calls:
//! - The [`Renderer`] interface a graphics backend implements
//! - Uniform blocks for camera, light, object and material data
//! - The per-frame traversal with lazy buffer uploads
//! - A recording backend for headless runs and tests

pub mod backend;
pub mod error;
pub mod recording;
pub mod traversal;
pub mod uniforms;

pub use backend::{BufferHandle, Renderer, VertexBuffers};
pub use error::{RenderError, RenderResult};
pub use recording::{RecordingRenderer, RenderCommand};
pub use traversal::{FrameStats, SceneRenderer};
