//! Scene graph for the editor.
//!
//! This crate provides the editable scene:
//! - Node tree with selection cursor and structural editing
//! - Drawable, camera, light and skybox nodes
//! - Transform operators and the interactive controller

pub mod camera;
pub mod drawable;
pub mod error;
pub mod graph;
pub mod light;
pub mod node;
pub mod transform;

pub use camera::Camera;
pub use drawable::{DrawableNode, RenderMode, TextureBinding};
pub use error::{SceneError, SceneResult};
pub use graph::{Direction, SceneContext};
pub use light::Light;
pub use node::{Node, NodeId, NodeKind};
pub use transform::{Axis, TransformController, TransformMode};
