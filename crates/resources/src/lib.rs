//! Geometry and asset resources for the editor.
//!
//! This crate produces everything a drawable needs before it reaches the
//! renderer:
//! - Procedural mesh generators and imported triangle models
//! - Tangent generation for normal mapping
//! - Phong materials and color parsing
//! - Texture tables and asynchronous image loading

pub mod error;
pub mod geometry;
pub mod material;
pub mod model;
pub mod primitives;
pub mod tangent;
pub mod texture;

pub use error::{ResourceError, ResourceResult};
pub use geometry::{Geometry, GeometryBuilder, Topology};
pub use material::{Material, parse_hex_color};
pub use primitives::{ShapeKind, ShapeParams};
pub use texture::{
    CubeFace, CubemapFaces, ImageTextureLoader, TextureEvent, TextureImage, TextureLoader,
    TextureRegistry, TextureSet, TextureTarget,
};
