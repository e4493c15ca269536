//! Uniform blocks sent with every frame and every draw.
//!
//! Each block is `#[repr(C)]`, `Pod` and laid out with std140 padding, so a
//! backend that prefers uniform buffers can upload it with
//! [`bytemuck::bytes_of`]. [`apply`](ObjectUniforms::apply) writes the same
//! values as individually named uniforms instead.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use editor_scene::transform::normal_matrix;
use editor_scene::{DrawableNode, Light};

use crate::backend::Renderer;

/// Uniform names shared with the shaders.
pub mod names {
    pub const MODEL_VIEW: &str = "uMV";
    pub const PROJECTION: &str = "uP";
    pub const NORMAL: &str = "uN";
    pub const MAT_AMBIENT: &str = "uMatAmbient";
    pub const MAT_DIFFUSE: &str = "uMatDiffuse";
    pub const MAT_SPECULAR: &str = "uMatSpecular";
    pub const MAT_SHININESS: &str = "uMatShininess";
    pub const RENDER_MODE: &str = "uRenderMode";
    pub const TEXTURE_LAYER: &str = "uTextureLayer";
    pub const BUMP_LAYER: &str = "uBumpLayer";
    pub const TEXTURE_CUBEMAP: &str = "uTextureCubemap";
    pub const LIGHT_POSITION: &str = "lightPos";
    pub const LIGHT_AMBIENT: &str = "lightAmbient";
    pub const LIGHT_DIFFUSE: &str = "lightDiffuse";
    pub const LIGHT_SPECULAR: &str = "lightSpecular";
}

/// Texture unit the environment cubemap is bound to.
pub const CUBEMAP_UNIT: i32 = 0;

/// Per-frame camera data.
///
/// # Memory Layout
///
/// - Offset 0: projection matrix (64 bytes)
/// - Total size: 64 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FrameUniforms {
    pub projection: Mat4,
}

impl FrameUniforms {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_uniform_mat4(names::PROJECTION, self.projection);
        renderer.set_uniform_int(names::TEXTURE_CUBEMAP, CUBEMAP_UNIT);
    }
}

/// Per-frame light data, in eye space.
///
/// # Memory Layout
///
/// - Offset 0: position (12 bytes) + padding
/// - Offset 16: ambient (12 bytes) + padding
/// - Offset 32: diffuse (12 bytes) + padding
/// - Offset 48: specular (12 bytes) + padding
/// - Total size: 64 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct LightUniforms {
    pub position: Vec3,
    pub _pad0: f32,
    pub ambient: Vec3,
    pub _pad1: f32,
    pub diffuse: Vec3,
    pub _pad2: f32,
    pub specular: Vec3,
    pub _pad3: f32,
}

impl LightUniforms {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(light: &Light) -> Self {
        Self {
            position: light.eye_position(),
            ambient: light.ambient,
            diffuse: light.diffuse,
            specular: light.specular,
            ..Self::default()
        }
    }

    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_uniform_vec3(names::LIGHT_POSITION, self.position);
        renderer.set_uniform_vec3(names::LIGHT_AMBIENT, self.ambient);
        renderer.set_uniform_vec3(names::LIGHT_DIFFUSE, self.diffuse);
        renderer.set_uniform_vec3(names::LIGHT_SPECULAR, self.specular);
    }
}

/// Per-draw transforms.
///
/// # Memory Layout
///
/// - Offset 0: model-view matrix (64 bytes)
/// - Offset 64: normal matrix (64 bytes)
/// - Total size: 128 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model_view: Mat4,
    /// Inverse transpose of `model_view`, identity when that is singular.
    pub normal: Mat4,
}

impl ObjectUniforms {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(view: Mat4, world: Mat4) -> Self {
        let model_view = view * world;
        Self {
            model_view,
            normal: normal_matrix(model_view),
        }
    }

    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_uniform_mat4(names::MODEL_VIEW, self.model_view);
        renderer.set_uniform_mat4(names::NORMAL, self.normal);
    }
}

/// Per-draw material and shading selectors.
///
/// # Memory Layout
///
/// - Offset 0: ambient (12 bytes), shininess (4 bytes)
/// - Offset 16: diffuse (12 bytes), render mode (4 bytes)
/// - Offset 32: specular (12 bytes), texture layer (4 bytes)
/// - Offset 48: bump layer (4 bytes) + padding
/// - Total size: 64 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub ambient: Vec3,
    pub shininess: f32,
    pub diffuse: Vec3,
    pub render_mode: i32,
    pub specular: Vec3,
    pub texture_layer: i32,
    pub bump_layer: i32,
    pub _padding: [i32; 3],
}

impl MaterialUniforms {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(drawable: &DrawableNode) -> Self {
        let material = drawable.material();
        let texture = drawable.texture();
        Self {
            ambient: material.ambient,
            shininess: material.shininess,
            diffuse: material.diffuse,
            render_mode: drawable.render_mode().selector(),
            specular: material.specular,
            texture_layer: texture.layer as i32,
            bump_layer: texture.bump_layer as i32,
            _padding: [0; 3],
        }
    }

    /// Writes the material, the render-mode selector and, for modes that
    /// sample them, the texture layers.
    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R, with_layers: bool) {
        renderer.set_uniform_vec3(names::MAT_AMBIENT, self.ambient);
        renderer.set_uniform_vec3(names::MAT_DIFFUSE, self.diffuse);
        renderer.set_uniform_vec3(names::MAT_SPECULAR, self.specular);
        renderer.set_uniform_float(names::MAT_SHININESS, self.shininess);
        renderer.set_uniform_int(names::RENDER_MODE, self.render_mode);
        if with_layers {
            renderer.set_uniform_int(names::TEXTURE_LAYER, self.texture_layer);
            renderer.set_uniform_int(names::BUMP_LAYER, self.bump_layer);
        }
    }
}
