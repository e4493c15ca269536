//! The interface between the render traversal and a graphics backend.
//!
//! The traversal never touches device resources. It creates vertex buffers
//! through a [`Renderer`], uploads attribute streams into them when a
//! drawable is dirty, sets named uniforms and issues one draw per drawable.
//! The backend owns everything on the device side.

use editor_resources::{TextureImage, TextureTarget, Topology};
use glam::{Mat4, Vec3};

use crate::error::RenderResult;

/// Components per vertex in every attribute stream the traversal uploads.
pub const ATTRIBUTE_COMPONENTS: usize = 3;

/// Backend-issued handle of a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// The per-attribute buffers of one drawable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexBuffers {
    pub position: BufferHandle,
    pub normal: BufferHandle,
    pub tangent: BufferHandle,
    pub tex_coord: BufferHandle,
}

impl VertexBuffers {
    pub fn create<R: Renderer + ?Sized>(renderer: &mut R) -> RenderResult<Self> {
        Ok(Self {
            position: renderer.create_vertex_buffer()?,
            normal: renderer.create_vertex_buffer()?,
            tangent: renderer.create_vertex_buffer()?,
            tex_coord: renderer.create_vertex_buffer()?,
        })
    }

    pub fn handles(&self) -> [BufferHandle; 4] {
        [self.position, self.normal, self.tangent, self.tex_coord]
    }
}

/// A graphics backend.
pub trait Renderer {
    fn create_vertex_buffer(&mut self) -> RenderResult<BufferHandle>;

    /// Replaces the contents of `buffer` with `data`, laid out as
    /// `components_per_vertex` floats per vertex.
    fn upload_vertex_attributes(
        &mut self,
        buffer: BufferHandle,
        components_per_vertex: usize,
        data: &[f32],
    ) -> RenderResult<()>;

    /// Frees a buffer whose drawable no longer exists.
    fn release_vertex_buffer(&mut self, _buffer: BufferHandle) {}

    /// Binds the attribute buffers the next draw reads from.
    fn bind_vertex_buffers(&mut self, buffers: &VertexBuffers);

    fn set_uniform_mat4(&mut self, name: &str, value: Mat4);

    fn set_uniform_vec3(&mut self, name: &str, value: Vec3);

    fn set_uniform_float(&mut self, name: &str, value: f32);

    fn set_uniform_int(&mut self, name: &str, value: i32);

    /// Draws `vertex_count` vertices from the bound buffers.
    fn draw_arrays(&mut self, topology: Topology, vertex_count: usize) -> RenderResult<()>;

    /// Populates a cubemap face or texture layer with decoded pixels.
    fn upload_texture(&mut self, target: TextureTarget, image: &TextureImage) -> RenderResult<()>;
}
