//! A [`Renderer`] that records every call instead of drawing.
//!
//! Used headless by the demo driver and by tests to inspect exactly what the
//! traversal asks of a backend.

use editor_resources::{TextureImage, TextureTarget, Topology};
use glam::{Mat4, Vec3};

use crate::backend::{BufferHandle, Renderer, VertexBuffers};
use crate::error::{RenderError, RenderResult};

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    CreateVertexBuffer(BufferHandle),
    UploadVertexAttributes {
        buffer: BufferHandle,
        components_per_vertex: usize,
        len: usize,
    },
    ReleaseVertexBuffer(BufferHandle),
    BindVertexBuffers(VertexBuffers),
    SetMat4 { name: String, value: Mat4 },
    SetVec3 { name: String, value: Vec3 },
    SetFloat { name: String, value: f32 },
    SetInt { name: String, value: i32 },
    DrawArrays { topology: Topology, vertex_count: usize },
    UploadTexture { target: TextureTarget, width: u32, height: u32 },
}

/// Records backend calls in order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
    next_buffer: u32,
    buffer_limit: Option<u32>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that fails buffer creation after `limit` buffers, as a
    /// backend out of device memory would.
    pub fn with_buffer_limit(limit: u32) -> Self {
        Self {
            buffer_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Returns and forgets the commands recorded so far.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of buffers handed out so far.
    pub fn buffers_created(&self) -> u32 {
        self.next_buffer
    }

    /// The `(topology, vertex_count)` of every recorded draw.
    pub fn draws(&self) -> Vec<(Topology, usize)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawArrays {
                    topology,
                    vertex_count,
                } => Some((*topology, *vertex_count)),
                _ => None,
            })
            .collect()
    }

    /// Every value set for the matrix uniform `name`, in order.
    pub fn mat4_values(&self, name: &str) -> Vec<Mat4> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::SetMat4 { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// The last value set for the vector uniform `name`.
    pub fn last_vec3(&self, name: &str) -> Option<Vec3> {
        self.commands.iter().rev().find_map(|command| match command {
            RenderCommand::SetVec3 { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Every value set for the integer uniform `name`, in order.
    pub fn int_values(&self, name: &str) -> Vec<i32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::SetInt { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, RenderCommand::UploadVertexAttributes { .. }))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn create_vertex_buffer(&mut self) -> RenderResult<BufferHandle> {
        if self.buffer_limit.is_some_and(|limit| self.next_buffer >= limit) {
            return Err(RenderError::Backend(format!(
                "vertex buffer limit of {} reached",
                self.next_buffer
            )));
        }
        let handle = BufferHandle(self.next_buffer);
        self.next_buffer += 1;
        self.commands.push(RenderCommand::CreateVertexBuffer(handle));
        Ok(handle)
    }

    fn upload_vertex_attributes(
        &mut self,
        buffer: BufferHandle,
        components_per_vertex: usize,
        data: &[f32],
    ) -> RenderResult<()> {
        if buffer.0 >= self.next_buffer {
            return Err(RenderError::Backend(format!("unknown buffer {buffer:?}")));
        }
        self.commands.push(RenderCommand::UploadVertexAttributes {
            buffer,
            components_per_vertex,
            len: data.len(),
        });
        Ok(())
    }

    fn release_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(RenderCommand::ReleaseVertexBuffer(buffer));
    }

    fn bind_vertex_buffers(&mut self, buffers: &VertexBuffers) {
        self.commands.push(RenderCommand::BindVertexBuffers(*buffers));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: Mat4) {
        self.commands.push(RenderCommand::SetMat4 {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_vec3(&mut self, name: &str, value: Vec3) {
        self.commands.push(RenderCommand::SetVec3 {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_float(&mut self, name: &str, value: f32) {
        self.commands.push(RenderCommand::SetFloat {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_int(&mut self, name: &str, value: i32) {
        self.commands.push(RenderCommand::SetInt {
            name: name.to_string(),
            value,
        });
    }

    fn draw_arrays(&mut self, topology: Topology, vertex_count: usize) -> RenderResult<()> {
        self.commands.push(RenderCommand::DrawArrays {
            topology,
            vertex_count,
        });
        Ok(())
    }

    fn upload_texture(&mut self, target: TextureTarget, image: &TextureImage) -> RenderResult<()> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.rgba.len() != expected {
            return Err(RenderError::Backend(format!(
                "texture {target:?} holds {} bytes, expected {expected}",
                image.rgba.len()
            )));
        }
        self.commands.push(RenderCommand::UploadTexture {
            target,
            width: image.width,
            height: image.height,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_handles_are_sequential() {
        let mut renderer = RecordingRenderer::new();
        assert_eq!(renderer.create_vertex_buffer().unwrap(), BufferHandle(0));
        assert_eq!(renderer.create_vertex_buffer().unwrap(), BufferHandle(1));
        assert_eq!(renderer.buffers_created(), 2);
    }

    #[test]
    fn test_buffer_limit() {
        let mut renderer = RecordingRenderer::with_buffer_limit(1);
        renderer.create_vertex_buffer().unwrap();
        assert!(matches!(
            renderer.create_vertex_buffer(),
            Err(RenderError::Backend(_))
        ));
    }

    #[test]
    fn test_upload_to_unknown_buffer_fails() {
        let mut renderer = RecordingRenderer::new();
        assert!(renderer
            .upload_vertex_attributes(BufferHandle(3), 3, &[0.0; 9])
            .is_err());
    }

    #[test]
    fn test_uniform_queries() {
        let mut renderer = RecordingRenderer::new();
        renderer.set_uniform_int("uRenderMode", 2);
        renderer.set_uniform_vec3("lightPos", Vec3::X);
        renderer.set_uniform_vec3("lightPos", Vec3::Y);
        renderer.draw_arrays(Topology::Lines, 12).unwrap();

        assert_eq!(renderer.int_values("uRenderMode"), vec![2]);
        assert_eq!(renderer.last_vec3("lightPos"), Some(Vec3::Y));
        assert_eq!(renderer.draws(), vec![(Topology::Lines, 12)]);

        assert_eq!(renderer.take_commands().len(), 4);
        assert!(renderer.commands().is_empty());
    }

    #[test]
    fn test_texture_size_checked() {
        let mut renderer = RecordingRenderer::new();
        let image = TextureImage {
            width: 2,
            height: 2,
            rgba: vec![0; 8],
        };
        assert!(renderer
            .upload_texture(TextureTarget::Layer(0), &image)
            .is_err());
    }
}
