//! Per-frame scene traversal.
//!
//! A frame refreshes the camera and light, then walks the tree depth-first
//! from the root, composing `world = parent_world * local` on the way down
//! and drawing every node that carries geometry. Vertex buffers are created
//! on a drawable's first draw and refilled whenever it is dirty.

use editor_resources::{TextureEvent, TextureLoader, TextureRegistry, TextureTarget};
use editor_scene::{DrawableNode, NodeId, NodeKind, RenderMode, SceneContext};
use glam::Mat4;
use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use crate::backend::{ATTRIBUTE_COMPONENTS, Renderer, VertexBuffers};
use crate::error::{RenderError, RenderResult};
use crate::uniforms::{FrameUniforms, LightUniforms, MaterialUniforms, ObjectUniforms};

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes reached by the traversal.
    pub nodes_visited: usize,
    /// Draw calls issued.
    pub draw_calls: usize,
    /// Drawables whose buffers were (re)filled.
    pub uploads: usize,
}

/// Draws a [`SceneContext`] through a [`Renderer`].
///
/// Holds the backend buffers of every drawable it has drawn and which
/// textures have arrived.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    buffers: SecondaryMap<NodeId, VertexBuffers>,
    textures: TextureRegistry,
}

/// Matrices fixed for the duration of one frame.
struct FrameContext {
    view: Mat4,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    /// Buffers of a drawable that has been drawn at least once.
    pub fn buffers(&self, id: NodeId) -> Option<&VertexBuffers> {
        self.buffers.get(id)
    }

    /// Hands finished texture loads to the backend.
    ///
    /// Failed loads are recorded and otherwise ignored: drawables sampling a
    /// missing texture keep drawing with whatever the backend holds. A
    /// texture the backend rejects is recorded as failed and the rest of the
    /// batch is still uploaded; the first rejection is returned afterwards.
    /// Returns the number of textures uploaded.
    pub fn receive_textures<R: Renderer + ?Sized>(
        &mut self,
        loader: &mut dyn TextureLoader,
        renderer: &mut R,
    ) -> RenderResult<usize> {
        let mut uploaded = 0;
        let mut first_error = None;
        for event in loader.poll() {
            let event = match event {
                TextureEvent::Loaded { target, image } => {
                    match renderer.upload_texture(target, &image) {
                        Ok(()) => {
                            uploaded += 1;
                            TextureEvent::Loaded { target, image }
                        }
                        Err(err) => {
                            let failed = TextureEvent::Failed {
                                target,
                                error: err.to_string(),
                            };
                            first_error.get_or_insert(err);
                            failed
                        }
                    }
                }
                failed => failed,
            };
            self.textures.record(&event);
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(uploaded),
        }
    }

    /// Renders one frame for a viewport of the given aspect ratio.
    pub fn render_frame<R: Renderer + ?Sized>(
        &mut self,
        ctx: &mut SceneContext,
        renderer: &mut R,
        aspect: f32,
    ) -> RenderResult<FrameStats> {
        let view = update_camera(ctx, aspect, renderer)?;
        update_light(ctx, view, renderer)?;

        self.release_deleted(ctx, renderer);

        let frame = FrameContext { view };
        let root = ctx.root();
        let mut stats = FrameStats::default();
        self.draw_tree(ctx, renderer, &frame, root, &mut stats)?;

        trace!(
            "Frame: {} nodes, {} draws, {} uploads",
            stats.nodes_visited, stats.draw_calls, stats.uploads
        );
        Ok(stats)
    }

    /// Walks the tree from `root` in pre-order with an explicit stack, so
    /// arbitrarily deep chains draw without growing the call stack.
    fn draw_tree<R: Renderer + ?Sized>(
        &mut self,
        ctx: &mut SceneContext,
        renderer: &mut R,
        frame: &FrameContext,
        root: NodeId,
        stats: &mut FrameStats,
    ) -> RenderResult<()> {
        let mut pending = vec![(root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = pending.pop() {
            let node = ctx.node_mut(id)?;
            if let NodeKind::Skybox(_) = node.kind {
                node.transform = Mat4::IDENTITY;
            }
            let world = parent_world * node.transform;
            stats.nodes_visited += 1;

            if let Some(drawable) = node.kind.drawable_mut() {
                let buffers = match self.buffers.get(id) {
                    Some(buffers) => *buffers,
                    None => {
                        let buffers = VertexBuffers::create(renderer)?;
                        self.buffers.insert(id, buffers);
                        buffers
                    }
                };
                if upload_if_dirty(drawable, &buffers, renderer)? {
                    stats.uploads += 1;
                }
                self.draw_drawable(drawable, &buffers, frame, world, renderer)?;
                stats.draw_calls += 1;
            }

            pending.extend(node.children().iter().rev().map(|&child| (child, world)));
        }
        Ok(())
    }

    fn draw_drawable<R: Renderer + ?Sized>(
        &self,
        drawable: &DrawableNode,
        buffers: &VertexBuffers,
        frame: &FrameContext,
        world: Mat4,
        renderer: &mut R,
    ) -> RenderResult<()> {
        let mode = drawable.render_mode();
        if self.textures_pending(drawable) {
            trace!("{} drawn before its textures arrived", drawable.shape().name());
        }

        ObjectUniforms::new(frame.view, world).apply(renderer);
        MaterialUniforms::new(drawable).apply(renderer, mode.uses_texture_layers());
        renderer.bind_vertex_buffers(buffers);
        renderer.draw_arrays(drawable.topology(), drawable.vertex_count())
    }

    fn textures_pending(&self, drawable: &DrawableNode) -> bool {
        let texture = drawable.texture();
        match drawable.render_mode() {
            RenderMode::Lit => false,
            RenderMode::Reflective => !self.textures.cubemap_complete(),
            RenderMode::Textured => !self.textures.is_resident(TextureTarget::Layer(texture.layer)),
            RenderMode::BumpMapped => {
                !self.textures.is_resident(TextureTarget::Layer(texture.layer))
                    || !self
                        .textures
                        .is_resident(TextureTarget::Layer(texture.bump_layer))
            }
        }
    }

    /// Frees the buffers of drawables deleted since the last frame.
    fn release_deleted<R: Renderer + ?Sized>(&mut self, ctx: &SceneContext, renderer: &mut R) {
        let deleted: Vec<NodeId> = self
            .buffers
            .keys()
            .filter(|&id| !ctx.contains(id))
            .collect();
        for id in deleted {
            if let Some(buffers) = self.buffers.remove(id) {
                debug!("Releasing buffers of deleted node {:?}", id);
                for handle in buffers.handles() {
                    renderer.release_vertex_buffer(handle);
                }
            }
        }
    }
}

/// Refreshes the camera and sends the projection. Returns the view matrix.
fn update_camera<R: Renderer + ?Sized>(
    ctx: &mut SceneContext,
    aspect: f32,
    renderer: &mut R,
) -> RenderResult<Mat4> {
    let id = ctx.camera();
    let world = ctx.world_transform(id)?;
    let NodeKind::Camera(camera) = &mut ctx.node_mut(id)?.kind else {
        return Err(RenderError::MissingCamera);
    };
    camera.update(world, aspect);

    FrameUniforms {
        projection: camera.projection_matrix(),
    }
    .apply(renderer);
    Ok(camera.view_matrix())
}

/// Moves the light into eye space and sends its uniforms.
fn update_light<R: Renderer + ?Sized>(
    ctx: &mut SceneContext,
    view: Mat4,
    renderer: &mut R,
) -> RenderResult<()> {
    let id = ctx.light();
    let world = ctx.world_transform(id)?;
    match &mut ctx.node_mut(id)?.kind {
        NodeKind::Light(light) => {
            light.update(world, view);
            LightUniforms::new(light).apply(renderer);
        }
        other => warn!("Light node holds {} instead of a light", other.name()),
    }
    Ok(())
}

/// Fills the buffers of a dirty drawable. Returns whether anything was
/// uploaded.
fn upload_if_dirty<R: Renderer + ?Sized>(
    drawable: &mut DrawableNode,
    buffers: &VertexBuffers,
    renderer: &mut R,
) -> RenderResult<bool> {
    let name = drawable.shape().name();
    let Some(geometry) = drawable.prepare_upload() else {
        return Ok(false);
    };

    let streams = [
        (buffers.position, geometry.positions()),
        (buffers.normal, geometry.normals()),
        (buffers.tangent, geometry.tangents()),
        (buffers.tex_coord, geometry.tex_coords()),
    ];
    for (buffer, data) in streams {
        renderer.upload_vertex_attributes(buffer, ATTRIBUTE_COMPONENTS, data)?;
    }
    debug!("Uploaded {} ({} vertices)", name, geometry.vertex_count());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingRenderer, RenderCommand};
    use crate::uniforms::names;
    use editor_core::EditorConfig;
    use editor_resources::{ShapeParams, TextureImage};

    const EPSILON: f32 = 1e-4;

    fn scene() -> SceneContext {
        SceneContext::new(&EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_scene_draws_skybox_and_light() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::new();
        let stats = SceneRenderer::new()
            .render_frame(&mut ctx, &mut renderer, 1.5)
            .unwrap();

        assert_eq!(
            stats,
            FrameStats {
                nodes_visited: 4,
                draw_calls: 2,
                uploads: 2,
            }
        );
        assert_eq!(renderer.buffers_created(), 8);
        assert_eq!(renderer.int_values(names::TEXTURE_CUBEMAP), vec![0]);
    }

    #[test]
    fn test_clean_drawables_are_not_reuploaded() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::new();
        let mut scene_renderer = SceneRenderer::new();

        scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
        renderer.take_commands();
        let stats = scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();

        assert_eq!(stats.uploads, 0);
        assert_eq!(renderer.upload_count(), 0);
        assert_eq!(renderer.draws().len(), 2);
    }

    #[test]
    fn test_material_edit_triggers_upload() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::new();
        let mut scene_renderer = SceneRenderer::new();
        ctx.create_child(&ShapeParams::Cube { size: 1.0 }).unwrap();
        scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();

        ctx.set_current_color(glam::Vec3::X);
        let stats = scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
        assert_eq!(stats.uploads, 1);
    }

    #[test]
    fn test_light_position_in_eye_space() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::new();
        SceneRenderer::new()
            .render_frame(&mut ctx, &mut renderer, 1.0)
            .unwrap();

        let view = ctx.world_transform(ctx.camera()).unwrap().inverse();
        let light_world = ctx.world_transform(ctx.light()).unwrap();
        let expected = view.transform_point3(light_world.transform_point3(glam::Vec3::ZERO));
        let sent = renderer.last_vec3(names::LIGHT_POSITION).unwrap();
        assert!(sent.abs_diff_eq(expected, EPSILON), "{sent:?} != {expected:?}");
    }

    #[test]
    fn test_deleted_drawable_buffers_released() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::new();
        let mut scene_renderer = SceneRenderer::new();
        let id = ctx.create_child(&ShapeParams::Plane { size: 1.0 }).unwrap();
        scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
        assert!(scene_renderer.buffers(id).is_some());

        ctx.delete_current();
        renderer.take_commands();
        scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();

        assert!(scene_renderer.buffers(id).is_none());
        let released = renderer
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::ReleaseVertexBuffer(_)))
            .count();
        assert_eq!(released, 4);
    }

    /// Hands out one prepared batch of events.
    struct BatchLoader(Vec<TextureEvent>);

    impl TextureLoader for BatchLoader {
        fn request(&mut self, _target: TextureTarget, _path: &std::path::Path) {}

        fn poll(&mut self) -> Vec<TextureEvent> {
            std::mem::take(&mut self.0)
        }
    }

    #[test]
    fn test_rejected_texture_does_not_drop_rest_of_batch() {
        let bad = TextureTarget::Layer(3);
        let good = TextureTarget::Layer(7);
        let mut loader = BatchLoader(vec![
            TextureEvent::Loaded {
                target: bad,
                image: TextureImage {
                    width: 2,
                    height: 2,
                    rgba: vec![0; 4],
                },
            },
            TextureEvent::Loaded {
                target: good,
                image: TextureImage {
                    width: 1,
                    height: 1,
                    rgba: vec![255; 4],
                },
            },
        ]);
        let mut renderer = RecordingRenderer::new();
        let mut scene_renderer = SceneRenderer::new();

        let result = scene_renderer.receive_textures(&mut loader, &mut renderer);
        assert!(matches!(result, Err(RenderError::Backend(_))));
        assert!(scene_renderer.textures().has_failed(bad));
        assert!(!scene_renderer.textures().is_resident(bad));
        assert!(scene_renderer.textures().is_resident(good));
        assert_eq!(
            renderer.commands(),
            &[RenderCommand::UploadTexture {
                target: good,
                width: 1,
                height: 1,
            }]
        );

        assert_eq!(
            scene_renderer
                .receive_textures(&mut loader, &mut renderer)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_deep_chain_renders() {
        const DEPTH: usize = 5000;
        let mut ctx = scene();
        for _ in 0..DEPTH - 1 {
            ctx.create_empty();
        }
        ctx.create_child(&ShapeParams::Cube { size: 1.0 }).unwrap();

        let mut renderer = RecordingRenderer::new();
        let stats = SceneRenderer::new()
            .render_frame(&mut ctx, &mut renderer, 1.0)
            .unwrap();
        assert_eq!(stats.nodes_visited, 4 + DEPTH);
        assert_eq!(stats.draw_calls, 3);
        // skybox, light, then the cube at the bottom of the chain
        assert_eq!(renderer.mat4_values(names::MODEL_VIEW).len(), 3);
    }

    #[test]
    fn test_buffer_failure_propagates() {
        let mut ctx = scene();
        let mut renderer = RecordingRenderer::with_buffer_limit(2);
        let result = SceneRenderer::new().render_frame(&mut ctx, &mut renderer, 1.0);
        assert!(matches!(result, Err(RenderError::Backend(_))));
    }
}
