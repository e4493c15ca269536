//! Frame traversal against the recording backend.

use editor_core::EditorConfig;
use editor_renderer::uniforms::names;
use editor_renderer::{RecordingRenderer, RenderCommand, SceneRenderer};
use editor_resources::texture::{BUMP_LAYER, SURFACE_LAYER};
use editor_resources::{
    ShapeParams, TextureEvent, TextureImage, TextureLoader, TextureTarget, Topology,
};
use editor_scene::{Direction, RenderMode, SceneContext};
use glam::{Mat4, Vec3};
use std::path::Path;

const EPSILON: f32 = 1e-4;

fn scene() -> SceneContext {
    SceneContext::new(&EditorConfig::default()).expect("default scene")
}

/// Completes every request immediately with a 1x1 image.
#[derive(Default)]
struct InstantLoader {
    ready: Vec<TextureEvent>,
}

impl TextureLoader for InstantLoader {
    fn request(&mut self, target: TextureTarget, _path: &Path) {
        self.ready.push(TextureEvent::Loaded {
            target,
            image: TextureImage {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            },
        });
    }

    fn poll(&mut self) -> Vec<TextureEvent> {
        std::mem::take(&mut self.ready)
    }
}

#[test]
fn test_world_transforms_compose_down_the_tree() {
    let mut ctx = scene();
    ctx.create_child(&ShapeParams::Cube { size: 2.0 }).unwrap();
    for _ in 0..3 {
        ctx.apply_to_current(1.0);
    }
    ctx.create_child(&ShapeParams::Plane { size: 1.0 }).unwrap();
    ctx.node_mut(ctx.selection()).unwrap().transform =
        Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));

    let mut renderer = RecordingRenderer::new();
    SceneRenderer::new()
        .render_frame(&mut ctx, &mut renderer, 1.0)
        .unwrap();

    let view = ctx.world_transform(ctx.camera()).unwrap().inverse();
    let model_views = renderer.mat4_values(names::MODEL_VIEW);
    // skybox, light, cube, plane in pre-order
    assert_eq!(model_views.len(), 4);

    let cube_world = model_views[2].transform_point3(Vec3::ZERO);
    let expected = view.transform_point3(Vec3::new(1.5, -1.0, 0.0));
    assert!(cube_world.abs_diff_eq(expected, EPSILON));

    let plane_world = model_views[3].transform_point3(Vec3::ZERO);
    let expected = view.transform_point3(Vec3::new(1.5, -1.0, 2.0));
    assert!(plane_world.abs_diff_eq(expected, EPSILON));
}

#[test]
fn test_skybox_follows_camera_without_own_offset() {
    let mut ctx = scene();
    let skybox = ctx.skybox();
    ctx.node_mut(skybox).unwrap().transform = Mat4::from_translation(Vec3::splat(10.0));

    let mut renderer = RecordingRenderer::new();
    SceneRenderer::new()
        .render_frame(&mut ctx, &mut renderer, 1.0)
        .unwrap();

    assert_eq!(ctx.node(skybox).unwrap().transform, Mat4::IDENTITY);
    // The skybox sits on the camera: its model-view is the identity.
    let skybox_mv = renderer.mat4_values(names::MODEL_VIEW)[0];
    assert!(skybox_mv.abs_diff_eq(Mat4::IDENTITY, EPSILON));
    assert_eq!(renderer.int_values(names::RENDER_MODE)[0], 2);
}

#[test]
fn test_draw_carries_topology_and_vertex_count() {
    let mut ctx = scene();
    ctx.create_child(&ShapeParams::Cube { size: 1.0 }).unwrap();
    ctx.convert_current_topology(Topology::Lines);

    let mut renderer = RecordingRenderer::new();
    SceneRenderer::new()
        .render_frame(&mut ctx, &mut renderer, 1.0)
        .unwrap();

    assert_eq!(renderer.draws().last(), Some(&(Topology::Lines, 72)));
    let cube_upload = renderer
        .commands()
        .iter()
        .rev()
        .find_map(|command| match command {
            RenderCommand::UploadVertexAttributes {
                components_per_vertex,
                len,
                ..
            } => Some((*components_per_vertex, *len)),
            _ => None,
        });
    assert_eq!(cube_upload, Some((3, 72 * 3)));
}

#[test]
fn test_bump_mapped_sends_texture_layers() {
    let mut ctx = scene();
    ctx.create_child(&ShapeParams::Sphere { radius: 1.0 }).unwrap();
    ctx.set_current_render_mode(RenderMode::BumpMapped);

    let mut renderer = RecordingRenderer::new();
    SceneRenderer::new()
        .render_frame(&mut ctx, &mut renderer, 1.0)
        .unwrap();

    assert_eq!(renderer.int_values(names::RENDER_MODE).last(), Some(&3));
    assert_eq!(
        renderer.int_values(names::TEXTURE_LAYER),
        vec![SURFACE_LAYER as i32]
    );
    assert_eq!(renderer.int_values(names::BUMP_LAYER), vec![BUMP_LAYER as i32]);
}

#[test]
fn test_textures_arrive_between_frames() {
    let mut ctx = scene();
    let mut renderer = RecordingRenderer::new();
    let mut scene_renderer = SceneRenderer::new();

    // Drawing before any texture has arrived is fine.
    scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
    assert!(!scene_renderer.textures().cubemap_complete());

    let mut loader = InstantLoader::default();
    let set = editor_resources::TextureSet::builtin("sky", "texture").unwrap();
    loader.request_set(&set);

    let uploaded = scene_renderer
        .receive_textures(&mut loader, &mut renderer)
        .unwrap();
    assert_eq!(uploaded, 15);
    assert!(scene_renderer.textures().cubemap_complete());
    assert!(scene_renderer
        .textures()
        .is_resident(TextureTarget::Layer(BUMP_LAYER)));

    let stats = scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
    assert_eq!(stats.draw_calls, 2);
}

#[test]
fn test_projection_follows_aspect() {
    let mut ctx = scene();
    let mut renderer = RecordingRenderer::new();
    let mut scene_renderer = SceneRenderer::new();

    scene_renderer.render_frame(&mut ctx, &mut renderer, 1.0).unwrap();
    scene_renderer.render_frame(&mut ctx, &mut renderer, 2.0).unwrap();

    let projections = renderer.mat4_values(names::PROJECTION);
    let expected = Mat4::perspective_rh_gl(75.0_f32.to_radians(), 2.0, 0.01, 1000.0);
    assert_eq!(projections.len(), 2);
    assert!(projections[1].abs_diff_eq(expected, EPSILON));
}

#[test]
fn test_deleted_subtree_not_drawn() {
    let mut ctx = scene();
    ctx.create_child(&ShapeParams::Sphere { radius: 1.0 }).unwrap();
    ctx.create_child(&ShapeParams::Cube { size: 1.0 }).unwrap();
    ctx.move_selection(Direction::Parent);
    assert!(ctx.delete_current());

    let mut renderer = RecordingRenderer::new();
    let stats = SceneRenderer::new()
        .render_frame(&mut ctx, &mut renderer, 1.0)
        .unwrap();
    assert_eq!(stats.nodes_visited, 4);
    assert_eq!(stats.draw_calls, 2);
}
