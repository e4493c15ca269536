//! Scene Editor - Headless Demo Driver
//!
//! Builds a small scene, then runs the fixed-interval render tick against the
//! recording backend while scripted pointer drags edit the selection.
//!
//! Usage: `editor [CONFIG.ron] [FRAMES]`

use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{debug, error, info};

use editor_core::{EditorConfig, Timer};
use editor_renderer::{RecordingRenderer, SceneRenderer};
use editor_resources::{ImageTextureLoader, ShapeParams, TextureLoader, TextureSet, Topology};
use editor_scene::{Axis, Direction, RenderMode, SceneContext, TransformMode};

const DEFAULT_FRAMES: u64 = 100;
const TEXTURE_ROOT: &str = "texture";
const TEXTURE_SET: &str = "sky";

struct App {
    config: EditorConfig,
    scene: SceneContext,
    scene_renderer: SceneRenderer,
    renderer: RecordingRenderer,
    loader: ImageTextureLoader,
    timer: Timer,
}

impl App {
    fn new(config: EditorConfig) -> Result<Self> {
        let scene = SceneContext::new(&config).context("building initial scene")?;
        let mut loader = ImageTextureLoader::new();
        match TextureSet::builtin(TEXTURE_SET, TEXTURE_ROOT) {
            Some(set) => loader.request_set(&set),
            None => error!("Unknown texture set '{}'", TEXTURE_SET),
        }

        Ok(Self {
            timer: Timer::from_millis(config.render.tick_interval_ms),
            config,
            scene,
            scene_renderer: SceneRenderer::new(),
            renderer: RecordingRenderer::new(),
            loader,
        })
    }

    /// Populates the scene the way a user would from the toolbar.
    fn build_demo_scene(&mut self) -> Result<()> {
        let scene = &mut self.scene;

        scene.create_child(&ShapeParams::Cube { size: 2.0 })?;
        scene.set_current_render_mode(RenderMode::Textured);
        for _ in 0..3 {
            scene.apply_to_current(1.0);
        }

        scene.create_child(&ShapeParams::Sphere { radius: 0.5 })?;
        scene.set_current_render_mode(RenderMode::Reflective);
        scene.node_mut(scene.selection())?.transform =
            glam::Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));

        scene.move_selection(Direction::Parent);
        scene.create_child(&ShapeParams::Torus {
            major_radius: 1.5,
            minor_radius: 0.4,
        })?;
        scene.set_current_render_mode(RenderMode::BumpMapped);

        scene.move_selection(Direction::Parent);
        scene.move_selection(Direction::Parent);
        scene.create_child(&ShapeParams::Cylinder {
            base_radius: 1.0,
            top_radius: 0.25,
            height: 3.0,
        })?;
        scene.set_current_color(editor_resources::parse_hex_color("#3080ff")?);

        scene.move_selection(Direction::Parent);
        scene.create_child(&ShapeParams::Helicoid { pitch: 1.0 })?;
        scene.convert_current_topology(Topology::Lines);

        scene.set_light_color(Vec3::new(1.0, 0.95, 0.8));
        scene.controller.set_mode(TransformMode::Rotate);
        scene.controller.set_axis(Axis::Y);

        info!("Demo scene ready with {} nodes", scene.node_count());
        debug!("Scene tree:\n{}", scene.display());
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        self.scene_renderer
            .receive_textures(&mut self.loader, &mut self.renderer)?;

        // A steady rightward drag spins the selection.
        self.scene.drag_current(-10.0);

        let stats = self.scene_renderer.render_frame(
            &mut self.scene,
            &mut self.renderer,
            self.config.render.aspect(),
        )?;
        debug!(
            "Frame {}: {} nodes, {} draws, {} uploads",
            self.timer.frames(),
            stats.nodes_visited,
            stats.draw_calls,
            stats.uploads
        );
        self.renderer.take_commands();
        Ok(())
    }

    fn run(&mut self, frames: u64) -> Result<()> {
        while self.timer.frames() < frames {
            if self.timer.poll_tick().is_none() {
                thread::sleep(self.timer.until_next_tick());
                continue;
            }
            self.tick()?;
        }
        info!(
            "Rendered {} frames in {:.2?}",
            self.timer.frames(),
            self.timer.elapsed()
        );
        Ok(())
    }
}

fn load_config(path: Option<&str>) -> Result<EditorConfig> {
    match path {
        Some(path) => {
            let config = EditorConfig::load(Path::new(path))?;
            info!("Loaded configuration from {}", path);
            Ok(config)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    editor_core::init_logging();
    info!("Starting scene editor");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let frames = match args.get(1) {
        Some(text) => text
            .parse()
            .with_context(|| format!("invalid frame count '{text}'"))?,
        None => DEFAULT_FRAMES,
    };

    let mut app = App::new(config)?;
    app.build_demo_scene()?;
    app.run(frames)?;

    info!("Final scene:\n{}", app.scene.display());
    Ok(())
}
