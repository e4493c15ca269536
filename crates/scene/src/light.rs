//! Point light node state.

use editor_resources::{Material, ResourceResult, ShapeParams};
use glam::{Mat4, Vec3};

use crate::drawable::DrawableNode;

/// Radius of the sphere drawn at the light's position.
pub const MARKER_RADIUS: f32 = 0.1;

/// Marker material until the light is first tinted: pure white glow with no
/// diffuse or specular response.
pub const MARKER_MATERIAL: Material = Material::new(Vec3::splat(10.0), Vec3::ZERO, Vec3::ZERO, 3.0);

/// A point light, drawn as a small bright sphere.
#[derive(Clone, Debug)]
pub struct Light {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Marker sphere drawn at the light's position
    pub marker: DrawableNode,
    eye_position: Vec3,
}

impl Light {
    /// A white light.
    pub fn new() -> ResourceResult<Self> {
        let marker = DrawableNode::new(&ShapeParams::Sphere {
            radius: MARKER_RADIUS,
        })?
        .with_material(MARKER_MATERIAL);
        Ok(Self {
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::ONE,
            marker,
            eye_position: Vec3::ZERO,
        })
    }

    /// Tints the light: the marker glows at ten times `color` and the
    /// ambient, diffuse and specular intensities become 0.2, 0.7 and 1.0
    /// times `color`.
    pub fn set_color(&mut self, color: Vec3) {
        self.marker
            .set_material(Material::new(color * 10.0, color, color, 3.0));
        self.ambient = color * 0.2;
        self.diffuse = color * 0.7;
        self.specular = color;
    }

    /// Recomputes the light's position in eye space.
    pub fn update(&mut self, world: Mat4, view: Mat4) {
        self.eye_position = (view * world).transform_point3(Vec3::ZERO);
    }

    /// Position in eye space as of the last update.
    pub fn eye_position(&self) -> Vec3 {
        self.eye_position
    }
}
