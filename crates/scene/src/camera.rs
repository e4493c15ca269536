//! Camera node state.

use editor_core::CameraConfig;
use glam::{Mat4, Vec3};

/// Perspective camera.
///
/// The camera is placed by its node's transform; [`Camera::update`] derives
/// the view matrix from the node's world transform and the projection from
/// the viewport aspect ratio each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect: 1.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update(Mat4::IDENTITY, 1.0);
        camera
    }

    /// Local transform placing a camera at `eye` looking at `target`.
    pub fn placement(eye: Vec3, target: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, target, Vec3::Y).inverse()
    }

    /// Recomputes view and projection.
    pub fn update(&mut self, world: Mat4, aspect: f32) {
        self.aspect = aspect;
        self.view = world.inverse();
        self.projection = Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Inverse of the camera's world transform as of the last update.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }
}
