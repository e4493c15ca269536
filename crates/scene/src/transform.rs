//! Transform operators and the interactive transform controller.
//!
//! Every operator post-multiplies a node's local transform, so the change is
//! expressed in the node's own (already transformed) frame:
//!
//! ```
//! use editor_scene::transform::{Axis, translate};
//! use glam::{Mat4, Vec3};
//!
//! let mut local = Mat4::IDENTITY;
//! translate(&mut local, Axis::X, 1.5);
//! assert_eq!(local.w_axis.truncate(), Vec3::new(1.5, 0.0, 0.0));
//! ```

use std::fmt;

use editor_core::ControllerConfig;
use glam::{Mat4, Vec3};

/// Axis an operator acts along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Operator applied by the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformMode::Translate => "Translate",
            TransformMode::Rotate => "Rotate",
            TransformMode::Scale => "Scale",
        };
        f.write_str(name)
    }
}

/// Moves `transform` by `distance` along `axis`.
pub fn translate(transform: &mut Mat4, axis: Axis, distance: f32) {
    *transform *= Mat4::from_translation(axis.unit() * distance);
}

/// Rotates `transform` by `angle` radians about `axis`.
pub fn rotate(transform: &mut Mat4, axis: Axis, angle: f32) {
    *transform *= Mat4::from_axis_angle(axis.unit(), angle);
}

/// Scales `transform` by `factor` along `axis`, leaving the other axes.
pub fn scale(transform: &mut Mat4, axis: Axis, factor: f32) {
    let mut factors = Vec3::ONE;
    factors[axis as usize] = factor;
    *transform *= Mat4::from_scale(factors);
}

/// Inverse transpose of `model_view`, for transforming normals.
///
/// Singular matrices (e.g. a zero scale) yield the identity instead of
/// non-finite values.
pub fn normal_matrix(model_view: Mat4) -> Mat4 {
    const EPSILON: f32 = 1e-6;

    if model_view.determinant().abs() < EPSILON {
        Mat4::IDENTITY
    } else {
        model_view.inverse().transpose()
    }
}

/// Current operator and axis plus the step response curves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformController {
    mode: TransformMode,
    axis: Axis,
    config: ControllerConfig,
}

impl TransformController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            mode: TransformMode::default(),
            axis: Axis::default(),
            config,
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn set_axis(&mut self, axis: Axis) {
        self.axis = axis;
    }

    /// Scale factor for a signed step: `max(floor, step + 1) ^ exponent`.
    ///
    /// The floor keeps large negative steps from collapsing or mirroring the
    /// node; the exponent damps the response.
    pub fn scale_factor(&self, step: f32) -> f32 {
        (step + 1.0)
            .max(self.config.scale_floor)
            .powf(self.config.scale_exponent)
    }

    /// Applies the current operator along the current axis.
    pub fn apply(&self, transform: &mut Mat4, step: f32) {
        match self.mode {
            TransformMode::Translate => translate(
                transform,
                self.axis,
                step * self.config.translate_sensitivity,
            ),
            TransformMode::Rotate => rotate(
                transform,
                self.axis,
                (step * self.config.rotate_step_degrees).to_radians(),
            ),
            TransformMode::Scale => scale(transform, self.axis, self.scale_factor(step)),
        }
    }

    /// Step produced by a horizontal pointer drag of `dx` pixels.
    ///
    /// Dragging right produces a negative step.
    pub fn drag_step(&self, dx: f32) -> f32 {
        -dx / self.config.drag_divisor
    }

    /// Applies the current operator for a horizontal pointer drag.
    pub fn apply_drag(&self, transform: &mut Mat4, dx: f32) {
        self.apply(transform, self.drag_step(dx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, EPSILON)
    }

    #[test]
    fn test_translate_post_multiplies() {
        let mut transform = Mat4::from_rotation_y(FRAC_PI_2);
        translate(&mut transform, Axis::X, 1.0);

        // Moving along the node's own X, which the rotation maps to -Z.
        let origin = transform.transform_point3(Vec3::ZERO);
        assert!(
            approx_eq_vec3(origin, Vec3::new(0.0, 0.0, -1.0)),
            "Expected (0, 0, -1), got {:?}",
            origin
        );
    }

    #[test]
    fn test_controller_translate_three_steps() {
        let controller = TransformController::default();
        let mut transform = Mat4::IDENTITY;
        for _ in 0..3 {
            controller.apply(&mut transform, 1.0);
        }
        assert!(approx_eq_vec3(
            transform.w_axis.truncate(),
            Vec3::new(1.5, 0.0, 0.0)
        ));
    }

    #[test]
    fn test_controller_rotate_step() {
        let mut controller = TransformController::default();
        controller.set_mode(TransformMode::Rotate);
        controller.set_axis(Axis::Y);

        let mut transform = Mat4::IDENTITY;
        for _ in 0..18 {
            controller.apply(&mut transform, 1.0);
        }
        // 18 steps of 5 degrees is a quarter turn.
        let x = transform.transform_vector3(Vec3::X);
        assert!(approx_eq_vec3(x, Vec3::NEG_Z), "got {x:?}");
    }

    #[test]
    fn test_scale_factor_is_damped_and_floored() {
        let controller = TransformController::default();
        assert_abs_diff_eq!(controller.scale_factor(0.0), 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(controller.scale_factor(3.0), 2.0, epsilon = EPSILON);
        let floor = 0.1_f32.sqrt();
        assert_abs_diff_eq!(controller.scale_factor(-5.0), floor, epsilon = EPSILON);
        assert!(controller.scale_factor(-100.0) > 0.0);
    }

    #[test]
    fn test_controller_scale_single_axis() {
        let mut controller = TransformController::default();
        controller.set_mode(TransformMode::Scale);
        controller.set_axis(Axis::Z);

        let mut transform = Mat4::IDENTITY;
        controller.apply(&mut transform, 3.0);
        let (scale, _, _) = transform.to_scale_rotation_translation();
        assert!(approx_eq_vec3(scale, Vec3::new(1.0, 1.0, 2.0)));
    }

    #[test]
    fn test_drag_step() {
        let controller = TransformController::default();
        assert_abs_diff_eq!(controller.drag_step(50.0), -1.0, epsilon = EPSILON);

        let mut transform = Mat4::IDENTITY;
        controller.apply_drag(&mut transform, -100.0);
        assert!(approx_eq_vec3(transform.w_axis.truncate(), Vec3::X));
    }

    #[test]
    fn test_normal_matrix_identity() {
        assert_eq!(normal_matrix(Mat4::IDENTITY), Mat4::IDENTITY);
    }

    #[test]
    fn test_normal_matrix_with_scale() {
        let model_view = Mat4::from_scale(Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(normal_matrix(model_view), model_view.inverse().transpose());
    }

    #[test]
    fn test_normal_matrix_non_invertible() {
        // Zero scale makes the transform non-invertible
        let normal = normal_matrix(Mat4::from_scale(Vec3::ZERO));
        assert_eq!(normal, Mat4::IDENTITY);
        assert!(normal.is_finite());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TransformMode::Rotate.to_string(), "Rotate");
        assert_eq!(Axis::Z.to_string(), "Z");
    }
}
