//! Procedural mesh generators.
//!
//! Every generator is a pure function from construction parameters to a
//! triangle-list [`Geometry`]. Tangents are left zeroed; they are derived
//! from positions and texture coordinates when the geometry is uploaded.
//!
//! Shapes are centered on their local origin with `+Y` up.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::error::{ResourceError, ResourceResult};
use crate::geometry::{Geometry, GeometryBuilder};
use crate::model;

/// Vertical distance between two cylinder rings.
pub const CYLINDER_RING_STEP: f32 = 0.1;
/// Upper bound on the rings of one cylinder, limiting `height` to
/// `(MAX_CYLINDER_RINGS - 1) * CYLINDER_RING_STEP`.
pub const MAX_CYLINDER_RINGS: usize = 10_000;
/// Angular slices per cylinder ring.
pub const CYLINDER_SLICES: usize = 16;
/// Grid resolution of parametric surfaces along each parameter axis.
pub const SURFACE_STEPS: usize = 32;
/// Turns swept by a helicoid.
pub const HELICOID_TURNS: f32 = 2.0;

/// The kind of primitive a drawable was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Plane,
    Cube,
    Cylinder,
    Sphere,
    Torus,
    Helicoid,
    Model,
}

impl ShapeKind {
    pub const fn name(self) -> &'static str {
        match self {
            ShapeKind::Plane => "Plane",
            ShapeKind::Cube => "Cube",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Torus => "Torus",
            ShapeKind::Helicoid => "Helicoid",
            ShapeKind::Model => "Model",
        }
    }

    /// Names of the numeric parameters, in the order [`ShapeParams::parse`]
    /// expects them.
    pub const fn parameter_names(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Plane | ShapeKind::Cube => &["size"],
            ShapeKind::Cylinder => &["base_radius", "top_radius", "height"],
            ShapeKind::Sphere => &["radius"],
            ShapeKind::Torus => &["major_radius", "minor_radius"],
            ShapeKind::Helicoid => &["pitch"],
            ShapeKind::Model => &[],
        }
    }
}

/// Validated construction parameters for one primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeParams {
    Plane { size: f32 },
    Cube { size: f32 },
    Cylinder { base_radius: f32, top_radius: f32, height: f32 },
    Sphere { radius: f32 },
    Torus { major_radius: f32, minor_radius: f32 },
    Helicoid { pitch: f32 },
    /// Raw triangle records, see [`model::generate_model`].
    Model { data: Vec<f32> },
}

impl ShapeParams {
    /// Parses user-entered parameter text for `kind`.
    ///
    /// Values are taken positionally in the order of
    /// [`ShapeKind::parameter_names`]; surrounding whitespace is ignored.
    /// Model data cannot be entered as text and is rejected here.
    pub fn parse(kind: ShapeKind, raw: &[&str]) -> ResourceResult<Self> {
        let names = kind.parameter_names();
        let value = |index: usize| -> ResourceResult<f32> {
            let name = names[index];
            let text = raw
                .get(index)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .ok_or(ResourceError::MissingParameter(name))?;
            text.parse::<f32>()
                .map_err(|_| ResourceError::InvalidParameter {
                    name,
                    value: text.to_string(),
                })
        };

        let params = match kind {
            ShapeKind::Plane => ShapeParams::Plane { size: value(0)? },
            ShapeKind::Cube => ShapeParams::Cube { size: value(0)? },
            ShapeKind::Cylinder => ShapeParams::Cylinder {
                base_radius: value(0)?,
                top_radius: value(1)?,
                height: value(2)?,
            },
            ShapeKind::Sphere => ShapeParams::Sphere { radius: value(0)? },
            ShapeKind::Torus => ShapeParams::Torus {
                major_radius: value(0)?,
                minor_radius: value(1)?,
            },
            ShapeKind::Helicoid => ShapeParams::Helicoid { pitch: value(0)? },
            ShapeKind::Model => return Err(ResourceError::MissingParameter("data")),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeParams::Plane { .. } => ShapeKind::Plane,
            ShapeParams::Cube { .. } => ShapeKind::Cube,
            ShapeParams::Cylinder { .. } => ShapeKind::Cylinder,
            ShapeParams::Sphere { .. } => ShapeKind::Sphere,
            ShapeParams::Torus { .. } => ShapeKind::Torus,
            ShapeParams::Helicoid { .. } => ShapeKind::Helicoid,
            ShapeParams::Model { .. } => ShapeKind::Model,
        }
    }

    /// Checks ranges: sizes and radii finite and positive (cylinder radii may
    /// be zero but not both), pitch finite and non-zero, model data made of
    /// whole records.
    pub fn validate(&self) -> ResourceResult<()> {
        fn positive(name: &'static str, value: f32) -> ResourceResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(invalid(name, value))
            }
        }
        fn non_negative(name: &'static str, value: f32) -> ResourceResult<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(invalid(name, value))
            }
        }

        match *self {
            ShapeParams::Plane { size } | ShapeParams::Cube { size } => positive("size", size),
            ShapeParams::Cylinder {
                base_radius,
                top_radius,
                height,
            } => {
                non_negative("base_radius", base_radius)?;
                non_negative("top_radius", top_radius)?;
                positive("height", height)?;
                if height / CYLINDER_RING_STEP > (MAX_CYLINDER_RINGS - 1) as f32 {
                    return Err(invalid("height", height));
                }
                if base_radius == 0.0 && top_radius == 0.0 {
                    return Err(invalid("base_radius", base_radius));
                }
                Ok(())
            }
            ShapeParams::Sphere { radius } => positive("radius", radius),
            ShapeParams::Torus {
                major_radius,
                minor_radius,
            } => {
                positive("major_radius", major_radius)?;
                positive("minor_radius", minor_radius)
            }
            ShapeParams::Helicoid { pitch } => {
                if pitch.is_finite() && pitch != 0.0 {
                    Ok(())
                } else {
                    Err(invalid("pitch", pitch))
                }
            }
            ShapeParams::Model { ref data } => model::validate_records(data),
        }
    }

    /// Runs the matching generator.
    pub fn generate(&self) -> ResourceResult<Geometry> {
        self.validate()?;
        Ok(match *self {
            ShapeParams::Plane { size } => generate_plane(size),
            ShapeParams::Cube { size } => generate_cube(size),
            ShapeParams::Cylinder {
                base_radius,
                top_radius,
                height,
            } => generate_cylinder(base_radius, top_radius, height),
            ShapeParams::Sphere { radius } => generate_sphere(radius),
            ShapeParams::Torus {
                major_radius,
                minor_radius,
            } => generate_torus(major_radius, minor_radius),
            ShapeParams::Helicoid { pitch } => generate_helicoid(pitch),
            ShapeParams::Model { ref data } => model::generate_model(data)?,
        })
    }
}

fn invalid(name: &'static str, value: f32) -> ResourceError {
    ResourceError::InvalidParameter {
        name,
        value: value.to_string(),
    }
}

/// One square face: outward normal plus the in-plane axes along which `u`
/// and `v` grow. `u.cross(v) == normal`, so the face winds counter-clockwise
/// seen from outside.
struct Face {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
}

/// Cube faces in texture-layer order: -X, +X, -Z, +Z, -Y, +Y.
const CUBE_FACES: [Face; 6] = [
    Face { normal: Vec3::NEG_X, u: Vec3::Z, v: Vec3::Y },
    Face { normal: Vec3::X, u: Vec3::NEG_Z, v: Vec3::Y },
    Face { normal: Vec3::NEG_Z, u: Vec3::NEG_X, v: Vec3::Y },
    Face { normal: Vec3::Z, u: Vec3::X, v: Vec3::Y },
    Face { normal: Vec3::NEG_Y, u: Vec3::X, v: Vec3::Z },
    Face { normal: Vec3::Y, u: Vec3::X, v: Vec3::NEG_Z },
];

/// Corner order of the two triangles making up a face, in UV space.
const QUAD_UVS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, 0.0),
];

fn push_face(builder: &mut GeometryBuilder, face: &Face, center: Vec3, half: f32, layer: f32) {
    for uv in QUAD_UVS {
        let offset = face.u * (2.0 * uv.x - 1.0) + face.v * (2.0 * uv.y - 1.0);
        builder.push_vertex(center + offset * half, face.normal, uv.extend(layer));
    }
}

/// A horizontal square of edge `size` through the origin, facing `+Y`.
pub fn generate_plane(size: f32) -> Geometry {
    let mut builder = GeometryBuilder::with_capacity(6);
    push_face(&mut builder, &CUBE_FACES[5], Vec3::ZERO, 0.5 * size, 0.0);
    builder.build()
}

/// An axis-aligned cube of edge `size`: 36 vertices, one texture layer per
/// face (`0..=5` in [`CUBE_FACES`] order).
pub fn generate_cube(size: f32) -> Geometry {
    let half = 0.5 * size;
    let mut builder = GeometryBuilder::with_capacity(36);
    for (layer, face) in CUBE_FACES.iter().enumerate() {
        push_face(&mut builder, face, face.normal * half, half, layer as f32);
    }
    builder.build()
}

/// A stack of triangle-fan discs spaced [`CYLINDER_RING_STEP`] apart from
/// `-height / 2` to `height / 2`, the radius interpolated linearly from
/// `base_radius` at the bottom to `top_radius` at the top. At most
/// [`MAX_CYLINDER_RINGS`] rings are generated.
pub fn generate_cylinder(base_radius: f32, top_radius: f32, height: f32) -> Geometry {
    let steps = (height / CYLINDER_RING_STEP + 1e-4).floor();
    let rings = (steps as usize).min(MAX_CYLINDER_RINGS - 1) + 1;
    let mut builder = GeometryBuilder::with_capacity(rings * CYLINDER_SLICES * 3);

    for ring in 0..rings {
        let rise = ring as f32 * CYLINDER_RING_STEP;
        let y = rise - 0.5 * height;
        let radius = base_radius + (top_radius - base_radius) * (rise / height);
        push_disc(&mut builder, radius, y);
    }

    builder.build()
}

fn push_disc(builder: &mut GeometryBuilder, radius: f32, y: f32) {
    let rim = |slice: usize| {
        let angle = TAU * slice as f32 / CYLINDER_SLICES as f32;
        let (sin, cos) = angle.sin_cos();
        (
            Vec3::new(radius * cos, y, radius * sin),
            Vec3::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin, 0.0),
        )
    };
    let vertex_normal = |p: Vec3| p.try_normalize().unwrap_or(Vec3::Y);

    let center = Vec3::new(0.0, y, 0.0);
    for slice in 0..CYLINDER_SLICES {
        let (p1, t1) = rim(slice);
        let (p2, t2) = rim(slice + 1);
        builder.push_vertex(center, vertex_normal(center), Vec3::new(0.5, 0.5, 0.0));
        builder.push_vertex(p1, vertex_normal(p1), t1);
        builder.push_vertex(p2, vertex_normal(p2), t2);
    }
}

/// A point on a parametric surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    /// Analytic normal; `None` requests a flat face normal instead.
    pub normal: Option<Vec3>,
    pub uv: Vec2,
}

/// Rectangular parameter domain sampled on a regular grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterDomain {
    pub s_min: f32,
    pub s_max: f32,
    pub t_min: f32,
    pub t_max: f32,
    pub s_steps: usize,
    pub t_steps: usize,
}

impl ParameterDomain {
    /// The unit square sampled with [`SURFACE_STEPS`] along both axes.
    pub const fn unit() -> Self {
        Self {
            s_min: 0.0,
            s_max: 1.0,
            t_min: 0.0,
            t_max: 1.0,
            s_steps: SURFACE_STEPS,
            t_steps: SURFACE_STEPS,
        }
    }

    fn s(&self, i: usize) -> f32 {
        self.s_min + (self.s_max - self.s_min) * i as f32 / self.s_steps as f32
    }

    fn t(&self, j: usize) -> f32 {
        self.t_min + (self.t_max - self.t_min) * j as f32 / self.t_steps as f32
    }
}

/// A surface `(s, t) -> point` swept over a parameter domain.
pub trait ParametricSurface {
    fn domain(&self) -> ParameterDomain {
        ParameterDomain::unit()
    }

    fn evaluate(&self, s: f32, t: f32) -> SurfacePoint;
}

/// Tessellates a parametric surface.
///
/// Each grid cell yields the triangles `(s, t) (s, t+dt) (s+ds, t+dt)` and
/// `(s+ds, t+dt) (s+ds, t) (s, t)`. Vertices use the surface's analytic
/// normal when it supplies one, otherwise the triangle's flat face normal.
pub fn generate_surface(surface: &impl ParametricSurface) -> Geometry {
    let domain = surface.domain();
    let mut builder = GeometryBuilder::with_capacity(domain.s_steps * domain.t_steps * 6);

    for i in 0..domain.s_steps {
        for j in 0..domain.t_steps {
            let (s0, s1) = (domain.s(i), domain.s(i + 1));
            let (t0, t1) = (domain.t(j), domain.t(j + 1));
            let a = surface.evaluate(s0, t0);
            let b = surface.evaluate(s0, t1);
            let c = surface.evaluate(s1, t1);
            let d = surface.evaluate(s1, t0);
            push_surface_triangle(&mut builder, [a, b, c]);
            push_surface_triangle(&mut builder, [c, d, a]);
        }
    }

    builder.build()
}

fn push_surface_triangle(builder: &mut GeometryBuilder, points: [SurfacePoint; 3]) {
    let tex_coord = |p: &SurfacePoint| p.uv.extend(0.0);
    if points.iter().all(|p| p.normal.is_some()) {
        for p in &points {
            builder.push_vertex(p.position, p.normal.unwrap_or_default(), tex_coord(p));
        }
    } else {
        builder.push_flat_triangle(points.map(|p| p.position), points.map(|p| tex_coord(&p)));
    }
}

/// Sphere: `s` sweeps the polar angle over `[0, pi]`, `t` the azimuth over
/// `[0, 2 pi]`.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub radius: f32,
}

impl ParametricSurface for Sphere {
    fn evaluate(&self, s: f32, t: f32) -> SurfacePoint {
        let (sin_theta, cos_theta) = (PI * s).sin_cos();
        let (sin_phi, cos_phi) = (TAU * t).sin_cos();
        let direction = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
        SurfacePoint {
            position: direction * self.radius,
            normal: Some(direction),
            uv: Vec2::new(t, s),
        }
    }
}

/// Torus around the `Y` axis with flat-shaded faces.
#[derive(Clone, Copy, Debug)]
pub struct Torus {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl ParametricSurface for Torus {
    fn evaluate(&self, s: f32, t: f32) -> SurfacePoint {
        let (sin_u, cos_u) = (TAU * s).sin_cos();
        let (sin_v, cos_v) = (TAU * t).sin_cos();
        let ring = self.major_radius + self.minor_radius * cos_v;
        SurfacePoint {
            position: Vec3::new(ring * cos_u, self.minor_radius * sin_v, ring * sin_u),
            normal: None,
            uv: Vec2::new(s, t),
        }
    }
}

/// Helicoid around the `Y` axis rising `pitch` per turn, unit half-width,
/// flat-shaded.
#[derive(Clone, Copy, Debug)]
pub struct Helicoid {
    pub pitch: f32,
}

impl ParametricSurface for Helicoid {
    fn domain(&self) -> ParameterDomain {
        ParameterDomain {
            s_steps: SURFACE_STEPS * HELICOID_TURNS as usize,
            ..ParameterDomain::unit()
        }
    }

    fn evaluate(&self, s: f32, t: f32) -> SurfacePoint {
        let turns = HELICOID_TURNS * s;
        let (sin_u, cos_u) = (TAU * turns).sin_cos();
        let r = 2.0 * t - 1.0;
        SurfacePoint {
            position: Vec3::new(
                r * cos_u,
                self.pitch * (turns - 0.5 * HELICOID_TURNS),
                r * sin_u,
            ),
            normal: None,
            uv: Vec2::new(s, t),
        }
    }
}

pub fn generate_sphere(radius: f32) -> Geometry {
    generate_surface(&Sphere { radius })
}

pub fn generate_torus(major_radius: f32, minor_radius: f32) -> Geometry {
    generate_surface(&Torus {
        major_radius,
        minor_radius,
    })
}

pub fn generate_helicoid(pitch: f32) -> Geometry {
    generate_surface(&Helicoid { pitch })
}
