//! Per-triangle tangent generation for normal mapping.
//!
//! For a triangle `(p0, p1, p2)` with texture coordinates `(t0, t1, t2)` the
//! tangent is the object-space direction of increasing `u`:
//!
//! ```text
//! e1 = p1 - p0            e2 = p2 - p0
//! (du1, dv1) = t1 - t0    (du2, dv2) = t2 - t0
//! f = 1 / (du1 * dv2 - du2 * dv1)
//! tangent = normalize(f * (dv2 * e1 - dv1 * e2))
//! ```
//!
//! All three vertices of the triangle receive the same tangent.
//!
//! # Degenerate mappings
//!
//! When the UV determinant vanishes (all texture coordinates equal, as for
//! geometry that was never UV-mapped, or collinear UVs) the formula has no
//! solution. Instead of propagating a non-finite value, such triangles get an
//! arbitrary unit vector orthogonal to their face normal, or `+X` when the
//! triangle itself has zero area. The output is therefore always finite and
//! unit length.

use glam::{Vec2, Vec3};

use crate::geometry::{COMPONENTS_PER_VERTEX, face_normal};

/// Smallest UV determinant treated as a valid mapping.
const DETERMINANT_EPSILON: f32 = 1e-12;

/// Computes the tangent of one triangle.
pub fn triangle_tangent(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Vec3 {
    let e1 = positions[1] - positions[0];
    let e2 = positions[2] - positions[0];
    let d1 = uvs[1] - uvs[0];
    let d2 = uvs[2] - uvs[0];

    let det = d1.x * d2.y - d2.x * d1.y;
    if det.abs() > DETERMINANT_EPSILON {
        let f = 1.0 / det;
        if let Some(tangent) = (f * (d2.y * e1 - d1.y * e2)).try_normalize() {
            return tangent;
        }
    }

    fallback_tangent(positions)
}

fn fallback_tangent(positions: [Vec3; 3]) -> Vec3 {
    let normal = face_normal(positions[0], positions[1], positions[2]);
    if normal == Vec3::ZERO {
        Vec3::X
    } else {
        normal.any_orthonormal_vector()
    }
}

/// Computes a tangent stream for flat triangle-list streams.
///
/// `positions` and `tex_coords` hold three components per vertex; the third
/// texture coordinate (layer) is ignored. A trailing partial triangle gets
/// zero tangents.
pub fn compute_tangents(positions: &[f32], tex_coords: &[f32]) -> Vec<f32> {
    let mut tangents = vec![0.0; positions.len()];
    let stride = 3 * COMPONENTS_PER_VERTEX;

    for ((out, p), t) in tangents
        .chunks_exact_mut(stride)
        .zip(positions.chunks_exact(stride))
        .zip(tex_coords.chunks_exact(stride))
    {
        let vertex = |i: usize| Vec3::from_slice(&p[i * COMPONENTS_PER_VERTEX..]);
        let uv = |i: usize| Vec2::from_slice(&t[i * COMPONENTS_PER_VERTEX..]);

        let tangent = triangle_tangent([vertex(0), vertex(1), vertex(2)], [uv(0), uv(1), uv(2)]);
        for slot in out.chunks_exact_mut(COMPONENTS_PER_VERTEX) {
            tangent.write_to_slice(slot);
        }
    }

    tangents
}
