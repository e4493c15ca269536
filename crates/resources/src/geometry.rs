//! Per-vertex geometry buffers.
//!
//! A [`Geometry`] stores flat `f32` streams exactly as they are handed to the
//! renderer: three components per vertex for positions, normals, tangents
//! and texture coordinates. The third texture coordinate selects a texture
//! layer (or cubemap face); generators that have no use for it leave it at
//! zero.
//!
//! Geometry is never edited in place. Topology conversion produces a new
//! [`Geometry`] resampled from the old one.

use glam::Vec3;

use crate::tangent;

/// Components per vertex in every attribute stream.
pub const COMPONENTS_PER_VERTEX: usize = 3;

/// Primitive topology used when drawing a vertex stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    #[default]
    Triangles,
}

impl Topology {
    /// Vertices consumed by one primitive of this topology.
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            Topology::Points => 1,
            Topology::Lines => 2,
            Topology::Triangles => 3,
        }
    }
}

/// Flat vertex attribute streams for one drawable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tangents: Vec<f32>,
    tex_coords: Vec<f32>,
}

impl Geometry {
    /// Creates geometry from flat streams.
    ///
    /// Tangents start zeroed and `tex_coords` may be empty, in which case it
    /// is zero-filled. Panics if the stream lengths disagree, since that can
    /// only come from a broken generator.
    pub fn from_streams(positions: Vec<f32>, normals: Vec<f32>, tex_coords: Vec<f32>) -> Self {
        assert_eq!(positions.len() % COMPONENTS_PER_VERTEX, 0);
        assert_eq!(positions.len(), normals.len());
        let tex_coords = if tex_coords.is_empty() {
            vec![0.0; positions.len()]
        } else {
            tex_coords
        };
        assert_eq!(positions.len(), tex_coords.len());

        Self {
            tangents: vec![0.0; positions.len()],
            positions,
            normals,
            tex_coords,
        }
    }

    /// Number of vertices in the streams.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COMPONENTS_PER_VERTEX
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn tangents(&self) -> &[f32] {
        &self.tangents
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    /// Position of vertex `index`.
    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * COMPONENTS_PER_VERTEX..])
    }

    /// Normal of vertex `index`.
    pub fn normal(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.normals[index * COMPONENTS_PER_VERTEX..])
    }

    /// Tangent of vertex `index`.
    pub fn tangent(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.tangents[index * COMPONENTS_PER_VERTEX..])
    }

    /// Texture coordinate (u, v, layer) of vertex `index`.
    pub fn tex_coord(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.tex_coords[index * COMPONENTS_PER_VERTEX..])
    }

    /// Recomputes the tangent stream from positions and texture coordinates.
    ///
    /// Only meaningful for triangle streams; see [`tangent::compute_tangents`].
    pub fn recompute_tangents(&mut self) {
        self.tangents = tangent::compute_tangents(&self.positions, &self.tex_coords);
    }

    /// Returns geometry resampled for drawing with topology `to`, assuming
    /// the current streams are laid out for `from`.
    ///
    /// Triangles to lines expands every triangle `(a, b, c)` into the edges
    /// `(a, b) (b, c) (c, a)`. Lines to triangles inverts that expansion by
    /// keeping the first vertex of every edge, so converting there and back
    /// restores the original streams. Conversions involving points keep the
    /// vertex stream as is.
    pub fn convert_topology(&self, from: Topology, to: Topology) -> Geometry {
        match (from, to) {
            (Topology::Triangles, Topology::Lines) => {
                let triangles = self.vertex_count() / 3;
                self.resample((0..triangles).flat_map(|t| {
                    let (a, b, c) = (3 * t, 3 * t + 1, 3 * t + 2);
                    [a, b, b, c, c, a]
                }))
            }
            (Topology::Lines, Topology::Triangles) => {
                let loops = self.vertex_count() / 6;
                self.resample((0..loops).flat_map(|l| [6 * l, 6 * l + 2, 6 * l + 4]))
            }
            _ => self.clone(),
        }
    }

    fn resample(&self, indices: impl Iterator<Item = usize>) -> Geometry {
        let (lower, _) = indices.size_hint();
        let mut out = Geometry {
            positions: Vec::with_capacity(lower * COMPONENTS_PER_VERTEX),
            normals: Vec::with_capacity(lower * COMPONENTS_PER_VERTEX),
            tangents: Vec::with_capacity(lower * COMPONENTS_PER_VERTEX),
            tex_coords: Vec::with_capacity(lower * COMPONENTS_PER_VERTEX),
        };
        for index in indices {
            let range = index * COMPONENTS_PER_VERTEX..(index + 1) * COMPONENTS_PER_VERTEX;
            out.positions.extend_from_slice(&self.positions[range.clone()]);
            out.normals.extend_from_slice(&self.normals[range.clone()]);
            out.tangents.extend_from_slice(&self.tangents[range.clone()]);
            out.tex_coords.extend_from_slice(&self.tex_coords[range]);
        }
        out
    }
}

/// Accumulates vertices as vectors and flattens them into a [`Geometry`].
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec3>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            tex_coords: Vec::with_capacity(vertices),
        }
    }

    /// Appends one vertex.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, tex_coord: Vec3) {
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(tex_coord);
    }

    /// Appends a triangle whose three vertices share its face normal.
    pub fn push_flat_triangle(&mut self, positions: [Vec3; 3], tex_coords: [Vec3; 3]) {
        let normal = face_normal(positions[0], positions[1], positions[2]);
        for (position, tex_coord) in positions.into_iter().zip(tex_coords) {
            self.push_vertex(position, normal, tex_coord);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Flattens the accumulated vertices.
    pub fn build(self) -> Geometry {
        Geometry::from_streams(
            bytemuck::cast_slice(&self.positions).to_vec(),
            bytemuck::cast_slice(&self.normals).to_vec(),
            bytemuck::cast_slice(&self.tex_coords).to_vec(),
        )
    }
}

/// Unit normal of the triangle `(p0, p1, p2)` by the right-hand rule, or zero
/// for a degenerate triangle.
pub fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}
