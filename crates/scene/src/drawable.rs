//! Drawable nodes: geometry plus the state that decides how it is shaded.

use editor_resources::texture::{BUMP_LAYER, SURFACE_LAYER};
use editor_resources::{Geometry, Material, ResourceResult, ShapeKind, ShapeParams, Topology};

/// Shading path selected per drawable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Phong lighting with the material colors.
    #[default]
    Lit,
    /// Lit, modulated by a flat texture layer.
    Textured,
    /// Samples the environment cubemap.
    Reflective,
    /// Textured with normals perturbed by a bump layer in tangent space.
    BumpMapped,
}

impl RenderMode {
    /// Value of the render-mode selector uniform.
    pub const fn selector(self) -> i32 {
        match self {
            RenderMode::Lit => 0,
            RenderMode::Textured => 1,
            RenderMode::Reflective => 2,
            RenderMode::BumpMapped => 3,
        }
    }

    pub const fn uses_texture_layers(self) -> bool {
        matches!(self, RenderMode::Textured | RenderMode::BumpMapped)
    }
}

/// Flat texture layers sampled by textured and bump-mapped drawables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    pub layer: u32,
    pub bump_layer: u32,
}

impl Default for TextureBinding {
    fn default() -> Self {
        Self {
            layer: SURFACE_LAYER,
            bump_layer: BUMP_LAYER,
        }
    }
}

/// Generated geometry with a material, render mode and topology.
///
/// Any change that affects what the renderer holds marks the drawable dirty;
/// [`DrawableNode::prepare_upload`] hands out the refreshed geometry once
/// and clears the flag.
#[derive(Clone, Debug)]
pub struct DrawableNode {
    shape: ShapeKind,
    geometry: Geometry,
    topology: Topology,
    /// Layout the vertex streams hold. Differs from `topology` only while
    /// drawing as points, which reuses the streams as they are.
    layout: Topology,
    material: Material,
    render_mode: RenderMode,
    texture: TextureBinding,
    dirty: bool,
}

impl DrawableNode {
    /// Generates geometry for `params` with the default material.
    pub fn new(params: &ShapeParams) -> ResourceResult<Self> {
        Ok(Self::from_geometry(params.kind(), params.generate()?))
    }

    /// Wraps triangle-list geometry produced elsewhere.
    pub fn from_geometry(shape: ShapeKind, geometry: Geometry) -> Self {
        Self {
            shape,
            geometry,
            topology: Topology::Triangles,
            layout: Topology::Triangles,
            material: Material::default(),
            render_mode: RenderMode::default(),
            texture: TextureBinding::default(),
            dirty: true,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Topology the vertex streams are laid out for.
    pub fn layout(&self) -> Topology {
        self.layout
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn texture(&self) -> TextureBinding {
        self.texture
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.dirty = true;
    }

    pub fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
        self.dirty = true;
    }

    pub fn set_texture(&mut self, texture: TextureBinding) {
        self.texture = texture;
        self.dirty = true;
    }

    /// Resamples the geometry for drawing as `to`.
    ///
    /// Converting triangles to lines and back restores the original streams,
    /// also when passing through points in between.
    pub fn convert_topology(&mut self, to: Topology) {
        if to == self.topology {
            return;
        }
        if to != Topology::Points && to != self.layout {
            self.geometry = self.geometry.convert_topology(self.layout, to);
            self.layout = to;
        }
        tracing::debug!(
            "{} converted {:?} -> {:?} ({} vertices)",
            self.shape.name(),
            self.topology,
            to,
            self.geometry.vertex_count()
        );
        self.topology = to;
        self.dirty = true;
    }

    /// Returns the geometry to upload if the drawable is dirty, clearing the
    /// flag.
    ///
    /// Tangents are regenerated on every dirty upload while the streams are a
    /// triangle list; line and point streams keep the tangents they were
    /// resampled with.
    pub fn prepare_upload(&mut self) -> Option<&Geometry> {
        if !self.dirty {
            return None;
        }
        if self.topology == Topology::Triangles {
            self.geometry.recompute_tangents();
        }
        self.dirty = false;
        Some(&self.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cube() -> DrawableNode {
        DrawableNode::new(&ShapeParams::Cube { size: 2.0 }).unwrap()
    }

    #[test]
    fn test_new_drawable_defaults() {
        let drawable = cube();
        assert_eq!(drawable.shape(), ShapeKind::Cube);
        assert_eq!(drawable.vertex_count(), 36);
        assert_eq!(drawable.topology(), Topology::Triangles);
        assert_eq!(*drawable.material(), Material::default());
        assert_eq!(drawable.render_mode(), RenderMode::Lit);
        assert!(drawable.is_dirty());
    }

    #[test]
    fn test_prepare_upload_clears_dirty_and_fills_tangents() {
        let mut drawable = cube();
        let geometry = drawable.prepare_upload().expect("fresh drawable is dirty");
        assert!(geometry.tangents().iter().any(|t| *t != 0.0));
        assert!(!drawable.is_dirty());
        assert!(drawable.prepare_upload().is_none());
    }

    #[test]
    fn test_material_edit_marks_dirty() {
        let mut drawable = cube();
        drawable.prepare_upload();
        drawable.set_material(Material::from_color(Vec3::X));
        assert!(drawable.is_dirty());
        assert_eq!(drawable.material().diffuse, Vec3::X);
    }

    #[test]
    fn test_topology_round_trip() {
        let mut drawable = cube();
        let original = drawable.geometry().positions().to_vec();

        drawable.convert_topology(Topology::Lines);
        assert_eq!(drawable.vertex_count(), 72);
        assert_eq!(drawable.topology(), Topology::Lines);

        drawable.convert_topology(Topology::Triangles);
        assert_eq!(drawable.vertex_count(), 36);
        assert_eq!(drawable.geometry().positions(), original.as_slice());
    }

    #[test]
    fn test_topology_round_trip_through_points() {
        let mut drawable = cube();
        let original = drawable.geometry().positions().to_vec();

        drawable.convert_topology(Topology::Points);
        assert_eq!(drawable.vertex_count(), 36);
        assert_eq!(drawable.layout(), Topology::Triangles);

        drawable.convert_topology(Topology::Lines);
        assert_eq!(drawable.vertex_count(), 72);

        drawable.convert_topology(Topology::Triangles);
        assert_eq!(drawable.vertex_count(), 36);
        assert_eq!(drawable.geometry().positions(), original.as_slice());

        drawable.convert_topology(Topology::Lines);
        drawable.convert_topology(Topology::Points);
        assert_eq!(drawable.vertex_count(), 72);
        drawable.convert_topology(Topology::Triangles);
        assert_eq!(drawable.vertex_count(), 36);
        assert_eq!(drawable.geometry().positions(), original.as_slice());
    }

    #[test]
    fn test_same_topology_is_a_no_op() {
        let mut drawable = cube();
        drawable.prepare_upload();
        drawable.convert_topology(Topology::Triangles);
        assert!(!drawable.is_dirty());
    }

    #[test]
    fn test_render_mode_selectors() {
        assert_eq!(RenderMode::Lit.selector(), 0);
        assert_eq!(RenderMode::Textured.selector(), 1);
        assert_eq!(RenderMode::Reflective.selector(), 2);
        assert_eq!(RenderMode::BumpMapped.selector(), 3);
        assert!(RenderMode::BumpMapped.uses_texture_layers());
        assert!(!RenderMode::Reflective.uses_texture_layers());
    }
}
