//! Scene nodes.

use glam::Mat4;
use slotmap::new_key_type;

use crate::camera::Camera;
use crate::drawable::DrawableNode;
use crate::light::Light;

new_key_type! {
    /// Stable handle to a node in a [`SceneContext`](crate::SceneContext).
    pub struct NodeId;
}

/// What a node is, beyond its place in the tree.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Grouping node; draws nothing.
    Empty,
    Drawable(DrawableNode),
    Camera(Camera),
    Light(Light),
    /// Environment cube. Its local transform is forced to identity, so it
    /// follows its parent without moving on its own.
    Skybox(DrawableNode),
}

impl NodeKind {
    /// Name shown in the tree display.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Empty => "Empty",
            NodeKind::Drawable(drawable) => drawable.shape().name(),
            NodeKind::Camera(_) => "Camera",
            NodeKind::Light(_) => "Light",
            NodeKind::Skybox(_) => "Skybox",
        }
    }

    /// The geometry drawn for this node, if any.
    pub fn drawable(&self) -> Option<&DrawableNode> {
        match self {
            NodeKind::Drawable(drawable) | NodeKind::Skybox(drawable) => Some(drawable),
            NodeKind::Light(light) => Some(&light.marker),
            NodeKind::Empty | NodeKind::Camera(_) => None,
        }
    }

    pub fn drawable_mut(&mut self) -> Option<&mut DrawableNode> {
        match self {
            NodeKind::Drawable(drawable) | NodeKind::Skybox(drawable) => Some(drawable),
            NodeKind::Light(light) => Some(&mut light.marker),
            NodeKind::Empty | NodeKind::Camera(_) => None,
        }
    }
}

/// A node of the scene tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) parent: NodeId,
    pub(crate) children: Vec<NodeId>,
    /// Transform relative to the parent
    pub transform: Mat4,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(parent: NodeId, kind: NodeKind) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform: Mat4::IDENTITY,
            kind,
        }
    }

    /// The parent node. The root is its own parent.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform as it takes part in world composition.
    pub fn effective_transform(&self) -> Mat4 {
        match self.kind {
            NodeKind::Skybox(_) => Mat4::IDENTITY,
            _ => self.transform,
        }
    }
}
