//! The scene tree and the operations the editor performs on it.
//!
//! All nodes live in one arena owned by [`SceneContext`]; nodes refer to
//! each other by [`NodeId`]. Each node lists its children in order and
//! records its parent, and the two are kept consistent by every operation
//! here. The root is its own parent.
//!
//! The context also holds the editor's cursor: the selected node that
//! creation, deletion, navigation and the transform operators act on.

use std::fmt::Write;

use editor_core::EditorConfig;
use editor_resources::{Material, ShapeParams, Topology};
use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use crate::camera::Camera;
use crate::drawable::{DrawableNode, RenderMode, TextureBinding};
use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::node::{Node, NodeId, NodeKind};
use crate::transform::TransformController;

/// Direction for [`SceneContext::move_selection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Parent,
    FirstChild,
    PrevSibling,
    NextSibling,
}

/// The scene tree, its designated nodes and the selection.
#[derive(Debug)]
pub struct SceneContext {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    camera: NodeId,
    light: NodeId,
    skybox: NodeId,
    selection: NodeId,
    /// Operator applied by [`SceneContext::apply_to_current`]
    pub controller: TransformController,
}

impl SceneContext {
    /// Builds the initial scene: a root offset by the configured bias, a
    /// camera under it looking at the configured target, the skybox under
    /// the camera and the light under the root. The root is selected.
    pub fn new(config: &EditorConfig) -> SceneResult<Self> {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert_with_key(|id| Node::new(id, NodeKind::Empty));
        nodes[root].transform = Mat4::from_translation(config.render.root_offset());

        let mut scene = Self {
            nodes,
            root,
            camera: root,
            light: root,
            skybox: root,
            selection: root,
            controller: TransformController::new(config.controller.clone()),
        };

        scene.camera = scene.attach(root, NodeKind::Camera(Camera::from_config(&config.camera)));
        scene.nodes[scene.camera].transform =
            Camera::placement(config.camera.eye(), config.camera.target());

        let skybox = DrawableNode::new(&ShapeParams::Cube {
            size: config.render.skybox_size,
        })?
        .with_render_mode(RenderMode::Reflective);
        scene.skybox = scene.attach(scene.camera, NodeKind::Skybox(skybox));

        scene.light = scene.attach(root, NodeKind::Light(Light::new()?));
        scene.nodes[scene.light].transform =
            Mat4::from_translation(config.render.light_position());

        tracing::debug!("Initial scene built with {} nodes", scene.node_count());
        Ok(scene)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn light(&self) -> NodeId {
        self.light
    }

    pub fn skybox(&self) -> NodeId {
        self.skybox
    }

    pub fn selection(&self) -> NodeId {
        self.selection
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// The selected node.
    pub fn current(&self) -> &Node {
        &self.nodes[self.selection]
    }

    pub fn current_mut(&mut self) -> &mut Node {
        &mut self.nodes[self.selection]
    }

    /// Whether `id` is one of the nodes that can never be deleted.
    pub fn is_protected(&self, id: NodeId) -> bool {
        id == self.root || id == self.camera || id == self.light || id == self.skybox
    }

    pub fn select(&mut self, id: NodeId) -> SceneResult<()> {
        self.node(id)?;
        self.selection = id;
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.insert(Node::new(parent, kind));
        self.nodes[parent].children.push(id);
        id
    }

    fn attach_to_selection(&mut self, kind: NodeKind) -> NodeId {
        let id = self.attach(self.selection, kind);
        tracing::debug!(
            "Created {} {:?} under {:?}",
            self.nodes[id].kind.name(),
            id,
            self.selection
        );
        self.selection = id;
        id
    }

    /// Generates a drawable for `params`, appends it as the last child of
    /// the selection and selects it.
    ///
    /// The new node has the default material and an identity transform. If
    /// the parameters are invalid the tree is left unchanged.
    pub fn create_child(&mut self, params: &ShapeParams) -> SceneResult<NodeId> {
        let drawable = DrawableNode::new(params).inspect_err(|err| {
            tracing::warn!("Rejected {}: {}", params.kind().name(), err);
        })?;
        Ok(self.attach_to_selection(NodeKind::Drawable(drawable)))
    }

    /// Appends an empty grouping node to the selection and selects it.
    pub fn create_empty(&mut self) -> NodeId {
        self.attach_to_selection(NodeKind::Empty)
    }

    /// Deletes the selected node and its subtree, selecting its parent.
    ///
    /// Returns `false`, changing nothing, when the selection is protected.
    pub fn delete_current(&mut self) -> bool {
        let target = self.selection;
        if self.is_protected(target) {
            tracing::warn!("Refusing to delete protected node {:?}", target);
            return false;
        }

        let parent = self.nodes[target].parent;
        self.nodes[parent].children.retain(|&child| child != target);

        let mut pending = vec![target];
        let mut removed = 0;
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(id) {
                pending.extend(node.children);
                removed += 1;
            }
        }

        self.selection = parent;
        tracing::debug!("Deleted {:?} ({} nodes)", target, removed);
        true
    }

    /// Moves the selection one step through the tree.
    ///
    /// Moves past the edge of the tree (the root's parent, a leaf's first
    /// child, before the first or after the last sibling) leave the
    /// selection where it is. Returns whether the selection changed.
    pub fn move_selection(&mut self, direction: Direction) -> bool {
        let current = &self.nodes[self.selection];
        let target = match direction {
            Direction::Parent => Some(current.parent),
            Direction::FirstChild => current.children.first().copied(),
            Direction::PrevSibling | Direction::NextSibling => {
                if self.selection == self.root {
                    None
                } else {
                    let siblings = &self.nodes[current.parent].children;
                    siblings
                        .iter()
                        .position(|&id| id == self.selection)
                        .and_then(|index| match direction {
                            Direction::PrevSibling => index.checked_sub(1),
                            _ => Some(index + 1),
                        })
                        .and_then(|index| siblings.get(index).copied())
                }
            }
        };

        match target {
            Some(id) if id != self.selection => {
                self.selection = id;
                true
            }
            _ => false,
        }
    }

    /// Nodes in depth-first pre-order with their depth below the root.
    pub fn enumerate(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            stack.extend(
                self.nodes[id]
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        out
    }

    /// The tree as indented text, the selection marked with `<-`, followed
    /// by the controller's mode and axis.
    pub fn display(&self) -> String {
        let mut text = String::new();
        for (id, depth) in self.enumerate() {
            let marker = if id == self.selection { " <-" } else { "" };
            let _ = writeln!(
                text,
                "{}{}{}",
                "| ".repeat(depth),
                self.nodes[id].kind.name(),
                marker
            );
        }
        let _ = write!(
            text,
            "\nMode: {}\nAxis: {}\n",
            self.controller.mode(),
            self.controller.axis()
        );
        text
    }

    /// Product of the local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Mat4> {
        let mut world = self.node(id)?.effective_transform();
        let mut current = id;
        while current != self.root {
            current = self.node(current)?.parent;
            world = self.node(current)?.effective_transform() * world;
        }
        Ok(world)
    }

    /// Verifies that parent and child links agree and that every node is
    /// reachable from the root exactly once.
    pub fn check_invariants(&self) -> SceneResult<()> {
        let corrupt = |message: String| Err(SceneError::CorruptTree(message));

        if self.nodes.get(self.root).map(|root| root.parent) != Some(self.root) {
            return corrupt("root is not its own parent".to_string());
        }
        for (id, node) in &self.nodes {
            for &child in &node.children {
                match self.nodes.get(child) {
                    Some(child_node) if child_node.parent == id => {}
                    Some(_) => return corrupt(format!("{child:?} does not point back at {id:?}")),
                    None => return corrupt(format!("{id:?} lists missing child {child:?}")),
                }
            }
            if id != self.root {
                let listed = self
                    .nodes
                    .get(node.parent)
                    .map_or(0, |parent| parent.children.iter().filter(|&&c| c == id).count());
                if listed != 1 {
                    return corrupt(format!("{id:?} listed {listed} times by its parent"));
                }
            }
        }

        let reachable = self.enumerate().len();
        if reachable != self.nodes.len() {
            return corrupt(format!(
                "{reachable} of {} nodes reachable from the root",
                self.nodes.len()
            ));
        }
        Ok(())
    }

    /// Gives the selection a uniform material of `color`. Returns `false`
    /// if the selection draws nothing.
    pub fn set_current_color(&mut self, color: Vec3) -> bool {
        match self.current_mut().kind.drawable_mut() {
            Some(drawable) => {
                drawable.set_material(Material::from_color(color));
                true
            }
            None => false,
        }
    }

    /// Tints the light and its marker.
    pub fn set_light_color(&mut self, color: Vec3) {
        if let NodeKind::Light(light) = &mut self.nodes[self.light].kind {
            light.set_color(color);
        }
    }

    pub fn set_current_render_mode(&mut self, mode: RenderMode) -> bool {
        match self.current_mut().kind.drawable_mut() {
            Some(drawable) => {
                drawable.set_render_mode(mode);
                true
            }
            None => false,
        }
    }

    pub fn set_current_texture(&mut self, texture: TextureBinding) -> bool {
        match self.current_mut().kind.drawable_mut() {
            Some(drawable) => {
                drawable.set_texture(texture);
                true
            }
            None => false,
        }
    }

    /// Resamples the selection's geometry for drawing as `to`.
    pub fn convert_current_topology(&mut self, to: Topology) -> bool {
        match self.current_mut().kind.drawable_mut() {
            Some(drawable) => {
                drawable.convert_topology(to);
                true
            }
            None => false,
        }
    }

    /// Applies the controller's operator to the selection.
    pub fn apply_to_current(&mut self, step: f32) {
        let selection = self.selection;
        self.apply_to(selection, step);
    }

    /// Applies the controller's operator to the root, moving the whole
    /// scene.
    pub fn apply_to_root(&mut self, step: f32) {
        let root = self.root;
        self.apply_to(root, step);
    }

    /// Applies the controller's operator to the selection for a horizontal
    /// pointer drag of `dx` pixels.
    pub fn drag_current(&mut self, dx: f32) {
        let step = self.controller.drag_step(dx);
        self.apply_to_current(step);
    }

    fn apply_to(&mut self, id: NodeId, step: f32) {
        let Self {
            nodes, controller, ..
        } = self;
        controller.apply(&mut nodes[id].transform, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneContext {
        SceneContext::new(&EditorConfig::default()).unwrap()
    }

    fn cube() -> ShapeParams {
        ShapeParams::Cube { size: 1.0 }
    }

    #[test]
    fn test_initial_scene() {
        let scene = scene();
        assert_eq!(scene.node_count(), 4);
        assert_eq!(scene.selection(), scene.root());
        assert_eq!(scene.current().parent(), scene.root());
        assert_eq!(scene.node(scene.skybox()).unwrap().parent(), scene.camera());
        assert_eq!(scene.node(scene.light()).unwrap().parent(), scene.root());
        scene.check_invariants().unwrap();
    }

    #[test]
    fn test_create_child_appends_and_selects() {
        let mut scene = scene();
        let root = scene.root();
        let cube = scene.create_child(&cube()).unwrap();

        assert_eq!(scene.selection(), cube);
        assert_eq!(scene.node(root).unwrap().children().last(), Some(&cube));
        assert_eq!(scene.current().transform, Mat4::IDENTITY);
        scene.check_invariants().unwrap();
    }

    #[test]
    fn test_invalid_params_leave_tree_unchanged() {
        let mut scene = scene();
        let before = scene.node_count();
        let result = scene.create_child(&ShapeParams::Sphere { radius: f32::NAN });

        assert!(matches!(result, Err(SceneError::Resource(_))));
        assert_eq!(scene.node_count(), before);
        assert_eq!(scene.selection(), scene.root());
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut scene = scene();
        let parent = scene.create_empty();
        scene.create_child(&cube()).unwrap();
        scene.create_child(&cube()).unwrap();
        assert_eq!(scene.node_count(), 7);

        scene.select(parent).unwrap();
        assert!(scene.delete_current());
        assert_eq!(scene.node_count(), 4);
        assert_eq!(scene.selection(), scene.root());
        assert!(!scene.contains(parent));
        scene.check_invariants().unwrap();
    }

    #[test]
    fn test_navigation() {
        let mut scene = scene();
        let root = scene.root();
        let a = scene.create_child(&cube()).unwrap();
        scene.select(root).unwrap();
        let b = scene.create_child(&cube()).unwrap();

        assert!(scene.move_selection(Direction::PrevSibling));
        assert_eq!(scene.selection(), a);
        assert!(scene.move_selection(Direction::NextSibling));
        assert_eq!(scene.selection(), b);
        assert!(!scene.move_selection(Direction::NextSibling));
        assert!(!scene.move_selection(Direction::FirstChild));

        assert!(scene.move_selection(Direction::Parent));
        assert_eq!(scene.selection(), root);
        assert!(!scene.move_selection(Direction::Parent));
        assert!(!scene.move_selection(Direction::NextSibling));

        assert!(scene.move_selection(Direction::FirstChild));
        assert_eq!(scene.selection(), scene.camera());
    }

    #[test]
    fn test_enumerate_is_pre_order() {
        let scene = scene();
        let order: Vec<_> = scene.enumerate();
        assert_eq!(
            order,
            vec![
                (scene.root(), 0),
                (scene.camera(), 1),
                (scene.skybox(), 2),
                (scene.light(), 1),
            ]
        );
    }

    #[test]
    fn test_display() {
        let mut scene = scene();
        scene.create_child(&ShapeParams::Sphere { radius: 1.0 }).unwrap();
        let expected = "Empty\n| Camera\n| | Skybox\n| Light\n| Sphere <-\n\nMode: Translate\nAxis: X\n";
        assert_eq!(scene.display(), expected);
    }

    #[test]
    fn test_color_and_mode_edits() {
        let mut scene = scene();
        assert!(!scene.set_current_color(Vec3::X));

        scene.create_child(&cube()).unwrap();
        assert!(scene.set_current_color(Vec3::X));
        assert!(scene.set_current_render_mode(RenderMode::BumpMapped));
        let drawable = scene.current().kind.drawable().unwrap();
        assert_eq!(drawable.material().specular, Vec3::X);
        assert_eq!(drawable.render_mode(), RenderMode::BumpMapped);
        assert!(drawable.is_dirty());
    }

    #[test]
    fn test_light_color() {
        let mut scene = scene();
        scene.set_light_color(Vec3::new(0.0, 0.5, 0.0));
        let NodeKind::Light(light) = &scene.node(scene.light()).unwrap().kind else {
            panic!("light node changed kind");
        };
        assert_eq!(light.marker.material().ambient, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(light.specular, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_skybox_ignores_its_own_transform() {
        let mut scene = scene();
        let skybox = scene.skybox();
        scene.node_mut(skybox).unwrap().transform = Mat4::from_translation(Vec3::X);

        let camera_world = scene.world_transform(scene.camera()).unwrap();
        assert_eq!(scene.world_transform(skybox).unwrap(), camera_world);
    }

    #[test]
    fn test_apply_to_root_moves_everything() {
        let mut scene = scene();
        let light_before = scene.world_transform(scene.light()).unwrap();
        scene.apply_to_root(2.0);
        let light_after = scene.world_transform(scene.light()).unwrap();

        let moved = light_after.w_axis.truncate() - light_before.w_axis.truncate();
        assert!(moved.abs_diff_eq(Vec3::X, 1e-5), "moved {moved:?}");
    }
}
