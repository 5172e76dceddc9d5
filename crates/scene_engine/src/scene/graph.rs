//! Scene graph
//!
//! The graph owns every node in a [`SlotMap`] arena. Parent and child links
//! are [`NodeId`] handles, so rewiring the hierarchy never moves a node and
//! a stale handle simply fails to resolve.
//!
//! Each frame runs in two passes:
//!
//! 1. [`SceneGraph::propagate_transforms`] walks the tree breadth-first,
//!    recomputing world matrices, world bounds and attached cameras.
//! 2. [`SceneGraph::update`] walks it again and lets every component emit
//!    its draw data into a [`DrawList`].
//!
//! Structural edits requested mid-frame go through [`SceneGraph::queue`]
//! and are applied by [`SceneGraph::apply_pending_commands`].

use std::collections::VecDeque;

use slotmap::SlotMap;

use crate::config::SceneSettings;
use crate::foundation::math::{Mat4, Vec3};
use crate::scene::camera::{Camera, CameraComponent, DEFAULT_GAME_CAMERA_POSITION};
use crate::scene::commands::SceneCommand;
use crate::scene::component::FrameContext;
use crate::scene::error::SceneError;
use crate::scene::frustum::Frustum;
use crate::scene::mesh::MeshComponent;
use crate::scene::node::{NodeId, ObjectId, SceneNode};
use crate::scene::primitives::PrimitiveShape;
use crate::scene::render_queue::{
    DrawList, GIZMO_FRONT_COLOR, GIZMO_RIGHT_COLOR, GIZMO_UP_COLOR,
};

/// Length of the selection gizmo axes in world units
const GIZMO_AXIS_LENGTH: f32 = 1.0;

/// Where the editor camera should look when focusing a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    /// World-space point to look at
    pub center: Vec3,
    /// World-space radius of the node's geometry, if it has any
    pub radius: Option<f32>,
}

/// Hierarchy of scene nodes with a single root
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    /// Live handles in creation order, root included
    node_list: Vec<NodeId>,

    /// Nodes created with the default name so far
    created_count: u64,
    next_object_id: u64,

    selected: Option<NodeId>,
    pending: VecDeque<SceneCommand>,
    settings: SceneSettings,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root
    pub fn new() -> Self {
        Self::with_settings(SceneSettings::default())
    }

    /// Create a graph with custom naming settings
    pub fn with_settings(settings: SceneSettings) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(settings.root_name.clone(), ObjectId(0)));
        log::info!("Scene graph created with root '{}'", settings.root_name);

        Self {
            nodes,
            root,
            node_list: vec![root],
            created_count: 0,
            next_object_id: 1,
            selected: None,
            pending: VecDeque::new(),
            settings,
        }
    }

    /// Root handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Naming settings
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Look up a node mutably
    ///
    /// Transform edits made through this handle take effect on the next
    /// propagation pass.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root is left
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Live node handles in creation order, root first
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_list
    }

    /// Children of a node, empty for unknown handles
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(SceneNode::parent)
    }

    /// Create an empty node
    ///
    /// Without a name the node is called `GameObject`, with the number of
    /// default-named nodes created so far appended once that count is
    /// positive. The count only grows. The node is attached under `parent`,
    /// or under the root when `parent` is `None`.
    pub fn create_game_object(
        &mut self,
        name: Option<&str>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let parent = parent.unwrap_or(self.root);
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let name = if self.created_count > 0 {
                    format!("{}{}", self.settings.default_object_name, self.created_count)
                } else {
                    self.settings.default_object_name.clone()
                };
                self.created_count += 1;
                name
            }
        };

        let object_id = self.allocate_object_id();

        let id = self.nodes.insert(SceneNode::new(name, object_id));
        self.node_list.push(id);
        self.link(parent, id);
        self.propagate_from(id);

        log::debug!(
            "Created '{}' {} under '{}'",
            self.nodes[id].name(),
            object_id,
            self.nodes[parent].name()
        );
        Ok(id)
    }

    /// Create a node named after a primitive shape, carrying its mesh
    pub fn create_primitive(
        &mut self,
        shape: PrimitiveShape,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let id = self.create_game_object(Some(shape.name()), parent)?;
        if let Some(node) = self.nodes.get_mut(id) {
            node.add_component(MeshComponent::primitive(shape));
        }
        Ok(id)
    }

    /// Create a game camera node at the default camera placement
    pub fn create_camera(&mut self, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        let name = self.settings.camera_name.clone();
        let id = self.create_game_object(Some(&name), parent)?;
        if let Some(node) = self.nodes.get_mut(id) {
            node.add_component(CameraComponent::new());
            node.transform_mut()
                .set_position(Vec3::from(DEFAULT_GAME_CAMERA_POSITION));
        }
        self.propagate_from(id);
        Ok(id)
    }

    /// Camera of the first active camera node in breadth-first order
    pub fn main_camera(&self) -> Option<&Camera> {
        self.bfs_order().into_iter().find_map(|id| {
            let node = self.nodes.get(id)?;
            if !node.is_active() {
                return None;
            }
            node.get_component::<CameraComponent>().map(CameraComponent::camera)
        })
    }

    /// Attach `child` under `parent`, keeping the child's world pose
    ///
    /// A child that already has a parent is detached first. The root can
    /// never be a child, and a node cannot go under its own descendant.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check_attach(parent, child)?;

        // World matrices must be current before they are preserved
        self.propagate_transforms();
        self.propagate_detached(child);

        if let Some(old_parent) = self.nodes[child].parent {
            self.unlink(old_parent, child);
        }

        let parent_world = if parent == self.root {
            None
        } else {
            Some(*self.nodes[parent].world_matrix())
        };
        self.nodes[child]
            .transform_mut()
            .reparent_preserve_world(parent_world.as_ref());
        self.link(parent, child);
        self.propagate_from(child);

        log::debug!(
            "Attached '{}' under '{}'",
            self.nodes[child].name(),
            self.nodes[parent].name()
        );
        Ok(())
    }

    /// Detach `child` from `parent` without destroying it
    ///
    /// The node stays live with its world pose as its local pose until it
    /// is attached again or deleted.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_node = self.nodes.get(parent).ok_or(SceneError::NodeNotFound(parent))?;
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if !parent_node.children.contains(&child) {
            return Err(SceneError::NotAChild { child, parent });
        }

        self.propagate_transforms();
        self.unlink(parent, child);
        self.nodes[child].transform_mut().reparent_preserve_world(None);
        self.propagate_from(child);

        log::debug!("Detached '{}'", self.nodes[child].name());
        Ok(())
    }

    /// Move a node under a new parent (`None` for the root)
    pub fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        self.attach_child(new_parent.unwrap_or(self.root), node)
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(SceneNode::parent);
        }
        false
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if child == self.root {
            return Err(SceneError::RootImmutable);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CycleDetected { child, parent });
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|id| *id != child);
        }
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
    }

    /// Destroy a node and everything below it
    ///
    /// Each node drops its components before its children are destroyed,
    /// and its child list last. Every destroyed handle leaves the arena and
    /// the live list; a selection inside the subtree is cleared. Returns the
    /// number of nodes destroyed.
    pub fn delete_subtree(&mut self, node: NodeId) -> Result<usize, SceneError> {
        if node == self.root {
            return Err(SceneError::RootImmutable);
        }
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node));
        }

        if let Some(selected) = self.selected {
            if self.is_ancestor_or_self(node, selected) {
                self.set_selected(None)?;
            }
        }

        if let Some(parent) = self.nodes[node].parent {
            self.unlink(parent, node);
        }

        let name = self.nodes[node].name().to_string();
        let mut destroyed: usize = 0;
        let mut stack = vec![(node, false)];
        while let Some((id, children_done)) = stack.pop() {
            if children_done {
                if let Some(mut removed) = self.nodes.remove(id) {
                    removed.children.clear();
                    destroyed += 1;
                }
                continue;
            }

            let Some(current) = self.nodes.get_mut(id) else {
                continue;
            };
            current.clear_components();
            stack.push((id, true));
            stack.extend(current.children.iter().rev().map(|child| (*child, false)));
        }

        let nodes = &self.nodes;
        self.node_list.retain(|id| nodes.contains_key(*id));
        log::debug!("Deleted '{}' and {} descendant(s)", name, destroyed.saturating_sub(1));
        Ok(destroyed)
    }

    /// Destroy every child of the root and every detached node
    pub fn clear_all(&mut self) -> usize {
        let mut targets: Vec<NodeId> = self.nodes[self.root].children.clone();
        targets.extend(
            self.node_list
                .iter()
                .copied()
                .filter(|id| *id != self.root && self.nodes[*id].parent.is_none()),
        );

        let destroyed: usize = targets
            .into_iter()
            .filter_map(|id| self.delete_subtree(id).ok())
            .sum();
        log::info!("Cleared scene, {} node(s) destroyed", destroyed);
        destroyed
    }

    /// Swap in a fresh root, returning the old one
    ///
    /// The current root must have no children left.
    pub fn replace_root(&mut self) -> Result<SceneNode, SceneError> {
        let child_count = self.nodes[self.root].children.len();
        if child_count > 0 {
            return Err(SceneError::RootNotEmpty(child_count));
        }

        if self.selected == Some(self.root) {
            self.set_selected(None)?;
        }

        let object_id = self.allocate_object_id();
        let new_root = self
            .nodes
            .insert(SceneNode::new(self.settings.root_name.clone(), object_id));

        let old_root = self.root;
        self.root = new_root;
        self.node_list.retain(|id| *id != old_root);
        self.node_list.insert(0, new_root);

        log::info!("Replaced scene root");
        self.nodes.remove(old_root).ok_or(SceneError::NodeNotFound(old_root))
    }

    /// Handles reachable from the root, breadth-first, root first
    pub fn bfs_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            if let Some(node) = self.nodes.get(id) {
                order.push(id);
                queue.extend(node.children.iter().copied());
            }
        }
        order
    }

    /// First node with the given name in breadth-first order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.bfs_order()
            .into_iter()
            .find(|id| self.nodes.get(*id).is_some_and(|node| node.name() == name))
    }

    /// Bring every world matrix reachable from the root up to date
    pub fn propagate_transforms(&mut self) {
        self.propagate_from(self.root);
    }

    fn propagate_detached(&mut self, node: NodeId) {
        if self.nodes.get(node).is_some_and(|n| n.parent.is_none()) {
            self.propagate_from(node);
        }
    }

    /// Breadth-first transform refresh of the subtree at `start`
    fn propagate_from(&mut self, start: NodeId) {
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let parent_world: Option<Mat4> = self
                .nodes
                .get(id)
                .and_then(SceneNode::parent)
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| *parent.world_matrix());

            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let children = node.children.clone();
            if node.transform_mut().update(parent_world.as_ref()) {
                node.on_world_changed();
                for child in &children {
                    if let Some(child) = self.nodes.get_mut(*child) {
                        child.transform_mut().notify_parent_moved();
                    }
                }
            }
            queue.extend(children);
        }
    }

    /// Run one frame over the scene
    ///
    /// Transforms are fully propagated before any component runs, so
    /// visibility always sees current bounds. Components of every node
    /// below the root then emit their draw data; the selected node gets
    /// an axis gizmo on top.
    pub fn update(&mut self, dt: f32, culling: Option<&Frustum>) -> DrawList {
        self.propagate_transforms();

        let mut draw_list = DrawList::new();
        let mut ctx = FrameContext {
            dt,
            culling,
            draw_list: &mut draw_list,
        };
        for id in self.bfs_order().into_iter().skip(1) {
            if let Some(node) = self.nodes.get(id) {
                node.update(id, &mut ctx);
            }
        }

        if let Some(node) = self.selected.and_then(|id| self.nodes.get(id)) {
            let transform = node.transform();
            let origin = transform.world_position();
            draw_list.push_line(
                origin,
                origin + transform.right() * GIZMO_AXIS_LENGTH,
                GIZMO_RIGHT_COLOR,
            );
            draw_list.push_line(
                origin,
                origin + transform.front() * GIZMO_AXIS_LENGTH,
                GIZMO_FRONT_COLOR,
            );
            draw_list.push_line(origin, origin + transform.up() * GIZMO_AXIS_LENGTH, GIZMO_UP_COLOR);
        }

        draw_list
    }

    /// Current selection
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Change the selection, keeping node flags in step
    pub fn set_selected(&mut self, selection: Option<NodeId>) -> Result<(), SceneError> {
        if let Some(id) = selection {
            if !self.nodes.contains_key(id) {
                return Err(SceneError::NodeNotFound(id));
            }
        }
        if let Some(previous) = self.selected.and_then(|id| self.nodes.get_mut(id)) {
            previous.selected = false;
        }
        if let Some(current) = selection.and_then(|id| self.nodes.get_mut(id)) {
            current.selected = true;
            log::debug!("Selected '{}'", current.name());
        }
        self.selected = selection;
        Ok(())
    }

    /// World-space point and radius to frame a node in view
    pub fn focus_target(&self, id: NodeId) -> Option<FocusTarget> {
        let node = self.nodes.get(id)?;
        let world = node.world_matrix();
        Some(match node.get_component::<MeshComponent>() {
            Some(mesh) => FocusTarget {
                center: mesh.center_in_world(world),
                radius: Some(mesh.radius_in_world(world)),
            },
            None => FocusTarget {
                center: node.transform().world_position(),
                radius: None,
            },
        })
    }

    /// Defer a structural edit until [`apply_pending_commands`](Self::apply_pending_commands)
    pub fn queue(&mut self, command: SceneCommand) {
        log::trace!("Queued {} command", command.label());
        self.pending.push_back(command);
    }

    /// Number of commands waiting
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Apply queued edits in order
    ///
    /// A failing command is logged and skipped. Returns how many applied.
    pub fn apply_pending_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Some(command) = self.pending.pop_front() {
            let label = command.label();
            match self.apply_command(command) {
                Ok(()) => applied += 1,
                Err(err) => log::warn!("Skipping {} command: {}", label, err),
            }
        }
        applied
    }

    fn apply_command(&mut self, command: SceneCommand) -> Result<(), SceneError> {
        match command {
            SceneCommand::DeleteSubtree(node) => self.delete_subtree(node).map(|_| ()),
            SceneCommand::Reparent { node, new_parent } => self.reparent(node, new_parent),
            SceneCommand::CreateGameObject { name, parent } => {
                self.create_game_object(name.as_deref(), parent).map(|_| ())
            }
            SceneCommand::CreatePrimitive { shape, parent } => {
                self.create_primitive(shape, parent).map(|_| ())
            }
            SceneCommand::ClearAll => {
                self.clear_all();
                Ok(())
            }
            SceneCommand::Select(selection) => self.set_selected(selection),
        }
    }

    /// Next process-unique object id
    pub(crate) fn allocate_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    /// Insert a node built elsewhere, used when rebuilding from records
    ///
    /// The node must carry an id from [`allocate_object_id`](Self::allocate_object_id).
    pub(crate) fn insert_detached(&mut self, node: SceneNode) -> NodeId {
        let id = self.nodes.insert(node);
        self.node_list.push(id);
        id
    }

    /// Link a detached node without touching its local pose
    pub(crate) fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check_attach(parent, child)?;
        if let Some(old_parent) = self.nodes[child].parent {
            self.unlink(old_parent, child);
        }
        self.link(parent, child);
        Ok(())
    }
}
