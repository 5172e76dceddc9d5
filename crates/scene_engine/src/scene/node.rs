//! Scene nodes
//!
//! A node is a named entity in the hierarchy. Parent and child links are
//! arena handles ([`NodeId`]); the [`SceneGraph`](super::graph::SceneGraph)
//! owns every node and is the only place links are rewired.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Mat4;
use crate::scene::bounds::{Aabb, Obb};
use crate::scene::camera::CameraComponent;
use crate::scene::component::{
    Component, ComponentKind, ComponentSet, ComponentType, FrameContext, NodeFrame, WorldBounds,
};
use crate::scene::material::MaterialComponent;
use crate::scene::mesh::MeshComponent;
use crate::scene::transform::TransformComponent;

slotmap::new_key_type! {
    /// Arena handle of a scene node
    pub struct NodeId;
}

/// Process-unique node identifier, never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    id: ObjectId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    transform: TransformComponent,
    components: ComponentSet,
    bounds: Option<WorldBounds>,

    active: bool,
    pub(crate) selected: bool,
}

impl SceneNode {
    pub(crate) fn new(name: String, id: ObjectId) -> Self {
        Self {
            name,
            id,
            parent: None,
            children: Vec::new(),
            transform: TransformComponent::new(),
            components: ComponentSet::new(),
            bounds: None,
            active: true,
            selected: false,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Stable identifier
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Parent handle; `None` for the root and for detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node takes part in picking
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable the node
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the node is the current selection
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Transform component
    pub fn transform(&self) -> &TransformComponent {
        &self.transform
    }

    /// Mutable transform component
    pub fn transform_mut(&mut self) -> &mut TransformComponent {
        &mut self.transform
    }

    /// World matrix as of the last propagation
    pub fn world_matrix(&self) -> &Mat4 {
        self.transform.world_matrix()
    }

    /// World OBB of the node's geometry
    pub fn global_obb(&self) -> Option<&Obb> {
        self.bounds.as_ref().map(|bounds| &bounds.obb)
    }

    /// World AABB enclosing [`global_obb`](Self::global_obb)
    pub fn global_aabb(&self) -> Option<&Aabb> {
        self.bounds.as_ref().map(|bounds| &bounds.aabb)
    }

    /// Both world bounds
    pub fn world_bounds(&self) -> Option<&WorldBounds> {
        self.bounds.as_ref()
    }

    /// Attach a component
    ///
    /// A component of the same kind is replaced and returned. Adding a mesh
    /// regenerates the node's world bounds right away.
    pub fn add_component<T: ComponentType>(&mut self, component: T) -> Option<Component> {
        let previous = self.components.insert(component.into_component());
        if let Some(previous) = &previous {
            log::warn!(
                "Node '{}' already had a {} component, replacing it",
                self.name,
                previous.kind().name()
            );
        }
        if T::KIND == ComponentKind::Mesh {
            self.generate_bounds();
        }
        previous
    }

    /// Detach a component
    pub fn remove_component<T: ComponentType>(&mut self) -> Option<T> {
        let removed = self.components.remove(T::KIND).and_then(T::try_from_component);
        if T::KIND == ComponentKind::Mesh {
            self.generate_bounds();
        }
        removed
    }

    /// Typed component lookup
    pub fn get_component<T: ComponentType>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    /// Typed mutable component lookup
    ///
    /// Callers that change mesh geometry must call
    /// [`generate_bounds`](Self::generate_bounds) afterwards.
    pub fn get_component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.components.get_mut::<T>()
    }

    /// Whether a component of the kind is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        kind == ComponentKind::Transform || self.components.contains(kind)
    }

    /// Attached component kinds in update order, transform first
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        std::iter::once(ComponentKind::Transform)
            .chain(self.components.kinds().iter().copied())
            .collect()
    }

    /// Registry of non-transform components
    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Recompute world bounds from the mesh and the current world matrix
    pub fn generate_bounds(&mut self) {
        self.bounds = self.components.get::<MeshComponent>().map(|mesh| {
            let (obb, aabb) = mesh.world_bounds(self.transform.world_matrix());
            WorldBounds { obb, aabb }
        });
    }

    /// React to a recomputed world matrix: bounds and attached camera
    pub(crate) fn on_world_changed(&mut self) {
        self.generate_bounds();
        let world = *self.transform.world_matrix();
        if let Some(camera) = self.components.get_mut::<CameraComponent>() {
            camera.follow(&world);
        }
    }

    /// Update every component in insertion order
    ///
    /// The transform is already current when this runs; the mesh decides
    /// visibility on its own.
    pub fn update(&self, handle: NodeId, ctx: &mut FrameContext<'_>) {
        let frame = NodeFrame {
            node: handle,
            object_id: self.id,
            world_matrix: self.transform.world_matrix(),
            bounds: self.bounds.as_ref(),
            texture_id: self
                .components
                .get::<MaterialComponent>()
                .and_then(MaterialComponent::texture),
            selected: self.selected,
        };

        for component in self.components.iter() {
            match component {
                Component::Mesh(mesh) => mesh.update(&frame, ctx),
                Component::Camera(camera) => camera.update(ctx),
                Component::Material(_) => {}
            }
        }
    }

    /// Drop components, last attached first
    pub(crate) fn clear_components(&mut self) {
        self.components.clear();
        self.bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::primitives::PrimitiveShape;
    use crate::scene::render_queue::DrawList;
    use approx::assert_relative_eq;

    fn node() -> SceneNode {
        SceneNode::new("Node".to_string(), ObjectId(1))
    }

    #[test]
    fn test_adding_mesh_generates_bounds() {
        let mut node = node();
        assert!(node.global_aabb().is_none());

        node.transform_mut().set_position(Vec3::new(2.0, 0.0, 0.0));
        node.transform_mut().update(None);
        node.add_component(MeshComponent::primitive(PrimitiveShape::Cube));

        let aabb = node.global_aabb().unwrap();
        assert_relative_eq!(aabb.min, Vec3::new(1.5, -0.5, -0.5));
        assert_relative_eq!(aabb.max, Vec3::new(2.5, 0.5, 0.5));

        node.remove_component::<MeshComponent>();
        assert!(node.global_aabb().is_none());
    }

    #[test]
    fn test_component_kinds_start_with_transform() {
        let mut node = node();
        node.add_component(MaterialComponent::default());
        node.add_component(MeshComponent::primitive(PrimitiveShape::Plane));
        assert_eq!(
            node.component_kinds(),
            vec![ComponentKind::Transform, ComponentKind::Material, ComponentKind::Mesh]
        );
        assert!(node.has_component(ComponentKind::Transform));
        assert!(!node.has_component(ComponentKind::Camera));
    }

    #[test]
    fn test_replacing_component_returns_old_one() {
        let mut node = node();
        assert!(node.add_component(MaterialComponent::with_texture("a", 3, 8, 8)).is_none());
        let previous = node.add_component(MaterialComponent::with_texture("b", 4, 8, 8));
        assert_eq!(previous.map(|c| c.kind()), Some(ComponentKind::Material));
        assert_eq!(node.get_component::<MaterialComponent>().map(|m| m.texture_id), Some(4));
    }

    #[test]
    fn test_update_emits_mesh_with_material_texture() {
        let mut node = node();
        node.add_component(MeshComponent::primitive(PrimitiveShape::Cube));
        node.add_component(MaterialComponent::with_texture("checker", 9, 2, 2));

        let mut draw_list = DrawList::new();
        let mut ctx = FrameContext { dt: 0.016, culling: None, draw_list: &mut draw_list };
        node.update(NodeId::default(), &mut ctx);

        assert_eq!(draw_list.commands().len(), 1);
        assert_eq!(draw_list.commands()[0].texture_id, Some(9));
        assert_eq!(draw_list.commands()[0].index_count, 36);
        // Default flags outline the AABB
        assert_eq!(draw_list.lines().len(), 12);
    }

    #[test]
    fn test_camera_follows_world_change() {
        let mut node = node();
        node.add_component(CameraComponent::new());
        node.transform_mut().set_position(Vec3::new(5.0, 6.0, 7.0));
        node.transform_mut().update(None);
        node.on_world_changed();

        let camera = node.get_component::<CameraComponent>().unwrap();
        assert_relative_eq!(camera.camera().position(), Vec3::new(5.0, 6.0, 7.0));
    }
}
