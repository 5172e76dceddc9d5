//! Component registry for scene nodes
//!
//! Every node owns a transform directly; everything else lives in a
//! [`ComponentSet`] keyed by [`ComponentKind`]. A node holds at most one
//! component of each kind, and iteration follows insertion order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Mat4;
use crate::scene::bounds::{Aabb, Obb};
use crate::scene::camera::CameraComponent;
use crate::scene::frustum::Frustum;
use crate::scene::material::MaterialComponent;
use crate::scene::mesh::MeshComponent;
use crate::scene::node::{NodeId, ObjectId};
use crate::scene::render_queue::DrawList;

/// Tag identifying a component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Local/world placement, owned by every node
    Transform,
    /// Triangle mesh
    Mesh,
    /// Texture binding
    Material,
    /// Perspective camera
    Camera,
}

impl ComponentKind {
    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Camera => "camera",
        }
    }
}

/// A component stored in a node's registry
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Mesh component
    Mesh(MeshComponent),
    /// Material component
    Material(MaterialComponent),
    /// Camera component
    Camera(CameraComponent),
}

impl Component {
    /// Kind tag of this component
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Mesh(_) => ComponentKind::Mesh,
            Self::Material(_) => ComponentKind::Material,
            Self::Camera(_) => ComponentKind::Camera,
        }
    }
}

/// Concrete component types that can live in a [`ComponentSet`]
pub trait ComponentType: Sized {
    /// Kind tag for this type
    const KIND: ComponentKind;

    /// Wrap into the registry enum
    fn into_component(self) -> Component;

    /// Borrow out of the registry enum
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow out of the registry enum
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;

    /// Take out of the registry enum
    fn try_from_component(component: Component) -> Option<Self>;
}

macro_rules! impl_component_type {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn into_component(self) -> Component {
                Component::$variant(self)
            }

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn try_from_component(component: Component) -> Option<Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(component: $ty) -> Self {
                Component::$variant(component)
            }
        }
    };
}

impl_component_type!(MeshComponent, Mesh);
impl_component_type!(MaterialComponent, Material);
impl_component_type!(CameraComponent, Camera);

/// Kind-keyed component storage preserving insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSet {
    order: Vec<ComponentKind>,
    slots: HashMap<ComponentKind, Component>,
}

impl ComponentSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, returning the one of the same kind it replaced
    ///
    /// A replacement keeps the original position in the update order.
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        let previous = self.slots.insert(kind, component);
        if previous.is_none() {
            self.order.push(kind);
        }
        previous
    }

    /// Remove the component of the given kind
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        let removed = self.slots.remove(&kind)?;
        self.order.retain(|k| *k != kind);
        Some(removed)
    }

    /// Typed lookup
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.slots.get(&T::KIND).and_then(T::from_component)
    }

    /// Typed mutable lookup
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.slots.get_mut(&T::KIND).and_then(T::from_component_mut)
    }

    /// Whether a component of the kind is present
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Kinds in insertion order
    pub fn kinds(&self) -> &[ComponentKind] {
        &self.order
    }

    /// Components in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Component> + '_ {
        self.order.iter().filter_map(|kind| self.slots.get(kind))
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every component, last inserted first
    pub fn clear(&mut self) {
        while let Some(kind) = self.order.pop() {
            self.slots.remove(&kind);
        }
    }
}

/// World-space bounds owned by a node with geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Local box under the world matrix
    pub obb: Obb,
    /// Axis-aligned box enclosing `obb`
    pub aabb: Aabb,
}

/// Shared state for one update pass over the scene
pub struct FrameContext<'a> {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Frustum used for visibility, `None` draws everything
    pub culling: Option<&'a Frustum>,
    /// Output of the pass
    pub draw_list: &'a mut DrawList,
}

/// Read-only view of the node a component is updated for
pub struct NodeFrame<'a> {
    /// Arena handle
    pub node: NodeId,
    /// Stable id
    pub object_id: ObjectId,
    /// Current world matrix
    pub world_matrix: &'a Mat4,
    /// Current world bounds, if the node has geometry
    pub bounds: Option<&'a WorldBounds>,
    /// Texture bound by a sibling material
    pub texture_id: Option<u32>,
    /// Whether the node is selected
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives::PrimitiveShape;

    #[test]
    fn test_typed_lookup() {
        let mut set = ComponentSet::new();
        assert!(set.get::<MeshComponent>().is_none());

        set.insert(MeshComponent::primitive(PrimitiveShape::Cube).into());
        set.insert(MaterialComponent::with_texture("bricks", 7, 64, 64).into());

        assert!(set.get::<MeshComponent>().is_some());
        assert_eq!(set.get::<MaterialComponent>().map(|m| m.texture_id), Some(7));
        assert!(set.get::<CameraComponent>().is_none());
        assert_eq!(set.kinds(), &[ComponentKind::Mesh, ComponentKind::Material]);
    }

    #[test]
    fn test_duplicate_kind_replaces_in_place() {
        let mut set = ComponentSet::new();
        set.insert(MaterialComponent::with_texture("a", 1, 1, 1).into());
        set.insert(CameraComponent::new().into());

        let previous = set.insert(MaterialComponent::with_texture("b", 2, 1, 1).into());
        let previous = previous.and_then(MaterialComponent::try_from_component);
        assert_eq!(previous.map(|m| m.texture_name), Some("a".to_string()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.kinds(), &[ComponentKind::Material, ComponentKind::Camera]);
        assert_eq!(set.get::<MaterialComponent>().map(|m| m.texture_id), Some(2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut set = ComponentSet::new();
        set.insert(CameraComponent::new().into());
        set.insert(MaterialComponent::default().into());

        assert!(set.remove(ComponentKind::Camera).is_some());
        assert!(set.remove(ComponentKind::Camera).is_none());
        assert_eq!(set.kinds(), &[ComponentKind::Material]);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
