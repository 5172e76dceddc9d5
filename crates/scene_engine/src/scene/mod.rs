//! Scene management
//!
//! Hierarchical scene graph of named nodes with attachable components,
//! the bounding volumes and frustum used for culling, and the per-frame
//! draw list the graph hands to a renderer.
//!
//! ## Frame flow
//!
//! ```text
//! SceneGraph::propagate_transforms   (world matrices, bounds, cameras)
//!      ↓
//! SceneGraph::update                 (visibility, draw commands, debug lines)
//!      ↓
//! SceneGraph::apply_pending_commands (deferred structural edits)
//! ```

pub mod bounds;
pub mod camera;
pub mod commands;
pub mod component;
pub mod error;
pub mod frustum;
pub mod graph;
pub mod material;
pub mod mesh;
pub mod node;
pub mod persistence;
pub mod primitives;
pub mod render_queue;
pub mod transform;

#[cfg(test)]
mod tests;

pub use bounds::{Aabb, BoundingSphere, Obb};
pub use camera::{Camera, CameraComponent};
pub use commands::SceneCommand;
pub use component::{Component, ComponentKind, ComponentSet, ComponentType};
pub use error::SceneError;
pub use frustum::{Frustum, FrustumSide, Plane};
pub use graph::{FocusTarget, SceneGraph};
pub use material::MaterialComponent;
pub use mesh::{MeshBuffers, MeshComponent, MeshDrawFlags, MeshSource};
pub use node::{NodeId, ObjectId, SceneNode};
pub use persistence::{ComponentRecord, FieldValue, NodeRecord, Persist};
pub use primitives::{MeshGeometry, PrimitiveShape};
pub use render_queue::{DebugLine, DrawCommand, DrawList};
pub use transform::TransformComponent;
