//! # Scene Engine
//!
//! Scene graph and spatial-query core for a small 3D editor.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-backed hierarchy with lazy transform propagation
//! - **Components**: Transform, mesh, material and camera per node
//! - **Bounds**: Local AABB and sphere per mesh, world OBB/AABB per node
//! - **Culling**: Frustum planes from the view-projection matrix
//! - **Picking**: Mouse segment, AABB broad phase, triangle narrow phase
//! - **Editor Camera**: Fly, free look, orbit and focus controls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! let mut session = EditorSession::new(&EditorConfig::default());
//! let cube = session
//!     .graph_mut()
//!     .create_primitive(PrimitiveShape::Cube, None)
//!     .expect("root exists");
//!
//! let mut input = InputSnapshot::new();
//! input.warp_mouse(800.0, 450.0);
//! input.set_button(MouseButton::Left, true);
//!
//! let draw_list = session.frame(0.016, &input, &Viewport::new(1600.0, 900.0));
//! assert_eq!(session.graph().selected(), Some(cube));
//! assert!(draw_list.contains(cube));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod editor;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod scene;
pub mod systems;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EditorConfig},
        editor::{EditorCamera, EditorSession},
        foundation::math::{Mat4, Quat, Transform, Vec3},
        input::{InputSnapshot, InputSource, KeyCode, MouseButton, Viewport},
        scene::{
            Camera, CameraComponent, DrawList, MaterialComponent, MeshComponent, NodeId, ObjectId,
            PrimitiveShape, SceneCommand, SceneError, SceneGraph, SceneNode, TransformComponent,
        },
        systems::{PickResult, PickingSystem},
    };
}
