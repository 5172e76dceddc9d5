//! Per-frame systems that read the scene graph

pub mod picking_system;

pub use picking_system::{PickHit, PickResult, PickState, PickingSystem};
