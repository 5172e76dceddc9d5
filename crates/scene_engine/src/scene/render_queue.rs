//! Per-frame draw list
//!
//! What the scene hands to a renderer after an update: one command per
//! visible mesh and a flat list of debug line segments. Pure data, the
//! renderer decides how to submit it.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::scene::bounds::BOX_EDGES;
use crate::scene::mesh::MeshBuffers;
use crate::scene::node::{NodeId, ObjectId};

/// Line colour for world AABBs
pub const AABB_COLOR: Vec4 = Vec4::new(1.0, 0.5, 0.5, 1.0);

/// Line colour for world OBBs
pub const OBB_COLOR: Vec4 = Vec4::new(0.5, 0.5, 1.0, 1.0);

/// Line colour for face normals
pub const FACE_NORMAL_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Line colour for vertex normals
pub const VERTEX_NORMAL_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Line colour for camera frustum outlines
pub const FRUSTUM_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

/// Selection gizmo colour for the local X axis
pub const GIZMO_RIGHT_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Selection gizmo colour for the local Y axis
pub const GIZMO_UP_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Selection gizmo colour for the local Z axis
pub const GIZMO_FRONT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// A mesh to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Node owning the mesh
    pub node: NodeId,
    /// Stable id of that node
    pub object_id: ObjectId,
    /// Model matrix
    pub world_matrix: Mat4,
    /// Renderer buffers for the mesh, if uploaded
    pub buffers: Option<MeshBuffers>,
    /// Number of indices to draw
    pub index_count: usize,
    /// Draw as wireframe
    pub wireframe: bool,
    /// Texture to bind, if any
    pub texture_id: Option<u32>,
    /// Whether the node is the current selection
    pub selected: bool,
}

/// A single debug line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Start point in world space
    pub start: Vec3,
    /// End point in world space
    pub end: Vec3,
    /// RGBA colour
    pub color: Vec4,
}

/// Everything produced by one scene update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    lines: Vec<DebugLine>,
    culled: usize,
}

impl DrawList {
    /// Create an empty draw list
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a mesh
    pub fn push_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Queue a debug line
    pub fn push_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        self.lines.push(DebugLine { start, end, color });
    }

    /// Queue the twelve edges of a box given its corners
    pub fn push_box(&mut self, corners: &[Vec3; 8], color: Vec4) {
        for (a, b) in BOX_EDGES {
            self.push_line(corners[a], corners[b], color);
        }
    }

    /// Count a mesh that failed the visibility test
    pub fn record_culled(&mut self) {
        self.culled += 1;
    }

    /// Queued meshes in traversal order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Queued debug lines
    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    /// Number of meshes rejected by culling
    pub fn culled_count(&self) -> usize {
        self.culled
    }

    /// Whether a node's mesh was queued
    pub fn contains(&self, node: NodeId) -> bool {
        self.commands.iter().any(|command| command.node == node)
    }

    /// Whether nothing was queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.lines.is_empty()
    }
}
