//! Mesh component
//!
//! Owns already-parsed triangle geometry together with its model-space
//! bounds (AABB and enclosing sphere), per-face normals and the editor's
//! debug draw flags. World-space bounds are derived on demand from a world
//! matrix and stored on the owning node.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{normalize_or, transform_point, Mat4, Vec2, Vec3};
use crate::physics::Triangle;
use crate::scene::bounds::{Aabb, BoundingSphere, Obb};
use crate::scene::component::{FrameContext, NodeFrame};
use crate::scene::render_queue::{
    DrawCommand, AABB_COLOR, FACE_NORMAL_COLOR, OBB_COLOR, VERTEX_NORMAL_COLOR,
};
use crate::scene::primitives::{MeshGeometry, PrimitiveShape};

bitflags! {
    /// Per-mesh debug drawing toggles
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MeshDrawFlags: u32 {
        /// Draw triangles as lines
        const WIREFRAME      = 1 << 0;
        /// Outline the world AABB
        const AABB           = 1 << 1;
        /// Outline the world OBB
        const OBB            = 1 << 2;
        /// Draw a line per face along its normal
        const FACE_NORMALS   = 1 << 3;
        /// Draw a line per vertex along its normal
        const VERTEX_NORMALS = 1 << 4;
    }
}

impl Default for MeshDrawFlags {
    fn default() -> Self {
        Self::AABB
    }
}

/// Opaque renderer handles for an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshBuffers {
    /// Vertex buffer handle
    pub vertex_buffer: u32,
    /// Index buffer handle
    pub index_buffer: u32,
    /// Texture coordinate buffer handle, if the mesh has UVs
    pub tex_coord_buffer: Option<u32>,
}

/// Where the mesh geometry came from, so it can be rebuilt on load
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshSource {
    /// Built-in primitive
    Primitive(PrimitiveShape),
    /// Imported asset path
    Asset(String),
    /// Geometry supplied directly by the caller
    #[default]
    Inline,
}

/// Triangle mesh attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    indices: Vec<u32>,

    face_normals: Vec<Vec3>,
    face_centers: Vec<Vec3>,

    local_aabb: Aabb,
    bounding_sphere: BoundingSphere,

    source: MeshSource,
    buffers: Option<MeshBuffers>,

    /// Debug draw toggles
    pub flags: MeshDrawFlags,
    /// Length of drawn normal lines
    pub normal_scale: f32,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self::from_geometry(MeshGeometry::default())
    }
}

impl MeshComponent {
    /// Build a mesh from parsed geometry; computes face normals and bounds
    pub fn from_geometry(geometry: MeshGeometry) -> Self {
        let mut mesh = Self {
            vertices: geometry.positions,
            normals: geometry.normals,
            tex_coords: geometry.tex_coords,
            indices: geometry.indices,
            face_normals: Vec::new(),
            face_centers: Vec::new(),
            local_aabb: Aabb::default(),
            bounding_sphere: BoundingSphere::default(),
            source: MeshSource::Inline,
            buffers: None,
            flags: MeshDrawFlags::default(),
            normal_scale: 1.0,
        };
        if mesh.indices.len() % 3 != 0 {
            log::warn!(
                "Index count {} is not a multiple of 3, trailing indices ignored",
                mesh.indices.len()
            );
        }
        mesh.compute_face_normals();
        mesh.generate_local_bounds();
        mesh
    }

    /// Mesh for one of the built-in primitive shapes
    pub fn primitive(shape: PrimitiveShape) -> Self {
        let mut mesh = Self::from_geometry(shape.generate());
        mesh.source = MeshSource::Primitive(shape);
        mesh
    }

    /// Replace the geometry, recomputing derived data
    pub fn set_geometry(&mut self, geometry: MeshGeometry) {
        let flags = self.flags;
        let normal_scale = self.normal_scale;
        let source = std::mem::take(&mut self.source);
        *self = Self::from_geometry(geometry);
        self.flags = flags;
        self.normal_scale = normal_scale;
        self.source = source;
    }

    /// Vertex positions in model space
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Per-vertex normals
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Per-vertex texture coordinates
    pub fn tex_coords(&self) -> &[Vec2] {
        &self.tex_coords
    }

    /// Triangle list indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Per-face unit normals (zero for degenerate faces)
    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    /// Per-face centroids
    pub fn face_centers(&self) -> &[Vec3] {
        &self.face_centers
    }

    /// Model-space bounding box
    pub fn local_aabb(&self) -> &Aabb {
        &self.local_aabb
    }

    /// Model-space sphere enclosing the local box
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    /// Where the geometry came from
    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    /// Record the geometry origin
    pub fn set_source(&mut self, source: MeshSource) {
        self.source = source;
    }

    /// Renderer buffers, if uploaded
    pub fn buffers(&self) -> Option<MeshBuffers> {
        self.buffers
    }

    /// Attach renderer buffers
    pub fn set_buffers(&mut self, buffers: Option<MeshBuffers>) {
        self.buffers = buffers;
    }

    /// Triangles in model space
    ///
    /// Triangles referencing a vertex that does not exist are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(|face| {
            let a = self.vertices.get(face[0] as usize)?;
            let b = self.vertices.get(face[1] as usize)?;
            let c = self.vertices.get(face[2] as usize)?;
            Some(Triangle::new(*a, *b, *c))
        })
    }

    /// Recompute per-face normals and centers from the triangles
    pub fn compute_face_normals(&mut self) {
        let skipped = self.triangle_count() - self.triangles().count();
        if skipped > 0 {
            log::warn!("Skipped {} faces with out-of-range vertex indices", skipped);
        }
        let (normals, centers) = self
            .triangles()
            .map(|triangle| (triangle.normal(), triangle.centroid()))
            .unzip();
        self.face_normals = normals;
        self.face_centers = centers;
    }

    /// Recompute the local AABB and bounding sphere from the vertices
    ///
    /// A mesh without vertices gets a degenerate box at the origin.
    pub fn generate_local_bounds(&mut self) {
        self.local_aabb = Aabb::from_points(&self.vertices).unwrap_or_else(|| {
            log::warn!("Generating bounds for a mesh without vertices");
            Aabb::default()
        });
        self.bounding_sphere = BoundingSphere::enclosing_aabb(&self.local_aabb);
    }

    /// World-space OBB (local box under `world`) and the AABB enclosing it
    pub fn world_bounds(&self, world: &Mat4) -> (Obb, Aabb) {
        let obb = Obb::from_transformed_aabb(&self.local_aabb, world);
        let mut aabb = Aabb::empty();
        aabb.enclose_obb(&obb);
        (obb, aabb)
    }

    /// Bounding sphere center in world space
    pub fn center_in_world(&self, world: &Mat4) -> Vec3 {
        transform_point(world, &self.bounding_sphere.center)
    }

    /// Bounding sphere radius scaled by the largest axis scale of `world`
    pub fn radius_in_world(&self, world: &Mat4) -> f32 {
        let scale = (0..3)
            .map(|axis| world.fixed_view::<3, 1>(0, axis).magnitude())
            .fold(0.0_f32, f32::max);
        self.bounding_sphere.radius * scale
    }

    /// World-space line segments for the enabled normal overlays
    pub fn normal_lines(&self, world: &Mat4) -> Vec<(Vec3, Vec3, bool)> {
        let mut lines = Vec::new();
        let rotate = |normal: &Vec3| {
            normalize_or(&(world.fixed_view::<3, 3>(0, 0) * normal), Vec3::zeros())
        };
        if self.flags.contains(MeshDrawFlags::FACE_NORMALS) {
            for (center, normal) in self.face_centers.iter().zip(&self.face_normals) {
                let start = transform_point(world, center);
                lines.push((start, start + rotate(normal) * self.normal_scale, true));
            }
        }
        if self.flags.contains(MeshDrawFlags::VERTEX_NORMALS) {
            for (vertex, normal) in self.vertices.iter().zip(&self.normals) {
                let start = transform_point(world, vertex);
                lines.push((start, start + rotate(normal) * self.normal_scale, false));
            }
        }
        lines
    }

    /// Per-frame work: visibility test, then the draw command and overlays
    ///
    /// Nothing is emitted when the node has no world bounds yet or when its
    /// world AABB is outside the culling frustum.
    pub fn update(&self, frame: &NodeFrame<'_>, ctx: &mut FrameContext<'_>) {
        let Some(bounds) = frame.bounds else {
            return;
        };
        if let Some(frustum) = ctx.culling {
            if !frustum.is_visible(&bounds.aabb) {
                log::trace!("Culled mesh of {:?}", frame.object_id);
                ctx.draw_list.record_culled();
                return;
            }
        }

        ctx.draw_list.push_command(DrawCommand {
            node: frame.node,
            object_id: frame.object_id,
            world_matrix: *frame.world_matrix,
            buffers: self.buffers,
            index_count: self.indices.len(),
            wireframe: self.flags.contains(MeshDrawFlags::WIREFRAME),
            texture_id: frame.texture_id,
            selected: frame.selected,
        });

        if self.flags.contains(MeshDrawFlags::AABB) {
            ctx.draw_list.push_box(&bounds.aabb.corners(), AABB_COLOR);
        }
        if self.flags.contains(MeshDrawFlags::OBB) {
            ctx.draw_list.push_box(&bounds.obb.corners(), OBB_COLOR);
        }
        for (start, end, per_face) in self.normal_lines(frame.world_matrix) {
            let color = if per_face { FACE_NORMAL_COLOR } else { VERTEX_NORMAL_COLOR };
            ctx.draw_list.push_line(start, end, color);
        }
    }
}
