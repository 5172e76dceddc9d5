//! Bounding volumes
//!
//! Axis-aligned boxes, oriented boxes and spheres. Meshes keep their bounds
//! in model space; nodes keep the world-space OBB and the AABB enclosing it.
//!
//! Corners of both box types are indexed the same way: bit 2 selects the X
//! extreme, bit 1 the Y extreme and bit 0 the Z extreme (0 = min side).

use serde::{Deserialize, Serialize};

use crate::foundation::math::{transform_point, Mat4, Mat4Ext, Vec3};
use crate::physics::LineSegment;

/// Corner index pairs forming the twelve edges of a box
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 2), (2, 6), (6, 4), (4, 0),
    (0, 1), (1, 3), (3, 2), (4, 5),
    (6, 7), (5, 7), (3, 7), (1, 5),
];

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that encloses nothing; grows with `enclose_point`
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut aabb = Self::empty();
        for point in points {
            aabb.enclose_point(point);
        }
        (!aabb.is_empty()).then_some(aabb)
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Whether the box is still inverted (encloses nothing)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain a point
    pub fn enclose_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to contain an oriented box
    pub fn enclose_obb(&mut self, obb: &Obb) {
        let extents = obb.aabb_extents();
        self.enclose_point(&(obb.center - extents));
        self.enclose_point(&(obb.center + extents));
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Length of the diagonal from `min` to `max`
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).magnitude()
    }

    /// Corner by index, see the module docs for the ordering
    pub fn corner(&self, index: usize) -> Vec3 {
        Vec3::new(
            if index & 4 == 0 { self.min.x } else { self.max.x },
            if index & 2 == 0 { self.min.y } else { self.max.y },
            if index & 1 == 0 { self.min.z } else { self.max.z },
        )
    }

    /// All eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Slab test against a segment
    ///
    /// Returns the entry and exit parameters, both clamped to `[0, 1]`
    /// along the segment, or `None` when the segment misses the box.
    pub fn intersect_segment(&self, segment: &LineSegment) -> Option<(f32, f32)> {
        let origin = segment.a;
        let direction = segment.direction();

        let mut t_near = 0.0_f32;
        let mut t_far = 1.0_f32;
        for axis in 0..3 {
            if direction[axis].abs() < f32::EPSILON {
                // Parallel to this slab: must already be inside it
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t1 = (self.min[axis] - origin[axis]) * inv;
            let mut t2 = (self.max[axis] - origin[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }
        Some((t_near, t_far))
    }
}

/// Oriented bounding box
///
/// Stored as a center and three half-axes (direction times half extent),
/// which represents any affine image of a box exactly, shear included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obb {
    /// Center of the box
    pub center: Vec3,
    /// Half-extent vectors along the box's local X, Y and Z
    pub half_axes: [Vec3; 3],
}

impl Default for Obb {
    fn default() -> Self {
        Self::from_aabb(&Aabb::default())
    }
}

impl Obb {
    /// Axis-aligned OBB covering the same volume as `aabb`
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let extents = aabb.extents();
        Self {
            center: aabb.center(),
            half_axes: [
                Vec3::x() * extents.x,
                Vec3::y() * extents.y,
                Vec3::z() * extents.z,
            ],
        }
    }

    /// The image of `aabb` under an affine `matrix`
    pub fn from_transformed_aabb(aabb: &Aabb, matrix: &Mat4) -> Self {
        let extents = aabb.extents();
        Self {
            center: transform_point(matrix, &aabb.center()),
            half_axes: [
                matrix.column3(0) * extents.x,
                matrix.column3(1) * extents.y,
                matrix.column3(2) * extents.z,
            ],
        }
    }

    /// Corner by index, same ordering as [`Aabb::corner`]
    pub fn corner(&self, index: usize) -> Vec3 {
        let sign = |bit: usize| if index & bit == 0 { -1.0_f32 } else { 1.0 };
        self.center
            + self.half_axes[0] * sign(4)
            + self.half_axes[1] * sign(2)
            + self.half_axes[2] * sign(1)
    }

    /// All eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }

    /// Half-size of the smallest AABB enclosing this box
    pub fn aabb_extents(&self) -> Vec3 {
        self.half_axes[0].abs() + self.half_axes[1].abs() + self.half_axes[2].abs()
    }

    /// Smallest AABB enclosing this box
    pub fn enclosing_aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, self.aabb_extents())
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere
    pub radius: f32,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::new(Vec3::zeros(), 0.0)
    }
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere enclosing a box: box center, half the diagonal
    pub fn enclosing_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.diagonal() * 0.5,
        }
    }

    /// Check if the sphere contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).magnitude() <= self.radius
    }
}
