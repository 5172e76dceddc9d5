//! Primitive query shapes and intersection algorithms

use crate::foundation::math::{normalize_or, transform_point, Mat4, Vec3};

/// Determinant threshold below which a direction is treated as parallel
const PARALLEL_EPSILON: f32 = 0.000001;

/// A half-infinite ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// A zero direction falls back to -Z.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalize_or(&direction, -Vec3::z()),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A finite segment from `a` to `b`
///
/// Picking works on segments rather than rays: intersection parameters are
/// expressed in `[0, 1]` along the segment, so they stay comparable after
/// the segment has been moved into differently scaled model spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start point (near plane for picking segments)
    pub a: Vec3,
    /// End point (far plane for picking segments)
    pub b: Vec3,
}

impl LineSegment {
    /// Creates a segment between two points
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// Unnormalized direction `b - a`
    pub fn direction(&self) -> Vec3 {
        self.b - self.a
    }

    /// Length of the segment
    pub fn length(&self) -> f32 {
        self.direction().magnitude()
    }

    /// Point at parameter `t` (0 = a, 1 = b)
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.a + self.direction() * t
    }

    /// A copy of this segment with both endpoints transformed by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            a: transform_point(matrix, &self.a),
            b: transform_point(matrix, &self.b),
        }
    }

    /// Ray starting at `a` heading toward `b`
    pub fn to_ray(&self) -> Ray {
        Ray::new(self.a, self.direction())
    }
}

/// A triangle for intersection tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Normal of the triangle (right-hand rule); zero for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        normalize_or(&edge1.cross(&edge2), Vec3::zeros())
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Intersect a ray; returns the distance along the ray
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        self.moller_trumbore(&ray.origin, &ray.direction)
            .map(|(t, _, _)| t)
    }

    /// Intersect a segment; returns the hit parameter in `[0, 1]`
    pub fn intersect_segment(&self, segment: &LineSegment) -> Option<f32> {
        self.moller_trumbore(&segment.a, &segment.direction())
            .and_then(|(t, _, _)| (t <= 1.0).then_some(t))
    }

    /// Möller-Trumbore intersection returning `(t, u, v)` with `t >= 0`
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    fn moller_trumbore(&self, origin: &Vec3, direction: &Vec3) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Parallel or degenerate
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t >= 0.0).then_some((t, u, v))
    }
}
