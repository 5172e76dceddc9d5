//! View frustum and visibility test

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::scene::bounds::Aabb;

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized, zero for a degenerate plane)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self::from_coefficients(Vec4::new(normal.x, normal.y, normal.z, distance))
    }

    /// Build from `(a, b, c, d)` of `ax + by + cz + d = 0`, normalizing
    ///
    /// A zero normal yields a plane with zero distance everywhere, which
    /// never rejects anything.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.magnitude();
        if length < f32::EPSILON {
            log::warn!("Degenerate frustum plane {:?}", coefficients);
            return Self { normal: Vec3::zeros(), distance: 0.0 };
        }
        Self {
            normal: normal / length,
            distance: coefficients.w / length,
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Index of each plane in [`Frustum::planes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumSide {
    /// Left clip plane
    Left = 0,
    /// Right clip plane
    Right = 1,
    /// Bottom clip plane
    Bottom = 2,
    /// Top clip plane
    Top = 3,
    /// Near clip plane
    Near = 4,
    /// Far clip plane
    Far = 5,
}

/// Frustum for visibility culling
///
/// Plane normals point inward: a point is inside when its distance to
/// every plane is non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for clip space with depth in [-1, 1].
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let row = |i: usize| view_projection.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Plane on the given side
    pub fn plane(&self, side: FrustumSide) -> &Plane {
        &self.planes[side as usize]
    }

    /// Check whether a point lies inside all six planes
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Conservative box visibility
    ///
    /// The box is culled only when all eight corners lie behind one single
    /// plane. Boxes straddling a frustum edge may be reported visible.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        let corners = aabb.corners();
        !self.planes.iter().any(|plane| {
            corners.iter().all(|corner| plane.distance_to_point(corner) < 0.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils::deg_to_rad, Mat4Ext};
    use approx::assert_relative_eq;

    fn looking_down_negative_z() -> Frustum {
        let projection = Mat4::perspective(deg_to_rad(90.0), 1.0, 1.0, 100.0).unwrap();
        let view = Mat4::look_to(Vec3::zeros(), -Vec3::z(), Vec3::y());
        Frustum::from_view_projection(&(projection * view))
    }

    #[test]
    fn test_planes_point_inward() {
        let frustum = looking_down_negative_z();
        assert!(frustum.contains_point(&Vec3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, -200.0)));

        let near = frustum.plane(FrustumSide::Near);
        assert_relative_eq!(near.normal, -Vec3::z(), epsilon = 1e-5);
        assert_relative_eq!(near.distance_to_point(&Vec3::new(0.0, 0.0, -1.0)), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_box_in_front_is_visible() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -20.0), Vec3::repeat(1.0));
        assert!(frustum.is_visible(&aabb));
    }

    #[test]
    fn test_box_behind_camera_is_culled() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::from_center_extents(Vec3::new(0.0, 0.0, 20.0), Vec3::repeat(1.0));
        assert!(!frustum.is_visible(&aabb));
    }

    #[test]
    fn test_straddling_box_is_visible() {
        let frustum = looking_down_negative_z();
        // Half inside the left edge of the 90 degree frustum at depth 10
        let aabb = Aabb::from_center_extents(Vec3::new(-10.0, 0.0, -10.0), Vec3::repeat(1.0));
        assert!(frustum.is_visible(&aabb));
    }

    #[test]
    fn test_degenerate_plane_never_rejects() {
        let plane = Plane::from_coefficients(Vec4::zeros());
        assert_relative_eq!(plane.distance_to_point(&Vec3::new(5.0, -3.0, 1.0)), 0.0);
    }
}
