//! Hierarchical transform component
//!
//! Holds a node's local SRT, the cached local and world matrices and the
//! local basis vectors. Mutations only mark the component dirty; matrices
//! are rebuilt by [`TransformComponent::update`] during the propagation pass.
//!
//! Children are never touched directly when a parent moves. The parent's
//! owner calls [`TransformComponent::notify_parent_moved`] on each child and
//! the child recomputes its world matrix against the then-current parent
//! matrix on its own update.

use crate::foundation::math::{
    euler_xyz_from_rotation, normalize_or, quat_from_euler_xyz, Mat4, Mat4Ext, Quat, Transform, Vec3,
};

/// Local and world placement of a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    /// Last Euler angles (radians) handed to `set_rotation_euler`
    euler_rotation: Vec3,

    local_matrix: Mat4,
    world_matrix: Mat4,

    right: Vec3,
    up: Vec3,
    front: Vec3,

    dirty: bool,
    parent_moved: bool,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformComponent {
    /// Identity transform
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            euler_rotation: Vec3::zeros(),
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            right: Vec3::x(),
            up: Vec3::y(),
            front: Vec3::z(),
            dirty: false,
            parent_moved: false,
        }
    }

    /// Transform starting from the given SRT, pending its first update
    pub fn from_transform(transform: &Transform) -> Self {
        let mut component = Self::new();
        component.position = transform.position;
        component.rotation = transform.rotation;
        component.scale = transform.scale;
        component.euler_rotation =
            euler_xyz_from_rotation(transform.rotation.to_rotation_matrix().matrix());
        component.dirty = true;
        component
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Cached Euler angles in radians
    ///
    /// Only kept in step by `set_rotation_euler` and re-attachment;
    /// `set_rotation` leaves it stale.
    pub fn euler_rotation(&self) -> Vec3 {
        self.euler_rotation
    }

    /// Local SRT as a plain value
    pub fn local_transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.scale)
    }

    /// Local matrix as of the last update
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    /// World matrix as of the last update
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Translation part of the world matrix
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation_part()
    }

    /// Local X basis vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Local Y basis vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Local Z basis vector
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Whether the local SRT changed since the last update
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a world refresh is pending
    pub fn needs_update(&self) -> bool {
        self.dirty || self.parent_moved
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Rotate to new Euler angles (radians, XYZ order)
    ///
    /// The change relative to the cached angles is applied as a delta on
    /// the right of the stored quaternion, so rotations set through other
    /// paths are preserved and compounded rather than overwritten.
    pub fn set_rotation_euler(&mut self, euler: Vec3) {
        let delta = quat_from_euler_xyz(euler - self.euler_rotation);
        self.rotation *= delta;
        self.euler_rotation = euler;
        self.dirty = true;
    }

    /// Set the local rotation directly; the Euler cache is left untouched
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Mark the world matrix stale because an ancestor moved
    pub fn notify_parent_moved(&mut self) {
        self.parent_moved = true;
    }

    /// Bring matrices up to date
    ///
    /// `parent_world` is `None` for the root. Returns whether the world
    /// matrix was recomputed, in which case the caller regenerates bounds
    /// and notifies children.
    pub fn update(&mut self, parent_world: Option<&Mat4>) -> bool {
        if self.dirty {
            self.rebuild_local();
        }
        if self.dirty || self.parent_moved {
            self.recompute_world(parent_world);
            self.dirty = false;
            self.parent_moved = false;
            return true;
        }
        false
    }

    /// Recompute the world matrix only, from the current parent matrix
    pub fn on_parent_moved(&mut self, parent_world: Option<&Mat4>) {
        self.recompute_world(parent_world);
        self.parent_moved = false;
    }

    /// Re-express the current world pose relative to a new parent
    ///
    /// `local = inverse(new_parent_world) * world`, decomposed back into
    /// position, rotation and scale. `None` stands for the root, whose
    /// frame is the identity. The world matrix does not change.
    pub fn reparent_preserve_world(&mut self, new_parent_world: Option<&Mat4>) {
        if self.dirty {
            // Pending local edits count as part of the pose being preserved
            self.rebuild_local();
        }
        let local = match new_parent_world {
            Some(parent) => match parent.try_inverse() {
                Some(inverse) => inverse * self.world_matrix,
                None => {
                    log::warn!("Parent world matrix is not invertible, keeping world as local");
                    self.world_matrix
                }
            },
            None => self.world_matrix,
        };

        let decomposed = Transform::from_matrix(&local);
        self.position = decomposed.position;
        self.rotation = decomposed.rotation;
        self.scale = decomposed.scale;
        self.euler_rotation = euler_xyz_from_rotation(decomposed.rotation.to_rotation_matrix().matrix());

        self.local_matrix = local;
        self.update_basis();
        self.dirty = false;
        self.parent_moved = true;
    }

    fn rebuild_local(&mut self) {
        self.local_matrix = self.local_transform().to_matrix();
        self.update_basis();
    }

    fn update_basis(&mut self) {
        self.right = normalize_or(&self.local_matrix.column3(0), Vec3::x());
        self.up = normalize_or(&self.local_matrix.column3(1), Vec3::y());
        self.front = normalize_or(&self.local_matrix.column3(2), Vec3::z());
    }

    fn recompute_world(&mut self, parent_world: Option<&Mat4>) {
        self.world_matrix = match parent_world {
            Some(parent) => parent * self.local_matrix,
            None => self.local_matrix,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::transform_point;
    use approx::assert_relative_eq;

    #[test]
    fn test_update_builds_local_and_world() {
        let mut transform = TransformComponent::new();
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.is_dirty());

        assert!(transform.update(None));
        assert!(!transform.is_dirty());
        assert_relative_eq!(transform.world_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.world_matrix(), transform.local_matrix());

        // Clean transform does nothing
        assert!(!transform.update(None));
    }

    #[test]
    fn test_world_is_parent_times_local() {
        let parent_world = Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0)) * Mat4::new_scaling(2.0);
        let mut child = TransformComponent::new();
        child.set_position(Vec3::new(1.0, 1.0, 0.0));
        child.update(Some(&parent_world));

        assert_relative_eq!(*child.world_matrix(), parent_world * child.local_matrix(), epsilon = 1e-6);
        assert_relative_eq!(child.world_position(), Vec3::new(12.0, 2.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_parent_moved_recomputes_world_only() {
        let mut child = TransformComponent::new();
        child.set_position(Vec3::new(0.0, 1.0, 0.0));
        child.update(None);

        child.notify_parent_moved();
        assert!(child.needs_update());
        let moved = Mat4::new_translation(&Vec3::new(0.0, 0.0, 5.0));
        assert!(child.update(Some(&moved)));
        assert_relative_eq!(child.world_position(), Vec3::new(0.0, 1.0, 5.0));
        assert_relative_eq!(child.position(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_euler_delta_accumulates_on_quaternion() {
        let mut transform = TransformComponent::new();
        let preset = quat_from_euler_xyz(Vec3::new(0.0, 0.5, 0.0));
        transform.set_rotation(preset);

        // Cache is still zero, so the whole new angle becomes the delta
        transform.set_rotation_euler(Vec3::new(0.3, 0.0, 0.0));
        let expected = preset * quat_from_euler_xyz(Vec3::new(0.3, 0.0, 0.0));
        assert_relative_eq!(transform.rotation().coords, expected.coords, epsilon = 1e-6);

        // Only the difference to the cached angles is applied
        transform.set_rotation_euler(Vec3::new(0.5, 0.0, 0.0));
        let expected = expected * quat_from_euler_xyz(Vec3::new(0.2, 0.0, 0.0));
        assert_relative_eq!(transform.rotation().coords, expected.coords, epsilon = 1e-5);
        assert_relative_eq!(transform.euler_rotation(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_reparent_preserves_world() {
        let mut child = TransformComponent::new();
        child.set_position(Vec3::new(4.0, -2.0, 1.0));
        child.set_rotation_euler(Vec3::new(0.2, 0.7, -0.4));
        child.set_scale(Vec3::new(1.5, 1.5, 1.5));
        child.update(None);
        let world_before = *child.world_matrix();

        let parent_world = Transform::new(
            Vec3::new(-3.0, 5.0, 2.0),
            quat_from_euler_xyz(Vec3::new(0.0, 1.2, 0.3)),
            Vec3::new(2.0, 2.0, 2.0),
        )
        .to_matrix();
        child.reparent_preserve_world(Some(&parent_world));
        child.update(Some(&parent_world));

        assert_relative_eq!(*child.world_matrix(), world_before, epsilon = 1e-4);
        assert_relative_eq!(child.scale(), Vec3::new(0.75, 0.75, 0.75), epsilon = 1e-5);

        // Local SRT rebuilt from the decomposition reproduces the same pose
        let rebuilt = parent_world * child.local_transform().to_matrix();
        let probe = Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(
            transform_point(&rebuilt, &probe),
            transform_point(&world_before, &probe),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_singular_parent_falls_back_to_identity() {
        let mut child = TransformComponent::new();
        child.set_position(Vec3::new(1.0, 0.0, 0.0));
        child.update(None);

        child.reparent_preserve_world(Some(&Mat4::zeros()));
        assert_relative_eq!(child.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_scale_keeps_finite_basis() {
        let mut transform = TransformComponent::new();
        transform.set_scale(Vec3::zeros());
        transform.update(None);

        assert_relative_eq!(transform.right(), Vec3::x());
        assert_relative_eq!(transform.up(), Vec3::y());
        assert_relative_eq!(transform.front(), Vec3::z());
    }
}
