//! Perspective camera and the camera component
//!
//! The camera keeps an explicit basis (`front`, `up`, `right`) instead of
//! Euler angles; controllers rotate the basis and call
//! [`Camera::calculate_view_matrix`] afterwards. Projection parameters only
//! mark the projection dirty, and the next view recalculation rebuilds it.
//!
//! `right` follows the editor convention `right = up x front`, which is the
//! screen-left direction of the right-handed view matrix.

use crate::config::CameraSettings;
use crate::foundation::math::{normalize_or, utils::deg_to_rad, Mat4, Mat4Ext, Vec3, Vec4};
use crate::physics::LineSegment;
use crate::scene::component::FrameContext;
use crate::scene::frustum::Frustum;
use crate::scene::render_queue::FRUSTUM_COLOR;

/// Default vertical field of view in degrees
pub const DEFAULT_VERTICAL_FOV: f32 = 60.0;

/// Default near clip distance
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far clip distance
pub const DEFAULT_FAR: f32 = 250.0;

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    reference: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,

    vertical_fov: f32,
    horizontal_fov: f32,
    near: f32,
    far: f32,
    aspect_ratio: f32,

    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    projection_dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::zeros())
    }
}

impl Camera {
    /// Camera at `position` looking down +Z with default projection
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            reference: position + Vec3::z(),
            front: Vec3::z(),
            up: Vec3::y(),
            right: Vec3::x(),
            vertical_fov: DEFAULT_VERTICAL_FOV,
            horizontal_fov: 0.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            aspect_ratio: 1.0,
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            frustum: Frustum::from_view_projection(&Mat4::identity()),
            projection_dirty: true,
        };
        camera.calculate_view_matrix();
        camera
    }

    /// Camera placed and configured from editor settings
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let mut camera = Self::new(settings.position());
        camera.vertical_fov = settings.vertical_fov_degrees;
        camera.near = settings.near;
        camera.far = settings.far;
        camera.aspect_ratio = settings.aspect_ratio;
        camera.projection_dirty = true;
        camera.look_at(settings.look_at());
        camera
    }

    /// Camera position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Last look-at target
    pub fn reference(&self) -> Vec3 {
        self.reference
    }

    /// Viewing direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Up direction
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Side direction (`up x front`)
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Vertical field of view in degrees
    pub fn vertical_fov(&self) -> f32 {
        self.vertical_fov
    }

    /// Horizontal field of view in radians, as of the last projection rebuild
    pub fn horizontal_fov(&self) -> f32 {
        self.horizontal_fov
    }

    /// Near clip distance
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clip distance
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Whether projection parameters changed since the last rebuild
    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    /// View matrix
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Projection times view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum planes as of the last view recalculation
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Move the camera and refresh the view
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.calculate_view_matrix();
    }

    /// Set the vertical field of view in degrees
    pub fn set_vertical_fov(&mut self, degrees: f32) {
        self.vertical_fov = degrees;
        self.projection_dirty = true;
    }

    /// Set the near clip distance
    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.projection_dirty = true;
    }

    /// Set the far clip distance
    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.projection_dirty = true;
    }

    /// Set the viewport aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.projection_dirty = true;
    }

    /// Replace the basis directly; it is re-orthonormalized
    pub fn set_orientation(&mut self, front: Vec3, up: Vec3) {
        self.front = front;
        self.up = up;
        self.calculate_view_matrix();
    }

    /// Turn the camera toward `target`
    ///
    /// `front = normalize(target - position)`, `right = normalize(Y x front)`,
    /// `up = front x right`. Looking straight up or down keeps the previous
    /// side vector.
    pub fn look_at(&mut self, target: Vec3) {
        self.reference = target;

        let Some(front) = (target - self.position).try_normalize(f32::EPSILON) else {
            log::warn!("Camera asked to look at its own position {:?}", target);
            return;
        };
        self.front = front;
        self.right = normalize_or(&Vec3::y().cross(&self.front), self.right);
        self.up = self.front.cross(&self.right);

        self.calculate_view_matrix();
    }

    /// Rebuild projection if dirty, re-orthonormalize the basis and the view
    pub fn calculate_view_matrix(&mut self) {
        if self.projection_dirty {
            self.recalculate_projection();
        }

        self.front = normalize_or(&self.front, Vec3::z());
        let up = self.up - self.front * self.up.dot(&self.front);
        self.up = normalize_or(&up, Vec3::y());
        self.right = self.up.cross(&self.front);

        self.view_matrix = Mat4::look_to(self.position, self.front, self.up);
        self.frustum = Frustum::from_view_projection(&self.view_projection());
    }

    /// Rebuild the projection matrix and horizontal field of view
    pub fn recalculate_projection(&mut self) {
        let vertical = deg_to_rad(self.vertical_fov);
        self.horizontal_fov = 2.0 * ((vertical * 0.5).tan() * self.aspect_ratio).atan();

        match Mat4::perspective(vertical, self.aspect_ratio, self.near, self.far) {
            Some(projection) => self.projection_matrix = projection,
            None => log::warn!(
                "Ignoring degenerate projection (fov {}, aspect {}, near {}, far {})",
                self.vertical_fov,
                self.aspect_ratio,
                self.near,
                self.far
            ),
        }
        self.projection_dirty = false;
        log::trace!(
            "Camera projection rebuilt: vfov {} deg, hfov {} rad",
            self.vertical_fov,
            self.horizontal_fov
        );
    }

    /// World-space segment from the near plane to the far plane through `(ndc_x, ndc_y)`
    ///
    /// `None` when the view-projection cannot be inverted.
    pub fn unproject_line_segment(&self, ndc_x: f32, ndc_y: f32) -> Option<LineSegment> {
        let inverse = self.view_projection().try_inverse()?;
        let near = unproject(&inverse, Vec4::new(ndc_x, ndc_y, -1.0, 1.0))?;
        let far = unproject(&inverse, Vec4::new(ndc_x, ndc_y, 1.0, 1.0))?;
        Some(LineSegment::new(near, far))
    }

    /// World-space frustum corners, indexed like box corners (bit 0 = far)
    pub fn frustum_corners(&self) -> Option<[Vec3; 8]> {
        let inverse = self.view_projection().try_inverse()?;
        let mut corners = [Vec3::zeros(); 8];
        for (index, corner) in corners.iter_mut().enumerate() {
            let ndc = |bit: usize| if index & bit == 0 { -1.0_f32 } else { 1.0 };
            *corner = unproject(&inverse, Vec4::new(ndc(4), ndc(2), ndc(1), 1.0))?;
        }
        Some(corners)
    }
}

fn unproject(inverse_view_projection: &Mat4, clip: Vec4) -> Option<Vec3> {
    let world = inverse_view_projection * clip;
    if world.w.abs() < f32::EPSILON {
        return None;
    }
    Some(world.xyz() / world.w)
}

/// Default placement of a camera attached to a scene node
pub const DEFAULT_GAME_CAMERA_POSITION: [f32; 3] = [0.0, 15.0, -60.0];

/// Camera attached to a scene node
///
/// Follows the node's world position whenever the node's world matrix
/// changes; orientation stays under the camera's own control.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    camera: Camera,
    draw_frustum: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraComponent {
    /// Game camera at the default placement, looking at the origin
    pub fn new() -> Self {
        let mut camera = Camera::new(Vec3::from(DEFAULT_GAME_CAMERA_POSITION));
        camera.look_at(Vec3::zeros());
        Self {
            camera,
            draw_frustum: true,
        }
    }

    /// Wrap an existing camera
    pub fn from_camera(camera: Camera) -> Self {
        Self {
            camera,
            draw_frustum: true,
        }
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Whether the frustum outline is emitted as debug lines
    pub fn draw_frustum(&self) -> bool {
        self.draw_frustum
    }

    /// Toggle the frustum outline
    pub fn set_draw_frustum(&mut self, draw: bool) {
        self.draw_frustum = draw;
    }

    /// Move the camera to the node's world position
    pub fn follow(&mut self, world_matrix: &Mat4) {
        self.camera.set_position(world_matrix.translation_part());
    }

    /// Per-frame work: outline the frustum when enabled
    pub fn update(&self, ctx: &mut FrameContext<'_>) {
        if !self.draw_frustum {
            return;
        }
        if let Some(corners) = self.camera.frustum_corners() {
            ctx.draw_list.push_box(&corners, FRUSTUM_COLOR);
        }
    }
}
