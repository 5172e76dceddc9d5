//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph: nalgebra
//! aliases, an SRT transform with matrix composition/decomposition, Euler
//! helpers for the XYZ convention used by the editor, and projection helpers.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Scale components below this magnitude are treated as collapsed
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from full SRT components
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Convert to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Decompose an affine matrix into position, rotation and scale
    ///
    /// A collapsed axis (zero scale) cannot carry rotation information; the
    /// canonical axis is substituted for it so the result stays finite, and
    /// a warning is logged. Mirroring matrices put the sign on the X scale.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let mut columns = [
            Vec3::new(matrix.m11, matrix.m21, matrix.m31),
            Vec3::new(matrix.m12, matrix.m22, matrix.m32),
            Vec3::new(matrix.m13, matrix.m23, matrix.m33),
        ];
        let mut scale = Vec3::new(
            columns[0].magnitude(),
            columns[1].magnitude(),
            columns[2].magnitude(),
        );

        let mut degenerate = false;
        for (axis, column) in columns.iter_mut().enumerate() {
            if scale[axis] < DEGENERATE_EPSILON {
                degenerate = true;
                *column = Vec3::ith(axis, 1.0);
            } else {
                *column /= scale[axis];
            }
        }
        if degenerate {
            log::warn!("Decomposing matrix with collapsed scale {:?}", scale);
        }

        let mut rotation_matrix = Mat3::from_columns(&columns);
        if rotation_matrix.determinant() < 0.0 {
            scale.x = -scale.x;
            rotation_matrix.set_column(0, &(-columns[0]));
        }
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// Build a quaternion from XYZ Euler angles (radians), `Rx * Ry * Rz`
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
    Quat::from_axis_angle(&Vec3::x_axis(), euler.x)
        * Quat::from_axis_angle(&Vec3::y_axis(), euler.y)
        * Quat::from_axis_angle(&Vec3::z_axis(), euler.z)
}

/// Extract XYZ Euler angles (radians) from a rotation matrix built as `Rx * Ry * Rz`
pub fn euler_xyz_from_rotation(rotation: &Mat3) -> Vec3 {
    let sin_y = rotation.m13.clamp(-1.0, 1.0);
    let y = sin_y.asin();
    if sin_y.abs() < 0.999_999 {
        let x = (-rotation.m23).atan2(rotation.m33);
        let z = (-rotation.m12).atan2(rotation.m11);
        Vec3::new(x, y, z)
    } else {
        // Gimbal lock: fold Z into X
        let x = rotation.m32.atan2(rotation.m22);
        Vec3::new(x, y, 0.0)
    }
}

/// Transform a point by an affine matrix
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Normalize or fall back to the given vector when the input has no length
pub fn normalize_or(vector: &Vec3, fallback: Vec3) -> Vec3 {
    vector.try_normalize(DEGENERATE_EPSILON).unwrap_or(fallback)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a right-handed perspective projection with clip depth in [-1, 1]
    ///
    /// Returns `None` for parameters that cannot form a projection
    /// (non-positive aspect or FOV, or coincident clip planes).
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Option<Mat4>;

    /// Create a right-handed look-at view matrix along a direction
    fn look_to(eye: Vec3, direction: Vec3, up: Vec3) -> Mat4;

    /// Translation part of an affine matrix
    fn translation_part(&self) -> Vec3;

    /// One of the first three columns as a 3D vector
    fn column3(&self, index: usize) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Option<Mat4> {
        if fov_y <= 0.0 || aspect <= 0.0 || (far - near).abs() < DEGENERATE_EPSILON {
            return None;
        }
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;
        Some(result)
    }

    fn look_to(eye: Vec3, direction: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(eye + direction), &up)
    }

    fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }

    fn column3(&self, index: usize) -> Vec3 {
        self.fixed_view::<3, 1>(0, index).into_owned()
    }
}
