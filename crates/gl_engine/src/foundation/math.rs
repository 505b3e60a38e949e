//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics. All matrices follow the
//! OpenGL conventions: right-handed view space, clip-space depth in [-1, 1].

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

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Mat4, Vec3};

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

    /// Upper-left 3x3 block of a 4x4 matrix
    pub fn upper_left_3x3(matrix: &Mat4) -> Mat3 {
        matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Normalize a vector, returning `fallback` for (near) zero-length input
    pub fn normalize_or(vector: Vec3, fallback: Vec3) -> Vec3 {
        vector.try_normalize(1.0e-6).unwrap_or(fallback)
    }

    /// Inverse of `matrix`, or identity when it is singular
    pub fn inverse_or_identity(matrix: &Mat4) -> Mat4 {
        matrix.try_inverse().unwrap_or_else(Mat4::identity)
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// OpenGL perspective projection; `fov_y` in radians
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// OpenGL orthographic projection
    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Copy of the matrix with the translation column cleared
    fn without_translation(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_orthographic(left, right, bottom, top, near, far)
    }

    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn without_translation(&self) -> Mat4 {
        let mut result = utils::upper_left_3x3(self).to_homogeneous();
        result[(3, 3)] = 1.0;
        result
    }
}
