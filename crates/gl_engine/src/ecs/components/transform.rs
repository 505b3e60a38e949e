//! Transform component
//!
//! Rotation is stored as Euler angles in degrees and applied X, then Y, then Z
//! in matrix order: `world = T * Rx * Ry * Rz * S`.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Quat, Vec3, Vec4};

/// Position, Euler rotation (degrees) and scale of a game object
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform from all three parts
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: set Euler rotation in degrees
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: set a uniform scale
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::new(scale, scale, scale))
    }

    /// Rotation part only, `Rx * Ry * Rz`
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_x(utils::deg_to_rad(self.rotation.x))
            * Mat4::rotation_y(utils::deg_to_rad(self.rotation.y))
            * Mat4::rotation_z(utils::deg_to_rad(self.rotation.z))
    }

    /// Same rotation as a quaternion
    pub fn rotation_quaternion(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(self.rotation.x))
            * Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(self.rotation.y))
            * Quat::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(self.rotation.z))
    }

    /// Local-to-world matrix
    pub fn local_to_world(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation_matrix()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// World-space direction of the local -Z axis
    pub fn forward(&self) -> Vec3 {
        self.world_axis(Vec3::new(0.0, 0.0, -1.0))
    }

    /// World-space direction of the local +X axis
    pub fn right(&self) -> Vec3 {
        self.world_axis(Vec3::new(1.0, 0.0, 0.0))
    }

    /// World-space direction of the local +Y axis
    pub fn up(&self) -> Vec3 {
        self.world_axis(Vec3::new(0.0, 1.0, 0.0))
    }

    fn world_axis(&self, axis: Vec3) -> Vec3 {
        let rotated = self.rotation_matrix() * Vec4::new(axis.x, axis.y, axis.z, 0.0);
        utils::normalize_or(rotated.xyz(), axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translation_column_equals_position() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, -2.0, 3.25),
            Vec3::new(-100.0, 0.001, 42.0),
        ];
        for position in positions {
            let m = Transform::from_position(position).local_to_world();
            assert_eq!(m[(0, 3)], position.x);
            assert_eq!(m[(1, 3)], position.y);
            assert_eq!(m[(2, 3)], position.z);
            assert_eq!(m[(3, 3)], 1.0);
        }
    }

    #[test]
    fn test_euler_order_matches_quaternion_composition() {
        let angles = [
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::new(-45.0, 170.0, 89.0),
            Vec3::new(123.0, -77.0, 5.5),
        ];
        for rotation in angles {
            let transform = Transform::default().with_rotation(rotation);
            let from_matrix = transform.rotation_matrix();
            let from_quat = transform.rotation_quaternion().to_homogeneous();
            assert_relative_eq!(from_matrix, from_quat, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_scale_is_applied_before_rotation() {
        let transform = Transform::default()
            .with_rotation(Vec3::new(0.0, 90.0, 0.0))
            .with_scale(Vec3::new(2.0, 1.0, 1.0));
        let p = transform.local_to_world().transform_point(&crate::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-5);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let transform = Transform::default().with_rotation(Vec3::new(0.0, 180.0, 0.0));
        assert_relative_eq!(transform.forward(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(Transform::default().forward(), Vec3::new(0.0, 0.0, -1.0));
    }
}
