//! Directional light component
//!
//! Only directional lights exist. The world direction is the owning
//! transform's -Z axis; without a transform the light points straight down.

use crate::core::config::ShadowSettings;
use crate::ecs::components::Transform;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};

/// Direction used when a light has no transform
pub fn fallback_direction() -> Vec3 {
    Vec3::new(0.0, -1.0, 0.0)
}

/// Directional light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// RGB color (0.0 to 1.0 range)
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
        }
    }
}

impl Light {
    /// Create a light with color and intensity
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Color scaled by intensity
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }

    /// Normalized world-space direction the light travels in
    pub fn world_direction(&self, transform: Option<&Transform>) -> Vec3 {
        let Some(transform) = transform else {
            return fallback_direction();
        };
        let direction = transform.local_to_world() * Vec4::new(0.0, 0.0, -1.0, 0.0);
        utils::normalize_or(direction.xyz(), fallback_direction())
    }

    /// Orthographic light-space transform for the shadow pass
    ///
    /// The virtual eye sits `light_distance` units against the light direction,
    /// looking at the origin.
    pub fn light_space_matrix(&self, transform: Option<&Transform>, settings: &ShadowSettings) -> Mat4 {
        light_space_matrix(self.world_direction(transform), settings)
    }
}

/// Light-space transform for a normalized world direction
pub fn light_space_matrix(direction: Vec3, settings: &ShadowSettings) -> Mat4 {
    let extent = settings.frustum_half_extent;
    let projection = Mat4::orthographic_gl(
        -extent,
        extent,
        -extent,
        extent,
        settings.near_plane,
        settings.far_plane,
    );

    let world_up = Vec3::new(0.0, 1.0, 0.0);
    let up = if direction.dot(&world_up).abs() > 0.99 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        world_up
    };
    let eye = -direction * settings.light_distance;
    projection * Mat4::look_at_gl(eye, Vec3::zeros(), up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_turn_negates_direction() {
        let light = Light::default();
        let identity = light.world_direction(Some(&Transform::default()));
        let turned = light.world_direction(Some(
            &Transform::default().with_rotation(Vec3::new(0.0, 180.0, 0.0)),
        ));
        assert_relative_eq!(turned, -identity, epsilon = 1e-5);
        assert_relative_eq!(identity, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_direction_ignores_translation_and_scale() {
        let transform = Transform::from_position(Vec3::new(10.0, 5.0, 1.0))
            .with_rotation(Vec3::new(-90.0, 0.0, 0.0))
            .with_uniform_scale(3.0);
        let direction = Light::default().world_direction(Some(&transform));
        assert_relative_eq!(direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_transform_points_down() {
        assert_eq!(Light::default().world_direction(None), fallback_direction());
    }

    #[test]
    fn test_radiance() {
        let light = Light::new(Vec3::new(1.0, 0.5, 0.25), 2.0);
        assert_eq!(light.radiance(), Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_light_space_handles_vertical_light() {
        let settings = ShadowSettings::default();
        let m = light_space_matrix(Vec3::new(0.0, -1.0, 0.0), &settings);
        assert!(m.iter().all(|v| v.is_finite()));

        // The origin lies light_distance in front of the eye, inside [near, far].
        let origin = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(origin.z > -1.0 && origin.z < 1.0);
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-5);
    }
}
