//! Lighting system: registered light components to per-draw light data
//!
//! Systems contain logic, components contain data. Lights are gathered in
//! world space once per frame and moved into each object's space right
//! before its draw.

use crate::core::config::ShadowSettings;
use crate::ecs::components::{light, Light, Transform};
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::lighting::{DirectionalLight, LightSet, MAX_LIGHTS};

/// Builds [`LightSet`]s from light components
pub struct LightingSystem;

impl LightingSystem {
    /// Gather up to [`MAX_LIGHTS`] lights in registration order
    ///
    /// Each entry carries the normalized world direction and color scaled by
    /// intensity. Lights past the limit are ignored.
    pub fn gather<'a>(lights: impl IntoIterator<Item = (&'a Light, Option<&'a Transform>)>) -> LightSet {
        let mut set = LightSet::new();
        for (index, (light, transform)) in lights.into_iter().enumerate() {
            let entry = DirectionalLight {
                direction: light.world_direction(transform),
                color: light.radiance(),
            };
            if !set.push(entry) {
                log::trace!("Ignoring light #{} beyond the limit of {}", index, MAX_LIGHTS);
                break;
            }
        }
        set
    }

    /// White light pointing straight down, used when a scene has no lights
    pub fn default_light() -> DirectionalLight {
        DirectionalLight {
            direction: light::fallback_direction(),
            color: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Scene lights, or the default light when there are none
    pub fn or_default(lights: &LightSet) -> LightSet {
        if !lights.is_empty() {
            return lights.clone();
        }
        let mut set = LightSet::new();
        set.push(Self::default_light());
        set
    }

    /// Rotate world-space light directions into the space of `model`
    pub fn to_object_space(lights: &LightSet, inverse_model: &Mat4) -> LightSet {
        let rotation = utils::upper_left_3x3(inverse_model);
        lights.map_directions(|direction| rotation * direction)
    }

    /// Light-space matrix of the first light, if any
    pub fn shadow_light_space(lights: &LightSet, settings: &ShadowSettings) -> Option<Mat4> {
        lights.get(0).map(|l| light::light_space_matrix(l.direction, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gather_scales_color_by_intensity() {
        let light = Light::new(Vec3::new(1.0, 0.5, 0.0), 2.0);
        let set = LightingSystem::gather([(&light, None)]);
        assert_eq!(set.len(), 1);
        let gathered = set.get(0).expect("light");
        assert_relative_eq!(gathered.color, Vec3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(gathered.direction, light::fallback_direction());
    }

    #[test]
    fn test_gather_caps_at_max_lights() {
        let lights: Vec<Light> = (0..MAX_LIGHTS + 2).map(|_| Light::default()).collect();
        let set = LightingSystem::gather(lights.iter().map(|l| (l, None)));
        assert_eq!(set.len(), MAX_LIGHTS);
    }

    #[test]
    fn test_empty_scene_uses_default_light() {
        let set = LightingSystem::or_default(&LightSet::new());
        assert_eq!(set.len(), 1);
        assert_relative_eq!(set.get(0).expect("light").direction, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_object_space_follows_object_rotation() {
        let transform = Transform::default().with_rotation(Vec3::new(0.0, 90.0, 0.0));
        let model = transform.local_to_world();
        let inverse = utils::inverse_or_identity(&model);

        let mut world = LightSet::new();
        world.push(DirectionalLight { direction: Vec3::new(1.0, 0.0, 0.0), color: Vec3::new(1.0, 1.0, 1.0) });
        let local = LightingSystem::to_object_space(&world, &inverse);

        // Rotating the object back must recover the world direction.
        let back = utils::upper_left_3x3(&model) * local.get(0).expect("light").direction;
        assert_relative_eq!(back, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_object_space_directions_stay_normalized() {
        let model = Mat4::new_scaling(3.0);
        let mut world = LightSet::new();
        world.push(DirectionalLight { direction: Vec3::new(0.0, -1.0, 0.0), color: Vec3::new(1.0, 1.0, 1.0) });
        let local = LightingSystem::to_object_space(&world, &utils::inverse_or_identity(&model));
        assert_relative_eq!(local.get(0).expect("light").direction.norm(), 1.0, epsilon = 1e-6);
    }
}
