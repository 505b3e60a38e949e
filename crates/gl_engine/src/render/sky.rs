//! Equirectangular sky mapping
//!
//! Mirrors the lookup in the built-in skybox fragment shader so the mapping
//! can be checked on the CPU.

use crate::foundation::math::{constants, Vec2, Vec3};

/// Texture coordinate of `direction` in an equirectangular image
///
/// `u` wraps around the horizon starting at +X; `v` is 0 at the zenith
/// (top image row) and 1 at the nadir.
pub fn direction_to_equirect_uv(direction: Vec3) -> Vec2 {
    let d = direction.try_normalize(1.0e-6).unwrap_or_else(|| Vec3::new(1.0, 0.0, 0.0));
    Vec2::new(
        0.5 + d.z.atan2(d.x) / constants::TAU,
        0.5 - d.y.clamp(-1.0, 1.0).asin() / constants::PI,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cardinal_directions() {
        assert_relative_eq!(direction_to_equirect_uv(Vec3::new(1.0, 0.0, 0.0)), Vec2::new(0.5, 0.5));
        assert_relative_eq!(direction_to_equirect_uv(Vec3::new(0.0, 0.0, 1.0)), Vec2::new(0.75, 0.5));
        assert_relative_eq!(direction_to_equirect_uv(Vec3::new(0.0, 0.0, -1.0)), Vec2::new(0.25, 0.5));
        assert_relative_eq!(direction_to_equirect_uv(Vec3::new(0.0, 1.0, 0.0)).y, 0.0);
        assert_relative_eq!(direction_to_equirect_uv(Vec3::new(0.0, -2.0, 0.0)).y, 1.0);
    }

    #[test]
    fn test_uv_stays_in_unit_square() {
        for i in 0..64 {
            let a = i as f32 * 0.37;
            let d = Vec3::new(a.cos(), (a * 1.3).sin(), a.sin());
            let uv = direction_to_equirect_uv(d);
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
    }
}
