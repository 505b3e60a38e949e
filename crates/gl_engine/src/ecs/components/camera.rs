//! Camera component
//!
//! The camera looks down the local -Z axis of its object's [`Transform`].
//! The view matrix is the inverse of that transform's world matrix.
//!
//! # Aspect ratio
//!
//! With [`AspectMode::SyncWithViewport`] the aspect is re-derived from the
//! viewport on every call, which is what single-window demos want. Use
//! [`AspectMode::Fixed`] for offscreen or split views.
//!
//! # Examples
//!
//! ```
//! use gl_engine::ecs::{Camera, Transform};
//! use gl_engine::render::api::Viewport;
//!
//! let camera = Camera::perspective(60.0, 0.1, 100.0);
//! let projection = camera.projection_matrix(Viewport::new(800, 600));
//! let view = camera.view_matrix(Some(&Transform::default()));
//! assert_eq!(view, nalgebra::Matrix4::identity());
//! # let _ = projection;
//! ```

use crate::ecs::components::Transform;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::api::Viewport;

/// Projection variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Field-of-view based perspective
    Perspective,
    /// Parallel projection sized by [`Camera::orthographic_size`]
    Orthographic,
}

/// Where the aspect ratio comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectMode {
    /// Authored width / height
    Fixed(f32),
    /// Width / height of the current viewport
    SyncWithViewport,
}

/// Camera parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Projection variant
    pub projection: Projection,
    /// Vertical field of view in degrees
    pub field_of_view_degrees: f32,
    /// Near clip distance
    pub near_clip: f32,
    /// Far clip distance
    pub far_clip: f32,
    /// Half height of the orthographic view volume
    pub orthographic_size: f32,
    /// Aspect ratio source
    pub aspect_mode: AspectMode,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            field_of_view_degrees: 45.0,
            near_clip: 0.1,
            far_clip: 100.0,
            orthographic_size: 5.0,
            aspect_mode: AspectMode::SyncWithViewport,
        }
    }
}

impl Camera {
    /// Perspective camera with the given vertical FOV (degrees) and clip planes
    pub fn perspective(field_of_view_degrees: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            field_of_view_degrees,
            near_clip,
            far_clip,
            ..Default::default()
        }
    }

    /// Orthographic camera with the given half height and clip planes
    pub fn orthographic(orthographic_size: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            projection: Projection::Orthographic,
            orthographic_size,
            near_clip,
            far_clip,
            ..Default::default()
        }
    }

    /// Builder: set the aspect mode
    pub fn with_aspect_mode(mut self, aspect_mode: AspectMode) -> Self {
        self.aspect_mode = aspect_mode;
        self
    }

    /// Aspect ratio used for `viewport`; 1.0 for a degenerate viewport
    pub fn aspect(&self, viewport: Viewport) -> f32 {
        match self.aspect_mode {
            AspectMode::Fixed(aspect) => aspect,
            AspectMode::SyncWithViewport => viewport.aspect().unwrap_or(1.0),
        }
    }

    /// Projection matrix for the configured variant
    pub fn projection_matrix(&self, viewport: Viewport) -> Mat4 {
        match self.projection {
            Projection::Perspective => self.perspective_matrix(viewport),
            Projection::Orthographic => {
                let half_height = self.orthographic_size;
                let half_width = half_height * self.aspect(viewport);
                Mat4::orthographic_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near_clip,
                    self.far_clip,
                )
            }
        }
    }

    /// Perspective matrix regardless of the configured variant
    ///
    /// Skyboxes use this so an orthographic camera still sees a full sky.
    pub fn perspective_matrix(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_gl(
            utils::deg_to_rad(self.field_of_view_degrees),
            self.aspect(viewport),
            self.near_clip,
            self.far_clip,
        )
    }

    /// Inverse of the transform's world matrix; identity without a transform
    pub fn view_matrix(&self, transform: Option<&Transform>) -> Mat4 {
        transform
            .and_then(|t| t.local_to_world().try_inverse())
            .unwrap_or_else(Mat4::identity)
    }

    /// Camera position in world space
    pub fn position(&self, transform: Option<&Transform>) -> Vec3 {
        transform.map_or_else(Vec3::zeros, |t| t.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perspective_y_scale() {
        let camera = Camera::perspective(60.0, 0.1, 100.0);
        let proj = camera.projection_matrix(Viewport::new(800, 800));
        assert_relative_eq!(proj[(1, 1)], 1.0 / 30.0f32.to_radians().tan(), epsilon = 1e-5);
    }

    #[test]
    fn test_view_is_inverse_of_world() {
        let transform = Transform::from_position(Vec3::new(3.0, -1.0, 7.5))
            .with_rotation(Vec3::new(15.0, -40.0, 5.0))
            .with_scale(Vec3::new(2.0, 0.5, 1.5));
        let view = Camera::default().view_matrix(Some(&transform));
        assert_relative_eq!(view * transform.local_to_world(), Mat4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_missing_transform_gives_identity_view() {
        assert_eq!(Camera::default().view_matrix(None), Mat4::identity());
        assert_eq!(Camera::default().position(None), Vec3::zeros());
    }

    #[test]
    fn test_aspect_modes() {
        let viewport = Viewport::new(1600, 800);
        let synced = Camera::default();
        assert_relative_eq!(synced.aspect(viewport), 2.0);
        assert_relative_eq!(synced.aspect(Viewport::new(100, 0)), 1.0);

        let fixed = Camera::default().with_aspect_mode(AspectMode::Fixed(0.5));
        assert_relative_eq!(fixed.aspect(viewport), 0.5);
    }

    #[test]
    fn test_orthographic_extent_scales_with_aspect() {
        let camera = Camera::orthographic(5.0, 0.1, 100.0)
            .with_aspect_mode(AspectMode::Fixed(2.0));
        let proj = camera.projection_matrix(Viewport::new(1, 1));
        assert_relative_eq!(proj[(1, 1)], 1.0 / 5.0, epsilon = 1e-6);
        assert_relative_eq!(proj[(0, 0)], 1.0 / 10.0, epsilon = 1e-6);
        assert_eq!(proj[(3, 3)], 1.0);
    }
}
