//! Rotator component: spins its object around the Y axis

use crate::ecs::component::ComponentContext;
use crate::foundation::time::FrameTime;

/// Sets the sibling transform's yaw from the elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct Rotator {
    /// Yaw speed in degrees per second
    pub degrees_per_second: f32,
}

impl Default for Rotator {
    fn default() -> Self {
        Self { degrees_per_second: 45.0 }
    }
}

impl Rotator {
    /// Create a rotator with the given speed
    pub fn new(degrees_per_second: f32) -> Self {
        Self { degrees_per_second }
    }

    pub(crate) fn update(&mut self, ctx: &mut ComponentContext<'_>, time: FrameTime) {
        if let Some(transform) = ctx.transform_mut() {
            transform.rotation.y = time.total * self.degrees_per_second;
        }
    }
}
