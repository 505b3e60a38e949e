//! Shadow map pass state
//!
//! The pass renders shadow casters into a square depth texture from the first
//! light's point of view. Lit draws later in the same frame sample it.

use crate::foundation::math::Mat4;
use crate::render::api::{DepthTarget, Viewport};

/// Where the shadow pass is in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowPassState {
    /// No depth data for this frame
    #[default]
    Idle,
    /// Depth target bound, casters being drawn
    Recording,
    /// Depth map complete and ready to sample
    Ready,
}

/// Depth target plus the transform it was rendered with
#[derive(Debug)]
pub struct ShadowPass {
    pub(crate) target: Option<DepthTarget>,
    pub(crate) light_space: Mat4,
    pub(crate) state: ShadowPassState,
    pub(crate) saved_viewport: Option<Viewport>,
}

impl Default for ShadowPass {
    fn default() -> Self {
        Self {
            target: None,
            light_space: Mat4::identity(),
            state: ShadowPassState::Idle,
            saved_viewport: None,
        }
    }
}

impl ShadowPass {
    /// Current state
    pub fn state(&self) -> ShadowPassState {
        self.state
    }

    /// Light-space transform of the last pass
    pub fn light_space(&self) -> Mat4 {
        self.light_space
    }

    /// Whether lit draws should sample the shadow map
    pub fn is_ready(&self) -> bool {
        self.state == ShadowPassState::Ready && self.target.is_some()
    }

    /// Allocated depth target
    pub fn target(&self) -> Option<&DepthTarget> {
        self.target.as_ref()
    }
}
