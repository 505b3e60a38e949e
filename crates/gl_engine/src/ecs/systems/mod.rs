//! Per-frame systems driven by [`crate::scene::Scene`]

pub mod lighting;
pub mod render_system;

pub use lighting::LightingSystem;
pub use render_system::{CameraView, FrameContext, RenderSystem};
