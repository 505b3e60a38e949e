//! Built-in component payloads

pub mod transform;
pub mod camera;
pub mod light;
pub mod mesh_renderer;
pub mod rotator;
pub mod debug_camera_controller;

pub use transform::Transform;
pub use camera::{AspectMode, Camera, Projection};
pub use light::Light;
pub use mesh_renderer::{MeshRenderer, RenderMode};
pub use rotator::Rotator;
pub use debug_camera_controller::DebugCameraController;
