//! Graphics backend implementations

#[allow(unsafe_code)]
pub mod opengl;
pub mod recording;

pub use opengl::OpenGlBackend;
pub use recording::RecordingBackend;
