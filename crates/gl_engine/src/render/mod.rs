//! # Rendering System
//!
//! High-level rendering layer over an OpenGL 4.1 core context.
//!
//! ## Architecture
//!
//! - **Renderer**: owns the backend and every GPU resource, caches light
//!   uniforms and runs the shadow pass
//! - **Backend API**: the [`api::RenderBackend`] trait with an OpenGL
//!   implementation and an in-memory recording implementation for tests
//! - **Resources**: slot-map arenas handing out copyable handles
//! - **Window**: GLFW window and context creation

pub mod api;
pub mod backends;
pub mod lighting;
pub mod material;
pub mod primitives;
pub mod renderer;
pub mod resources;
pub mod shaders;
pub mod shadow;
pub mod sky;
pub mod window;

pub use api::{RenderBackend, Viewport};
pub use backends::{OpenGlBackend, RecordingBackend};
pub use lighting::{DirectionalLight, LightSet, MAX_LIGHTS};
pub use material::{MaterialDescriptor, ResolvedMaterial};
pub use primitives::{MeshData, MeshFactory, Vertex};
pub use renderer::{LitDraw, Renderer, SkyboxDraw, UnlitDraw};
pub use resources::{MaterialHandle, MeshHandle, ShaderHandle, TextureHandle};
pub use shaders::BuiltinProgram;
pub use window::{Window, WindowError};

use crate::assets::AssetError;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Rendering errors
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A shader stage failed to compile
    ///
    /// Carries the driver's info log. Fatal for the demos.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler info log
        log: String,
    },

    /// Linking the program failed
    #[error("Program link failed: {0}")]
    ProgramLink(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU objects (buffers, textures, framebuffers) cannot be
    /// created, typically due to invalid data or an incomplete framebuffer.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A handle did not refer to a live resource
    #[error("Invalid {0} handle")]
    InvalidHandle(&'static str),

    /// Loading an asset for a GPU resource failed
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Reading a shader source file failed
    #[error("Failed to read shader source {path}: {source}")]
    ShaderSource {
        /// File that could not be read
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
