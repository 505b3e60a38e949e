//! Backend-agnostic rendering API

pub mod render_backend;

pub use render_backend::{
    BackendResult, ClearFlags, CullMode, DepthFunc, DepthTarget, GpuMeshId, GpuProgramId,
    GpuTextureId, RenderBackend, TextureDescriptor, TextureFilter, TextureWrap, UniformValue,
    Viewport,
};
