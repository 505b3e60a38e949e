//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait that rendering backends must implement to
//! provide a consistent interface for the high-level [`crate::render::Renderer`].
//! Backends hand out opaque ids; the renderer owns the mapping from its
//! public handles to those ids.

use bitflags::bitflags;

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::primitives::Vertex;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Backend id of an uploaded vertex/index buffer pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuMeshId(pub u64);

/// Backend id of a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuProgramId(pub u64);

/// Backend id of a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureId(pub u64);

/// Depth-only offscreen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthTarget {
    /// Framebuffer id
    pub framebuffer: u64,
    /// Depth texture sampled by later passes
    pub texture: GpuTextureId,
    /// Edge length in texels
    pub size: u32,
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport anchored at the origin
    pub fn new(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Width / height, or `None` when the height is zero
    pub fn aspect(&self) -> Option<f32> {
        (self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

bitflags! {
    /// Buffers cleared by [`RenderBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color attachment
        const COLOR = 0b01;
        /// Depth attachment
        const DEPTH = 0b10;
    }
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    /// Pass if closer
    Less,
    /// Pass if closer or equal; used for skyboxes drawn at the far plane
    LessEqual,
}

/// Face culling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    Disabled,
    /// Cull back faces
    Back,
    /// Cull front faces
    Front,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    /// Tile
    Repeat,
    /// Clamp to the edge texel
    ClampToEdge,
    /// Clamp to a white border
    ClampToBorder,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// How a texture is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Wrapping on both axes
    pub wrap: TextureWrap,
    /// Minification filter
    pub min_filter: TextureFilter,
    /// Magnification filter
    pub mag_filter: TextureFilter,
    /// Build a mip chain after upload
    pub generate_mipmaps: bool,
    /// Enable hardware depth comparison
    pub depth_compare: bool,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            wrap: TextureWrap::Repeat,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            generate_mipmaps: true,
            depth_compare: false,
        }
    }
}

impl TextureDescriptor {
    /// Settings for equirectangular sky images
    pub fn sky() -> Self {
        Self {
            wrap: TextureWrap::ClampToEdge,
            generate_mipmaps: false,
            ..Default::default()
        }
    }
}

/// Value uploaded to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    /// `int` or sampler unit
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3(Vec3),
    /// `vec3[]`
    Vec3Array(&'a [Vec3]),
    /// `mat4`
    Mat4(Mat4),
}

/// Main rendering backend trait
///
/// One implementation talks to OpenGL; the recording backend keeps every
/// call in memory so scene logic can be tested without a GPU.
pub trait RenderBackend {
    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Change the viewport
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear the selected buffers of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    /// Toggle depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Toggle depth writes
    fn set_depth_write(&mut self, enabled: bool);

    /// Select the depth comparison
    fn set_depth_func(&mut self, func: DepthFunc);

    /// Select face culling
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Upload interleaved vertices and indices
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<GpuMeshId>;

    /// Attach or replace a per-instance model matrix buffer
    fn set_instance_transforms(&mut self, mesh: GpuMeshId, transforms: &[Mat4]) -> BackendResult<()>;

    /// Draw indexed triangles; `instances` selects an instanced draw
    fn draw_mesh(&mut self, mesh: GpuMeshId, index_count: u32, instances: Option<u32>);

    /// Release a mesh
    fn delete_mesh(&mut self, mesh: GpuMeshId);

    /// Compile and link a program from GLSL sources
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<GpuProgramId>;

    /// Make `program` current
    fn use_program(&mut self, program: GpuProgramId);

    /// Upload a uniform to `program`; unknown names are ignored
    fn set_uniform(&mut self, program: GpuProgramId, name: &str, value: UniformValue<'_>);

    /// Release a program
    fn delete_program(&mut self, program: GpuProgramId);

    /// Upload an RGBA8 image
    fn create_texture(&mut self, image: &ImageData, descriptor: &TextureDescriptor) -> BackendResult<GpuTextureId>;

    /// Bind a texture to a sampler unit
    fn bind_texture(&mut self, texture: GpuTextureId, unit: u32);

    /// Release a texture
    fn delete_texture(&mut self, texture: GpuTextureId);

    /// Create a square depth-only framebuffer
    fn create_depth_target(&mut self, size: u32) -> BackendResult<DepthTarget>;

    /// Bind a depth target, or the default framebuffer for `None`
    fn bind_depth_target(&mut self, target: Option<&DepthTarget>);

    /// Release a depth target and its texture
    fn delete_depth_target(&mut self, target: &DepthTarget);
}
