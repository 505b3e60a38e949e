//! Renderer-owned resource arenas
//!
//! Meshes, shaders, textures and materials live in slot maps owned by the
//! [`crate::render::Renderer`]. Components store the copyable handles; the
//! GPU objects behind them are freed once, by the renderer.

use slotmap::{new_key_type, SlotMap};

use crate::render::api::{GpuMeshId, GpuProgramId, GpuTextureId, RenderBackend};
use crate::render::material::Material;

new_key_type! {
    /// Handle to an uploaded mesh
    pub struct MeshHandle;
    /// Handle to a linked shader program
    pub struct ShaderHandle;
    /// Handle to a 2D texture
    pub struct TextureHandle;
    /// Handle to a shared material
    pub struct MaterialHandle;
}

/// Uploaded mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub(crate) gpu: GpuMeshId,
    /// Number of indices
    pub index_count: u32,
    /// Number of vertices
    pub vertex_count: u32,
    /// Instance count when a per-instance transform buffer is attached
    pub instance_count: Option<u32>,
}

/// Linked program
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub(crate) gpu: GpuProgramId,
    /// Debug label
    pub label: String,
}

/// Uploaded texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub(crate) gpu: GpuTextureId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// All arenas
#[derive(Debug, Default)]
pub(crate) struct ResourceStore {
    pub meshes: SlotMap<MeshHandle, Mesh>,
    pub shaders: SlotMap<ShaderHandle, Shader>,
    pub textures: SlotMap<TextureHandle, Texture>,
    pub materials: SlotMap<MaterialHandle, Material>,
}

impl ResourceStore {
    /// Free every GPU object and empty the arenas
    pub fn release_all<B: RenderBackend>(&mut self, backend: &mut B) {
        for (_, mesh) in self.meshes.drain() {
            backend.delete_mesh(mesh.gpu);
        }
        for (_, shader) in self.shaders.drain() {
            backend.delete_program(shader.gpu);
        }
        for (_, texture) in self.textures.drain() {
            backend.delete_texture(texture.gpu);
        }
        self.materials.clear();
    }
}
