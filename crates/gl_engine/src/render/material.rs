//! Materials: authoring data plus lazily resolved GPU resources
//!
//! A material names shader sources and an albedo texture on disk. Nothing is
//! loaded until the first draw that uses it; see
//! [`crate::render::Renderer::ensure_material_resources`]. Every mesh renderer
//! holding the same [`crate::render::resources::MaterialHandle`] shares the
//! resolved program and texture.

use std::path::PathBuf;

use crate::foundation::math::Vec3;
use crate::render::resources::{ShaderHandle, TextureHandle};

/// Authoring data for a material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// GLSL vertex shader path; the built-in lit program is used when unset
    pub vertex_shader_path: Option<PathBuf>,
    /// GLSL fragment shader path
    pub fragment_shader_path: Option<PathBuf>,
    /// Albedo image path
    pub albedo_texture_path: Option<PathBuf>,
    /// Base color
    pub base_color: Vec3,
    /// Specular smoothness in [0, 1]
    pub smoothness: f32,
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            vertex_shader_path: None,
            fragment_shader_path: None,
            albedo_texture_path: None,
            base_color: Vec3::new(1.0, 1.0, 1.0),
            smoothness: 0.5,
        }
    }
}

impl MaterialDescriptor {
    /// Material with a base color only
    pub fn colored(base_color: Vec3) -> Self {
        Self {
            base_color,
            ..Default::default()
        }
    }

    /// Builder: custom shader sources
    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader_path = Some(vertex.into());
        self.fragment_shader_path = Some(fragment.into());
        self
    }

    /// Builder: albedo texture
    pub fn with_albedo(mut self, path: impl Into<PathBuf>) -> Self {
        self.albedo_texture_path = Some(path.into());
        self
    }

    /// Builder: smoothness
    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self
    }
}

/// Stored material
#[derive(Debug, Clone)]
pub struct Material {
    /// Authoring data
    pub descriptor: MaterialDescriptor,
    pub(crate) shader: Option<ShaderHandle>,
    pub(crate) albedo: Option<TextureHandle>,
    pub(crate) resolved: bool,
}

impl Material {
    pub(crate) fn new(descriptor: MaterialDescriptor) -> Self {
        Self {
            descriptor,
            shader: None,
            albedo: None,
            resolved: false,
        }
    }

    /// Whether GPU resources have been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn resolved_view(&self) -> ResolvedMaterial {
        ResolvedMaterial {
            shader: self.shader,
            albedo: self.albedo,
            base_color: self.descriptor.base_color,
            smoothness: self.descriptor.smoothness,
        }
    }
}

/// What a draw needs from a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMaterial {
    /// Custom program, if the material names one
    pub shader: Option<ShaderHandle>,
    /// Albedo texture, if it loaded
    pub albedo: Option<TextureHandle>,
    /// Base color
    pub base_color: Vec3,
    /// Specular smoothness
    pub smoothness: f32,
}
