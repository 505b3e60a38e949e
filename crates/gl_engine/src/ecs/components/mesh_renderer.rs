//! Mesh renderer component
//!
//! Pure draw description. The render system turns it into a lit, unlit or
//! skybox draw each frame; see [`crate::ecs::systems::render_system`].

use crate::foundation::math::Vec3;
use crate::render::resources::{MaterialHandle, MeshHandle, ShaderHandle, TextureHandle};

/// How a mesh renderer is shaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Directional lights, ambient term and optional texture
    #[default]
    Lit,
    /// MVP transform and flat color or texture only
    Unlit,
    /// Equirectangular sky around the camera
    Skybox,
}

/// Draws a mesh with a shader, texture or material
///
/// Cloning copies the handles, so clones share the same GPU mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    /// Geometry to draw
    pub mesh: Option<MeshHandle>,
    /// Explicit program; the built-in one for the mode is used when unset
    pub shader: Option<ShaderHandle>,
    /// Lazily resolved material; overrides `shader`, `texture` and `color`
    pub material: Option<MaterialHandle>,
    /// Explicit diffuse texture
    pub texture: Option<TextureHandle>,
    /// Base color, multiplied with the texture when present
    pub color: Vec3,
    /// Specular smoothness in [0, 1]
    pub smoothness: f32,
    /// Per-channel multiplier on the scene ambient color
    pub ambient_multiplier: Vec3,
    /// Shading mode
    pub render_mode: RenderMode,
    /// Include in the shadow depth pass
    pub cast_shadows: bool,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            mesh: None,
            shader: None,
            material: None,
            texture: None,
            color: Vec3::new(1.0, 1.0, 1.0),
            smoothness: 0.5,
            ambient_multiplier: Vec3::new(1.0, 1.0, 1.0),
            render_mode: RenderMode::Lit,
            cast_shadows: true,
        }
    }
}

impl MeshRenderer {
    /// Lit renderer for `mesh` using the built-in program
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh: Some(mesh),
            ..Default::default()
        }
    }

    /// Renderer resolving its surface from `material`
    pub fn with_material(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            ..Default::default()
        }
    }

    /// Builder: explicit shader
    pub fn shader(mut self, shader: ShaderHandle) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Builder: explicit texture
    pub fn texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Builder: base color
    pub fn color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Builder: render mode
    pub fn mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        if render_mode == RenderMode::Skybox {
            self.cast_shadows = false;
        }
        self
    }

    /// Mesh handle, shared with any clone of this renderer
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }
}
