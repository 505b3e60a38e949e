//! Frame-level rendering coordinator
//!
//! [`Renderer`] owns a backend plus the resource arenas, compiles the built-in
//! programs on first use, diffs light state before uploading it and drives the
//! optional shadow map pass. Mesh renderers reach it through the draw helpers
//! [`Renderer::draw_lit`], [`Renderer::draw_unlit`] and [`Renderer::draw_skybox`].

use std::collections::HashMap;
use std::path::Path;

use crate::assets::ImageData;
use crate::core::config::{RendererConfig, ShadowSettings};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::api::{
    ClearFlags, CullMode, DepthFunc, GpuProgramId, GpuTextureId, RenderBackend,
    TextureDescriptor, UniformValue, Viewport,
};
use crate::render::lighting::{LightChanges, LightSet, LightUniformCache};
use crate::render::material::{Material, MaterialDescriptor, ResolvedMaterial};
use crate::render::primitives::MeshData;
use crate::render::resources::{
    MaterialHandle, Mesh, MeshHandle, ResourceStore, Shader, ShaderHandle, Texture, TextureHandle,
};
use crate::render::shaders::{uniforms, BuiltinProgram, ALBEDO_UNIT, SHADOW_UNIT};
use crate::render::shadow::{ShadowPass, ShadowPassState};
use crate::render::{RenderError, RenderResult};

/// Inputs of a lit draw; lights and camera already in object space
#[derive(Debug, Clone)]
pub struct LitDraw<'a> {
    /// Geometry
    pub mesh: MeshHandle,
    /// Program; built-in lit when `None`
    pub shader: Option<ShaderHandle>,
    /// Albedo texture
    pub texture: Option<TextureHandle>,
    /// Projection * view * model
    pub mvp: Mat4,
    /// Model matrix, used for the shadow lookup
    pub model: Mat4,
    /// Object-space lights
    pub lights: &'a LightSet,
    /// Object-space camera position
    pub camera_position: Vec3,
    /// Ambient color after the per-renderer multiplier
    pub ambient: Vec3,
    /// Base color
    pub color: Vec3,
    /// Specular smoothness
    pub smoothness: f32,
}

/// Inputs of an unlit draw
#[derive(Debug, Clone)]
pub struct UnlitDraw {
    /// Geometry
    pub mesh: MeshHandle,
    /// Program; built-in unlit when `None`
    pub shader: Option<ShaderHandle>,
    /// Texture multiplied with `color`
    pub texture: Option<TextureHandle>,
    /// Projection * view * model
    pub mvp: Mat4,
    /// Flat color
    pub color: Vec3,
}

/// Inputs of a skybox draw
#[derive(Debug, Clone)]
pub struct SkyboxDraw {
    /// Geometry, normally [`crate::render::MeshFactory::sky_cube`]
    pub mesh: MeshHandle,
    /// Program; built-in skybox when `None`
    pub shader: Option<ShaderHandle>,
    /// Equirectangular sky image
    pub texture: Option<TextureHandle>,
    /// Camera view matrix; translation is stripped
    pub view: Mat4,
    /// Perspective projection
    pub projection: Mat4,
}

/// Rendering coordinator generic over its backend
pub struct Renderer<B: RenderBackend> {
    backend: B,
    config: RendererConfig,
    resources: ResourceStore,
    builtins: [Option<ShaderHandle>; 4],
    frame_lights: LightUniformCache,
    program_lights: HashMap<GpuProgramId, LightUniformCache>,
    shadow: ShadowPass,
}

impl<B: RenderBackend> Renderer<B> {
    /// Create a renderer and apply the configured fixed-function state
    pub fn new(mut backend: B, config: RendererConfig) -> Self {
        backend.set_depth_test(config.depth_test);
        backend.set_depth_func(DepthFunc::Less);
        backend.set_cull_mode(if config.back_face_culling { CullMode::Back } else { CullMode::Disabled });
        log::debug!("Renderer created with viewport {:?}", backend.viewport());

        Self {
            backend,
            config,
            resources: ResourceStore::default(),
            builtins: [None; 4],
            frame_lights: LightUniformCache::default(),
            program_lights: HashMap::new(),
            shadow: ShadowPass::default(),
        }
    }

    /// Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Shadow settings
    pub fn shadow_settings(&self) -> &ShadowSettings {
        &self.config.shadows
    }

    /// Replace shadow settings; a new map size reallocates the depth target
    pub fn set_shadow_settings(&mut self, settings: ShadowSettings) {
        if let Some(target) = self.shadow.target {
            if target.size != settings.shadow_map_size {
                self.backend.delete_depth_target(&target);
                self.shadow.target = None;
            }
        }
        self.config.shadows = settings;
    }

    /// Shadow pass state
    pub fn shadow_pass(&self) -> &ShadowPass {
        &self.shadow
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.backend.viewport()
    }

    /// Resize the viewport, e.g. after a framebuffer resize
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.backend.set_viewport(viewport);
    }

    /// Clear color and depth
    pub fn begin_frame(&mut self, clear_color: Vec3) {
        self.backend.clear(
            ClearFlags::COLOR | ClearFlags::DEPTH,
            [clear_color.x, clear_color.y, clear_color.z, 1.0],
        );
    }

    /// Close the frame; the shadow map is not sampled after this
    pub fn end_frame(&mut self) {
        if self.shadow.state == ShadowPassState::Ready {
            self.shadow.state = ShadowPassState::Idle;
        }
    }

    /// Record this frame's world-space lights and camera position
    ///
    /// Returns whether anything differs from the previous frame by more than
    /// the change threshold. Uniform re-uploads are decided per program from
    /// the object-space lights of each draw, so this only reports the change.
    #[must_use]
    pub fn update_light_state(&mut self, lights: &LightSet, camera_position: Vec3) -> bool {
        self.frame_lights.update(lights, Some(camera_position)).any()
    }

    // --- resources ---------------------------------------------------------

    /// Upload mesh data
    pub fn create_mesh(&mut self, data: &MeshData) -> RenderResult<MeshHandle> {
        let gpu = self.backend.create_mesh(&data.vertices, &data.indices)?;
        Ok(self.resources.meshes.insert(Mesh {
            gpu,
            index_count: data.indices.len() as u32,
            vertex_count: data.vertices.len() as u32,
            instance_count: None,
        }))
    }

    /// Upload mesh data with one model matrix per instance
    pub fn create_instanced_mesh(&mut self, data: &MeshData, instances: &[Mat4]) -> RenderResult<MeshHandle> {
        let handle = self.create_mesh(data)?;
        self.set_instance_transforms(handle, instances)?;
        Ok(handle)
    }

    /// Replace the per-instance transforms of a mesh
    pub fn set_instance_transforms(&mut self, mesh: MeshHandle, instances: &[Mat4]) -> RenderResult<()> {
        let entry = self.resources.meshes.get_mut(mesh).ok_or(RenderError::InvalidHandle("mesh"))?;
        self.backend.set_instance_transforms(entry.gpu, instances)?;
        entry.instance_count = Some(instances.len() as u32);
        Ok(())
    }

    /// Mesh metadata
    pub fn mesh(&self, mesh: MeshHandle) -> Option<&Mesh> {
        self.resources.meshes.get(mesh)
    }

    /// Free a mesh; handles copied into components become invalid
    pub fn release_mesh(&mut self, mesh: MeshHandle) {
        if let Some(entry) = self.resources.meshes.remove(mesh) {
            self.backend.delete_mesh(entry.gpu);
        }
    }

    /// Compile and link a program from sources
    pub fn create_shader(&mut self, vertex_source: &str, fragment_source: &str) -> RenderResult<ShaderHandle> {
        self.create_labeled_shader("custom", vertex_source, fragment_source)
    }

    fn create_labeled_shader(&mut self, label: &str, vertex_source: &str, fragment_source: &str) -> RenderResult<ShaderHandle> {
        let gpu = self.backend.create_program(vertex_source, fragment_source).map_err(|e| {
            log::error!("Shader '{}' failed: {}", label, e);
            e
        })?;
        log::debug!("Shader '{}' linked", label);
        Ok(self.resources.shaders.insert(Shader { gpu, label: label.to_string() }))
    }

    /// Compile and link a program from GLSL files
    pub fn create_shader_from_files(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> RenderResult<ShaderHandle> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
                path: path.display().to_string(),
                source,
            })
        };
        let vertex_path = vertex_path.as_ref();
        let vertex = read(vertex_path)?;
        let fragment = read(fragment_path.as_ref())?;
        self.create_labeled_shader(&vertex_path.display().to_string(), &vertex, &fragment)
    }

    /// Shader metadata
    pub fn shader(&self, shader: ShaderHandle) -> Option<&Shader> {
        self.resources.shaders.get(shader)
    }

    /// Handle of a built-in program, compiling it on first request
    pub fn builtin_program(&mut self, program: BuiltinProgram) -> RenderResult<ShaderHandle> {
        if let Some(handle) = self.builtins[program.index()] {
            return Ok(handle);
        }
        let (vertex, fragment) = program.sources();
        let handle = self.create_labeled_shader(program.label(), vertex, fragment)?;
        self.builtins[program.index()] = Some(handle);
        Ok(handle)
    }

    /// Upload decoded image data
    pub fn create_texture(&mut self, image: &ImageData, descriptor: &TextureDescriptor) -> RenderResult<TextureHandle> {
        let gpu = self.backend.create_texture(image, descriptor)?;
        Ok(self.resources.textures.insert(Texture {
            gpu,
            width: image.width,
            height: image.height,
        }))
    }

    /// Load and upload an image file with default sampling
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> RenderResult<TextureHandle> {
        let image = ImageData::from_file(path)?;
        self.create_texture(&image, &TextureDescriptor::default())
    }

    /// Free a texture; handles copied into components become invalid
    pub fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(entry) = self.resources.textures.remove(texture) {
            self.backend.delete_texture(entry.gpu);
        }
    }

    /// Texture metadata
    pub fn texture(&self, texture: TextureHandle) -> Option<&Texture> {
        self.resources.textures.get(texture)
    }

    /// Store a material; resources are loaded on first use
    pub fn create_material(&mut self, descriptor: MaterialDescriptor) -> MaterialHandle {
        self.resources.materials.insert(Material::new(descriptor))
    }

    /// Material entry
    pub fn material(&self, material: MaterialHandle) -> Option<&Material> {
        self.resources.materials.get(material)
    }

    /// Resolve a material's program and albedo texture
    ///
    /// Shader failures are returned; a texture that fails to load is logged
    /// and the material falls back to its flat color. Resolution happens once.
    pub fn ensure_material_resources(&mut self, material: MaterialHandle) -> RenderResult<ResolvedMaterial> {
        let entry = self.resources.materials.get(material).ok_or(RenderError::InvalidHandle("material"))?;
        if entry.resolved {
            return Ok(entry.resolved_view());
        }
        let descriptor = entry.descriptor.clone();

        let shader = match (&descriptor.vertex_shader_path, &descriptor.fragment_shader_path) {
            (Some(vertex), Some(fragment)) => Some(self.create_shader_from_files(vertex, fragment)?),
            _ => None,
        };

        let albedo = match &descriptor.albedo_texture_path {
            Some(path) => match self.load_texture(path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::warn!("Albedo texture {} unavailable, using flat color: {}", path.display(), e);
                    None
                }
            },
            None => None,
        };

        let entry = self.resources.materials.get_mut(material).ok_or(RenderError::InvalidHandle("material"))?;
        entry.shader = shader;
        entry.albedo = albedo;
        entry.resolved = true;
        Ok(entry.resolved_view())
    }

    // --- drawing -----------------------------------------------------------

    fn program_for(&mut self, shader: Option<ShaderHandle>, fallback: BuiltinProgram) -> RenderResult<GpuProgramId> {
        let handle = match shader {
            Some(handle) => handle,
            None => self.builtin_program(fallback)?,
        };
        self.resources
            .shaders
            .get(handle)
            .map(|s| s.gpu)
            .ok_or(RenderError::InvalidHandle("shader"))
    }

    fn mesh_entry(&self, mesh: MeshHandle) -> RenderResult<Mesh> {
        self.resources.meshes.get(mesh).cloned().ok_or(RenderError::InvalidHandle("mesh"))
    }

    fn bind_surface_texture(&mut self, program: GpuProgramId, texture: Option<TextureHandle>) {
        let gpu = texture.and_then(|t| self.resources.textures.get(t)).map(|t| t.gpu);
        match gpu {
            Some(gpu) => {
                self.backend.bind_texture(gpu, ALBEDO_UNIT);
                self.backend.set_uniform(program, uniforms::ALBEDO, UniformValue::Int(ALBEDO_UNIT as i32));
                self.backend.set_uniform(program, uniforms::USE_TEXTURE, UniformValue::Int(1));
            }
            None => self.backend.set_uniform(program, uniforms::USE_TEXTURE, UniformValue::Int(0)),
        }
    }

    fn issue_draw(&mut self, program: GpuProgramId, mesh: &Mesh) {
        self.backend.set_uniform(
            program,
            uniforms::INSTANCED,
            UniformValue::Int(i32::from(mesh.instance_count.is_some())),
        );
        self.backend.draw_mesh(mesh.gpu, mesh.index_count, mesh.instance_count);
    }

    fn upload_lights(&mut self, program: GpuProgramId, lights: &LightSet) -> LightChanges {
        let changes = self.program_lights.entry(program).or_default().update(lights, None);
        if changes.count {
            self.backend.set_uniform(program, uniforms::LIGHT_COUNT, UniformValue::Int(lights.len() as i32));
        }
        if changes.directions && !lights.is_empty() {
            self.backend.set_uniform(program, uniforms::LIGHT_DIRECTIONS, UniformValue::Vec3Array(lights.directions()));
        }
        if changes.colors && !lights.is_empty() {
            self.backend.set_uniform(program, uniforms::LIGHT_COLORS, UniformValue::Vec3Array(lights.colors()));
        }
        changes
    }

    /// Draw with directional lighting, ambient term and optional shadows
    pub fn draw_lit(&mut self, draw: &LitDraw<'_>) -> RenderResult<()> {
        let mesh = self.mesh_entry(draw.mesh)?;
        let program = self.program_for(draw.shader, BuiltinProgram::Lit)?;
        self.backend.use_program(program);

        self.backend.set_uniform(program, uniforms::MVP, UniformValue::Mat4(draw.mvp));
        self.upload_lights(program, draw.lights);
        self.backend.set_uniform(program, uniforms::CAMERA_POSITION, UniformValue::Vec3(draw.camera_position));
        self.backend.set_uniform(program, uniforms::AMBIENT, UniformValue::Vec3(draw.ambient));
        self.backend.set_uniform(program, uniforms::COLOR, UniformValue::Vec3(draw.color));
        self.backend.set_uniform(program, uniforms::SMOOTHNESS, UniformValue::Float(draw.smoothness));
        self.bind_surface_texture(program, draw.texture);
        self.bind_shadow_map(program, &draw.model);

        self.issue_draw(program, &mesh);
        Ok(())
    }

    fn bind_shadow_map(&mut self, program: GpuProgramId, model: &Mat4) {
        let depth_texture = self.shadow.target.filter(|_| self.shadow.is_ready()).map(|t| t.texture);
        let Some(depth_texture) = depth_texture else {
            self.backend.set_uniform(program, uniforms::USE_SHADOWS, UniformValue::Int(0));
            return;
        };

        let settings = &self.config.shadows;
        let (bias, radius) = (settings.bias, settings.pcf_radius());
        let (advanced, contact) = (settings.use_advanced_shadows, settings.use_contact_hardening);
        self.backend.bind_texture(depth_texture, SHADOW_UNIT);
        self.backend.set_uniform(program, uniforms::SHADOW_MAP, UniformValue::Int(SHADOW_UNIT as i32));
        self.backend.set_uniform(program, uniforms::USE_SHADOWS, UniformValue::Int(1));
        self.backend.set_uniform(
            program,
            uniforms::LIGHT_SPACE_MODEL,
            UniformValue::Mat4(self.shadow.light_space * model),
        );
        self.backend.set_uniform(program, uniforms::SHADOW_BIAS, UniformValue::Float(bias));
        self.backend.set_uniform(program, uniforms::PCF_RADIUS, UniformValue::Int(radius));
        self.backend.set_uniform(program, uniforms::ADVANCED_SHADOWS, UniformValue::Int(i32::from(advanced)));
        self.backend.set_uniform(program, uniforms::CONTACT_HARDENING, UniformValue::Int(i32::from(contact)));
    }

    /// Draw with MVP and flat color or texture only
    pub fn draw_unlit(&mut self, draw: &UnlitDraw) -> RenderResult<()> {
        let mesh = self.mesh_entry(draw.mesh)?;
        let program = self.program_for(draw.shader, BuiltinProgram::Unlit)?;
        self.backend.use_program(program);
        self.backend.set_uniform(program, uniforms::MVP, UniformValue::Mat4(draw.mvp));
        self.backend.set_uniform(program, uniforms::COLOR, UniformValue::Vec3(draw.color));
        self.bind_surface_texture(program, draw.texture);
        self.issue_draw(program, &mesh);
        Ok(())
    }

    /// Draw the sky around the camera
    ///
    /// Front faces are culled and depth writes are off so the sky sits behind
    /// everything drawn later. Skipped without a texture.
    pub fn draw_skybox(&mut self, draw: &SkyboxDraw) -> RenderResult<()> {
        let Some(texture) = draw.texture.and_then(|t| self.resources.textures.get(t)).map(|t| t.gpu) else {
            log::trace!("Skybox has no texture; skipping");
            return Ok(());
        };
        let mesh = self.mesh_entry(draw.mesh)?;
        let program = self.program_for(draw.shader, BuiltinProgram::Skybox)?;

        self.backend.set_cull_mode(CullMode::Front);
        self.backend.set_depth_write(false);
        self.backend.set_depth_func(DepthFunc::LessEqual);

        self.backend.use_program(program);
        self.backend.set_uniform(program, uniforms::VIEW_ROTATION, UniformValue::Mat4(draw.view.without_translation()));
        self.backend.set_uniform(program, uniforms::PROJECTION, UniformValue::Mat4(draw.projection));
        self.backend.bind_texture(texture, ALBEDO_UNIT);
        self.backend.set_uniform(program, uniforms::SKY, UniformValue::Int(ALBEDO_UNIT as i32));
        self.backend.draw_mesh(mesh.gpu, mesh.index_count, None);

        self.restore_scene_state();
        Ok(())
    }

    fn restore_scene_state(&mut self) {
        self.backend.set_depth_func(DepthFunc::Less);
        self.backend.set_depth_write(true);
        self.backend.set_cull_mode(self.scene_cull_mode());
    }

    fn scene_cull_mode(&self) -> CullMode {
        if self.config.back_face_culling {
            CullMode::Back
        } else {
            CullMode::Disabled
        }
    }

    // --- shadow pass -------------------------------------------------------

    /// Allocate the depth target; a no-op when one of `size` exists
    pub fn initialize_shadow_map(&mut self, size: u32) -> RenderResult<()> {
        if let Some(target) = self.shadow.target {
            if target.size == size {
                return Ok(());
            }
            self.backend.delete_depth_target(&target);
            self.shadow.target = None;
        }
        let target = self.backend.create_depth_target(size)?;
        log::debug!("Shadow map allocated: {}x{}", size, size);
        self.shadow.target = Some(target);
        Ok(())
    }

    /// Bind and clear the depth target and switch to front-face culling
    pub fn begin_shadow_pass(&mut self, light_space: Mat4) -> RenderResult<()> {
        self.initialize_shadow_map(self.config.shadows.shadow_map_size)?;
        let Some(target) = self.shadow.target else {
            return Err(RenderError::ResourceCreationFailed("shadow map missing".to_string()));
        };

        self.shadow.saved_viewport = Some(self.backend.viewport());
        self.backend.bind_depth_target(Some(&target));
        self.backend.set_viewport(Viewport::new(target.size, target.size));
        self.backend.set_depth_write(true);
        self.backend.clear(ClearFlags::DEPTH, [0.0; 4]);
        self.backend.set_cull_mode(CullMode::Front);

        self.shadow.light_space = light_space;
        self.shadow.state = ShadowPassState::Recording;
        Ok(())
    }

    /// Render a mesh's positions into the depth target
    pub fn draw_mesh_for_depth(&mut self, mesh: MeshHandle, model: &Mat4) -> RenderResult<()> {
        if self.shadow.state != ShadowPassState::Recording {
            log::warn!("draw_mesh_for_depth called outside a shadow pass");
            return Ok(());
        }
        let mesh = self.mesh_entry(mesh)?;
        let program = self.program_for(None, BuiltinProgram::Depth)?;
        self.backend.use_program(program);
        self.backend.set_uniform(
            program,
            uniforms::LIGHT_SPACE_MODEL,
            UniformValue::Mat4(self.shadow.light_space * model),
        );
        self.issue_draw(program, &mesh);
        Ok(())
    }

    /// Restore the default framebuffer, viewport and culling
    pub fn end_shadow_pass(&mut self) {
        if self.shadow.state != ShadowPassState::Recording {
            return;
        }
        self.backend.bind_depth_target(None);
        if let Some(viewport) = self.shadow.saved_viewport.take() {
            self.backend.set_viewport(viewport);
        }
        self.backend.set_cull_mode(self.scene_cull_mode());
        self.shadow.state = ShadowPassState::Ready;
    }

    /// Depth texture of the shadow map, once allocated
    pub fn shadow_map_texture(&self) -> Option<GpuTextureId> {
        self.shadow.target.map(|t| t.texture)
    }
}

impl<B: RenderBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        if let Some(target) = self.shadow.target.take() {
            self.backend.delete_depth_target(&target);
        }
        self.resources.release_all(&mut self.backend);
    }
}
