//! OpenGL 4.1 core backend built on `glow`
//!
//! All raw GL calls of the crate live in this module.

use std::collections::HashMap;

use glow::HasContext;

use crate::assets::ImageData;
use crate::foundation::math::Mat4;
use crate::render::api::{
    BackendResult, ClearFlags, CullMode, DepthFunc, DepthTarget, GpuMeshId, GpuProgramId,
    GpuTextureId, RenderBackend, TextureDescriptor, TextureFilter, TextureWrap, UniformValue,
    Viewport,
};
use crate::render::primitives::Vertex;
use crate::render::window::Window;
use crate::render::{RenderError, ShaderStage};

const INSTANCE_ATTRIBUTE: u32 = 3;

struct GlMesh {
    vao: glow::VertexArray,
    vertex_buffer: glow::Buffer,
    index_buffer: glow::Buffer,
    instance_buffer: Option<glow::Buffer>,
}

struct GlProgram {
    program: glow::Program,
    locations: HashMap<String, Option<glow::UniformLocation>>,
}

/// Backend issuing OpenGL calls on the current context
pub struct OpenGlBackend {
    gl: glow::Context,
    viewport: Viewport,
    meshes: HashMap<u64, GlMesh>,
    programs: HashMap<u64, GlProgram>,
    textures: HashMap<u64, glow::Texture>,
    framebuffers: HashMap<u64, glow::Framebuffer>,
    next_id: u64,
}

impl std::fmt::Debug for OpenGlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenGlBackend")
            .field("viewport", &self.viewport)
            .field("meshes", &self.meshes.len())
            .field("programs", &self.programs.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

fn backend_error(what: &str, e: String) -> RenderError {
    RenderError::ResourceCreationFailed(format!("{what}: {e}"))
}

impl OpenGlBackend {
    /// Load GL entry points from the window's current context
    pub fn from_window(window: &mut Window) -> Self {
        // SAFETY: the window's context is current on this thread.
        let gl = unsafe { glow::Context::from_loader_function(|name| window.proc_address(name)) };
        let (width, height) = window.framebuffer_size();
        Self::new(gl, Viewport::new(width, height))
    }

    /// Wrap an already loaded context
    pub fn new(gl: glow::Context, viewport: Viewport) -> Self {
        // SAFETY: plain state setters on a loaded context.
        unsafe {
            log::info!(
                "OpenGL {} on {}",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
            gl.viewport(viewport.x, viewport.y, viewport.width as i32, viewport.height as i32);
        }
        Self {
            gl,
            viewport,
            meshes: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> BackendResult<glow::Shader> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        // SAFETY: the shader object is deleted on failure and owned by the caller otherwise.
        unsafe {
            let shader = self.gl.create_shader(kind).map_err(|e| backend_error("shader", e))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(RenderError::ShaderCompilation { stage, log });
            }
            Ok(shader)
        }
    }
}

impl RenderBackend for OpenGlBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        // SAFETY: state setter.
        unsafe {
            self.gl.viewport(viewport.x, viewport.y, viewport.width as i32, viewport.height as i32);
        }
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        // SAFETY: state setters.
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(mask);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        // SAFETY: state setter.
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_depth_write(&mut self, enabled: bool) {
        // SAFETY: state setter.
        unsafe { self.gl.depth_mask(enabled) }
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => glow::LESS,
            DepthFunc::LessEqual => glow::LEQUAL,
        };
        // SAFETY: state setter.
        unsafe { self.gl.depth_func(func) }
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        // SAFETY: state setters.
        unsafe {
            match mode {
                CullMode::Disabled => self.gl.disable(glow::CULL_FACE),
                CullMode::Back | CullMode::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.front_face(glow::CCW);
                    self.gl.cull_face(if mode == CullMode::Back { glow::BACK } else { glow::FRONT });
                }
            }
        }
    }

    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<GpuMeshId> {
        let stride = std::mem::size_of::<Vertex>() as i32;
        // SAFETY: buffers are filled from live slices and the VAO records the layout of `Vertex`.
        let mesh = unsafe {
            let vao = self.gl.create_vertex_array().map_err(|e| backend_error("vertex array", e))?;
            let vertex_buffer = self.gl.create_buffer().map_err(|e| backend_error("vertex buffer", e))?;
            let index_buffer = self.gl.create_buffer().map_err(|e| backend_error("index buffer", e))?;

            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex_buffer));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(vertices), glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
            self.gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(indices), glow::STATIC_DRAW);

            self.gl.enable_vertex_attrib_array(0);
            self.gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            self.gl.enable_vertex_attrib_array(1);
            self.gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
            self.gl.enable_vertex_attrib_array(2);
            self.gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 24);

            self.gl.bind_vertex_array(None);
            GlMesh { vao, vertex_buffer, index_buffer, instance_buffer: None }
        };

        let id = self.next_id();
        self.meshes.insert(id, mesh);
        Ok(GpuMeshId(id))
    }

    fn set_instance_transforms(&mut self, mesh: GpuMeshId, transforms: &[Mat4]) -> BackendResult<()> {
        let entry = self.meshes.get_mut(&mesh.0).ok_or(RenderError::InvalidHandle("mesh"))?;
        let data: Vec<f32> = transforms.iter().flat_map(|m| m.as_slice().iter().copied()).collect();
        let stride = std::mem::size_of::<[f32; 16]>() as i32;

        // SAFETY: the instance buffer belongs to this VAO; each mat4 column is one vec4 attribute.
        unsafe {
            let buffer = match entry.instance_buffer {
                Some(buffer) => buffer,
                None => self.gl.create_buffer().map_err(|e| backend_error("instance buffer", e))?,
            };
            self.gl.bind_vertex_array(Some(entry.vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(&data), glow::DYNAMIC_DRAW);
            for column in 0..4 {
                let location = INSTANCE_ATTRIBUTE + column;
                self.gl.enable_vertex_attrib_array(location);
                self.gl.vertex_attrib_pointer_f32(location, 4, glow::FLOAT, false, stride, (column * 16) as i32);
                self.gl.vertex_attrib_divisor(location, 1);
            }
            self.gl.bind_vertex_array(None);
            entry.instance_buffer = Some(buffer);
        }
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: GpuMeshId, index_count: u32, instances: Option<u32>) {
        let Some(entry) = self.meshes.get(&mesh.0) else {
            log::warn!("Draw of unknown mesh {:?}", mesh);
            return;
        };
        // SAFETY: the VAO owns a complete index buffer of `index_count` entries.
        unsafe {
            self.gl.bind_vertex_array(Some(entry.vao));
            match instances {
                Some(count) => self.gl.draw_elements_instanced(
                    glow::TRIANGLES,
                    index_count as i32,
                    glow::UNSIGNED_INT,
                    0,
                    count as i32,
                ),
                None => self.gl.draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0),
            }
            self.gl.bind_vertex_array(None);
        }
    }

    fn delete_mesh(&mut self, mesh: GpuMeshId) {
        let Some(entry) = self.meshes.remove(&mesh.0) else {
            return;
        };
        // SAFETY: the objects were created by this context and are no longer referenced.
        unsafe {
            self.gl.delete_vertex_array(entry.vao);
            self.gl.delete_buffer(entry.vertex_buffer);
            self.gl.delete_buffer(entry.index_buffer);
            if let Some(buffer) = entry.instance_buffer {
                self.gl.delete_buffer(buffer);
            }
        }
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<GpuProgramId> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = match self.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                // SAFETY: the vertex stage is not attached anywhere yet.
                unsafe { self.gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        // SAFETY: stages are detached and deleted once the link result is known.
        let program = unsafe {
            let program = self.gl.create_program().map_err(|e| backend_error("program", e))?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);
            if !linked {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(RenderError::ProgramLink(log));
            }
            program
        };

        let id = self.next_id();
        self.programs.insert(id, GlProgram { program, locations: HashMap::new() });
        Ok(GpuProgramId(id))
    }

    fn use_program(&mut self, program: GpuProgramId) {
        let native = self.programs.get(&program.0).map(|p| p.program);
        // SAFETY: state setter with a live program or none.
        unsafe { self.gl.use_program(native) }
    }

    fn set_uniform(&mut self, program: GpuProgramId, name: &str, value: UniformValue<'_>) {
        let Some(entry) = self.programs.get_mut(&program.0) else {
            return;
        };
        let gl = &self.gl;
        let native = entry.program;
        let location = entry
            .locations
            .entry(name.to_string())
            // SAFETY: lookup on a linked program.
            .or_insert_with(|| unsafe { gl.get_uniform_location(native, name) });
        let Some(location) = location.as_ref() else {
            return;
        };

        // SAFETY: uploads to the currently bound program, which owns `location`.
        unsafe {
            match value {
                UniformValue::Int(v) => gl.uniform_1_i32(Some(location), v),
                UniformValue::Float(v) => gl.uniform_1_f32(Some(location), v),
                UniformValue::Vec3(v) => gl.uniform_3_f32(Some(location), v.x, v.y, v.z),
                UniformValue::Vec3Array(values) => {
                    let flat: Vec<f32> = values.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
                    gl.uniform_3_f32_slice(Some(location), &flat);
                }
                UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(Some(location), false, m.as_slice()),
            }
        }
    }

    fn delete_program(&mut self, program: GpuProgramId) {
        if let Some(entry) = self.programs.remove(&program.0) {
            // SAFETY: program created by this context.
            unsafe { self.gl.delete_program(entry.program) }
        }
    }

    fn create_texture(&mut self, image: &ImageData, descriptor: &TextureDescriptor) -> BackendResult<GpuTextureId> {
        let wrap = match descriptor.wrap {
            TextureWrap::Repeat => glow::REPEAT,
            TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
            TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
        };
        let mag = match descriptor.mag_filter {
            TextureFilter::Nearest => glow::NEAREST,
            TextureFilter::Linear => glow::LINEAR,
        };
        let min = match (descriptor.min_filter, descriptor.generate_mipmaps) {
            (TextureFilter::Nearest, false) => glow::NEAREST,
            (TextureFilter::Linear, false) => glow::LINEAR,
            (TextureFilter::Nearest, true) => glow::NEAREST_MIPMAP_NEAREST,
            (TextureFilter::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
        };

        // SAFETY: `image.data` holds width * height RGBA8 texels.
        let texture = unsafe {
            let texture = self.gl.create_texture().map_err(|e| backend_error("texture", e))?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                image.width as i32,
                image.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(&image.data),
            );
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag as i32);
            if descriptor.depth_compare {
                self.gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_COMPARE_MODE,
                    glow::COMPARE_REF_TO_TEXTURE as i32,
                );
            }
            if descriptor.generate_mipmaps {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let id = self.next_id();
        self.textures.insert(id, texture);
        Ok(GpuTextureId(id))
    }

    fn bind_texture(&mut self, texture: GpuTextureId, unit: u32) {
        let native = self.textures.get(&texture.0).copied();
        // SAFETY: state setters.
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, native);
        }
    }

    fn delete_texture(&mut self, texture: GpuTextureId) {
        if let Some(native) = self.textures.remove(&texture.0) {
            // SAFETY: texture created by this context.
            unsafe { self.gl.delete_texture(native) }
        }
    }

    fn create_depth_target(&mut self, size: u32) -> BackendResult<DepthTarget> {
        // SAFETY: the depth texture is allocated before it is attached; the
        // default framebuffer is restored before returning.
        let (framebuffer, texture) = unsafe {
            let texture = self.gl.create_texture().map_err(|e| backend_error("depth texture", e))?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT24 as i32,
                size as i32,
                size as i32,
                0,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
                None,
            );
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_BORDER as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_BORDER as i32);
            self.gl.tex_parameter_f32_slice(glow::TEXTURE_2D, glow::TEXTURE_BORDER_COLOR, &[1.0, 1.0, 1.0, 1.0]);

            let framebuffer = self.gl.create_framebuffer().map_err(|e| backend_error("framebuffer", e))?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );
            self.gl.draw_buffer(glow::NONE);
            self.gl.read_buffer(glow::NONE);
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            self.gl.bind_texture(glow::TEXTURE_2D, None);

            if status != glow::FRAMEBUFFER_COMPLETE {
                self.gl.delete_framebuffer(framebuffer);
                self.gl.delete_texture(texture);
                return Err(RenderError::ResourceCreationFailed(format!(
                    "shadow framebuffer incomplete (status {status:#x})"
                )));
            }
            (framebuffer, texture)
        };

        let texture_id = self.next_id();
        self.textures.insert(texture_id, texture);
        let framebuffer_id = self.next_id();
        self.framebuffers.insert(framebuffer_id, framebuffer);
        Ok(DepthTarget { framebuffer: framebuffer_id, texture: GpuTextureId(texture_id), size })
    }

    fn bind_depth_target(&mut self, target: Option<&DepthTarget>) {
        let native = target.and_then(|t| self.framebuffers.get(&t.framebuffer).copied());
        // SAFETY: state setter with a live framebuffer or the default one.
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, native) }
    }

    fn delete_depth_target(&mut self, target: &DepthTarget) {
        if let Some(framebuffer) = self.framebuffers.remove(&target.framebuffer) {
            // SAFETY: framebuffer created by this context.
            unsafe { self.gl.delete_framebuffer(framebuffer) }
        }
        self.delete_texture(target.texture);
    }
}
