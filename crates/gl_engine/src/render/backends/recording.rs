//! In-memory backend that records every call
//!
//! Used by tests to check what the scene and renderer ask of the GPU without
//! a context. Ids are handed out sequentially.

use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{
    BackendResult, ClearFlags, CullMode, DepthFunc, DepthTarget, GpuMeshId, GpuProgramId,
    GpuTextureId, RenderBackend, TextureDescriptor, UniformValue, Viewport,
};
use crate::render::primitives::Vertex;
use crate::render::{RenderError, ShaderStage};

/// Owned copy of an uploaded uniform
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    /// `int`
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3(Vec3),
    /// `vec3[]`
    Vec3Array(Vec<Vec3>),
    /// `mat4`
    Mat4(Mat4),
}

impl From<UniformValue<'_>> for RecordedUniform {
    fn from(value: UniformValue<'_>) -> Self {
        match value {
            UniformValue::Int(v) => Self::Int(v),
            UniformValue::Float(v) => Self::Float(v),
            UniformValue::Vec3(v) => Self::Vec3(v),
            UniformValue::Vec3Array(v) => Self::Vec3Array(v.to_vec()),
            UniformValue::Mat4(v) => Self::Mat4(v),
        }
    }
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `set_viewport`
    SetViewport(Viewport),
    /// `clear`
    Clear {
        /// Buffers cleared
        flags: ClearFlags,
        /// Clear color
        color: [f32; 4],
    },
    /// `set_depth_test`
    SetDepthTest(bool),
    /// `set_depth_write`
    SetDepthWrite(bool),
    /// `set_depth_func`
    SetDepthFunc(DepthFunc),
    /// `set_cull_mode`
    SetCullMode(CullMode),
    /// `create_mesh`
    CreateMesh {
        /// Id handed out
        mesh: GpuMeshId,
        /// Vertices uploaded
        vertex_count: usize,
        /// Indices uploaded
        index_count: usize,
    },
    /// `set_instance_transforms`
    SetInstanceTransforms {
        /// Target mesh
        mesh: GpuMeshId,
        /// Number of instances
        count: usize,
    },
    /// `draw_mesh`
    DrawMesh {
        /// Mesh drawn
        mesh: GpuMeshId,
        /// Indices drawn
        index_count: u32,
        /// Instance count for instanced draws
        instances: Option<u32>,
    },
    /// `delete_mesh`
    DeleteMesh(GpuMeshId),
    /// `create_program`
    CreateProgram {
        /// Id handed out
        program: GpuProgramId,
    },
    /// `use_program`
    UseProgram(GpuProgramId),
    /// `set_uniform`
    SetUniform {
        /// Uniform name
        name: String,
        /// Uploaded value
        value: RecordedUniform,
    },
    /// `delete_program`
    DeleteProgram(GpuProgramId),
    /// `create_texture`
    CreateTexture {
        /// Id handed out
        texture: GpuTextureId,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// `bind_texture`
    BindTexture {
        /// Texture bound
        texture: GpuTextureId,
        /// Sampler unit
        unit: u32,
    },
    /// `delete_texture`
    DeleteTexture(GpuTextureId),
    /// `create_depth_target`
    CreateDepthTarget {
        /// Edge length
        size: u32,
    },
    /// `bind_depth_target`; framebuffer id or `None` for the default
    BindDepthTarget(Option<u64>),
    /// `delete_depth_target`
    DeleteDepthTarget(u64),
}

/// Backend double recording calls in order
#[derive(Debug)]
pub struct RecordingBackend {
    viewport: Viewport,
    calls: Rc<RefCell<Vec<BackendCall>>>,
    next_id: u64,
    fail_next_program: Option<String>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(Viewport::new(800, 800))
    }
}

impl RecordingBackend {
    /// Create a backend reporting `viewport`
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            calls: Rc::new(RefCell::new(Vec::new())),
            next_id: 1,
            fail_next_program: None,
        }
    }

    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Snapshot of every call so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    /// Remove and return the recorded calls
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Log shared with the backend; stays readable after it is dropped
    pub fn shared_log(&self) -> Rc<RefCell<Vec<BackendCall>>> {
        Rc::clone(&self.calls)
    }

    /// Number of calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    /// Number of draw calls
    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::DrawMesh { .. }))
    }

    /// Number of clear calls
    pub fn clear_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Clear { .. }))
    }

    /// Number of uploads to uniform `name`
    pub fn uniform_uploads(&self, name: &str) -> usize {
        self.count(|c| matches!(c, BackendCall::SetUniform { name: n, .. } if n == name))
    }

    /// Last value uploaded to uniform `name`
    pub fn last_uniform(&self, name: &str) -> Option<RecordedUniform> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            BackendCall::SetUniform { name: n, value } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    /// Make the next `create_program` fail with a compile error
    pub fn fail_next_program(&mut self, log: impl Into<String>) {
        self.fail_next_program = Some(log.into());
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.record(BackendCall::SetViewport(viewport));
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        self.record(BackendCall::Clear { flags, color });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(BackendCall::SetDepthTest(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.record(BackendCall::SetDepthWrite(enabled));
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.record(BackendCall::SetDepthFunc(func));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.record(BackendCall::SetCullMode(mode));
    }

    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<GpuMeshId> {
        let mesh = GpuMeshId(self.next_id());
        self.record(BackendCall::CreateMesh {
            mesh,
            vertex_count: vertices.len(),
            index_count: indices.len(),
        });
        Ok(mesh)
    }

    fn set_instance_transforms(&mut self, mesh: GpuMeshId, transforms: &[Mat4]) -> BackendResult<()> {
        self.record(BackendCall::SetInstanceTransforms { mesh, count: transforms.len() });
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: GpuMeshId, index_count: u32, instances: Option<u32>) {
        self.record(BackendCall::DrawMesh { mesh, index_count, instances });
    }

    fn delete_mesh(&mut self, mesh: GpuMeshId) {
        self.record(BackendCall::DeleteMesh(mesh));
    }

    fn create_program(&mut self, _vertex_source: &str, _fragment_source: &str) -> BackendResult<GpuProgramId> {
        if let Some(log) = self.fail_next_program.take() {
            return Err(RenderError::ShaderCompilation { stage: ShaderStage::Fragment, log });
        }
        let program = GpuProgramId(self.next_id());
        self.record(BackendCall::CreateProgram { program });
        Ok(program)
    }

    fn use_program(&mut self, program: GpuProgramId) {
        self.record(BackendCall::UseProgram(program));
    }

    fn set_uniform(&mut self, _program: GpuProgramId, name: &str, value: UniformValue<'_>) {
        self.record(BackendCall::SetUniform {
            name: name.to_string(),
            value: value.into(),
        });
    }

    fn delete_program(&mut self, program: GpuProgramId) {
        self.record(BackendCall::DeleteProgram(program));
    }

    fn create_texture(&mut self, image: &ImageData, _descriptor: &TextureDescriptor) -> BackendResult<GpuTextureId> {
        let texture = GpuTextureId(self.next_id());
        self.record(BackendCall::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        Ok(texture)
    }

    fn bind_texture(&mut self, texture: GpuTextureId, unit: u32) {
        self.record(BackendCall::BindTexture { texture, unit });
    }

    fn delete_texture(&mut self, texture: GpuTextureId) {
        self.record(BackendCall::DeleteTexture(texture));
    }

    fn create_depth_target(&mut self, size: u32) -> BackendResult<DepthTarget> {
        let framebuffer = self.next_id();
        let texture = GpuTextureId(self.next_id());
        self.record(BackendCall::CreateDepthTarget { size });
        Ok(DepthTarget { framebuffer, texture, size })
    }

    fn bind_depth_target(&mut self, target: Option<&DepthTarget>) {
        self.record(BackendCall::BindDepthTarget(target.map(|t| t.framebuffer)));
    }

    fn delete_depth_target(&mut self, target: &DepthTarget) {
        self.record(BackendCall::DeleteDepthTarget(target.framebuffer));
    }
}
