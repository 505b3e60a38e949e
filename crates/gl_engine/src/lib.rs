//! # GL Engine
//!
//! A small scene and component runtime with an OpenGL 4.1 renderer.
//!
//! ## Features
//!
//! - **Scene/component runtime**: game objects holding a closed set of
//!   component variants plus user behaviours, with first-of-kind typed lookup
//! - **Renderer**: lit, unlit and skybox draws, instancing, light uniform
//!   caching and a directional shadow map pass
//! - **Backends**: OpenGL through `glow`, and an in-memory recording backend
//!   for tests
//! - **Assets**: OBJ models through `tobj`, images through `image`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_engine::prelude::*;
//!
//! struct Spinner {
//!     scene: Scene,
//! }
//!
//! impl Application for Spinner {
//!     fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
//!         let mesh = ctx.renderer.create_mesh(&MeshFactory::unit_cube())?;
//!
//!         let camera = self.scene.create_object("Camera");
//!         self.scene.add_component(camera, Transform::from_position(Vec3::new(0.0, 0.0, 5.0)));
//!         self.scene.add_component(camera, Camera::default());
//!
//!         let cube = self.scene.create_object("Cube");
//!         self.scene.add_component(cube, Transform::default());
//!         self.scene.add_component(cube, MeshRenderer::new(mesh));
//!         self.scene.add_component(cube, Rotator::default());
//!         Ok(())
//!     }
//!
//!     fn scene(&mut self) -> &mut Scene {
//!         &mut self.scene
//!     }
//! }
//!
//! fn main() -> Result<(), AppError> {
//!     gl_engine::foundation::logging::init();
//!     let mut app = Spinner { scene: Scene::new() };
//!     run_application(ApplicationConfig::default(), &mut app)
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

pub mod core;

pub mod application;
pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

pub use application::{run_application, AppContext, AppError, Application};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        application::{run_application, AppContext, AppError, Application},
        assets::{ImageData, LoadOptions, ModelLoader},
        core::config::{ApplicationConfig, Config, RendererConfig, ShadowSettings, WindowConfig},
        ecs::{
            AspectMode, Behaviour, Camera, Component, ComponentContext, DebugCameraController,
            GameObject, GameObjectId, Light, MeshRenderer, Projection, RenderMode, Rotator,
            Transform,
        },
        foundation::{
            math::{Mat4, Mat4Ext, Vec3},
            time::FrameTime,
        },
        input::{InputDispatcher, InputState},
        render::{
            MaterialDescriptor, MaterialHandle, MeshData, MeshFactory, MeshHandle, RenderError,
            Renderer, ShaderHandle, TextureHandle,
        },
        scene::Scene,
    };
}
