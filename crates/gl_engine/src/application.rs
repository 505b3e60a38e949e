//! Application trait and main loop

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::core::config::ApplicationConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::{FpsCounter, FrameTime, Timer};
use crate::input::InputDispatcher;
use crate::render::backends::OpenGlBackend;
use crate::render::renderer::Renderer;
use crate::render::window::{Window, WindowError};
use crate::render::RenderError;
use crate::scene::Scene;

/// Frames averaged per FPS log line
const FPS_WINDOW: u32 = 120;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Rendering failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Window or context creation failed
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Asset loading failed
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Engine services handed to application hooks
pub struct AppContext<'a> {
    /// Renderer owning every GPU resource
    pub renderer: &'a mut Renderer<OpenGlBackend>,
    /// Scroll event fan-out
    pub input: &'a mut InputDispatcher,
    /// Configuration the loop was started with
    pub config: &'a ApplicationConfig,
}

/// Application lifecycle trait
///
/// The loop updates and renders [`Application::scene`] every frame; the
/// hooks run around it.
pub trait Application {
    /// Build the scene; called once after the window and renderer exist
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError>;

    /// Scene driven by the loop
    fn scene(&mut self) -> &mut Scene;

    /// Called every frame before the scene update
    fn on_update(&mut self, _ctx: &mut AppContext<'_>, _time: FrameTime) -> Result<(), AppError> {
        Ok(())
    }

    /// Called every frame after the scene has rendered, before the swap
    fn on_render(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Create the window and renderer and run `app` until the window closes
pub fn run_application<A: Application>(config: ApplicationConfig, app: &mut A) -> Result<(), AppError> {
    let mut window = Window::new(&config.window)?;
    let backend = OpenGlBackend::from_window(&mut window);
    // Declared after the window so GPU resources are released while the context is alive.
    let mut renderer = Renderer::new(backend, config.renderer.clone());
    let mut dispatcher = InputDispatcher::new();

    app.scene().set_clear_color(Vec3::from(config.renderer.clear_color));
    app.initialize(&mut AppContext { renderer: &mut renderer, input: &mut dispatcher, config: &config })?;

    let mut timer = Timer::new();
    let mut fps = FpsCounter::new(FPS_WINDOW);
    log::info!("Starting main loop");

    while !window.should_close() {
        let time = timer.tick(window.time());
        app.scene().set_input_state(window.input_state());

        app.on_update(&mut AppContext { renderer: &mut renderer, input: &mut dispatcher, config: &config }, time)?;
        app.scene().update(time);
        app.scene().render(&mut renderer)?;
        app.on_render(&mut AppContext { renderer: &mut renderer, input: &mut dispatcher, config: &config })?;

        window.swap_buffers();
        if let Some(viewport) = window.poll_events(&mut dispatcher) {
            renderer.set_viewport(viewport);
        }

        if let Some(report) = fps.record(time.delta) {
            log::info!("FPS avg {:.1} (min {:.1}, max {:.1})", report.average, report.min, report.max);
        }
    }

    log::info!("Shutting down after {} frames", timer.frame_count());
    Ok(())
}
