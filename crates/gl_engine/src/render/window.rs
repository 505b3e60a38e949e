//! GLFW window with an OpenGL 4.1 core context

use thiserror::Error;

use crate::core::config::WindowConfig;
use crate::input::{InputDispatcher, InputState};
use crate::render::api::Viewport;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// Window or context creation failed
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window owning the current GL context
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window").field("framebuffer_size", &self.framebuffer_size()).finish()
    }
}

impl Window {
    /// Create the window, make its context current and apply the swap interval
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(4, 1));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        glfw::Context::make_current(&mut *window);
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        log::info!("Created window '{}' ({}x{})", config.title, config.width, config.height);
        Ok(Self { glfw, window, events })
    }

    /// Address of a GL entry point for the current context
    pub fn proc_address(&mut self, name: &str) -> *const std::ffi::c_void {
        self.window.get_proc_address(name) as *const _
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request the main loop to stop
    pub fn set_should_close(&mut self, value: bool) {
        self.window.set_should_close(value);
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        glfw::Context::swap_buffers(&mut *self.window);
    }

    /// Seconds since GLFW initialization
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Poll window events, forwarding scroll offsets to `dispatcher`.
    ///
    /// Returns the new viewport when the framebuffer was resized.
    pub fn poll_events(&mut self, dispatcher: &mut InputDispatcher) -> Option<Viewport> {
        self.glfw.poll_events();
        let mut resized = None;
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::Scroll(_, y) => dispatcher.dispatch_scroll(y),
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    log::debug!("Framebuffer resized to {}x{}", width, height);
                    resized = Some(Viewport::new(width.max(0) as u32, height.max(0) as u32));
                }
                _ => {}
            }
        }
        resized
    }

    /// Snapshot of cursor position and mouse buttons
    pub fn input_state(&self) -> InputState {
        let pressed = |button| self.window.get_mouse_button(button) == glfw::Action::Press;
        InputState {
            cursor_position: self.window.get_cursor_pos(),
            left_button: pressed(glfw::MouseButtonLeft),
            right_button: pressed(glfw::MouseButtonRight),
            middle_button: pressed(glfw::MouseButtonMiddle),
        }
    }
}
