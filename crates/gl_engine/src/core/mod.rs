//! # Core Engine Module
//!
//! Shared configuration used by the window, renderer and applications.

pub mod config;

pub use config::{
    ApplicationConfig,
    WindowConfig,
    RendererConfig,
    ShadowSettings,
    Config,
    ConfigError,
};
