//! # Unified Configuration System
//!
//! Configuration for the window, the renderer and its shadow pass. Every
//! struct has working defaults so a missing config file still produces a
//! runnable application.
//!
//! ```toml
//! [window]
//! title = "Cool GL"
//! width = 1280
//!
//! [renderer.shadows]
//! enabled = true
//! pcf_samples = 25
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Wait for vertical sync when presenting
    pub vsync: bool,
    /// Allow the user to resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Cool GL".to_string(),
            width: 800,
            height: 800,
            vsync: true,
            resizable: true,
        }
    }
}

/// # Shadow Settings
///
/// Parameters of the single-light shadow map pass. `use_advanced_shadows` and
/// `use_contact_hardening` are forwarded to the lit shader but currently select no
/// alternate code path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Run the depth pass and sample the shadow map
    pub enabled: bool,
    /// Depth bias applied when comparing against the shadow map
    pub bias: f32,
    /// Requested percentage-closer filter taps; rounded to a square kernel
    pub pcf_samples: u32,
    /// Edge length of the square depth texture
    pub shadow_map_size: u32,
    /// Reserved toggle forwarded to shaders
    pub use_advanced_shadows: bool,
    /// Reserved toggle forwarded to shaders
    pub use_contact_hardening: bool,
    /// Half extent of the light's orthographic frustum
    pub frustum_half_extent: f32,
    /// Near plane of the light frustum
    pub near_plane: f32,
    /// Far plane of the light frustum
    pub far_plane: f32,
    /// Distance of the virtual light eye from the origin
    pub light_distance: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bias: 0.005,
            pcf_samples: 9,
            shadow_map_size: 2048,
            use_advanced_shadows: false,
            use_contact_hardening: false,
            frustum_half_extent: 15.0,
            near_plane: 1.0,
            far_plane: 50.0,
            light_distance: 20.0,
        }
    }
}

impl ShadowSettings {
    /// Half width of the square PCF kernel, e.g. 9 samples -> radius 1 (3x3)
    pub fn pcf_radius(&self) -> i32 {
        let side = (self.pcf_samples.max(1) as f32).sqrt().round().max(1.0) as i32;
        (side - 1) / 2
    }
}

/// # Renderer Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Shadow map pass settings
    pub shadows: ShadowSettings,
    /// Initial clear color (RGB)
    pub clear_color: [f32; 3],
    /// Enable depth testing for scene draws
    pub depth_test: bool,
    /// Cull back faces for scene draws
    pub back_face_culling: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shadows: ShadowSettings::default(),
            clear_color: [0.1, 0.1, 0.1],
            depth_test: true,
            back_face_culling: true,
        }
    }
}

/// # Application Configuration
///
/// Top-level configuration loaded by the demo binaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
}

impl Config for ApplicationConfig {}
impl Config for RendererConfig {}
impl Config for WindowConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_defaults() {
        let shadows = ShadowSettings::default();
        assert!(!shadows.enabled);
        assert_eq!(shadows.bias, 0.005);
        assert_eq!(shadows.pcf_samples, 9);
        assert_eq!(shadows.shadow_map_size, 2048);
        assert!(!shadows.use_advanced_shadows);
        assert!(!shadows.use_contact_hardening);
    }

    #[test]
    fn test_pcf_radius_rounds_to_square_kernel() {
        let mut shadows = ShadowSettings::default();
        assert_eq!(shadows.pcf_radius(), 1);
        shadows.pcf_samples = 25;
        assert_eq!(shadows.pcf_radius(), 2);
        shadows.pcf_samples = 1;
        assert_eq!(shadows.pcf_radius(), 0);
        shadows.pcf_samples = 0;
        assert_eq!(shadows.pcf_radius(), 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApplicationConfig = toml::from_str(
            "[window]\ntitle = \"Cats\"\n\n[renderer.shadows]\nenabled = true\n",
        )
        .expect("valid toml");
        assert_eq!(config.window.title, "Cats");
        assert_eq!(config.window.width, 800);
        assert!(config.renderer.shadows.enabled);
        assert_eq!(config.renderer.shadows.shadow_map_size, 2048);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ApplicationConfig::load_or_default("definitely/not/here.toml");
        assert_eq!(config, ApplicationConfig::default());
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gl_engine_{}_{}", std::process::id(), name))
    }

    fn customized() -> ApplicationConfig {
        let mut config = ApplicationConfig::default();
        config.window.title = "Shadows".to_string();
        config.window.vsync = false;
        config.renderer.clear_color = [0.25, 0.5, 0.75];
        config.renderer.shadows.enabled = true;
        config.renderer.shadows.pcf_samples = 25;
        config
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_path("config.json");
        std::fs::write(&path, "{}").expect("write json");

        let load = WindowConfig::load_from_file(&path);
        let save = WindowConfig::default().save_to_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(load, Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(save, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_supported_file_is_io_error() {
        let result = WindowConfig::load_from_file(temp_path("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_toml_save_then_load() {
        let path = temp_path("app.toml");
        let config = customized();
        config.save_to_file(&path).expect("save toml");
        let loaded = ApplicationConfig::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.expect("load toml"), config);
    }

    #[test]
    fn test_ron_save_then_load() {
        let path = temp_path("app.ron");
        let config = customized();
        config.save_to_file(&path).expect("save ron");
        let loaded = ApplicationConfig::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.expect("load ron"), config);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_path("broken.ron");
        std::fs::write(&path, "(window: (width: \"wide\"))").expect("write ron");
        let result = ApplicationConfig::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
