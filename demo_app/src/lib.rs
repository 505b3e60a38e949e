//! Shared setup for the demo programs
//!
//! Every demo loads `demo.toml` from the working directory when present and
//! expects its assets under `resources/`.

use gl_engine::prelude::*;

/// Cat model
pub const CAT_MODEL: &str = "resources/cat/cat.obj";
/// Cat albedo texture
pub const CAT_TEXTURE: &str = "resources/cat/cattex.png";
/// Equirectangular sky image
pub const CAT_SKY: &str = "resources/cat/catsky.png";
/// Optional configuration file
pub const CONFIG_PATH: &str = "demo.toml";

/// Warm white used by the demo sun
pub const SUN_COLOR: [f32; 3] = [1.0, 0.956_862_7, 0.839_215_7];

/// Initialize logging and load the demo configuration
pub fn setup() -> ApplicationConfig {
    gl_engine::foundation::logging::init();
    let config = ApplicationConfig::load_or_default(CONFIG_PATH);
    log::info!("Window {}x{}, shadows {}", config.window.width, config.window.height, config.renderer.shadows.enabled);
    config
}

/// Camera object at `position` looking along `rotation` (degrees)
pub fn spawn_camera(scene: &mut Scene, position: Vec3, rotation: Vec3, field_of_view_degrees: f32) -> GameObjectId {
    let id = scene.create_object("Camera");
    scene.add_component(id, Transform::from_position(position).with_rotation(rotation));
    scene.add_component(
        id,
        Camera {
            field_of_view_degrees,
            ..Camera::default()
        },
    );
    id
}

/// Camera driven by the mouse through a [`DebugCameraController`]
pub fn spawn_debug_camera(
    scene: &mut Scene,
    input: &mut InputDispatcher,
    position: Vec3,
    rotation: Vec3,
) -> GameObjectId {
    let id = spawn_camera(scene, position, rotation, 60.0);
    scene.add_component(id, DebugCameraController::new(input));
    id
}

/// Directional light rotated by `rotation` (degrees)
pub fn spawn_sun(scene: &mut Scene, rotation: Vec3) -> GameObjectId {
    let id = scene.create_object("Sun");
    scene.add_component(id, Transform::from_position(Vec3::new(0.0, 3.0, 0.0)).with_rotation(rotation));
    scene.add_component(id, Light::new(Vec3::from(SUN_COLOR), 1.0));
    id
}

/// Load the cat mesh
pub fn load_cat() -> Result<MeshData, AppError> {
    Ok(ModelLoader::load_first_mesh(CAT_MODEL, &LoadOptions::default())?)
}

/// Textured material using the built-in lit program
pub fn cat_material() -> MaterialDescriptor {
    MaterialDescriptor::colored(Vec3::new(1.0, 1.0, 1.0))
        .with_albedo(CAT_TEXTURE)
        .with_smoothness(0.6)
}
