//! Equirectangular sky around a mouse-driven camera

use demo_app::{setup, spawn_debug_camera, spawn_sun, CAT_SKY};
use gl_engine::prelude::*;

struct JustSky {
    scene: Scene,
}

impl Application for JustSky {
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        spawn_debug_camera(&mut self.scene, ctx.input, Vec3::new(0.0, 4.0, -8.0), Vec3::new(-7.0, 180.0, 0.0));
        spawn_sun(&mut self.scene, Vec3::new(45.0, -120.0, 0.0));
        self.scene.set_sky_from_equirect(CAT_SKY, ctx.renderer)?;
        Ok(())
    }

    fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

fn main() -> Result<(), AppError> {
    let config = setup();
    run_application(config, &mut JustSky { scene: Scene::new() })
}
