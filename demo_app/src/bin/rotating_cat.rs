//! Textured cat spinning under a single sun

use demo_app::{cat_material, load_cat, setup, spawn_camera, spawn_sun};
use gl_engine::prelude::*;

struct RotatingCat {
    scene: Scene,
}

impl Application for RotatingCat {
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let mesh = ctx.renderer.create_mesh(&load_cat()?)?;
        let material = ctx.renderer.create_material(cat_material());

        let cat = self.scene.create_object("Cat");
        self.scene.add_component(cat, Transform::default().with_rotation(Vec3::new(-90.0, 0.0, 0.0)));
        self.scene.add_component(cat, MeshRenderer::with_material(mesh, material));
        self.scene.add_component(cat, Rotator::new(45.0));

        spawn_camera(&mut self.scene, Vec3::new(0.0, 1.0, 5.0), Vec3::zeros(), 45.0);
        spawn_sun(&mut self.scene, Vec3::new(-45.0, 30.0, 0.0));
        Ok(())
    }

    fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

fn main() -> Result<(), AppError> {
    let config = setup();
    run_application(config, &mut RotatingCat { scene: Scene::new() })
}
