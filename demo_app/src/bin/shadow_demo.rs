//! Cubes on a ground plane lit by a shadow-casting sun

use demo_app::{setup, spawn_debug_camera, spawn_sun};
use gl_engine::prelude::*;

struct ShadowDemo {
    scene: Scene,
}

impl Application for ShadowDemo {
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let mut shadows = ctx.renderer.shadow_settings().clone();
        shadows.enabled = true;
        ctx.renderer.set_shadow_settings(shadows);

        let plane = ctx.renderer.create_mesh(&MeshFactory::unit_plane())?;
        let cube = ctx.renderer.create_mesh(&MeshFactory::unit_cube())?;

        let ground = self.scene.create_object("Ground");
        self.scene.add_component(ground, Transform::default().with_uniform_scale(30.0));
        let mut ground_renderer = MeshRenderer::new(plane).color(Vec3::new(0.8, 0.8, 0.8));
        ground_renderer.cast_shadows = false;
        self.scene.add_component(ground, ground_renderer);

        let first = self.scene.create_object("Cube");
        self.scene.add_component(first, Transform::from_position(Vec3::new(-3.0, 1.0, 0.0)));
        self.scene.add_component(first, MeshRenderer::new(cube).color(Vec3::new(0.9, 0.3, 0.2)));
        self.scene.add_component(first, Rotator::new(30.0));

        for (i, x) in [0.0_f32, 3.0].into_iter().enumerate() {
            let Some(clone) = self.scene.instantiate(first) else {
                continue;
            };
            if let Some(transform) = self.scene.object_mut(clone).and_then(GameObject::transform_mut) {
                transform.position = Vec3::new(x, 1.0 + i as f32, 0.0);
            }
        }

        spawn_debug_camera(&mut self.scene, ctx.input, Vec3::new(0.0, 8.0, 14.0), Vec3::new(-25.0, 0.0, 0.0));
        spawn_sun(&mut self.scene, Vec3::new(-50.0, 30.0, 0.0));
        Ok(())
    }

    fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

fn main() -> Result<(), AppError> {
    let config = setup();
    run_application(config, &mut ShadowDemo { scene: Scene::new() })
}
