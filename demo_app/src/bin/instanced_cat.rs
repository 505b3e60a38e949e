//! Ten thousand cats from one instanced draw

use demo_app::{cat_material, load_cat, setup, spawn_debug_camera, spawn_sun, CAT_SKY};
use gl_engine::foundation::math::utils::deg_to_rad;
use gl_engine::prelude::*;

const GRID: i32 = 100;

fn cat_grid() -> Vec<Mat4> {
    let upright = Mat4::rotation_x(deg_to_rad(-90.0)) * Mat4::rotation_z(deg_to_rad(180.0));
    (0..GRID)
        .flat_map(|i| (0..GRID).map(move |j| (i, j)))
        .map(|(i, j)| Mat4::new_translation(&Vec3::new((i - GRID / 2) as f32, 0.0, j as f32)) * upright)
        .collect()
}

struct InstancedCats {
    scene: Scene,
}

impl Application for InstancedCats {
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let cats = ctx.renderer.create_instanced_mesh(&load_cat()?, &cat_grid())?;
        let material = ctx.renderer.create_material(cat_material());
        let herd = self.scene.create_object("Cats");
        self.scene.add_component(herd, Transform::default());
        self.scene.add_component(herd, MeshRenderer::with_material(cats, material));

        let plane = ctx.renderer.create_mesh(&MeshFactory::unit_plane())?;
        let ground_material = ctx.renderer.create_material(
            MaterialDescriptor::colored(Vec3::new(1.0, 1.0, 1.0)).with_smoothness(0.6),
        );
        let ground = self.scene.create_object("Ground");
        self.scene.add_component(ground, Transform::default().with_uniform_scale(100.0));
        self.scene.add_component(ground, MeshRenderer::with_material(plane, ground_material));

        spawn_debug_camera(&mut self.scene, ctx.input, Vec3::new(0.0, 30.0, -30.0), Vec3::new(-45.0, 180.0, 0.0));
        spawn_sun(&mut self.scene, Vec3::new(-45.0, 60.0, 0.0));
        self.scene.set_sky_from_equirect(CAT_SKY, ctx.renderer)?;
        Ok(())
    }

    fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

fn main() -> Result<(), AppError> {
    let config = setup();
    run_application(config, &mut InstancedCats { scene: Scene::new() })
}
