//! Single unlit triangle with the cat texture

use demo_app::{setup, spawn_camera, CAT_TEXTURE};
use gl_engine::prelude::*;

struct TexturedTriangle {
    scene: Scene,
    triangle: Option<GameObjectId>,
}

impl Application for TexturedTriangle {
    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let mesh = ctx.renderer.create_mesh(&MeshFactory::triangle())?;
        let texture = ctx.renderer.load_texture(CAT_TEXTURE)?;

        let triangle = self.scene.create_object("Triangle");
        self.scene.add_component(triangle, Transform::default());
        self.scene.add_component(triangle, MeshRenderer::new(mesh).texture(texture).mode(RenderMode::Unlit));
        self.triangle = Some(triangle);

        spawn_camera(&mut self.scene, Vec3::new(0.0, 0.0, 2.5), Vec3::zeros(), 45.0);
        self.scene.set_clear_color(Vec3::new(0.1, 0.2, 0.3));
        Ok(())
    }

    fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn on_update(&mut self, _ctx: &mut AppContext<'_>, time: FrameTime) -> Result<(), AppError> {
        // Gentle sway around the vertical axis.
        let transform = self
            .triangle
            .and_then(|id| self.scene.object_mut(id))
            .and_then(GameObject::transform_mut);
        if let Some(transform) = transform {
            transform.rotation.y = 30.0 * time.total.sin();
        }
        Ok(())
    }
}

fn main() -> Result<(), AppError> {
    let config = setup();
    run_application(config, &mut TexturedTriangle { scene: Scene::new(), triangle: None })
}
