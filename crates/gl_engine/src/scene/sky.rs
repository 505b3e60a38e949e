//! Equirectangular sky and image-based ambient color

use std::path::Path;

use crate::assets::ImageData;
use crate::ecs::components::{MeshRenderer, RenderMode, Transform};
use crate::render::api::{RenderBackend, TextureDescriptor};
use crate::render::primitives::MeshFactory;
use crate::render::renderer::Renderer;
use crate::render::RenderResult;
use crate::scene::Scene;

impl Scene {
    /// Use an equirectangular image as sky and ambient source
    ///
    /// The image's average color becomes both the ambient and the clear
    /// color. A skybox object drawn before every other object is created on
    /// first use; later calls swap its texture and release the previous one.
    pub fn set_sky_from_equirect<B: RenderBackend>(
        &mut self,
        path: impl AsRef<Path>,
        renderer: &mut Renderer<B>,
    ) -> RenderResult<()> {
        let path = path.as_ref();
        let image = ImageData::from_file(path)?;
        let average = image.average_color();
        let texture = renderer.create_texture(&image, &TextureDescriptor::sky())?;

        self.ambient_color = average;
        self.clear_color = average;

        let existing = self
            .skybox
            .and_then(|id| self.objects.get_mut(id))
            .and_then(|object| object.get_component_mut::<MeshRenderer>());
        if let Some(mesh_renderer) = existing {
            if let Some(previous) = mesh_renderer.texture.replace(texture) {
                renderer.release_texture(previous);
            }
        } else {
            let mesh = renderer.create_mesh(&MeshFactory::sky_cube())?;
            let id = self.create_object("Skybox");
            self.add_component(id, Transform::default());
            self.add_component(id, MeshRenderer::new(mesh).texture(texture).mode(RenderMode::Skybox));
            self.order.retain(|&other| other != id);
            self.skybox = Some(id);
        }

        log::info!(
            "Sky set from {} (ambient {:.3}, {:.3}, {:.3})",
            path.display(),
            average.x,
            average.y,
            average.z
        );
        Ok(())
    }

    /// Whether a skybox object is installed
    pub fn has_skybox(&self) -> bool {
        self.skybox.is_some()
    }
}
