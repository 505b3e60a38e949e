//! Render system: mesh renderer components to renderer draw calls

use crate::ecs::components::{Camera, MeshRenderer, Projection, RenderMode, Transform};
use crate::ecs::systems::lighting::LightingSystem;
use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use crate::render::api::{RenderBackend, Viewport};
use crate::render::lighting::LightSet;
use crate::render::renderer::{LitDraw, Renderer, SkyboxDraw, UnlitDraw};
use crate::render::RenderResult;

/// Matrices of the active camera for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// Projection used for skyboxes; perspective even for orthographic cameras
    pub sky_projection: Mat4,
    /// World-space eye position
    pub position: Vec3,
}

impl CameraView {
    /// Resolve a camera against its transform and the current viewport
    pub fn new(camera: &Camera, transform: Option<&Transform>, viewport: Viewport) -> Self {
        let projection = camera.projection_matrix(viewport);
        let sky_projection = match camera.projection {
            Projection::Perspective => projection,
            Projection::Orthographic => camera.perspective_matrix(viewport),
        };
        Self {
            view: camera.view_matrix(transform),
            projection,
            sky_projection,
            position: camera.position(transform),
        }
    }
}

/// Per-frame data shared by every draw
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// Active camera
    pub camera: CameraView,
    /// World-space lights, never empty
    pub lights: LightSet,
    /// Scene ambient color
    pub ambient: Vec3,
}

impl FrameContext {
    /// Frame context; an empty light set is replaced by the default light
    pub fn new(camera: CameraView, lights: &LightSet, ambient: Vec3) -> Self {
        Self { camera, lights: LightingSystem::or_default(lights), ambient }
    }
}

struct Surface {
    shader: Option<crate::render::ShaderHandle>,
    texture: Option<crate::render::TextureHandle>,
    color: Vec3,
    smoothness: f32,
}

/// Turns [`MeshRenderer`] components into draws
pub struct RenderSystem;

impl RenderSystem {
    /// Draw one mesh renderer attached to an object with `transform`
    pub fn render<B: RenderBackend>(
        renderer: &mut Renderer<B>,
        mesh_renderer: &MeshRenderer,
        transform: Option<&Transform>,
        frame: &FrameContext,
    ) -> RenderResult<()> {
        let Some(mesh) = mesh_renderer.mesh else {
            log::trace!("Mesh renderer without mesh skipped");
            return Ok(());
        };
        let surface = Self::resolve_surface(renderer, mesh_renderer)?;
        let camera = &frame.camera;

        match mesh_renderer.render_mode {
            RenderMode::Skybox => renderer.draw_skybox(&SkyboxDraw {
                mesh,
                shader: surface.shader,
                texture: surface.texture,
                view: camera.view,
                projection: camera.sky_projection,
            }),
            RenderMode::Unlit => {
                let model = Self::model_matrix(transform);
                renderer.draw_unlit(&UnlitDraw {
                    mesh,
                    shader: surface.shader,
                    texture: surface.texture,
                    mvp: camera.projection * camera.view * model,
                    color: surface.color,
                })
            }
            RenderMode::Lit => {
                let model = Self::model_matrix(transform);
                let inverse_model = utils::inverse_or_identity(&model);
                let lights = LightingSystem::to_object_space(&frame.lights, &inverse_model);
                let eye = inverse_model.transform_point(&Point3::from(camera.position));
                renderer.draw_lit(&LitDraw {
                    mesh,
                    shader: surface.shader,
                    texture: surface.texture,
                    mvp: camera.projection * camera.view * model,
                    model,
                    lights: &lights,
                    camera_position: eye.coords,
                    ambient: frame.ambient.component_mul(&mesh_renderer.ambient_multiplier),
                    color: surface.color,
                    smoothness: surface.smoothness,
                })
            }
        }
    }

    /// Draw a mesh renderer into the shadow map, if it casts shadows
    pub fn render_depth<B: RenderBackend>(
        renderer: &mut Renderer<B>,
        mesh_renderer: &MeshRenderer,
        transform: Option<&Transform>,
    ) -> RenderResult<()> {
        if !mesh_renderer.cast_shadows || mesh_renderer.render_mode == RenderMode::Skybox {
            return Ok(());
        }
        let Some(mesh) = mesh_renderer.mesh else {
            return Ok(());
        };
        renderer.draw_mesh_for_depth(mesh, &Self::model_matrix(transform))
    }

    fn model_matrix(transform: Option<&Transform>) -> Mat4 {
        transform.map_or_else(Mat4::identity, Transform::local_to_world)
    }

    fn resolve_surface<B: RenderBackend>(
        renderer: &mut Renderer<B>,
        mesh_renderer: &MeshRenderer,
    ) -> RenderResult<Surface> {
        match mesh_renderer.material {
            Some(material) => {
                let resolved = renderer.ensure_material_resources(material)?;
                Ok(Surface {
                    shader: resolved.shader.or(mesh_renderer.shader),
                    texture: resolved.albedo,
                    color: resolved.base_color,
                    smoothness: resolved.smoothness,
                })
            }
            None => Ok(Surface {
                shader: mesh_renderer.shader,
                texture: mesh_renderer.texture,
                color: mesh_renderer.color,
                smoothness: mesh_renderer.smoothness,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RendererConfig;
    use crate::render::backends::recording::{BackendCall, RecordedUniform};
    use crate::render::backends::RecordingBackend;
    use crate::render::lighting::DirectionalLight;
    use crate::render::material::MaterialDescriptor;
    use crate::render::primitives::MeshFactory;
    use crate::render::shaders::uniforms;
    use approx::assert_relative_eq;

    fn setup() -> (Renderer<RecordingBackend>, crate::render::MeshHandle) {
        let mut renderer = Renderer::new(RecordingBackend::new(Viewport::new(800, 600)), RendererConfig::default());
        let mesh = renderer.create_mesh(&MeshFactory::unit_cube()).expect("mesh");
        renderer.backend_mut().take_calls();
        (renderer, mesh)
    }

    fn frame(lights: &LightSet) -> FrameContext {
        let camera = CameraView::new(&Camera::default(), None, Viewport::new(800, 600));
        FrameContext::new(camera, lights, Vec3::new(0.2, 0.2, 0.2))
    }

    #[test]
    fn test_lit_draw_uses_default_light_without_scene_lights() {
        let (mut renderer, mesh) = setup();
        RenderSystem::render(&mut renderer, &MeshRenderer::new(mesh), None, &frame(&LightSet::new()))
            .expect("render");

        assert_eq!(renderer.backend().draw_count(), 1);
        assert_eq!(
            renderer.backend().last_uniform(uniforms::LIGHT_COUNT),
            Some(RecordedUniform::Int(1))
        );
    }

    #[test]
    fn test_lit_lights_are_in_object_space() {
        let (mut renderer, mesh) = setup();
        let mut lights = LightSet::new();
        lights.push(DirectionalLight { direction: Vec3::new(1.0, 0.0, 0.0), color: Vec3::new(1.0, 1.0, 1.0) });
        let transform = Transform::default().with_rotation(Vec3::new(0.0, 90.0, 0.0));

        RenderSystem::render(&mut renderer, &MeshRenderer::new(mesh), Some(&transform), &frame(&lights))
            .expect("render");

        let Some(RecordedUniform::Vec3Array(directions)) = renderer.backend().last_uniform(uniforms::LIGHT_DIRECTIONS)
        else {
            panic!("light directions not uploaded");
        };
        let expected = utils::upper_left_3x3(&utils::inverse_or_identity(&transform.local_to_world()))
            * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(directions[0], expected.normalize(), epsilon = 1e-5);
    }

    #[test]
    fn test_unlit_skips_light_uniforms() {
        let (mut renderer, mesh) = setup();
        let unlit = MeshRenderer::new(mesh).mode(RenderMode::Unlit);
        RenderSystem::render(&mut renderer, &unlit, None, &frame(&LightSet::new())).expect("render");

        assert_eq!(renderer.backend().draw_count(), 1);
        assert_eq!(renderer.backend().uniform_uploads(uniforms::LIGHT_COUNT), 0);
    }

    #[test]
    fn test_orthographic_camera_gets_perspective_sky() {
        let camera = Camera::orthographic(5.0, 0.1, 100.0);
        let view = CameraView::new(&camera, None, Viewport::new(800, 600));
        assert_relative_eq!(view.projection[(3, 3)], 1.0);
        assert_relative_eq!(view.sky_projection[(3, 3)], 0.0);
        assert_relative_eq!(view.sky_projection[(3, 2)], -1.0);
    }

    #[test]
    fn test_material_color_overrides_renderer_color() {
        let (mut renderer, mesh) = setup();
        let material = renderer.create_material(MaterialDescriptor::colored(Vec3::new(0.0, 1.0, 0.0)));
        let mut mesh_renderer = MeshRenderer::with_material(mesh, material);
        mesh_renderer.color = Vec3::new(1.0, 0.0, 0.0);

        RenderSystem::render(&mut renderer, &mesh_renderer, None, &frame(&LightSet::new())).expect("render");

        assert_eq!(
            renderer.backend().last_uniform(uniforms::COLOR),
            Some(RecordedUniform::Vec3(Vec3::new(0.0, 1.0, 0.0)))
        );
    }

    #[test]
    fn test_depth_pass_skips_non_casters() {
        let (mut renderer, mesh) = setup();
        renderer.begin_shadow_pass(Mat4::identity()).expect("shadow pass");
        renderer.backend_mut().take_calls();

        let mut hidden = MeshRenderer::new(mesh);
        hidden.cast_shadows = false;
        RenderSystem::render_depth(&mut renderer, &hidden, None).expect("depth");
        RenderSystem::render_depth(&mut renderer, &MeshRenderer::new(mesh), None).expect("depth");
        renderer.end_shadow_pass();

        let draws = renderer.backend().count(|c| matches!(c, BackendCall::DrawMesh { .. }));
        assert_eq!(draws, 1);
    }
}
