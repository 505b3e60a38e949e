//! Scene-level scenarios checked against the recording backend

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use gl_engine::core::config::RendererConfig;
use gl_engine::ecs::{Behaviour, Camera, Component, Light, MeshRenderer, Transform};
use gl_engine::foundation::math::Vec3;
use gl_engine::render::api::{ClearFlags, Viewport};
use gl_engine::render::backends::recording::{BackendCall, RecordedUniform};
use gl_engine::render::backends::RecordingBackend;
use gl_engine::render::shaders::uniforms;
use gl_engine::render::shadow::ShadowPassState;
use gl_engine::render::{MeshFactory, Renderer};
use gl_engine::scene::Scene;

fn renderer_with(config: RendererConfig) -> Renderer<RecordingBackend> {
    let mut renderer = Renderer::new(RecordingBackend::new(Viewport::new(800, 600)), config);
    renderer.backend_mut().take_calls();
    renderer
}

fn renderer() -> Renderer<RecordingBackend> {
    renderer_with(RendererConfig::default())
}

fn add_camera(scene: &mut Scene, position: Vec3) {
    let camera = scene.create_object("Camera");
    scene.add_component(camera, Transform::from_position(position));
    scene.add_component(camera, Camera::default());
}

fn add_sun(scene: &mut Scene) {
    let sun = scene.create_object("Sun");
    scene.add_component(sun, Transform::default().with_rotation(Vec3::new(-60.0, 20.0, 0.0)));
    scene.add_component(sun, Light::default());
}

#[test]
fn render_without_camera_touches_nothing() {
    let mut renderer = renderer();
    let mesh = renderer.create_mesh(&MeshFactory::unit_cube()).expect("mesh");
    renderer.backend_mut().take_calls();

    let mut scene = Scene::new();
    let cube = scene.create_object("Cube");
    scene.add_component(cube, Transform::default());
    scene.add_component(cube, MeshRenderer::new(mesh));
    add_sun(&mut scene);

    scene.render(&mut renderer).expect("render");
    assert!(renderer.backend().calls().is_empty());
}

#[test]
fn perspective_projection_matches_field_of_view() {
    let mut scene = Scene::new();
    let camera = scene.create_object("Camera");
    scene.add_component(camera, Transform::from_position(Vec3::zeros()));
    let address = scene
        .add_component(
            camera,
            Camera {
                field_of_view_degrees: 60.0,
                near_clip: 0.1,
                far_clip: 100.0,
                ..Camera::default()
            },
        )
        .expect("camera attached");
    assert_eq!(scene.active_camera(), Some(address));

    let component = scene
        .object(camera)
        .and_then(|object| object.get_component::<Camera>())
        .expect("camera component");
    let projection = component.projection_matrix(Viewport::new(800, 600));
    assert_relative_eq!(projection[(1, 1)], 1.0 / 30.0_f32.to_radians().tan(), epsilon = 1e-5);
}

#[test]
fn second_camera_does_not_take_over() {
    let mut renderer = renderer();
    let mesh = renderer.create_mesh(&MeshFactory::unit_cube()).expect("mesh");

    let mut scene = Scene::new();
    let cube = scene.create_object("Cube");
    scene.add_component(cube, MeshRenderer::new(mesh));
    let first = scene.create_object("First");
    let first_address = scene.add_component(first, Camera::default()).expect("first camera");
    let second = scene.create_object("Second");
    scene.add_component(second, Camera::default()).expect("second camera");

    assert_eq!(scene.active_camera(), Some(first_address));
    scene.destroy_object(first);
    assert_eq!(scene.active_camera(), None);

    renderer.backend_mut().take_calls();
    scene.render(&mut renderer).expect("render");
    assert_eq!(renderer.backend().draw_count(), 0);
    assert_eq!(renderer.backend().clear_count(), 0);
}

#[test]
fn instantiate_shares_mesh_but_not_transform() {
    let mut renderer = renderer();
    let mesh = renderer.create_mesh(&MeshFactory::unit_cube()).expect("mesh");

    let mut scene = Scene::new();
    let original = scene.create_object("Cube");
    scene.add_component(original, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
    scene.add_component(original, MeshRenderer::new(mesh));

    let clone = scene.instantiate(original).expect("clone");
    scene
        .object_mut(clone)
        .and_then(|object| object.transform_mut())
        .expect("clone transform")
        .position = Vec3::new(-5.0, 0.0, 0.0);

    let original_object = scene.object(original).expect("original");
    let clone_object = scene.object(clone).expect("clone");
    assert_eq!(original_object.transform().expect("transform").position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(
        original_object.get_component::<MeshRenderer>().and_then(MeshRenderer::mesh),
        clone_object.get_component::<MeshRenderer>().and_then(MeshRenderer::mesh),
    );
}

#[test]
fn half_turn_light_points_the_other_way() {
    let mut scene = Scene::new();
    for yaw in [0.0, 180.0] {
        let light = scene.create_object("Light");
        scene.add_component(light, Transform::default().with_rotation(Vec3::new(0.0, yaw, 0.0)));
        scene.add_component(light, Light::default());
    }

    let lights = scene.gather_lights();
    let a = lights.get(0).expect("first light").direction;
    let b = lights.get(1).expect("second light").direction;
    assert_relative_eq!(a, -b, epsilon = 1e-5);
}

#[test]
fn frame_clears_then_draws_in_creation_order() {
    let mut renderer = renderer();
    let plane = renderer.create_mesh(&MeshFactory::unit_plane()).expect("plane");
    let cube = renderer.create_mesh(&MeshFactory::unit_cube()).expect("cube");
    renderer.backend_mut().take_calls();

    let mut scene = Scene::new();
    scene.set_clear_color(Vec3::new(0.1, 0.2, 0.3));
    for mesh in [plane, cube] {
        let object = scene.create_object("Object");
        scene.add_component(object, Transform::default());
        scene.add_component(object, MeshRenderer::new(mesh));
    }
    add_camera(&mut scene, Vec3::new(0.0, 0.0, 5.0));

    scene.render(&mut renderer).expect("render");
    let calls = renderer.backend().calls();

    let clear = calls
        .iter()
        .position(|c| matches!(c, BackendCall::Clear { flags, .. } if flags.contains(ClearFlags::COLOR)))
        .expect("clear");
    assert!(matches!(calls[clear], BackendCall::Clear { color, .. } if color == [0.1, 0.2, 0.3, 1.0]));

    let draws: Vec<(usize, u32)> = calls
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c {
            BackendCall::DrawMesh { index_count, .. } => Some((i, *index_count)),
            _ => None,
        })
        .collect();
    assert_eq!(draws.iter().map(|d| d.1).collect::<Vec<_>>(), vec![6, 36]);
    assert!(draws.iter().all(|(i, _)| *i > clear));
}

#[test]
fn sky_is_drawn_first_and_sets_ambient() {
    let path = std::env::temp_dir().join(format!("gl_engine_sky_{}.png", std::process::id()));
    image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0])).save(&path).expect("write sky");

    let mut renderer = renderer();
    let plane = renderer.create_mesh(&MeshFactory::unit_plane()).expect("plane");

    let mut scene = Scene::new();
    let ground = scene.create_object("Ground");
    scene.add_component(ground, Transform::default());
    scene.add_component(ground, MeshRenderer::new(plane));
    add_camera(&mut scene, Vec3::new(0.0, 1.0, 5.0));

    let result = scene.set_sky_from_equirect(&path, &mut renderer);
    let _ = std::fs::remove_file(&path);
    result.expect("sky");

    assert!(scene.has_skybox());
    assert_relative_eq!(scene.ambient_color(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    assert_relative_eq!(scene.clear_color(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    assert_eq!(scene.object_count(), 2);

    renderer.backend_mut().take_calls();
    scene.render(&mut renderer).expect("render");

    let draws: Vec<u32> = renderer
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            BackendCall::DrawMesh { index_count, .. } => Some(*index_count),
            _ => None,
        })
        .collect();
    assert_eq!(draws, vec![36, 6]);
}

#[test]
fn replacing_the_sky_releases_the_old_texture() {
    let dir = std::env::temp_dir();
    let red = dir.join(format!("gl_engine_sky_red_{}.png", std::process::id()));
    let blue = dir.join(format!("gl_engine_sky_blue_{}.png", std::process::id()));
    image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0])).save(&red).expect("write red");
    image::RgbImage::from_pixel(4, 2, image::Rgb([0, 0, 255])).save(&blue).expect("write blue");

    let mut renderer = renderer();
    let mut scene = Scene::new();
    let first = scene.set_sky_from_equirect(&red, &mut renderer);
    let second = scene.set_sky_from_equirect(&blue, &mut renderer);
    let third = scene.set_sky_from_equirect(&red, &mut renderer);
    let _ = std::fs::remove_file(&red);
    let _ = std::fs::remove_file(&blue);
    first.and(second).and(third).expect("sky");

    let backend = renderer.backend();
    assert_eq!(backend.count(|c| matches!(c, BackendCall::CreateTexture { .. })), 3);
    assert_eq!(backend.count(|c| matches!(c, BackendCall::DeleteTexture(_))), 2);
    assert_eq!(scene.object_count(), 0);
    assert_relative_eq!(scene.ambient_color(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
}

#[test]
fn missing_sky_image_is_an_error() {
    let mut renderer = renderer();
    let mut scene = Scene::new();
    assert!(scene.set_sky_from_equirect("no/such/sky.png", &mut renderer).is_err());
    assert!(!scene.has_skybox());
}

#[test]
fn shadow_pass_runs_before_the_main_pass() {
    let mut config = RendererConfig::default();
    config.shadows.enabled = true;
    config.shadows.shadow_map_size = 256;
    let mut renderer = renderer_with(config);
    let cube = renderer.create_mesh(&MeshFactory::unit_cube()).expect("cube");
    renderer.backend_mut().take_calls();

    let mut scene = Scene::new();
    let object = scene.create_object("Cube");
    scene.add_component(object, Transform::default());
    scene.add_component(object, MeshRenderer::new(cube));
    add_camera(&mut scene, Vec3::new(0.0, 2.0, 6.0));
    add_sun(&mut scene);

    scene.render(&mut renderer).expect("render");
    let calls = renderer.backend().calls();

    let bind = calls
        .iter()
        .position(|c| matches!(c, BackendCall::BindDepthTarget(Some(_))))
        .expect("depth target bound");
    let unbind = calls
        .iter()
        .position(|c| matches!(c, BackendCall::BindDepthTarget(None)))
        .expect("default framebuffer restored");
    let clear = calls
        .iter()
        .position(|c| matches!(c, BackendCall::Clear { flags, .. } if flags.contains(ClearFlags::COLOR)))
        .expect("main clear");
    assert!(bind < unbind && unbind < clear);

    assert_eq!(renderer.backend().draw_count(), 2);
    assert_eq!(
        renderer.backend().last_uniform(uniforms::USE_SHADOWS),
        Some(RecordedUniform::Int(1))
    );
    assert_eq!(renderer.viewport(), Viewport::new(800, 600));
    assert_eq!(renderer.shadow_pass().state(), ShadowPassState::Idle);
}

#[test]
fn shadow_pass_needs_a_light() {
    let mut config = RendererConfig::default();
    config.shadows.enabled = true;
    let mut renderer = renderer_with(config);
    let cube = renderer.create_mesh(&MeshFactory::unit_cube()).expect("cube");
    renderer.backend_mut().take_calls();

    let mut scene = Scene::new();
    let object = scene.create_object("Cube");
    scene.add_component(object, MeshRenderer::new(cube));
    add_camera(&mut scene, Vec3::new(0.0, 0.0, 4.0));

    scene.render(&mut renderer).expect("render");
    let depth_calls = renderer
        .backend()
        .count(|c| matches!(c, BackendCall::BindDepthTarget(_) | BackendCall::CreateDepthTarget { .. }));
    assert_eq!(depth_calls, 0);
    assert_eq!(
        renderer.backend().last_uniform(uniforms::USE_SHADOWS),
        Some(RecordedUniform::Int(0))
    );
}

#[derive(Debug)]
struct DetachFlag(Rc<Cell<bool>>);

impl Behaviour for DetachFlag {
    fn on_detach(&mut self) {
        self.0.set(true);
    }
}

#[test]
fn dropping_the_scene_detaches_components() {
    let detached = Rc::new(Cell::new(false));
    {
        let mut scene = Scene::new();
        let object = scene.create_object("Holder");
        scene.add_component(object, Component::behaviour(DetachFlag(Rc::clone(&detached))));
        assert!(!detached.get());
    }
    assert!(detached.get());
}
