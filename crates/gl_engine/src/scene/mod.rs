//! Scene: game object owner, camera/light registry and frame driver
//!
//! Objects live in a slot map and are walked in creation order. Cameras and
//! lights are registered by [`ComponentAddress`] when they are attached and
//! unregistered when their object is destroyed, so no registration outlives
//! its component.

mod sky;

use slotmap::SlotMap;

use crate::ecs::components::{Camera, Light, MeshRenderer};
use crate::ecs::systems::{CameraView, FrameContext, LightingSystem, RenderSystem};
use crate::ecs::{Component, ComponentAddress, ComponentKind, ComponentVariant, GameObject, GameObjectId};
use crate::foundation::math::{Mat4, Vec3};
use crate::foundation::time::FrameTime;
use crate::input::InputState;
use crate::render::api::RenderBackend;
use crate::render::lighting::LightSet;
use crate::render::renderer::Renderer;
use crate::render::RenderResult;

const DEFAULT_AMBIENT: f32 = 0.1;

/// World container and render driver
#[derive(Debug)]
pub struct Scene {
    objects: SlotMap<GameObjectId, GameObject>,
    order: Vec<GameObjectId>,
    active_camera: Option<ComponentAddress>,
    lights: Vec<ComponentAddress>,
    skybox: Option<GameObjectId>,
    ambient_color: Vec3,
    clear_color: Vec3,
    input: InputState,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with a dim grey ambient and clear color
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
            active_camera: None,
            lights: Vec::new(),
            skybox: None,
            ambient_color: Vec3::repeat(DEFAULT_AMBIENT),
            clear_color: Vec3::repeat(DEFAULT_AMBIENT),
            input: InputState::default(),
        }
    }

    // --- objects -----------------------------------------------------------

    /// Create an empty object
    pub fn create_object(&mut self, name: impl Into<String>) -> GameObjectId {
        let object = GameObject::new(name);
        log::debug!("Created object '{}'", object.name());
        let id = self.objects.insert(object);
        self.order.push(id);
        id
    }

    /// Attach a component and register it if it is a camera or light
    ///
    /// Returns `None` when `id` does not name a live object.
    pub fn add_component(&mut self, id: GameObjectId, component: impl Into<Component>) -> Option<ComponentAddress> {
        let component = component.into();
        let kind = component.kind();
        let index = self.objects.get_mut(id)?.push_component(component);
        let address = ComponentAddress { object: id, index };

        match kind {
            ComponentKind::Camera => self.register_camera(address),
            ComponentKind::Light => self.register_light(address),
            _ => {}
        }
        Some(address)
    }

    /// New object carrying clones of `original`'s components
    ///
    /// Mesh renderers share their mesh handles with the original. Components
    /// that cannot be cloned are skipped.
    pub fn instantiate(&mut self, original: GameObjectId) -> Option<GameObjectId> {
        let source = self.objects.get(original)?;
        let name = source.name().to_string();
        let components = source.clone_components();

        let clone = self.create_object(name);
        for component in components {
            self.add_component(clone, component);
        }
        Some(clone)
    }

    /// Detach and remove an object; returns whether it existed
    pub fn destroy_object(&mut self, id: GameObjectId) -> bool {
        let Some(mut object) = self.objects.remove(id) else {
            return false;
        };
        object.detach_all();
        if self.active_camera.is_some_and(|address| address.object == id) {
            self.active_camera = None;
        }
        self.lights.retain(|address| address.object != id);
        self.order.retain(|&other| other != id);
        if self.skybox == Some(id) {
            self.skybox = None;
        }
        log::debug!("Destroyed object '{}'", object.name());
        true
    }

    /// Object by id
    pub fn object(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Object by id, mutably
    pub fn object_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Objects in creation order; the skybox object is not included
    pub fn objects(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> {
        self.order.iter().filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    /// Number of objects, excluding the skybox
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    // --- registration ------------------------------------------------------

    /// Register a camera; ignored while another camera is active
    pub fn register_camera(&mut self, address: ComponentAddress) {
        match self.active_camera {
            None => {
                log::debug!("Camera {:?} is now active", address);
                self.active_camera = Some(address);
            }
            Some(active) if active != address => {
                log::debug!("Camera {:?} ignored, {:?} is active", address, active);
            }
            Some(_) => {}
        }
    }

    /// Unregister a camera
    ///
    /// Only the active camera can clear the slot. The scene has no camera
    /// afterwards until one registers again.
    pub fn unregister_camera(&mut self, address: ComponentAddress) {
        if self.active_camera == Some(address) {
            log::debug!("Active camera {:?} unregistered", address);
            self.active_camera = None;
        }
    }

    /// Active camera address
    pub fn active_camera(&self) -> Option<ComponentAddress> {
        self.active_camera
    }

    /// Register a light; duplicates are ignored
    pub fn register_light(&mut self, address: ComponentAddress) {
        if !self.lights.contains(&address) {
            log::debug!("Light {:?} registered", address);
            self.lights.push(address);
        }
    }

    /// Unregister a light
    pub fn unregister_light(&mut self, address: ComponentAddress) {
        self.lights.retain(|&other| other != address);
        log::debug!("Light {:?} unregistered", address);
    }

    /// Registered light addresses in registration order
    pub fn lights(&self) -> &[ComponentAddress] {
        &self.lights
    }

    // --- state -------------------------------------------------------------

    /// Ambient color used by lit draws
    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    /// Override the ambient color
    pub fn set_ambient_color(&mut self, color: Vec3) {
        self.ambient_color = color;
    }

    /// Framebuffer clear color
    pub fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    /// Override the clear color
    pub fn set_clear_color(&mut self, color: Vec3) {
        self.clear_color = color;
    }

    /// Input snapshot handed to components during the next update
    pub fn set_input_state(&mut self, input: InputState) {
        self.input = input;
    }

    // --- frame -------------------------------------------------------------

    /// Start and update every object in creation order
    pub fn update(&mut self, time: FrameTime) {
        for &id in &self.order {
            if let Some(object) = self.objects.get_mut(id) {
                object.update(time, &self.input);
            }
        }
    }

    fn component<T: ComponentVariant>(&self, address: ComponentAddress) -> Option<(&T, &GameObject)> {
        let object = self.objects.get(address.object)?;
        let component = T::from_component(object.component(address.index)?)?;
        Some((component, object))
    }

    /// World-space lights of this frame, at most [`crate::render::MAX_LIGHTS`]
    pub fn gather_lights(&self) -> LightSet {
        LightingSystem::gather(
            self.lights
                .iter()
                .filter_map(|&address| self.component::<Light>(address))
                .map(|(light, object)| (light, object.transform())),
        )
    }

    /// Draw the frame through the active camera
    ///
    /// Without a camera nothing is submitted to the renderer at all.
    pub fn render<B: RenderBackend>(&self, renderer: &mut Renderer<B>) -> RenderResult<()> {
        let Some((camera, camera_object)) = self.active_camera().and_then(|a| self.component::<Camera>(a)) else {
            log::trace!("No active camera; skipping render");
            return Ok(());
        };

        let camera = CameraView::new(camera, camera_object.transform(), renderer.viewport());
        let lights = self.gather_lights();
        if renderer.update_light_state(&lights, camera.position) {
            log::trace!("Frame lighting changed: {} light(s)", lights.len());
        }

        if renderer.shadow_settings().enabled {
            if let Some(light_space) = LightingSystem::shadow_light_space(&lights, renderer.shadow_settings()) {
                self.render_shadow_pass(renderer, light_space)?;
            }
        }

        renderer.begin_frame(self.clear_color);
        let frame = FrameContext::new(camera, &lights, self.ambient_color);

        let skybox = self.skybox.and_then(|id| self.objects.get(id));
        for object in skybox.into_iter().chain(self.objects().map(|(_, object)| object)) {
            let transform = object.transform();
            for mesh_renderer in object.components().filter_map(MeshRenderer::from_component) {
                RenderSystem::render(renderer, mesh_renderer, transform, &frame)?;
            }
        }

        renderer.end_frame();
        Ok(())
    }

    fn render_shadow_pass<B: RenderBackend>(&self, renderer: &mut Renderer<B>, light_space: Mat4) -> RenderResult<()> {
        renderer.begin_shadow_pass(light_space)?;
        let result = self.draw_shadow_casters(renderer);
        renderer.end_shadow_pass();
        result
    }

    fn draw_shadow_casters<B: RenderBackend>(&self, renderer: &mut Renderer<B>) -> RenderResult<()> {
        for (_, object) in self.objects() {
            let transform = object.transform();
            for mesh_renderer in object.components().filter_map(MeshRenderer::from_component) {
                RenderSystem::render_depth(renderer, mesh_renderer, transform)?;
            }
        }
        Ok(())
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        for object in self.objects.values_mut() {
            object.detach_all();
        }
        self.active_camera = None;
        self.lights.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Rotator, Transform};

    fn camera_object(scene: &mut Scene, name: &str) -> (GameObjectId, ComponentAddress) {
        let id = scene.create_object(name);
        scene.add_component(id, Transform::default());
        let address = scene.add_component(id, Camera::default()).expect("camera attached");
        (id, address)
    }

    #[test]
    fn test_first_camera_stays_active() {
        let mut scene = Scene::new();
        let (_, first) = camera_object(&mut scene, "first");
        let (_, second) = camera_object(&mut scene, "second");

        assert_eq!(scene.active_camera(), Some(first));
        scene.unregister_camera(second);
        assert_eq!(scene.active_camera(), Some(first));
    }

    #[test]
    fn test_unregistering_active_camera_leaves_scene_without_camera() {
        let mut scene = Scene::new();
        let (_, first) = camera_object(&mut scene, "first");
        let (_, second) = camera_object(&mut scene, "second");

        scene.unregister_camera(first);
        assert_eq!(scene.active_camera(), None);

        scene.register_camera(second);
        assert_eq!(scene.active_camera(), Some(second));
    }

    #[test]
    fn test_destroy_unregisters_camera_and_light() {
        let mut scene = Scene::new();
        let (camera_id, _) = camera_object(&mut scene, "camera");
        let light_id = scene.create_object("sun");
        scene.add_component(light_id, Light::default());

        assert!(scene.destroy_object(camera_id));
        assert!(scene.destroy_object(light_id));
        assert_eq!(scene.active_camera(), None);
        assert!(scene.lights().is_empty());
        assert!(!scene.destroy_object(light_id));
    }

    #[test]
    fn test_light_registration_is_idempotent() {
        let mut scene = Scene::new();
        let id = scene.create_object("sun");
        let address = scene.add_component(id, Light::default()).expect("light attached");
        scene.register_light(address);
        assert_eq!(scene.lights().len(), 1);

        scene.unregister_light(address);
        assert!(scene.lights().is_empty());
    }

    #[test]
    fn test_update_runs_in_creation_order() {
        let mut scene = Scene::new();
        let id = scene.create_object("spinner");
        scene.add_component(id, Transform::default());
        scene.add_component(id, Rotator::new(90.0));

        scene.update(FrameTime::new(0.5, 0.5));
        let rotation = scene.object(id).and_then(GameObject::transform).expect("transform").rotation;
        assert!((rotation.y - 45.0).abs() < 1e-5);
    }

    #[test]
    fn test_add_component_to_missing_object() {
        let mut scene = Scene::new();
        let id = scene.create_object("gone");
        scene.destroy_object(id);
        assert!(scene.add_component(id, Transform::default()).is_none());
        assert!(scene.instantiate(id).is_none());
    }

    #[test]
    fn test_objects_keep_creation_order() {
        let mut scene = Scene::new();
        let a = scene.create_object("a");
        let b = scene.create_object("b");
        let c = scene.create_object("c");
        scene.destroy_object(b);

        let ids: Vec<GameObjectId> = scene.objects().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
