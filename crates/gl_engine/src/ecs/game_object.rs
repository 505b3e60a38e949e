//! Game objects: ordered component containers with typed lookup

use slotmap::new_key_type;

use crate::ecs::component::{Component, ComponentContext, ComponentKind, ComponentSlot, ComponentVariant};
use crate::ecs::components::Transform;
use crate::foundation::time::FrameTime;
use crate::input::InputState;

new_key_type! {
    /// Stable identifier of a game object inside its scene
    pub struct GameObjectId;
}

/// Location of one component inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentAddress {
    /// Owning object
    pub object: GameObjectId,
    /// Index in the object's component list
    pub index: usize,
}

/// An ordered set of components
///
/// Components keep their attach order. The first component of each kind is
/// cached for O(1) typed lookup; later components of the same kind are stored
/// and updated but never returned by [`GameObject::get_component`].
///
/// Components are added through [`crate::scene::Scene::add_component`] so
/// cameras and lights are registered with the scene on attach.
#[derive(Debug, Default)]
pub struct GameObject {
    name: String,
    slots: Vec<ComponentSlot>,
    first_of_kind: [Option<usize>; ComponentKind::COUNT],
}

impl GameObject {
    /// Create an empty object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// Components in attach order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter().map(|slot| &slot.component)
    }

    /// Component at `index`
    pub fn component(&self, index: usize) -> Option<&Component> {
        self.slots.get(index).map(|slot| &slot.component)
    }

    /// First component of type `T`, if any
    pub fn get_component<T: ComponentVariant>(&self) -> Option<&T> {
        let index = self.first_of_kind[T::KIND.index()]?;
        T::from_component(&self.slots[index].component)
    }

    /// First component of type `T`, mutably
    pub fn get_component_mut<T: ComponentVariant>(&mut self) -> Option<&mut T> {
        let index = self.first_of_kind[T::KIND.index()]?;
        T::from_component_mut(&mut self.slots[index].component)
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: ComponentVariant>(&self) -> bool {
        self.first_of_kind[T::KIND.index()].is_some()
    }

    /// Shorthand for the first [`Transform`]
    pub fn transform(&self) -> Option<&Transform> {
        self.get_component::<Transform>()
    }

    /// Shorthand for the first [`Transform`], mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.get_component_mut::<Transform>()
    }

    /// Store a component and run its attach hook; returns its index
    pub(crate) fn push_component(&mut self, component: Component) -> usize {
        let kind = component.kind();
        let index = self.slots.len();

        match self.first_of_kind[kind.index()] {
            None => self.first_of_kind[kind.index()] = Some(index),
            Some(_) if kind != ComponentKind::Behaviour => {
                log::warn!(
                    "Object '{}' already has a {:?}; the new one is stored but lookups return the first",
                    self.name,
                    kind
                );
            }
            Some(_) => {}
        }

        self.slots.push(ComponentSlot { component, started: false });
        self.slots[index].component.on_attach();
        index
    }

    /// Start any component not yet started, then update all in attach order
    pub(crate) fn update(&mut self, time: FrameTime, input: &InputState) {
        let transform_index = self.first_of_kind[ComponentKind::Transform.index()];

        for index in 0..self.slots.len() {
            let (before, rest) = self.slots.split_at_mut(index);
            let Some((slot, after)) = rest.split_first_mut() else {
                continue;
            };
            let mut ctx = ComponentContext::new(before, after, transform_index, input);

            if !slot.started {
                slot.component.on_start(&mut ctx);
                slot.started = true;
            }
            slot.component.on_update(&mut ctx, time);
        }
    }

    /// Run every component's detach hook
    pub(crate) fn detach_all(&mut self) {
        for slot in &mut self.slots {
            slot.component.on_detach();
        }
    }

    /// Clone every cloneable component, in attach order
    pub(crate) fn clone_components(&self) -> Vec<Component> {
        self.slots
            .iter()
            .filter_map(|slot| {
                let clone = slot.component.try_clone();
                if clone.is_none() {
                    log::debug!(
                        "Skipping non-cloneable {:?} while instantiating '{}'",
                        slot.component.kind(),
                        self.name
                    );
                }
                clone
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Behaviour;
    use crate::ecs::components::{Light, Rotator};
    use crate::foundation::math::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Behaviour for Recorder {
        fn on_start(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log.borrow_mut().push(format!("{}:start", self.tag));
        }

        fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _time: FrameTime) {
            self.log.borrow_mut().push(format!("{}:update", self.tag));
            if let Some(t) = ctx.transform_mut() {
                t.position.x += 1.0;
            }
        }
    }

    #[test]
    fn test_typed_lookup_returns_first_instance() {
        let mut object = GameObject::new("lamp");
        object.push_component(Light::new(Vec3::new(1.0, 0.0, 0.0), 1.0).into());
        object.push_component(Light::new(Vec3::new(0.0, 1.0, 0.0), 2.0).into());

        assert_eq!(object.component_count(), 2);
        let light = object.get_component::<Light>().expect("light");
        assert_eq!(light.color, Vec3::new(1.0, 0.0, 0.0));
        assert!(object.get_component::<Transform>().is_none());
        assert!(object.has_component::<Light>());
        assert!(!object.has_component::<Transform>());
    }

    #[test]
    fn test_start_runs_once_and_update_every_frame_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut object = GameObject::new("recorder");
        object.push_component(Component::behaviour(Recorder { tag: "a", log: log.clone() }));
        object.push_component(Transform::default().into());
        object.push_component(Component::behaviour(Recorder { tag: "b", log: log.clone() }));

        let input = InputState::default();
        object.update(FrameTime::new(0.0, 0.0), &input);
        object.update(FrameTime::new(0.1, 0.1), &input);

        assert_eq!(
            *log.borrow(),
            vec!["a:start", "a:update", "b:start", "b:update", "a:update", "b:update"]
        );
        // Both recorders see the sibling transform regardless of attach position.
        assert_eq!(object.transform().map(|t| t.position.x), Some(4.0));
    }

    #[test]
    fn test_rotator_drives_sibling_transform() {
        let mut object = GameObject::new("spinner");
        object.push_component(Transform::default().into());
        object.push_component(Rotator::new(90.0).into());

        object.update(FrameTime::new(2.0, 0.016), &InputState::default());

        assert_eq!(object.transform().map(|t| t.rotation.y), Some(180.0));
    }

    #[test]
    fn test_clone_skips_non_cloneable_behaviours() {
        let mut object = GameObject::new("original");
        object.push_component(Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).into());
        object.push_component(Component::behaviour(Recorder {
            tag: "x",
            log: Rc::new(RefCell::new(Vec::new())),
        }));

        let clones = object.clone_components();
        assert_eq!(clones.len(), 1);
        assert_eq!(clones[0].kind(), ComponentKind::Transform);
    }
}
