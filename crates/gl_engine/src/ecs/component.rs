//! Component variants and the hooks shared by all of them

use std::fmt;

use crate::ecs::components::{
    Camera, DebugCameraController, Light, MeshRenderer, Rotator, Transform,
};
use crate::foundation::time::FrameTime;
use crate::input::InputState;

/// Tag identifying a component variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Transform`]
    Transform,
    /// [`Camera`]
    Camera,
    /// [`Light`]
    Light,
    /// [`MeshRenderer`]
    MeshRenderer,
    /// [`Rotator`]
    Rotator,
    /// [`DebugCameraController`]
    DebugCameraController,
    /// User [`Behaviour`]
    Behaviour,
}

impl ComponentKind {
    /// Number of variants
    pub const COUNT: usize = 7;

    /// Dense index of the kind
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A unit of data or behaviour attached to a game object
#[derive(Debug)]
pub enum Component {
    /// Position, rotation and scale
    Transform(Transform),
    /// View and projection source
    Camera(Camera),
    /// Directional light
    Light(Light),
    /// Mesh draw description
    MeshRenderer(MeshRenderer),
    /// Spins the sibling transform around Y
    Rotator(Rotator),
    /// Mouse driven fly camera
    DebugCameraController(DebugCameraController),
    /// Open extension point for user code
    Behaviour(Box<dyn Behaviour>),
}

impl Component {
    /// Wrap a user behaviour
    pub fn behaviour(behaviour: impl Behaviour + 'static) -> Self {
        Self::Behaviour(Box::new(behaviour))
    }

    /// Variant tag
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Camera(_) => ComponentKind::Camera,
            Self::Light(_) => ComponentKind::Light,
            Self::MeshRenderer(_) => ComponentKind::MeshRenderer,
            Self::Rotator(_) => ComponentKind::Rotator,
            Self::DebugCameraController(_) => ComponentKind::DebugCameraController,
            Self::Behaviour(_) => ComponentKind::Behaviour,
        }
    }

    /// Copy the component for instantiation
    ///
    /// Mesh renderers copy their resource handles, so clones share GPU data.
    /// Returns `None` for components that cannot be duplicated.
    pub fn try_clone(&self) -> Option<Component> {
        match self {
            Self::Transform(t) => Some(Self::Transform(t.clone())),
            Self::Camera(c) => Some(Self::Camera(c.clone())),
            Self::Light(l) => Some(Self::Light(l.clone())),
            Self::MeshRenderer(m) => Some(Self::MeshRenderer(m.clone())),
            Self::Rotator(r) => Some(Self::Rotator(r.clone())),
            Self::DebugCameraController(_) => None,
            Self::Behaviour(b) => b.clone_box().map(Self::Behaviour),
        }
    }

    pub(crate) fn on_attach(&mut self) {
        if let Self::Behaviour(b) = self {
            b.on_attach();
        }
    }

    pub(crate) fn on_detach(&mut self) {
        if let Self::Behaviour(b) = self {
            b.on_detach();
        }
    }

    pub(crate) fn on_start(&mut self, ctx: &mut ComponentContext<'_>) {
        match self {
            Self::DebugCameraController(controller) => controller.start(),
            Self::Behaviour(b) => b.on_start(ctx),
            _ => {}
        }
    }

    pub(crate) fn on_update(&mut self, ctx: &mut ComponentContext<'_>, time: FrameTime) {
        match self {
            Self::Rotator(rotator) => rotator.update(ctx, time),
            Self::DebugCameraController(controller) => controller.update(ctx),
            Self::Behaviour(b) => b.on_update(ctx, time),
            _ => {}
        }
    }
}

/// User-defined behaviour attached through [`Component::Behaviour`]
///
/// Every hook has an empty default.
pub trait Behaviour: fmt::Debug {
    /// Called when the behaviour is added to a scene object
    fn on_attach(&mut self) {}

    /// Called when the owning object is destroyed
    fn on_detach(&mut self) {}

    /// Called once, before the first update
    fn on_start(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every frame
    fn on_update(&mut self, _ctx: &mut ComponentContext<'_>, _time: FrameTime) {}

    /// Duplicate for [`crate::scene::Scene::instantiate`]; `None` skips it
    fn clone_box(&self) -> Option<Box<dyn Behaviour>> {
        None
    }
}

impl From<Box<dyn Behaviour>> for Component {
    fn from(behaviour: Box<dyn Behaviour>) -> Self {
        Self::Behaviour(behaviour)
    }
}

/// Slot in a game object's component list
#[derive(Debug)]
pub(crate) struct ComponentSlot {
    pub component: Component,
    pub started: bool,
}

/// Access to the running component's siblings during start and update
pub struct ComponentContext<'a> {
    before: &'a mut [ComponentSlot],
    after: &'a mut [ComponentSlot],
    current: usize,
    transform_index: Option<usize>,
    input: &'a InputState,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        before: &'a mut [ComponentSlot],
        after: &'a mut [ComponentSlot],
        transform_index: Option<usize>,
        input: &'a InputState,
    ) -> Self {
        let current = before.len();
        Self { before, after, current, transform_index, input }
    }

    fn sibling(&self, index: usize) -> Option<&Component> {
        if index < self.current {
            self.before.get(index).map(|slot| &slot.component)
        } else if index > self.current {
            self.after.get(index - self.current - 1).map(|slot| &slot.component)
        } else {
            None
        }
    }

    fn sibling_mut(&mut self, index: usize) -> Option<&mut Component> {
        if index < self.current {
            self.before.get_mut(index).map(|slot| &mut slot.component)
        } else if index > self.current {
            self.after.get_mut(index - self.current - 1).map(|slot| &mut slot.component)
        } else {
            None
        }
    }

    /// The owning object's transform
    pub fn transform(&self) -> Option<&Transform> {
        match self.sibling(self.transform_index?)? {
            Component::Transform(t) => Some(t),
            _ => None,
        }
    }

    /// The owning object's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match self.sibling_mut(self.transform_index?)? {
            Component::Transform(t) => Some(t),
            _ => None,
        }
    }

    /// Input polled at the start of the frame
    pub fn input(&self) -> &InputState {
        self.input
    }
}

/// Typed access to a component variant
pub trait ComponentVariant: Sized + Into<Component> {
    /// Tag of the variant
    const KIND: ComponentKind;

    /// Borrow the payload if `component` is this variant
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow the payload if `component` is this variant
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_variant {
    ($ty:ident) => {
        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$ty(value)
            }
        }

        impl ComponentVariant for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$ty(value) => Some(value),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$ty(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

component_variant!(Transform);
component_variant!(Camera);
component_variant!(Light);
component_variant!(MeshRenderer);
component_variant!(Rotator);
component_variant!(DebugCameraController);
