//! Entity-Component implementation
//!
//! A [`GameObject`] owns an ordered list of [`Component`]s drawn from a closed
//! set of variants. The scene starts and ticks components each frame. The
//! helpers in [`systems`] gather registered lights and assemble draws.

pub mod component;
pub mod components;
pub mod game_object;
pub mod systems;

pub use component::{Behaviour, Component, ComponentContext, ComponentKind, ComponentVariant};
pub use components::{
    AspectMode, Camera, DebugCameraController, Light, MeshRenderer, Projection, RenderMode,
    Rotator, Transform,
};
pub use game_object::{ComponentAddress, GameObject, GameObjectId};
