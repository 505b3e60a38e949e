//! Mouse driven camera controller
//!
//! Right drag rotates, left drag pans along the camera's right/up axes and
//! the scroll wheel moves along the view direction. Scroll offsets arrive
//! through a [`ScrollAccumulator`] registered with the application's
//! [`InputDispatcher`]; dropping the controller ends that subscription.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::component::ComponentContext;
use crate::input::{InputDispatcher, ScrollAccumulator};

/// Fly camera for inspecting scenes
#[derive(Debug)]
pub struct DebugCameraController {
    /// Degrees of rotation per pixel of right-drag
    pub rotate_sensitivity: f32,
    /// World units per pixel of left-drag
    pub pan_sensitivity: f32,
    /// World units per scroll notch
    pub zoom_speed: f32,
    scroll: Rc<RefCell<ScrollAccumulator>>,
    last_cursor: Option<(f64, f64)>,
}

impl DebugCameraController {
    /// Create a controller listening to `dispatcher` for scroll input
    pub fn new(dispatcher: &mut InputDispatcher) -> Self {
        let (scroll, _) = ScrollAccumulator::register(dispatcher);
        Self {
            rotate_sensitivity: 0.2,
            pan_sensitivity: 0.01,
            zoom_speed: 0.5,
            scroll,
            last_cursor: None,
        }
    }

    pub(crate) fn start(&mut self) {
        self.last_cursor = None;
    }

    pub(crate) fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let input = *ctx.input();
        let Some(transform) = ctx.transform_mut() else {
            return;
        };

        let cursor = input.cursor_position;
        let (last_x, last_y) = *self.last_cursor.get_or_insert(cursor);
        let dx = (cursor.0 - last_x) as f32;
        let dy = (cursor.1 - last_y) as f32;
        self.last_cursor = Some(cursor);

        if input.right_button {
            transform.rotation.y -= dx * self.rotate_sensitivity;
            transform.rotation.x =
                (transform.rotation.x - dy * self.rotate_sensitivity).clamp(-89.0, 89.0);
        }

        if input.left_button {
            let pan = transform.right() * (-dx * self.pan_sensitivity)
                + transform.up() * (dy * self.pan_sensitivity);
            transform.position += pan;
        }

        let scroll = self.scroll.borrow_mut().take();
        if scroll != 0.0 {
            transform.position += transform.forward() * (scroll as f32 * self.zoom_speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform;
    use crate::ecs::game_object::GameObject;
    use crate::foundation::math::Vec3;
    use crate::foundation::time::FrameTime;
    use crate::input::InputState;
    use approx::assert_relative_eq;

    fn camera_object(dispatcher: &mut InputDispatcher) -> GameObject {
        let mut object = GameObject::new("camera");
        object.push_component(Transform::default().into());
        object.push_component(DebugCameraController::new(dispatcher).into());
        object
    }

    #[test]
    fn test_first_sample_only_seeds_cursor() {
        let mut dispatcher = InputDispatcher::new();
        let mut object = camera_object(&mut dispatcher);
        let input = InputState {
            cursor_position: (400.0, 300.0),
            right_button: true,
            ..Default::default()
        };
        object.update(FrameTime::default(), &input);
        assert_eq!(object.transform().map(|t| t.rotation), Some(Vec3::zeros()));
    }

    #[test]
    fn test_right_drag_rotates_and_clamps_pitch() {
        let mut dispatcher = InputDispatcher::new();
        let mut object = camera_object(&mut dispatcher);
        let mut input = InputState { cursor_position: (0.0, 0.0), ..Default::default() };
        object.update(FrameTime::default(), &input);

        input.right_button = true;
        input.cursor_position = (10.0, -1000.0);
        object.update(FrameTime::default(), &input);

        let rotation = object.transform().map(|t| t.rotation).expect("transform");
        assert_relative_eq!(rotation.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(rotation.x, 89.0);
    }

    #[test]
    fn test_scroll_moves_along_forward() {
        let mut dispatcher = InputDispatcher::new();
        let mut object = camera_object(&mut dispatcher);
        dispatcher.dispatch_scroll(2.0);
        object.update(FrameTime::default(), &InputState::default());

        let position = object.transform().map(|t| t.position).expect("transform");
        assert_relative_eq!(position, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);

        // Consumed: the next frame does not move again.
        object.update(FrameTime::default(), &InputState::default());
        let again = object.transform().map(|t| t.position).expect("transform");
        assert_relative_eq!(again, position);
    }

    #[test]
    fn test_dropping_controller_unsubscribes() {
        let mut dispatcher = InputDispatcher::new();
        let object = camera_object(&mut dispatcher);
        drop(object);
        dispatcher.dispatch_scroll(1.0);
        assert_eq!(dispatcher.listener_count(), 0);
    }
}
