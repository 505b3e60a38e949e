//! Input management system
//!
//! The window forwards scroll events into an [`InputDispatcher`] owned by the
//! application; interested components hold a listener registered with it.
//! Cursor position and mouse buttons are polled once per frame into an
//! [`InputState`] snapshot that the scene hands to its components.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Mouse buttons the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Polled input snapshot for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Cursor position in window coordinates
    pub cursor_position: (f64, f64),
    /// Left button held
    pub left_button: bool,
    /// Right button held
    pub right_button: bool,
    /// Middle button held
    pub middle_button: bool,
}

impl InputState {
    /// Whether `button` is currently held
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_button,
            MouseButton::Right => self.right_button,
            MouseButton::Middle => self.middle_button,
        }
    }
}

/// Receives scroll events from an [`InputDispatcher`]
pub trait ScrollListener {
    /// Called once per scroll event with the vertical offset
    fn on_scroll(&mut self, y_offset: f64);
}

/// Identifier returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Fans a single scroll source out to any number of listeners
///
/// Listeners are held weakly. Dropping the last strong reference to a
/// listener is enough to stop delivery; dead entries are pruned on dispatch.
#[derive(Default)]
pub struct InputDispatcher {
    listeners: Vec<(ListenerId, Weak<RefCell<dyn ScrollListener>>)>,
    next_id: u64,
}

impl InputDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn ScrollListener>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::downgrade(&listener)));
        log::trace!("Scroll listener {:?} registered", id);
        id
    }

    /// Unregister a listener; unknown ids are ignored
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    /// Deliver a scroll event to every live listener
    pub fn dispatch_scroll(&mut self, y_offset: f64) {
        self.listeners.retain(|(_, listener)| match listener.upgrade() {
            Some(listener) => {
                listener.borrow_mut().on_scroll(y_offset);
                true
            }
            None => false,
        });
    }

    /// Number of registered listeners, including ones not yet pruned
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for InputDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that sums scroll offsets until they are consumed
#[derive(Debug, Default)]
pub struct ScrollAccumulator {
    pending: f64,
}

impl ScrollAccumulator {
    /// Create a shared accumulator and register it with `dispatcher`
    pub fn register(dispatcher: &mut InputDispatcher) -> (Rc<RefCell<Self>>, ListenerId) {
        let accumulator = Rc::new(RefCell::new(Self::default()));
        let id = dispatcher.add_listener(accumulator.clone());
        (accumulator, id)
    }

    /// Return the accumulated offset and reset it
    pub fn take(&mut self) -> f64 {
        std::mem::take(&mut self.pending)
    }

    /// Accumulated offset without consuming it
    pub fn pending(&self) -> f64 {
        self.pending
    }
}

impl ScrollListener for ScrollAccumulator {
    fn on_scroll(&mut self, y_offset: f64) {
        self.pending += y_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let mut dispatcher = InputDispatcher::new();
        let (a, _) = ScrollAccumulator::register(&mut dispatcher);
        let (b, _) = ScrollAccumulator::register(&mut dispatcher);

        dispatcher.dispatch_scroll(1.5);
        dispatcher.dispatch_scroll(-0.5);

        assert_eq!(a.borrow().pending(), 1.0);
        assert_eq!(b.borrow_mut().take(), 1.0);
        assert_eq!(b.borrow().pending(), 0.0);
    }

    #[test]
    fn test_removed_listener_stops_receiving() {
        let mut dispatcher = InputDispatcher::new();
        let (a, id) = ScrollAccumulator::register(&mut dispatcher);
        dispatcher.remove_listener(id);
        dispatcher.dispatch_scroll(3.0);
        assert_eq!(a.borrow().pending(), 0.0);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let mut dispatcher = InputDispatcher::new();
        let (a, _) = ScrollAccumulator::register(&mut dispatcher);
        drop(a);
        assert_eq!(dispatcher.listener_count(), 1);
        dispatcher.dispatch_scroll(1.0);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_input_state_buttons() {
        let state = InputState { right_button: true, ..Default::default() };
        assert!(state.is_pressed(MouseButton::Right));
        assert!(!state.is_pressed(MouseButton::Left));
    }
}
