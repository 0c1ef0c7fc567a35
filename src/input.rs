use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard and mouse state between redraws.
///
/// Events are folded in as they arrive; per-frame deltas are cleared by
/// [`Input::begin_frame`] once the frame has consumed them. The overlay can
/// [`capture`](Input::capture_pointer) the pointer for the rest of a frame so
/// the orbit controller ignores clicks that landed on a button.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    pointer_captured: bool,
    drag_captured: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame state. Call after the frame has read its input.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_buttons_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.pointer_captured = false;
        if self.mouse_buttons_down.is_empty() {
            self.drag_captured = false;
        }
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if self.keys_down.insert(key) {
                                self.keys_pressed.insert(key);
                            }
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if self.mouse_buttons_down.insert(*button) {
                        self.mouse_buttons_pressed.insert(*button);
                    }
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                self.mouse_delta += new_pos - self.mouse_position;
                self.mouse_position = new_pos;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
            }
            WindowEvent::Focused(false) => {
                // Releases can be lost while unfocused.
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Mark the pointer as used by the overlay for this frame. A press that is
    /// captured also blocks the drag that follows it until every button is up.
    pub fn capture_pointer(&mut self) {
        self.pointer_captured = true;
        if !self.mouse_buttons_pressed.is_empty() {
            self.drag_captured = true;
        }
    }

    /// True when the overlay owns the pointer, so camera controls should
    /// ignore mouse input.
    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured || self.drag_captured
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
impl Input {
    pub(crate) fn press_mouse(&mut self, button: MouseButton) {
        if self.mouse_buttons_down.insert(button) {
            self.mouse_buttons_pressed.insert(button);
        }
    }

    pub(crate) fn release_mouse(&mut self, button: MouseButton) {
        self.mouse_buttons_down.remove(&button);
    }

    pub(crate) fn move_mouse(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    pub(crate) fn scroll(&mut self, lines: f32) {
        self.scroll_delta.y += lines;
    }

    pub(crate) fn press_key(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_are_reported_once() {
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        assert!(input.mouse_pressed(MouseButton::Left));
        input.begin_frame();
        assert!(!input.mouse_pressed(MouseButton::Left));
        assert!(input.mouse_down(MouseButton::Left));
    }

    #[test]
    fn deltas_reset_each_frame() {
        let mut input = Input::new();
        input.move_mouse(Vec2::new(10.0, 5.0));
        input.scroll(2.0);
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, 5.0));
        assert_eq!(input.scroll_delta().y, 2.0);
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn captured_press_blocks_the_following_drag() {
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.capture_pointer();
        assert!(input.pointer_captured());

        input.begin_frame();
        input.move_mouse(Vec2::new(40.0, 0.0));
        assert!(input.pointer_captured());

        input.release_mouse(MouseButton::Left);
        input.begin_frame();
        assert!(!input.pointer_captured());
    }

    #[test]
    fn hover_capture_lasts_one_frame() {
        let mut input = Input::new();
        input.capture_pointer();
        assert!(input.pointer_captured());
        input.begin_frame();
        assert!(!input.pointer_captured());
    }
}
