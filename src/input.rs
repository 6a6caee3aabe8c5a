use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state across frames.
///
/// `key_down` is level triggered (held this frame), `key_pressed` is edge
/// triggered (went down since the last [`Input::begin_frame`]). Auto-repeat
/// events never count as a fresh press.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per frame after the frame has consumed its input.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                match event.state {
                    ElementState::Pressed => self.press(key),
                    ElementState::Released => self.release(key),
                }
            }
        }
    }

    /// Records a key going down.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    /// Records a key going up.
    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_once_while_held() {
        let mut input = Input::new();
        input.press(KeyCode::KeyW);
        assert!(input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));

        input.begin_frame();
        // auto-repeat
        input.press(KeyCode::KeyW);
        assert!(!input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn release_then_press_is_a_new_edge() {
        let mut input = Input::new();
        input.press(KeyCode::KeyC);
        input.begin_frame();
        input.release(KeyCode::KeyC);
        assert!(!input.key_down(KeyCode::KeyC));

        input.begin_frame();
        input.press(KeyCode::KeyC);
        assert!(input.key_pressed(KeyCode::KeyC));
    }

    #[test]
    fn stray_release_is_ignored() {
        let mut input = Input::new();
        input.release(KeyCode::ArrowUp);
        assert!(!input.key_down(KeyCode::ArrowUp));
        assert!(!input.key_pressed(KeyCode::ArrowUp));
    }
}
