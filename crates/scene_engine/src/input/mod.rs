//! Input sampling
//!
//! The editor polls an [`InputSource`] once per frame. [`InputSnapshot`] is
//! a plain in-memory implementation fed by a windowing layer (or a script)
//! and advanced with [`InputSnapshot::end_frame`].

pub mod viewport;

use std::collections::HashMap;

pub use viewport::Viewport;

/// Per-frame state of a key or mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// Not pressed
    #[default]
    Idle,
    /// Pressed this frame
    Down,
    /// Held since an earlier frame
    Repeat,
    /// Released this frame
    Up,
}

impl KeyState {
    /// Whether the key is currently held
    pub fn is_held(self) -> bool {
        matches!(self, Self::Down | Self::Repeat)
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Move forward
    W,
    /// Move left
    A,
    /// Move backward
    S,
    /// Move right
    D,
    /// Move up
    Q,
    /// Move down
    E,
    /// Focus the selection
    F,
    /// Speed boost
    LeftShift,
    /// Orbit modifier
    LeftAlt,
    /// Delete the selection
    Delete,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Right button
    Right,
    /// Middle button
    Middle,
}

/// Poll-based view of the current frame's input
pub trait InputSource {
    /// State of a key
    fn key(&self, key: KeyCode) -> KeyState;

    /// State of a mouse button
    fn mouse_button(&self, button: MouseButton) -> KeyState;

    /// Cursor position in window pixels, origin top-left
    fn mouse_position(&self) -> (f32, f32);

    /// Cursor motion since the previous frame in pixels
    fn mouse_delta(&self) -> (f32, f32);

    /// Wheel steps this frame, positive away from the user
    fn mouse_wheel(&self) -> f32;

    /// Whether a key is held
    fn is_key_held(&self, key: KeyCode) -> bool {
        self.key(key).is_held()
    }

    /// Whether a key went down this frame
    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.key(key) == KeyState::Down
    }

    /// Whether a mouse button is held
    fn is_button_held(&self, button: MouseButton) -> bool {
        self.mouse_button(button).is_held()
    }

    /// Whether a mouse button went down this frame
    fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_button(button) == KeyState::Down
    }
}

/// Input state recorded for one frame
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: HashMap<KeyCode, KeyState>,
    buttons: HashMap<MouseButton, KeyState>,
    mouse_position: (f32, f32),
    mouse_delta: (f32, f32),
    mouse_wheel: f32,
}

impl InputSnapshot {
    /// Create a snapshot with nothing pressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        let state = self.keys.entry(key).or_default();
        *state = next_state(*state, pressed);
    }

    /// Record a mouse button press or release
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        let state = self.buttons.entry(button).or_default();
        *state = next_state(*state, pressed);
    }

    /// Move the cursor, accumulating the motion for this frame
    pub fn move_mouse(&mut self, x: f32, y: f32) {
        self.mouse_delta.0 += x - self.mouse_position.0;
        self.mouse_delta.1 += y - self.mouse_position.1;
        self.mouse_position = (x, y);
    }

    /// Place the cursor without recording motion
    pub fn warp_mouse(&mut self, x: f32, y: f32) {
        self.mouse_position = (x, y);
    }

    /// Record wheel steps
    pub fn scroll(&mut self, steps: f32) {
        self.mouse_wheel += steps;
    }

    /// Advance edge states and clear per-frame motion
    pub fn end_frame(&mut self) {
        for state in self.keys.values_mut().chain(self.buttons.values_mut()) {
            *state = match *state {
                KeyState::Down | KeyState::Repeat => KeyState::Repeat,
                KeyState::Up | KeyState::Idle => KeyState::Idle,
            };
        }
        self.mouse_delta = (0.0, 0.0);
        self.mouse_wheel = 0.0;
    }
}

fn next_state(current: KeyState, pressed: bool) -> KeyState {
    match (current.is_held(), pressed) {
        (false, true) => KeyState::Down,
        (true, true) => current,
        (true, false) => KeyState::Up,
        (false, false) => current,
    }
}

impl InputSource for InputSnapshot {
    fn key(&self, key: KeyCode) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    fn mouse_button(&self, button: MouseButton) -> KeyState {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    fn mouse_wheel(&self) -> f32 {
        self.mouse_wheel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges_advance_per_frame() {
        let mut input = InputSnapshot::new();
        input.set_key(KeyCode::W, true);
        assert!(input.is_key_pressed(KeyCode::W));

        input.end_frame();
        assert_eq!(input.key(KeyCode::W), KeyState::Repeat);
        assert!(input.is_key_held(KeyCode::W));

        input.set_key(KeyCode::W, false);
        assert_eq!(input.key(KeyCode::W), KeyState::Up);
        input.end_frame();
        assert_eq!(input.key(KeyCode::W), KeyState::Idle);
    }

    #[test]
    fn test_mouse_motion_resets_each_frame() {
        let mut input = InputSnapshot::new();
        input.warp_mouse(100.0, 100.0);
        input.move_mouse(110.0, 95.0);
        input.scroll(1.0);
        assert_eq!(input.mouse_delta(), (10.0, -5.0));
        assert_eq!(input.mouse_wheel(), 1.0);

        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
        assert_eq!(input.mouse_position(), (110.0, 95.0));
    }
}
