//! Editor viewport camera
//!
//! Fly with W/A/S/D and Q/E (Shift boosts), wheel dolly, right mouse free
//! look, Alt + right mouse orbit around the selection, F to frame the
//! selection.

use crate::config::CameraSettings;
use crate::foundation::math::{Quat, Unit, Vec3};
use crate::input::{InputSource, KeyCode, MouseButton};
use crate::scene::camera::Camera;
use crate::scene::graph::{FocusTarget, SceneGraph};

/// Below this |up.y| the orbit only pitches away from the poles
const ORBIT_POLE_GUARD: f32 = 0.3;

/// Free-flying camera the editor views the scene through
#[derive(Debug, Clone)]
pub struct EditorCamera {
    camera: Camera,
    settings: CameraSettings,
    last_delta: (f32, f32),
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl EditorCamera {
    /// Camera placed and aimed as the settings say
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            camera: Camera::from_settings(&settings),
            settings,
            last_delta: (0.0, 0.0),
        }
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Controller settings
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Apply one frame of input
    pub fn update(&mut self, dt: f32, input: &impl InputSource, graph: &SceneGraph) {
        let selected = graph.selected();

        self.fly(dt, input);

        if input.is_key_pressed(KeyCode::F) {
            if let Some(target) = selected.and_then(|id| graph.focus_target(id)) {
                self.focus(&target);
            }
        }

        let mut rotated = false;
        if input.is_button_held(MouseButton::Right) {
            let (motion_x, motion_y) = input.mouse_delta();
            let (dx, dy) = (-motion_x, -motion_y);

            if input.is_key_held(KeyCode::LeftAlt) {
                let pivot = selected
                    .and_then(|id| graph.node(id))
                    .map(|node| node.transform().world_position());
                if let Some(pivot) = pivot {
                    self.orbit(pivot, dx, dy);
                }
            } else {
                rotated = self.free_look(dx, dy);
            }
        }

        if !rotated {
            self.last_delta = (0.0, 0.0);
        }
    }

    /// Keyboard and wheel translation
    pub fn fly(&mut self, dt: f32, input: &impl InputSource) {
        let mut speed = self.settings.movement_speed * dt;
        if input.is_key_held(KeyCode::LeftShift) {
            speed *= self.settings.boost_multiplier;
        }

        let front = self.camera.front();
        let right = self.camera.right();
        let mut offset = Vec3::zeros();

        if input.is_key_held(KeyCode::Q) {
            offset.y += speed;
        }
        if input.is_key_held(KeyCode::E) {
            offset.y -= speed;
        }
        if input.is_key_held(KeyCode::W) {
            offset += front * speed;
        }
        if input.is_key_held(KeyCode::S) {
            offset -= front * speed;
        }
        if input.is_key_held(KeyCode::A) {
            offset += right * speed;
        }
        if input.is_key_held(KeyCode::D) {
            offset -= right * speed;
        }

        let wheel = input.mouse_wheel();
        if wheel > 0.0 {
            offset += front * speed * 2.0;
        } else if wheel < 0.0 {
            offset -= front * speed * 2.0;
        }

        if offset != Vec3::zeros() {
            self.camera.set_position(self.camera.position() + offset);
        }
    }

    /// Distance at which a sphere of `radius` fills the view
    pub fn focus_distance(&self, radius: f32) -> f32 {
        radius * 2.0 / self.camera.horizontal_fov().atan()
    }

    /// Look at a target and, if it has a size, dolly to frame it
    pub fn focus(&mut self, target: &FocusTarget) {
        self.camera.look_at(target.center);
        if let Some(radius) = target.radius {
            let current = (target.center - self.camera.position()).magnitude();
            let desired = self.focus_distance(radius);
            let position = self.camera.position() + self.camera.front() * (current - desired);
            self.camera.set_position(position);
            log::trace!("Focus: distance {} -> {}", current, desired);
        }
    }

    /// Smoothed yaw and pitch from mouse motion; returns whether it turned
    pub fn free_look(&mut self, dx: f32, dy: f32) -> bool {
        let step = self.settings.rotation_step;
        let mut rotated = false;

        if dx != 0.0 {
            let new_delta = dx * self.settings.sensitivity;
            let delta = new_delta + self.settings.smoothing * (self.last_delta.0 - new_delta);
            self.last_delta.0 = delta;

            let angle = if self.camera.up().y >= 0.0 { delta * step } else { -delta * step };
            let yaw = Quat::from_axis_angle(&Vec3::y_axis(), angle);
            self.camera
                .set_orientation(yaw * self.camera.front(), yaw * self.camera.up());
            rotated = true;
        }

        if dy != 0.0 {
            let new_delta = dy * self.settings.sensitivity;
            let delta = new_delta + self.settings.smoothing * (self.last_delta.1 - new_delta);
            self.last_delta.1 = delta;

            if let Some(axis) = Unit::try_new(self.camera.right(), f32::EPSILON) {
                let pitch = Quat::from_axis_angle(&axis, -delta * step);
                self.camera
                    .set_orientation(pitch * self.camera.front(), pitch * self.camera.up());
            }
            rotated = true;
        }

        rotated
    }

    /// Rotate the camera around `pivot` and keep looking at it
    pub fn orbit(&mut self, pivot: Vec3, dx: f32, dy: f32) {
        let step = self.settings.rotation_step;
        let delta_x = dx * self.settings.sensitivity;
        let delta_y = dy * self.settings.sensitivity;

        let mut orbit = Quat::from_axis_angle(&Vec3::y_axis(), delta_x * step);

        let position = self.camera.position();
        let pitch_allowed = if self.camera.up().y.abs() < ORBIT_POLE_GUARD {
            // Near a pole only pitch back toward the horizon
            (position.y > pivot.y && delta_y < 0.0) || (position.y < pivot.y && delta_y > 0.0)
        } else {
            true
        };
        if pitch_allowed {
            if let Some(axis) = Unit::try_new(self.camera.right(), f32::EPSILON) {
                orbit *= Quat::from_axis_angle(&axis, delta_y * step);
            }
        }

        self.camera.set_position(orbit * (position - pivot) + pivot);
        self.camera.look_at(pivot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;
    use crate::scene::primitives::PrimitiveShape;
    use approx::assert_relative_eq;

    #[test]
    fn test_w_moves_along_front() {
        let mut editor = EditorCamera::default();
        let graph = SceneGraph::new();
        let start = editor.camera().position();
        let front = editor.camera().front();

        let mut input = InputSnapshot::new();
        input.set_key(KeyCode::W, true);
        editor.update(0.5, &input, &graph);

        assert_relative_eq!(editor.camera().position(), start + front * 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_shift_boosts_speed() {
        let mut editor = EditorCamera::default();
        let graph = SceneGraph::new();
        let start = editor.camera().position();

        let mut input = InputSnapshot::new();
        input.set_key(KeyCode::Q, true);
        input.set_key(KeyCode::LeftShift, true);
        editor.update(0.25, &input, &graph);

        assert_relative_eq!(editor.camera().position().y, start.y + 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_focus_frames_selected_mesh() {
        let mut graph = SceneGraph::new();
        let cube = graph.create_primitive(PrimitiveShape::Cube, None).unwrap();
        graph.node_mut(cube).unwrap().transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        graph.propagate_transforms();
        graph.set_selected(Some(cube)).unwrap();

        let mut editor = EditorCamera::default();
        let mut input = InputSnapshot::new();
        input.set_key(KeyCode::F, true);
        editor.update(0.016, &input, &graph);

        let target = graph.focus_target(cube).unwrap();
        let expected = editor.focus_distance(target.radius.unwrap());
        let distance = (target.center - editor.camera().position()).magnitude();
        assert_relative_eq!(distance, expected, epsilon = 1e-3);
        assert_relative_eq!(
            editor.camera().front(),
            (target.center - editor.camera().position()).normalize(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_free_look_turns_and_resets_smoothing() {
        let mut editor = EditorCamera::default();
        let graph = SceneGraph::new();
        let front = editor.camera().front();

        let mut input = InputSnapshot::new();
        input.set_button(MouseButton::Right, true);
        input.move_mouse(40.0, 0.0);
        editor.update(0.016, &input, &graph);
        assert!((editor.camera().front() - front).magnitude() > 1e-4);
        assert!(editor.last_delta.0 != 0.0);

        input.end_frame();
        editor.update(0.016, &input, &graph);
        assert_eq!(editor.last_delta, (0.0, 0.0));
    }

    #[test]
    fn test_orbit_keeps_distance_to_pivot() {
        let mut editor = EditorCamera::default();
        let pivot = Vec3::zeros();
        let before = (editor.camera().position() - pivot).magnitude();

        editor.orbit(pivot, 30.0, 10.0);

        let after = (editor.camera().position() - pivot).magnitude();
        assert_relative_eq!(before, after, epsilon = 1e-3);
        assert_relative_eq!(
            editor.camera().front(),
            (pivot - editor.camera().position()).normalize(),
            epsilon = 1e-4
        );
    }
}
