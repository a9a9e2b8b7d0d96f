use cgmath::{vec3, InnerSpace, Vector3};

use crate::config::DesktopConfig;

/// Movement intents the keyboard can hold down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
}

impl Key {
    /// Map a physical key code (`KeyboardEvent.code` naming) to a movement key.
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "KeyW" | "ArrowUp" => Some(Key::Forward),
            "KeyS" | "ArrowDown" => Some(Key::Backward),
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            _ => None,
        }
    }
}

/// Held keys plus the gliding velocity they produce, in camera-local axes
/// (x = right, z = backward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub velocity: Vector3<f32>,
}

impl Default for MovementState {
    fn default() -> Self {
        MovementState {
            move_forward: false,
            move_backward: false,
            move_left: false,
            move_right: false,
            velocity: vec3(0.0, 0.0, 0.0),
        }
    }
}

impl MovementState {
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Forward => self.move_forward = pressed,
            Key::Backward => self.move_backward = pressed,
            Key::Left => self.move_left = pressed,
            Key::Right => self.move_right = pressed,
        }
    }

    pub fn any_held(&self) -> bool {
        self.move_forward || self.move_backward || self.move_left || self.move_right
    }

    pub fn release_all(&mut self) {
        self.move_forward = false;
        self.move_backward = false;
        self.move_left = false;
        self.move_right = false;
    }

    /// Unit direction of the held keys; zero when nothing (or only opposing
    /// keys) is held.
    pub fn input_direction(&self) -> Vector3<f32> {
        let direction = vec3(
            axis(self.move_right, self.move_left),
            0.0,
            axis(self.move_forward, self.move_backward),
        );
        let length = direction.magnitude();
        if length > f32::EPSILON {
            direction / length
        } else {
            vec3(0.0, 0.0, 0.0)
        }
    }

    /// Advance the glide by `delta` seconds and return the camera-relative
    /// step `(right, forward)` to walk this frame.
    pub fn step(&mut self, delta: f32, config: &DesktopConfig) -> (f32, f32) {
        let decay = (-config.damping * delta).exp();
        self.velocity.x *= decay;
        self.velocity.z *= decay;

        let direction = self.input_direction();
        if self.move_forward || self.move_backward {
            self.velocity.z -= direction.z * config.acceleration * delta;
        }
        if self.move_left || self.move_right {
            self.velocity.x -= direction.x * config.acceleration * delta;
        }

        (-self.velocity.x * delta, -self.velocity.z * delta)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::Forward));
        assert_eq!(Key::from_code("ArrowUp"), Some(Key::Forward));
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Right));
        assert_eq!(Key::from_code("Space"), None);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut state = MovementState::default();
        state.set_key(Key::Forward, true);
        state.set_key(Key::Right, true);
        assert!((state.input_direction().magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposing_keys_give_zero_direction() {
        let mut state = MovementState::default();
        state.set_key(Key::Forward, true);
        state.set_key(Key::Backward, true);
        assert_eq!(state.input_direction(), vec3(0.0, 0.0, 0.0));

        let (right, forward) = state.step(FRAME, &DesktopConfig::default());
        assert_eq!((right, forward), (0.0, 0.0));
        assert!(state.velocity.x.is_finite() && state.velocity.z.is_finite());
    }

    #[test]
    fn test_forward_key_walks_forward() {
        let config = DesktopConfig::default();
        let mut state = MovementState::default();
        state.set_key(Key::Forward, true);

        let mut walked = 0.0;
        for _ in 0..30 {
            let (right, forward) = state.step(FRAME, &config);
            assert_eq!(right, 0.0);
            walked += forward;
        }
        assert!(walked > 0.0);
    }

    #[test]
    fn test_velocity_decays_to_rest_without_input() {
        let config = DesktopConfig::default();
        let mut state = MovementState::default();
        state.set_key(Key::Left, true);
        for _ in 0..60 {
            state.step(FRAME, &config);
        }
        assert!(state.velocity.magnitude() > 0.1);

        state.release_all();
        let mut frames = 0;
        while state.velocity.magnitude() > 1e-4 {
            state.step(FRAME, &config);
            frames += 1;
            assert!(frames < 200, "velocity never settled: {:?}", state.velocity);
        }
    }

    #[test]
    fn test_large_frame_does_not_reverse_velocity() {
        let config = DesktopConfig::default();
        let mut state = MovementState {
            velocity: vec3(2.0, 0.0, -3.0),
            ..MovementState::default()
        };
        state.step(1.0, &config);
        assert!(state.velocity.x >= 0.0 && state.velocity.z <= 0.0);
    }
}
