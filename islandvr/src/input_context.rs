use std::fmt;

use cgmath::{vec2, vec3, Quaternion, Vector2, Vector3};

/// Typical standing eye height reported by a headset over a `local-floor` space.
pub const DEFAULT_EYE_HEIGHT: f32 = 1.6;

/// Tracked-device state for one frame.
///
/// Poses are in tracking space, i.e. exactly what the headset reports. The VR
/// controller maps them into the world through its reference frame.
#[derive(Clone, Debug, PartialEq)]
pub struct InputContext {
    pub head: Head,
    pub sources: Vec<InputSource>,
}

impl Default for InputContext {
    fn default() -> Self {
        InputContext {
            head: Head::default(),
            sources: Vec::new(),
        }
    }
}

impl InputContext {
    pub fn with_sources(head: Head, sources: Vec<InputSource>) -> Self {
        InputContext { head, sources }
    }

    pub fn source(&self, id: InputSourceId) -> Option<&InputSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: InputSourceId) -> bool {
        self.source(id).is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Head {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Default for Head {
    fn default() -> Self {
        Head {
            position: vec3(0.0, DEFAULT_EYE_HEIGHT, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Head {
    pub fn at(position: Vector3<f32>) -> Self {
        Head {
            position,
            ..Head::default()
        }
    }
}

/// Stable identity of a tracked input source for the lifetime of its connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputSourceId(pub u32);

impl fmt::Display for InputSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    None,
}

/// Gamepad-style axes and buttons attached to a tracked controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gamepad {
    pub thumbstick: Vector2<f32>,
    /// Analog value of the secondary face button (B/Y).
    pub secondary_button: f32,
}

impl Default for Gamepad {
    fn default() -> Self {
        Gamepad {
            thumbstick: vec2(0.0, 0.0),
            secondary_button: 0.0,
        }
    }
}

/// A tracked controller. The target ray starts at `position` and points along
/// the local -Z axis of `rotation`.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSource {
    pub id: InputSourceId,
    pub handedness: Handedness,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    /// Select (trigger) value in `[0, 1]`.
    pub trigger_value: f32,
    /// Hand-tracking and gaze sources carry no gamepad.
    pub gamepad: Option<Gamepad>,
}

impl InputSource {
    pub fn new(id: InputSourceId, handedness: Handedness) -> Self {
        InputSource {
            id,
            handedness,
            position: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            trigger_value: 0.0,
            gamepad: Some(Gamepad::default()),
        }
    }

    pub fn with_pose(mut self, position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    pub fn with_trigger(mut self, value: f32) -> Self {
        self.trigger_value = value;
        self
    }

    pub fn with_thumbstick(mut self, x: f32, y: f32) -> Self {
        self.gamepad.get_or_insert_with(Gamepad::default).thumbstick = vec2(x, y);
        self
    }

    pub fn with_secondary_button(mut self, value: f32) -> Self {
        self.gamepad.get_or_insert_with(Gamepad::default).secondary_button = value;
        self
    }

    pub fn without_gamepad(mut self) -> Self {
        self.gamepad = None;
        self
    }

    /// Direction of the target ray in tracking space.
    pub fn ray_direction(&self) -> Vector3<f32> {
        self.rotation * vec3(0.0, 0.0, -1.0)
    }
}
