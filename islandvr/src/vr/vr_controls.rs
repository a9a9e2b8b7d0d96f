use std::collections::HashMap;

use cgmath::{Rad, Vector3};

use crate::{
    config::{TurnMode, VrConfig},
    input_context::{Head, InputContext, InputSource, InputSourceId},
    spatial::{IntersectionResult, SpatialQueryEngine},
    teleport::TeleportMarker,
    NavigationMode,
};

use super::ReferenceFrame;

/// Something the VR controller did this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavigationEffect {
    Teleported {
        source: InputSourceId,
        destination: Vector3<f32>,
    },
    Rotated {
        angle: Rad<f32>,
    },
    DebugToggled {
        source: InputSourceId,
    },
}

/// Per-controller edge memory. Dropped when the controller disconnects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceState {
    pub is_selecting: bool,
    pub was_trigger_pressed: bool,
    /// Set once a snap turn fired; cleared when the stick returns inside the dead zone.
    pub turn_triggered: bool,
    pub was_button_pressed: bool,
    /// Hit recorded on the latest frame this source was selecting.
    pub intersection: Option<IntersectionResult>,
}

/// Controller-ray teleport, snap/smooth turning and the debug toggle, all
/// expressed as replacements of the immersive reference frame.
pub struct VrControls {
    config: VrConfig,
    starting_position: Vector3<f32>,
    starting_yaw: Rad<f32>,
    frame: Option<ReferenceFrame>,
    sources: HashMap<InputSourceId, SourceState>,
    intersection: Option<IntersectionResult>,
    debug_toggle: Option<Box<dyn FnMut()>>,
}

impl VrControls {
    pub fn new(config: VrConfig, starting_position: Vector3<f32>, starting_yaw: Rad<f32>) -> Self {
        VrControls {
            config,
            starting_position,
            starting_yaw,
            frame: None,
            sources: HashMap::new(),
            intersection: None,
            debug_toggle: None,
        }
    }

    pub fn config(&self) -> &VrConfig {
        &self.config
    }

    pub fn set_turn_mode(&mut self, turn_mode: TurnMode) {
        self.config.turn_mode = turn_mode;
    }

    /// Establish the starting frame: the device origin is placed on the
    /// configured starting position before any input is read.
    pub fn begin_session(&mut self) {
        let frame = ReferenceFrame::starting_at(self.starting_position, self.starting_yaw);
        engine::vr_log!(INFO, "session frame established at {:?}", frame.origin());
        self.frame = Some(frame);
        self.sources.clear();
        self.intersection = None;
    }

    pub fn end_session(&mut self) {
        self.frame = None;
        self.sources.clear();
        self.intersection = None;
    }

    pub fn reference_frame(&self) -> Option<ReferenceFrame> {
        self.frame
    }

    /// Latest hit among the selecting controllers.
    pub fn intersection(&self) -> Option<IntersectionResult> {
        self.intersection
    }

    pub fn source_state(&self, id: InputSourceId) -> Option<&SourceState> {
        self.sources.get(&id)
    }

    pub fn head_world_position(&self, head: &Head) -> Option<Vector3<f32>> {
        self.frame.map(|frame| frame.head_position(head))
    }

    pub fn set_debug_toggle_callback(&mut self, callback: impl FnMut() + 'static) {
        self.debug_toggle = Some(Box::new(callback));
    }

    /// Shift the frame by a world-space correction (used for ground clamping).
    pub fn apply_world_offset(&mut self, delta: Vector3<f32>) {
        match self.frame {
            Some(frame) => self.frame = Some(frame.translated(delta)),
            None => engine::vr_log!(DEBUG, "no reference frame, ground correction skipped"),
        }
    }

    /// Process one frame of tracked input. Controllers are handled in input
    /// order; a teleport by one is visible to those after it.
    pub fn update(
        &mut self,
        input: &InputContext,
        spatial: &dyn SpatialQueryEngine,
        marker: &mut TeleportMarker,
    ) -> Vec<NavigationEffect> {
        self.sources.retain(|id, _| {
            let connected = input.contains(*id);
            if !connected {
                engine::input_log!(DEBUG, "{id} disconnected");
            }
            connected
        });

        let Some(mut frame) = self.frame else {
            engine::vr_log!(DEBUG, "no reference frame yet, skipping navigation");
            return Vec::new();
        };

        let mut effects = Vec::new();
        let mut pending_yaw = 0.0;
        let mut latest_hit = None;

        for source in &input.sources {
            let state = self.sources.entry(source.id).or_insert_with(|| {
                engine::input_log!(DEBUG, "{} connected ({:?})", source.id, source.handedness);
                SourceState::default()
            });

            if let Some(destination) = Self::update_select(
                &self.config,
                source,
                state,
                &frame,
                spatial,
            ) {
                frame = frame.teleported_to(destination);
                engine::vr_log!(INFO, "{} teleported to {:?}", source.id, destination);
                effects.push(NavigationEffect::Teleported {
                    source: source.id,
                    destination,
                });
            }

            if state.is_selecting {
                if let Some(hit) = state.intersection {
                    latest_hit = Some(hit);
                }
            }

            pending_yaw += Self::update_turn(&self.config, source, state);

            if Self::update_debug_button(&self.config, source, state) {
                if let Some(callback) = self.debug_toggle.as_mut() {
                    callback();
                }
                effects.push(NavigationEffect::DebugToggled { source: source.id });
            }
        }

        if pending_yaw != 0.0 {
            let angle = Rad(pending_yaw);
            frame = frame.rotated_about(frame.head_position(&input.head), angle);
            engine::vr_log!(TRACE, "turned {:?}", angle);
            effects.push(NavigationEffect::Rotated { angle });
        }

        self.frame = Some(frame);
        self.intersection = latest_hit;
        marker.update(latest_hit.as_ref());

        effects
    }

    /// Trigger edges and continuous targeting. Returns a destination when a
    /// release commits a teleport.
    fn update_select(
        config: &VrConfig,
        source: &InputSource,
        state: &mut SourceState,
        frame: &ReferenceFrame,
        spatial: &dyn SpatialQueryEngine,
    ) -> Option<Vector3<f32>> {
        let is_pressed = source.trigger_value >= config.trigger_threshold;
        let just_pressed = is_pressed && !state.was_trigger_pressed;
        let just_released = !is_pressed && state.was_trigger_pressed;
        state.was_trigger_pressed = is_pressed;

        if just_pressed {
            state.is_selecting = true;
            state.intersection = None;
        }

        if just_released && state.is_selecting {
            state.is_selecting = false;
            // Releasing before anything was hit cancels the teleport
            let hit = state.intersection.take()?;
            return Some(spatial.compute_teleport_destination(hit.point, NavigationMode::Vr));
        }

        if state.is_selecting {
            let origin = frame.to_world_point(source.position);
            let direction = frame.to_world_direction(source.ray_direction());
            state.intersection = spatial.raycast_from_pose(origin, direction);
        }

        None
    }

    /// Yaw requested by this source's thumbstick, in radians.
    fn update_turn(config: &VrConfig, source: &InputSource, state: &mut SourceState) -> f32 {
        let Some(gamepad) = source.gamepad.as_ref() else {
            return 0.0;
        };
        let x = gamepad.thumbstick.x;
        if !x.is_finite() {
            return 0.0;
        }

        match config.turn_mode {
            TurnMode::Smooth => {
                if x.abs() < config.smooth_dead_zone {
                    0.0
                } else {
                    -x * config.smooth_turn_speed
                }
            }
            TurnMode::Snap => {
                if x.abs() < config.snap_dead_zone {
                    state.turn_triggered = false;
                    0.0
                } else if state.turn_triggered {
                    0.0
                } else {
                    state.turn_triggered = true;
                    -x.signum() * config.snap_angle().0
                }
            }
        }
    }

    fn update_debug_button(config: &VrConfig, source: &InputSource, state: &mut SourceState) -> bool {
        let value = source.gamepad.map_or(0.0, |g| g.secondary_button);
        let is_pressed = value >= config.button_threshold;
        let just_pressed = is_pressed && !state.was_button_pressed;
        state.was_button_pressed = is_pressed;
        just_pressed
    }
}
