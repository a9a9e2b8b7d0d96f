use cgmath::{Rad, Vector3};
use engine::PerspectiveCamera;

use crate::{
    config::DesktopConfig,
    spatial::{IntersectionResult, SpatialQueryEngine},
    teleport::TeleportMarker,
    time::Time,
    NavigationMode,
};

use super::{Key, MovementState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerLockState {
    Unlocked,
    Locked,
}

/// What a click landed on. Clicks on UI overlays never teleport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Viewport,
    Overlay,
}

/// Pointer-lock first-person navigation: WASD glide, mouse look, and
/// click-to-teleport onto navigable surfaces.
pub struct DesktopControls {
    config: DesktopConfig,
    lock_state: PointerLockState,
    movement: MovementState,
    teleport_enabled: bool,
}

impl DesktopControls {
    pub fn new(config: DesktopConfig) -> Self {
        DesktopControls {
            config,
            lock_state: PointerLockState::Unlocked,
            movement: MovementState::default(),
            teleport_enabled: true,
        }
    }

    pub fn lock_state(&self) -> PointerLockState {
        self.lock_state
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state == PointerLockState::Locked
    }

    pub fn movement(&self) -> &MovementState {
        &self.movement
    }

    pub fn teleport_enabled(&self) -> bool {
        self.teleport_enabled
    }

    pub fn set_teleport_enabled(&mut self, enabled: bool) {
        self.teleport_enabled = enabled;
    }

    /// Capture the pointer after an explicit user gesture.
    pub fn request_lock(&mut self) {
        if self.lock_state == PointerLockState::Unlocked {
            engine::desktop_log!(DEBUG, "pointer locked");
        }
        self.lock_state = PointerLockState::Locked;
    }

    /// Release the pointer. Held keys are dropped since their key-up events
    /// will not reach us once the pointer is free.
    pub fn unlock(&mut self) {
        if self.lock_state == PointerLockState::Locked {
            engine::desktop_log!(DEBUG, "pointer unlocked");
        }
        self.lock_state = PointerLockState::Unlocked;
        self.movement = MovementState::default();
    }

    /// Record a key transition. Returns false for keys that do not move.
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                engine::input_log!(TRACE, "{code} -> {key:?} pressed={pressed}");
                self.movement.set_key(key, pressed);
                true
            }
            None => false,
        }
    }

    /// Relative pointer motion while locked turns the camera.
    pub fn handle_mouse_look(&self, delta_x: f32, delta_y: f32, camera: &mut PerspectiveCamera) {
        if !self.is_locked() {
            return;
        }
        let sensitivity = self.config.mouse_sensitivity;
        camera.rotate(
            Rad(-delta_x * sensitivity),
            Rad(-delta_y * sensitivity),
            self.config.max_pitch(),
        );
    }

    /// Walk the camera for one frame. Does nothing while unlocked.
    pub fn update(&mut self, time: &Time, camera: &mut PerspectiveCamera) {
        if !self.is_locked() {
            return;
        }

        let (right, forward) = self.movement.step(time.delta_seconds(), &self.config);
        camera.move_right(right);
        camera.move_forward(forward);
    }

    /// Preview the teleport target under the cursor.
    pub fn handle_pointer_move(
        &self,
        screen_x: f32,
        screen_y: f32,
        camera: &PerspectiveCamera,
        spatial: &dyn SpatialQueryEngine,
        marker: &mut TeleportMarker,
    ) -> Option<IntersectionResult> {
        if !self.is_locked() {
            return None;
        }

        let hit = spatial.raycast_from_screen_point(screen_x, screen_y, camera);
        marker.update(hit.as_ref());
        hit
    }

    /// Teleport onto the surface under the cursor. Returns the new camera
    /// position, or `None` if the click was ignored or hit nothing.
    pub fn handle_click(
        &self,
        screen_x: f32,
        screen_y: f32,
        target: ClickTarget,
        camera: &mut PerspectiveCamera,
        spatial: &dyn SpatialQueryEngine,
    ) -> Option<Vector3<f32>> {
        if !self.is_locked() || !self.teleport_enabled || target != ClickTarget::Viewport {
            return None;
        }

        let hit = spatial.raycast_from_screen_point(screen_x, screen_y, camera)?;
        let destination = spatial.compute_teleport_destination(hit.point, NavigationMode::Desktop);
        camera.position = destination;

        engine::desktop_log!(INFO, "teleported to {:?}", destination);
        Some(destination)
    }
}
