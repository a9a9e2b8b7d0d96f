use std::sync::Arc;

use cgmath::{InnerSpace, Vector2, Vector3};
use engine::PerspectiveCamera;

use crate::{
    config::NavigationConfig,
    debug_readout::DebugReadout,
    desktop::{ClickTarget, DesktopControls},
    input_context::{Head, InputContext},
    spatial::{IntersectionResult, NavigableSurface, SpatialQueryEngine, SurfaceSpatialData},
    teleport::TeleportMarker,
    time::Time,
    vr::{NavigationEffect, VrControls},
    NavigationMode,
};

/// Owns both controllers and decides, frame by frame, which one drives the
/// viewer. Gravity is applied here, once, for whichever pose is authoritative.
pub struct NavigationSession {
    config: NavigationConfig,
    mode: NavigationMode,
    camera: PerspectiveCamera,
    spatial: Box<dyn SpatialQueryEngine>,
    desktop: DesktopControls,
    vr: VrControls,
    marker: TeleportMarker,
    pointer: Option<Vector2<f32>>,
    last_intersection: Option<IntersectionResult>,
    last_head: Head,
}

impl NavigationSession {
    pub fn new(config: NavigationConfig, viewport: Vector2<f32>) -> Self {
        let spatial = Box::new(SurfaceSpatialData::from_config(&config));
        Self::with_spatial_engine(config, viewport, spatial)
    }

    pub fn with_spatial_engine(
        config: NavigationConfig,
        viewport: Vector2<f32>,
        spatial: Box<dyn SpatialQueryEngine>,
    ) -> Self {
        let starting_position = config.session.starting_position();
        let starting_yaw = config.session.starting_yaw();

        let mut camera = PerspectiveCamera::new(starting_position, viewport);
        camera.yaw = starting_yaw;

        NavigationSession {
            desktop: DesktopControls::new(config.desktop.clone()),
            vr: VrControls::new(config.vr.clone(), starting_position, starting_yaw),
            config,
            mode: NavigationMode::Desktop,
            camera,
            spatial,
            marker: TeleportMarker::default(),
            pointer: None,
            last_intersection: None,
            last_head: Head::default(),
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    pub fn desktop(&self) -> &DesktopControls {
        &self.desktop
    }

    pub fn vr(&self) -> &VrControls {
        &self.vr
    }

    pub fn spatial(&self) -> &dyn SpatialQueryEngine {
        self.spatial.as_ref()
    }

    pub fn marker(&self) -> &TeleportMarker {
        &self.marker
    }

    /// The scene replaced its navigable geometry. Takes effect for the next query.
    pub fn set_navigable_surfaces(&mut self, surfaces: Vec<Arc<NavigableSurface>>) {
        self.spatial.set_navigable_surfaces(surfaces);
    }

    pub fn set_debug_toggle_callback(&mut self, callback: impl FnMut() + 'static) {
        self.vr.set_debug_toggle_callback(callback);
    }

    pub fn on_session_start(&mut self) {
        if self.mode == NavigationMode::Vr {
            engine::session_log!(WARN, "session start while already immersive, ignoring");
            return;
        }

        self.desktop.unlock();
        self.desktop.set_teleport_enabled(false);
        self.vr.begin_session();
        self.mode = NavigationMode::Vr;
        self.clear_targeting();

        engine::session_log!(INFO, "entered immersive mode");
    }

    pub fn on_session_end(&mut self) {
        if self.mode == NavigationMode::Desktop {
            engine::session_log!(WARN, "session end while on desktop, ignoring");
            return;
        }

        self.vr.end_session();
        self.desktop.set_teleport_enabled(true);
        self.mode = NavigationMode::Desktop;
        self.clear_targeting();

        engine::session_log!(INFO, "returned to desktop mode");
    }

    /// One frame: run the active controller, then clamp its pose to the ground.
    /// `xr` is the tracked input for this frame, when a headset is presenting.
    pub fn update(&mut self, time: &Time, xr: Option<&InputContext>) -> Vec<NavigationEffect> {
        match self.mode {
            NavigationMode::Desktop => {
                self.update_desktop(time);
                Vec::new()
            }
            NavigationMode::Vr => self.update_vr(xr),
        }
    }

    fn update_desktop(&mut self, time: &Time) {
        self.desktop.update(time, &mut self.camera);

        let position = self.camera.position;
        let clamped = self.spatial.clamp_to_ground(position, NavigationMode::Desktop);
        if (clamped - position).magnitude() > self.config.session.clamp_epsilon {
            engine::spatial_log!(TRACE, "desktop ground clamp {:?} -> {:?}", position, clamped);
            self.camera.position = clamped;
        }

        // Re-aim the preview since the camera may have moved under a still pointer
        if let Some(pointer) = self.pointer {
            self.last_intersection = self.desktop.handle_pointer_move(
                pointer.x,
                pointer.y,
                &self.camera,
                self.spatial.as_ref(),
                &mut self.marker,
            );
        }
    }

    fn update_vr(&mut self, xr: Option<&InputContext>) -> Vec<NavigationEffect> {
        let effects = match xr {
            Some(input) => {
                self.last_head = input.head;
                let effects = self.vr.update(input, self.spatial.as_ref(), &mut self.marker);
                self.last_intersection = self.vr.intersection();
                effects
            }
            None => Vec::new(),
        };

        if let Some(head) = self.vr.head_world_position(&self.last_head) {
            let clamped = self.spatial.clamp_to_ground(head, NavigationMode::Vr);
            let correction = clamped - head;
            if correction.magnitude() > self.config.session.clamp_epsilon {
                engine::spatial_log!(TRACE, "vr ground clamp {:?} -> {:?}", head, clamped);
                self.vr.apply_world_offset(correction);
            }
        }

        effects
    }

    fn clear_targeting(&mut self) {
        self.pointer = None;
        self.last_intersection = None;
        self.marker.hide();
    }

    /// Camera position on desktop, head position in VR.
    pub fn authoritative_position(&self) -> Vector3<f32> {
        match self.mode {
            NavigationMode::Desktop => self.camera.position,
            NavigationMode::Vr => self
                .vr
                .head_world_position(&self.last_head)
                .unwrap_or(self.camera.position),
        }
    }

    pub fn last_intersection(&self) -> Option<IntersectionResult> {
        self.last_intersection
    }

    /// Where committing the current intersection would put the subject.
    pub fn teleport_target(&self) -> Option<Vector3<f32>> {
        self.last_intersection
            .map(|hit| self.spatial.compute_teleport_destination(hit.point, self.mode))
    }

    pub fn debug_readout(&self) -> DebugReadout {
        DebugReadout {
            position: self.authoritative_position(),
            raycast_hit: self.last_intersection.map(|hit| hit.point),
            teleport_target: self.teleport_target(),
            mode: self.mode,
        }
    }

    /// Capture gesture on the viewport. Only honoured on desktop.
    pub fn request_pointer_lock(&mut self) -> bool {
        if self.mode != NavigationMode::Desktop {
            return false;
        }
        self.desktop.request_lock();
        true
    }

    pub fn release_pointer_lock(&mut self) {
        self.desktop.unlock();
        if self.mode == NavigationMode::Desktop {
            self.clear_targeting();
        }
    }

    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        self.desktop.handle_key(code, pressed)
    }

    pub fn handle_mouse_look(&mut self, delta_x: f32, delta_y: f32) {
        if self.mode == NavigationMode::Desktop {
            self.desktop.handle_mouse_look(delta_x, delta_y, &mut self.camera);
        }
    }

    pub fn handle_pointer_move(&mut self, screen_x: f32, screen_y: f32) {
        if self.mode != NavigationMode::Desktop || !self.desktop.is_locked() {
            return;
        }
        self.pointer = Some(Vector2::new(screen_x, screen_y));
        self.last_intersection = self.desktop.handle_pointer_move(
            screen_x,
            screen_y,
            &self.camera,
            self.spatial.as_ref(),
            &mut self.marker,
        );
    }

    pub fn handle_click(
        &mut self,
        screen_x: f32,
        screen_y: f32,
        target: ClickTarget,
    ) -> Option<Vector3<f32>> {
        if self.mode != NavigationMode::Desktop {
            return None;
        }
        self.desktop.handle_click(
            screen_x,
            screen_y,
            target,
            &mut self.camera,
            self.spatial.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input_context::{Handedness, InputSource, InputSourceId},
        spatial::SurfaceTransform,
    };
    use cgmath::{vec2, vec3, Deg, Quaternion, Rad, Rotation3};
    use std::{cell::Cell, f32::consts::FRAC_PI_2, rc::Rc, time::Duration};

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
    }

    fn frame() -> Time {
        Time::first_frame(Duration::from_millis(16))
    }

    fn session_over_floor() -> NavigationSession {
        let mut session = NavigationSession::new(NavigationConfig::default(), vec2(800.0, 600.0));
        let floor =
            NavigableSurface::plane("floor", 100.0, 100.0, SurfaceTransform::default()).unwrap();
        session.set_navigable_surfaces(vec![Arc::new(floor)]);
        session
    }

    fn look_straight_down(session: &mut NavigationSession, position: Vector3<f32>) {
        session.camera.position = position;
        session.camera.yaw = Rad(0.0);
        session.camera.pitch = Rad(-FRAC_PI_2);
    }

    #[test]
    fn test_starts_on_desktop_at_starting_position() {
        let session = NavigationSession::new(NavigationConfig::default(), vec2(800.0, 600.0));
        assert_eq!(session.mode(), NavigationMode::Desktop);
        assert_eq!(session.authoritative_position(), vec3(-5.0, 18.0, 5.0));
        assert!(session.last_intersection().is_none());
        assert!(session.teleport_target().is_none());
    }

    #[test]
    fn test_desktop_click_scenario() {
        let mut session = session_over_floor();
        look_straight_down(&mut session, vec3(2.0, 5.0, 3.0));
        assert!(session.request_pointer_lock());

        session.handle_pointer_move(400.0, 300.0);
        assert_close(session.last_intersection().unwrap().point, vec3(2.0, 0.0, 3.0));
        assert_close(session.teleport_target().unwrap(), vec3(2.0, 0.25, 3.0));
        assert!(session.marker().visible);

        session.handle_click(400.0, 300.0, ClickTarget::Viewport).unwrap();
        assert_close(session.authoritative_position(), vec3(2.0, 0.25, 3.0));
    }

    #[test]
    fn test_desktop_gravity_lifts_camera() {
        let mut session = session_over_floor();
        session.camera.position = vec3(1.0, -2.0, 1.0);
        session.update(&frame(), None);
        assert_close(session.authoritative_position(), vec3(1.0, 0.25, 1.0));

        // Resting on the floor stays put
        let rested = session.authoritative_position();
        session.update(&frame(), None);
        assert_eq!(session.authoritative_position(), rested);
    }

    #[test]
    fn test_desktop_without_surfaces_uses_minimum_height() {
        let mut session = NavigationSession::new(NavigationConfig::default(), vec2(800.0, 600.0));
        session.camera.position = vec3(0.0, -40.0, 0.0);
        session.update(&frame(), None);
        assert_close(session.authoritative_position(), vec3(0.0, 0.25, 0.0));
    }

    #[test]
    fn test_session_start_unlocks_and_blocks_desktop_teleport() {
        let mut session = session_over_floor();
        look_straight_down(&mut session, vec3(2.0, 5.0, 3.0));
        session.request_pointer_lock();
        session.handle_key("KeyW", true);

        session.on_session_start();
        assert_eq!(session.mode(), NavigationMode::Vr);
        assert!(!session.desktop().is_locked());
        assert!(!session.desktop().teleport_enabled());
        assert!(!session.request_pointer_lock());
        assert!(session
            .handle_click(400.0, 300.0, ClickTarget::Viewport)
            .is_none());
        assert_eq!(session.debug_readout().mode_text(), "VR");

        session.on_session_end();
        assert_eq!(session.mode(), NavigationMode::Desktop);
        assert!(session.desktop().teleport_enabled());
        assert!(session.request_pointer_lock());
        assert!(session
            .handle_click(400.0, 300.0, ClickTarget::Viewport)
            .is_some());
    }

    #[test]
    fn test_vr_head_starts_at_starting_position() {
        let mut session = session_over_floor();
        session.on_session_start();
        let input = InputContext::default();
        session.update(&frame(), Some(&input));
        assert_close(session.authoritative_position(), vec3(-5.0, 19.6, 5.0));
    }

    #[test]
    fn test_vr_teleport_and_readout() {
        let mut session = session_over_floor();
        session.on_session_start();

        let controller = |trigger: f32| {
            InputSource::new(InputSourceId(1), Handedness::Right)
                .with_pose(vec3(0.0, 1.0, 0.0), Quaternion::from_angle_x(Deg(-45.0)))
                .with_trigger(trigger)
        };

        let selecting = InputContext::with_sources(Head::default(), vec![controller(1.0)]);
        session.update(&frame(), Some(&selecting));
        let hit = session.last_intersection().unwrap();
        // Controller held at (-5, 19, 5) pointing down at 45 degrees toward -Z
        assert_close(hit.point, vec3(-5.0, 0.0, -14.0));
        assert_close(session.teleport_target().unwrap(), vec3(-5.0, 0.1, -14.0));

        let released = InputContext::with_sources(Head::default(), vec![controller(0.0)]);
        let effects = session.update(&frame(), Some(&released));
        assert_eq!(effects.len(), 1);
        assert_close(session.authoritative_position(), vec3(-5.0, 1.7, -14.0));

        let readout = session.debug_readout();
        assert_eq!(readout.position_text(), "-5.00, 1.70, -14.00");
        assert_eq!(readout.raycast_text(), "No hit");
        assert_eq!(readout.teleport_text(), "None");
    }

    #[test]
    fn test_vr_gravity_lifts_head_through_frame() {
        let mut session = session_over_floor();
        session.on_session_start();

        // Head reported below the floor
        let input = InputContext::with_sources(Head::at(vec3(0.0, -19.0, 0.0)), vec![]);
        session.update(&frame(), Some(&input));
        assert_close(session.authoritative_position(), vec3(-5.0, 0.1, 5.0));

        session.update(&frame(), Some(&input));
        assert_close(session.authoritative_position(), vec3(-5.0, 0.1, 5.0));
    }

    #[test]
    fn test_debug_toggle_reaches_registered_callback() {
        let mut session = session_over_floor();
        let toggled = Rc::new(Cell::new(false));
        let flag = toggled.clone();
        session.set_debug_toggle_callback(move || flag.set(!flag.get()));
        session.on_session_start();

        let input = InputContext::with_sources(
            Head::default(),
            vec![InputSource::new(InputSourceId(0), Handedness::Left).with_secondary_button(1.0)],
        );
        session.update(&frame(), Some(&input));
        assert!(toggled.get());
    }

    #[test]
    fn test_missing_xr_frame_is_harmless() {
        let mut session = session_over_floor();
        session.on_session_start();
        assert!(session.update(&frame(), None).is_empty());
        assert_close(session.authoritative_position(), vec3(-5.0, 19.6, 5.0));
    }

    #[test]
    fn test_pointer_preview_tracks_camera_movement() {
        let mut session = session_over_floor();
        look_straight_down(&mut session, vec3(0.0, 5.0, 0.0));
        session.request_pointer_lock();
        session.handle_pointer_move(400.0, 300.0);

        session.camera.position = vec3(3.0, 5.0, 0.0);
        session.update(&frame(), None);
        assert_close(session.last_intersection().unwrap().point, vec3(3.0, 0.0, 0.0));

        session.release_pointer_lock();
        assert!(session.last_intersection().is_none());
        assert!(!session.marker().visible);
    }
}
