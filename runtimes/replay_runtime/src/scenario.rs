// Scripted input for the replay runtime.
//
// A scenario is the stand-in for a browser tab: the surfaces a loader would
// hand over, plus what the user does with keyboard, mouse and headset on each
// animation frame.

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use cgmath::{vec2, Deg, Euler, Quaternion, Rotation3, Vector3};
use islandvr::{
    desktop::ClickTarget, vr::NavigationEffect, Handedness, Head, InputContext, InputSource,
    InputSourceId, NavResult, NavigableSurface, NavigationSession, SurfaceTransform, Time,
};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 2],
    #[serde(default = "default_frame_time_ms")]
    pub frame_time_ms: u64,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
}

fn default_viewport() -> [f32; 2] {
    [1280.0, 720.0]
}

fn default_frame_time_ms() -> u64 {
    16
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurfaceSpec {
    pub name: String,
    #[serde(flatten)]
    pub geometry: GeometrySpec,
    #[serde(default)]
    pub transform: TransformSpec,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometrySpec {
    Plane {
        width: f32,
        depth: f32,
    },
    Mesh {
        vertices: Vec<[f32; 3]>,
        indices: Vec<[u32; 3]>,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub translation: [f32; 3],
    /// Euler angles, degrees.
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for TransformSpec {
    fn default() -> Self {
        TransformSpec {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: 1.0,
        }
    }
}

impl TransformSpec {
    fn to_transform(&self) -> SurfaceTransform {
        let [x, y, z] = self.rotation;
        SurfaceTransform::from_translation(self.translation.into())
            .with_rotation(Quaternion::from(Euler::new(Deg(x), Deg(y), Deg(z))))
            .with_scale(self.scale)
    }
}

impl SurfaceSpec {
    pub fn build(&self) -> NavResult<NavigableSurface> {
        let transform = self.transform.to_transform();
        match &self.geometry {
            GeometrySpec::Plane { width, depth } => {
                NavigableSurface::plane(self.name.clone(), *width, *depth, transform)
            }
            GeometrySpec::Mesh { vertices, indices } => NavigableSurface::triangle_mesh(
                self.name.clone(),
                vertices.iter().map(|&v| Vector3::from(v)).collect(),
                indices.clone(),
                transform,
            ),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FrameSpec {
    /// Run this frame several times. Events fire on the first repetition only.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    /// Headset state; absent while no immersive session presents.
    #[serde(default)]
    pub xr: Option<XrSpec>,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSpec {
    Lock,
    Unlock,
    Key {
        code: String,
        pressed: bool,
    },
    MouseLook {
        dx: f32,
        dy: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        overlay: bool,
    },
    Resize {
        width: f32,
        height: f32,
    },
    SessionStart,
    SessionEnd,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PoseSpec {
    pub position: Option<[f32; 3]>,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
}

impl PoseSpec {
    fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Deg(self.yaw_degrees))
            * Quaternion::from_angle_x(Deg(self.pitch_degrees))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct XrSpec {
    pub head: PoseSpec,
    pub sources: Vec<SourceSpec>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSpec {
    Left,
    Right,
    #[default]
    None,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceSpec {
    pub id: u32,
    #[serde(default)]
    pub hand: HandSpec,
    #[serde(flatten)]
    pub pose: PoseSpec,
    #[serde(default)]
    pub trigger: f32,
    #[serde(default)]
    pub thumbstick: [f32; 2],
    #[serde(default)]
    pub secondary_button: f32,
    #[serde(default = "default_has_gamepad")]
    pub gamepad: bool,
}

fn default_has_gamepad() -> bool {
    true
}

impl XrSpec {
    pub fn to_input_context(&self) -> InputContext {
        let mut head = Head::default();
        if let Some(position) = self.head.position {
            head.position = position.into();
        }
        head.rotation = self.head.rotation();

        let sources = self
            .sources
            .iter()
            .map(|spec| {
                let handedness = match spec.hand {
                    HandSpec::Left => Handedness::Left,
                    HandSpec::Right => Handedness::Right,
                    HandSpec::None => Handedness::None,
                };
                let position = spec.pose.position.unwrap_or([0.0, 0.0, 0.0]);
                let source = InputSource::new(InputSourceId(spec.id), handedness)
                    .with_pose(position.into(), spec.pose.rotation())
                    .with_trigger(spec.trigger);

                if spec.gamepad {
                    source
                        .with_thumbstick(spec.thumbstick[0], spec.thumbstick[1])
                        .with_secondary_button(spec.secondary_button)
                } else {
                    source.without_gamepad()
                }
            })
            .collect();

        InputContext::with_sources(head, sources)
    }
}

impl Scenario {
    pub fn from_json_str(content: &str) -> anyhow::Result<Scenario> {
        let scenario = serde_json::from_str(content).context("invalid scenario JSON")?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> anyhow::Result<Scenario> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn build_surfaces(&self) -> anyhow::Result<Vec<Arc<NavigableSurface>>> {
        self.surfaces
            .iter()
            .map(|spec| {
                spec.build()
                    .map(Arc::new)
                    .with_context(|| format!("building surface '{}'", spec.name))
            })
            .collect()
    }

    pub fn viewport(&self) -> cgmath::Vector2<f32> {
        vec2(self.viewport[0], self.viewport[1])
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(self.frame_time_ms)
    }

    /// Total animation frames once repeats are expanded.
    pub fn frame_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat as usize).sum()
    }
}

/// What happened during one replayed frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    pub teleports: Vec<Vector3<f32>>,
    pub rotations: usize,
    pub debug_toggles: usize,
}

fn apply_event(session: &mut NavigationSession, event: &EventSpec, report: &mut FrameReport) {
    match event {
        EventSpec::Lock => {
            session.request_pointer_lock();
        }
        EventSpec::Unlock => session.release_pointer_lock(),
        EventSpec::Key { code, pressed } => {
            if !session.handle_key(code, *pressed) {
                engine::input_log!(DEBUG, "ignoring key {code}");
            }
        }
        EventSpec::MouseLook { dx, dy } => session.handle_mouse_look(*dx, *dy),
        EventSpec::PointerMove { x, y } => session.handle_pointer_move(*x, *y),
        EventSpec::Click { x, y, overlay } => {
            let target = if *overlay {
                ClickTarget::Overlay
            } else {
                ClickTarget::Viewport
            };
            if let Some(destination) = session.handle_click(*x, *y, target) {
                report.teleports.push(destination);
            }
        }
        EventSpec::Resize { width, height } => session.set_viewport(*width, *height),
        EventSpec::SessionStart => session.on_session_start(),
        EventSpec::SessionEnd => session.on_session_end(),
    }
}

/// Drive `session` through the scenario frames, at most `max_frames` of them.
/// `on_frame` sees the session after every update.
pub fn replay(
    scenario: &Scenario,
    session: &mut NavigationSession,
    max_frames: Option<usize>,
    mut on_frame: impl FnMut(&FrameReport, &NavigationSession),
) -> Vec<FrameReport> {
    let limit = max_frames.unwrap_or(usize::MAX);
    let frame_time = scenario.frame_time();
    let mut time = Time::first_frame(frame_time);
    let mut reports = Vec::new();

    'frames: for frame in &scenario.frames {
        let input = frame.xr.as_ref().map(XrSpec::to_input_context);

        for repetition in 0..frame.repeat {
            if reports.len() >= limit {
                break 'frames;
            }

            let mut report = FrameReport {
                index: reports.len(),
                ..FrameReport::default()
            };

            if repetition == 0 {
                for event in &frame.events {
                    apply_event(session, event, &mut report);
                }
            }

            for effect in session.update(&time, input.as_ref()) {
                match effect {
                    NavigationEffect::Teleported { destination, .. } => {
                        report.teleports.push(destination)
                    }
                    NavigationEffect::Rotated { .. } => report.rotations += 1,
                    NavigationEffect::DebugToggled { .. } => report.debug_toggles += 1,
                }
            }

            on_frame(&report, session);
            reports.push(report);
            time = time.advance(frame_time);
        }
    }

    reports
}
