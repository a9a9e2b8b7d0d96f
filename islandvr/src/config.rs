use std::path::Path;

use cgmath::{Deg, Rad, Vector3};
use serde::{Deserialize, Serialize};

use crate::{NavError, NavResult, NavigationMode};

/// Tunables for the navigation core. Every section falls back to its defaults,
/// so a TOML file only needs the values it changes:
///
/// ```toml
/// [vr]
/// turn_mode = "snap"
///
/// [session]
/// starting_position = [0.0, 2.0, 8.0]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub heights: HeightConfig,
    pub raycast: RaycastConfig,
    pub desktop: DesktopConfig,
    pub vr: VrConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightConfig {
    /// Eye level above a walking surface for the desktop camera.
    pub desktop_standing_height: f32,
    /// Step-up above a surface in VR; the headset already reports eye height.
    pub vr_standing_height: f32,
    /// Fallback floor used when no surface is below the subject.
    pub ground_level: f32,
}

impl Default for HeightConfig {
    fn default() -> Self {
        HeightConfig {
            desktop_standing_height: 0.25,
            vr_standing_height: 0.1,
            ground_level: 0.0,
        }
    }
}

impl HeightConfig {
    pub fn standing_height_for(&self, mode: NavigationMode) -> f32 {
        match mode {
            NavigationMode::Desktop => self.desktop_standing_height,
            NavigationMode::Vr => self.vr_standing_height,
        }
    }

    pub fn minimum_height_for(&self, mode: NavigationMode) -> f32 {
        self.ground_level + self.standing_height_for(mode)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    /// Rays never report hits further away than this.
    pub max_distance: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        RaycastConfig {
            max_distance: 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Exponential velocity decay rate, per second.
    pub damping: f32,
    /// Acceleration toward the held direction, in m/s².
    pub acceleration: f32,
    /// Radians of look rotation per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    pub max_pitch_degrees: f32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        DesktopConfig {
            damping: 10.0,
            acceleration: 20.0,
            mouse_sensitivity: 0.002,
            max_pitch_degrees: 89.0,
        }
    }
}

impl DesktopConfig {
    pub fn max_pitch(&self) -> Rad<f32> {
        Deg(self.max_pitch_degrees).into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    Smooth,
    Snap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VrConfig {
    pub turn_mode: TurnMode,
    /// Radians per frame at full thumbstick deflection.
    pub smooth_turn_speed: f32,
    pub smooth_dead_zone: f32,
    pub snap_dead_zone: f32,
    pub snap_angle_degrees: f32,
    /// Trigger value at which a controller counts as selecting.
    pub trigger_threshold: f32,
    /// Secondary button value at which the debug toggle fires.
    pub button_threshold: f32,
}

impl Default for VrConfig {
    fn default() -> Self {
        VrConfig {
            turn_mode: TurnMode::Smooth,
            smooth_turn_speed: 0.02,
            smooth_dead_zone: 0.2,
            snap_dead_zone: 0.6,
            snap_angle_degrees: 30.0,
            trigger_threshold: 0.5,
            button_threshold: 0.5,
        }
    }
}

impl VrConfig {
    pub fn snap_angle(&self) -> Rad<f32> {
        Deg(self.snap_angle_degrees).into()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_position: [f32; 3],
    pub starting_yaw_degrees: f32,
    /// Ground corrections smaller than this are treated as float noise.
    pub clamp_epsilon: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            starting_position: [-5.0, 18.0, 5.0],
            starting_yaw_degrees: 0.0,
            clamp_epsilon: 0.001,
        }
    }
}

impl SessionConfig {
    pub fn starting_position(&self) -> Vector3<f32> {
        self.starting_position.into()
    }

    pub fn starting_yaw(&self) -> Rad<f32> {
        Deg(self.starting_yaw_degrees).into()
    }
}

impl NavigationConfig {
    pub fn from_toml_str(content: &str) -> NavResult<Self> {
        let config: NavigationConfig = toml::from_str(content).map_err(|e| NavError::Config {
            context: "navigation config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> NavResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| NavError::Io {
            operation: format!("read {}", path.display()),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|err| match err {
            NavError::Config { message, .. } => NavError::Config {
                context: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn to_toml_string(&self) -> NavResult<String> {
        toml::to_string_pretty(self).map_err(|e| NavError::Config {
            context: "navigation config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> NavResult<()> {
        let h = &self.heights;
        check("heights.desktop_standing_height", non_negative(h.desktop_standing_height))?;
        check("heights.vr_standing_height", non_negative(h.vr_standing_height))?;
        check("heights.ground_level", h.ground_level.is_finite())?;

        check("raycast.max_distance", positive(self.raycast.max_distance))?;

        let d = &self.desktop;
        check("desktop.damping", positive(d.damping))?;
        check("desktop.acceleration", non_negative(d.acceleration))?;
        check("desktop.mouse_sensitivity", d.mouse_sensitivity.is_finite())?;
        check(
            "desktop.max_pitch_degrees",
            positive(d.max_pitch_degrees) && d.max_pitch_degrees < 90.0,
        )?;

        let v = &self.vr;
        check("vr.smooth_turn_speed", non_negative(v.smooth_turn_speed))?;
        check("vr.smooth_dead_zone", unit_interval(v.smooth_dead_zone) && v.smooth_dead_zone < 1.0)?;
        check("vr.snap_dead_zone", positive(v.snap_dead_zone) && v.snap_dead_zone <= 1.0)?;
        check("vr.snap_dead_zone", v.snap_dead_zone >= v.smooth_dead_zone)?;
        check(
            "vr.snap_angle_degrees",
            positive(v.snap_angle_degrees) && v.snap_angle_degrees <= 180.0,
        )?;
        check("vr.trigger_threshold", positive(v.trigger_threshold) && v.trigger_threshold <= 1.0)?;
        check("vr.button_threshold", positive(v.button_threshold) && v.button_threshold <= 1.0)?;

        let s = &self.session;
        check(
            "session.starting_position",
            s.starting_position.iter().all(|c| c.is_finite()),
        )?;
        check("session.starting_yaw_degrees", s.starting_yaw_degrees.is_finite())?;
        check("session.clamp_epsilon", non_negative(s.clamp_epsilon))?;

        Ok(())
    }
}

fn check(item: &str, ok: bool) -> NavResult<()> {
    if ok {
        Ok(())
    } else {
        Err(NavError::validation(item, "value out of range"))
    }
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn unit_interval(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_defaults_match_viewer_constants() {
        let config = NavigationConfig::default();
        assert_eq!(config.heights.standing_height_for(NavigationMode::Desktop), 0.25);
        assert_eq!(config.heights.standing_height_for(NavigationMode::Vr), 0.1);
        assert_eq!(config.raycast.max_distance, 1000.0);
        assert_eq!(config.session.starting_position(), vec3(-5.0, 18.0, 5.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = NavigationConfig::from_toml_str(
            r#"
            [vr]
            turn_mode = "snap"
            snap_angle_degrees = 45.0

            [session]
            starting_position = [0.0, 2.0, 8.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.vr.turn_mode, TurnMode::Snap);
        assert_eq!(config.vr.snap_angle_degrees, 45.0);
        assert_eq!(config.vr.smooth_dead_zone, 0.2);
        assert_eq!(config.session.starting_position(), vec3(0.0, 2.0, 8.0));
        assert_eq!(config.heights, HeightConfig::default());
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let config = NavigationConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(NavigationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = NavigationConfig::from_toml_str("[raycast]\nmax_distance = -1.0\n").unwrap_err();
        match err {
            NavError::Validation { item, .. } => assert_eq!(item, "raycast.max_distance"),
            other => panic!("unexpected error {other}"),
        }

        let err = NavigationConfig::from_toml_str("[vr]\nturn_mode = \"spin\"\n").unwrap_err();
        assert!(matches!(err, NavError::Config { .. }));

        let err = NavigationConfig::from_toml_str("[desktop]\ndamping = 0.0\n").unwrap_err();
        match err {
            NavError::Validation { item, .. } => assert_eq!(item, "desktop.damping"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_snap_dead_zone_below_smooth_is_rejected() {
        let err = NavigationConfig::from_toml_str(
            "[vr]\nsmooth_dead_zone = 0.5\nsnap_dead_zone = 0.3\n",
        )
        .unwrap_err();
        match err {
            NavError::Validation { item, .. } => assert_eq!(item, "vr.snap_dead_zone"),
            other => panic!("unexpected error {other}"),
        }

        assert!(
            NavigationConfig::from_toml_str("[vr]\nsmooth_dead_zone = 0.4\nsnap_dead_zone = 0.4\n")
                .is_ok()
        );
    }

    #[test]
    fn test_minimum_height_includes_standing_height() {
        let heights = HeightConfig {
            ground_level: -2.0,
            ..HeightConfig::default()
        };
        assert_eq!(heights.minimum_height_for(NavigationMode::Desktop), -1.75);
    }
}
