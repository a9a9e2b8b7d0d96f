use std::fmt;

use cgmath::Vector3;

use crate::NavigationMode;

/// Values the debug overlay shows each frame. Read-only snapshot; the overlay
/// has no way to write back into navigation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugReadout {
    pub position: Vector3<f32>,
    pub raycast_hit: Option<Vector3<f32>>,
    pub teleport_target: Option<Vector3<f32>>,
    pub mode: NavigationMode,
}

pub fn format_position(position: Vector3<f32>) -> String {
    format!("{:.2}, {:.2}, {:.2}", position.x, position.y, position.z)
}

impl DebugReadout {
    pub fn position_text(&self) -> String {
        format_position(self.position)
    }

    pub fn raycast_text(&self) -> String {
        self.raycast_hit
            .map_or_else(|| "No hit".to_string(), format_position)
    }

    pub fn teleport_text(&self) -> String {
        self.teleport_target
            .map_or_else(|| "None".to_string(), format_position)
    }

    pub fn mode_text(&self) -> &'static str {
        self.mode.label()
    }
}

impl fmt::Display for DebugReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position: {}", self.position_text())?;
        writeln!(f, "Raycast: {}", self.raycast_text())?;
        writeln!(f, "Teleport: {}", self.teleport_text())?;
        write!(f, "Mode: {}", self.mode_text())
    }
}
