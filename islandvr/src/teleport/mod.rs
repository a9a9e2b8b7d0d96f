// Teleport movement shared by both navigation modes.
//
// The destination formula lives here once so desktop clicks and VR trigger
// releases always land at the same height above a surface.

pub mod marker;

pub use marker::TeleportMarker;

use cgmath::{vec3, Vector3};

use crate::{config::HeightConfig, NavigationMode};

/// Where the subject ends up after teleporting onto `surface_point`: directly
/// above it, raised by the standing height of `mode`.
pub fn compute_teleport_destination(
    surface_point: Vector3<f32>,
    mode: NavigationMode,
    heights: &HeightConfig,
) -> Vector3<f32> {
    vec3(
        surface_point.x,
        surface_point.y + heights.standing_height_for(mode),
        surface_point.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_height_per_mode() {
        let heights = HeightConfig::default();
        for point in [vec3(2.0, 0.0, 3.0), vec3(-7.5, 12.25, 0.5), vec3(0.0, -3.0, 0.0)] {
            let desktop = compute_teleport_destination(point, NavigationMode::Desktop, &heights);
            let vr = compute_teleport_destination(point, NavigationMode::Vr, &heights);

            assert_eq!(desktop, vec3(point.x, point.y + 0.25, point.z));
            assert_eq!(vr, vec3(point.x, point.y + 0.1, point.z));
        }
    }

    #[test]
    fn test_destination_uses_configured_heights() {
        let heights = HeightConfig {
            desktop_standing_height: 1.7,
            ..HeightConfig::default()
        };
        let destination =
            compute_teleport_destination(vec3(1.0, 2.0, 3.0), NavigationMode::Desktop, &heights);
        assert_eq!(destination, vec3(1.0, 3.7, 3.0));
    }
}
