use cgmath::{vec3, Quaternion, Vector3};

use crate::spatial::IntersectionResult;

/// The ring drawn where a teleport would land. Both controllers drive the same
/// marker, and it always lies flat against the surface it was placed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportMarker {
    pub visible: bool,
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    /// Rotates the marker's local +Y onto `normal`.
    pub orientation: Quaternion<f32>,
}

impl Default for TeleportMarker {
    fn default() -> Self {
        TeleportMarker {
            visible: false,
            position: vec3(0.0, 0.0, 0.0),
            normal: vec3(0.0, 1.0, 0.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl TeleportMarker {
    pub fn show(&mut self, hit: &IntersectionResult) {
        self.visible = true;
        self.position = hit.point;
        self.normal = hit.normal;
        self.orientation =
            Quaternion::from_arc(vec3(0.0, 1.0, 0.0), hit.normal, Some(vec3(1.0, 0.0, 0.0)));
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Show the marker on a hit, hide it on a miss.
    pub fn update(&mut self, hit: Option<&IntersectionResult>) {
        match hit {
            Some(hit) => self.show(hit),
            None => self.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn hit(normal: Vector3<f32>) -> IntersectionResult {
        IntersectionResult {
            point: vec3(1.0, 2.0, 3.0),
            normal,
            distance: 4.0,
        }
    }

    #[test]
    fn test_marker_aligns_to_slope() {
        let normal = vec3(-0.5, 0.75_f32.sqrt(), 0.0);
        let mut marker = TeleportMarker::default();
        marker.show(&hit(normal));

        assert!(marker.visible);
        assert_eq!(marker.position, vec3(1.0, 2.0, 3.0));
        let up = marker.orientation * vec3(0.0, 1.0, 0.0);
        assert!((up - normal).magnitude() < 1e-5);
    }

    #[test]
    fn test_marker_flips_for_downward_normal() {
        let mut marker = TeleportMarker::default();
        marker.show(&hit(vec3(0.0, -1.0, 0.0)));
        let up = marker.orientation * vec3(0.0, 1.0, 0.0);
        assert!((up - vec3(0.0, -1.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_miss_hides_marker_but_keeps_last_pose() {
        let mut marker = TeleportMarker::default();
        marker.update(Some(&hit(vec3(0.0, 1.0, 0.0))));
        marker.update(None);
        assert!(!marker.visible);
        assert_eq!(marker.position, vec3(1.0, 2.0, 3.0));
    }
}
