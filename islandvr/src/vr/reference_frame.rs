use std::ops::Mul;

use cgmath::{vec3, InnerSpace, Quaternion, Rad, Rotation3, Vector3};

use crate::input_context::Head;

/// Rotation followed by translation, like `XRRigidTransform`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidTransform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        RigidTransform::identity()
    }
}

impl RigidTransform {
    pub fn identity() -> Self {
        RigidTransform {
            translation: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn new(translation: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        RigidTransform {
            translation,
            rotation: rotation.normalize(),
        }
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        RigidTransform {
            translation,
            ..RigidTransform::identity()
        }
    }

    pub fn from_yaw(angle: Rad<f32>) -> Self {
        RigidTransform {
            rotation: Quaternion::from_angle_y(angle),
            ..RigidTransform::identity()
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        RigidTransform {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    pub fn transform_point(&self, point: Vector3<f32>) -> Vector3<f32> {
        self.rotation * point + self.translation
    }

    pub fn transform_vector(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.rotation * vector
    }
}

/// `a * b` applies `b` first, then `a`.
impl Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform {
            translation: self.rotation * rhs.translation + self.translation,
            rotation: (self.rotation * rhs.rotation).normalize(),
        }
    }
}

/// The immersive reference space: where the headset's tracking origin sits
/// in the world.
///
/// Frames are values. Every navigation step derives a new frame from the
/// current one with [`ReferenceFrame::offset_by`] and the caller swaps it in
/// whole, so nothing ever observes a half-applied transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceFrame {
    world_from_tracking: RigidTransform,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        ReferenceFrame::tracking_origin()
    }
}

impl ReferenceFrame {
    /// The frame the device reports: tracking space is world space.
    pub fn tracking_origin() -> Self {
        ReferenceFrame {
            world_from_tracking: RigidTransform::identity(),
        }
    }

    /// Device frame offset so the tracking origin lands on `position`,
    /// facing `yaw`.
    pub fn starting_at(position: Vector3<f32>, yaw: Rad<f32>) -> Self {
        let start = RigidTransform::new(position, Quaternion::from_angle_y(yaw));
        ReferenceFrame::tracking_origin().offset_by(start.inverse())
    }

    pub fn world_from_tracking(&self) -> RigidTransform {
        self.world_from_tracking
    }

    /// World position of the tracking origin.
    pub fn origin(&self) -> Vector3<f32> {
        self.world_from_tracking.translation
    }

    /// Same semantics as `XRReferenceSpace.getOffsetReferenceSpace`: `offset`
    /// is the new origin expressed in this frame, so poses seen through the
    /// new frame are `offset⁻¹ · pose`.
    pub fn offset_by(&self, offset: RigidTransform) -> ReferenceFrame {
        ReferenceFrame {
            world_from_tracking: offset.inverse() * self.world_from_tracking,
        }
    }

    /// Move the tracking origin onto `destination`, keeping the facing.
    pub fn teleported_to(&self, destination: Vector3<f32>) -> ReferenceFrame {
        self.offset_by(RigidTransform::from_translation(self.origin() - destination))
    }

    /// Turn the world about a vertical axis through `pivot`; a point at the
    /// pivot keeps its world position.
    pub fn rotated_about(&self, pivot: Vector3<f32>, yaw: Rad<f32>) -> ReferenceFrame {
        let offset = RigidTransform::from_translation(pivot)
            * RigidTransform::from_yaw(-yaw)
            * RigidTransform::from_translation(-pivot);
        self.offset_by(offset)
    }

    /// Shift everything seen through the frame by `delta` in world space.
    pub fn translated(&self, delta: Vector3<f32>) -> ReferenceFrame {
        self.offset_by(RigidTransform::from_translation(-delta))
    }

    pub fn to_world_point(&self, tracking: Vector3<f32>) -> Vector3<f32> {
        self.world_from_tracking.transform_point(tracking)
    }

    pub fn to_world_direction(&self, tracking: Vector3<f32>) -> Vector3<f32> {
        self.world_from_tracking.transform_vector(tracking)
    }

    pub fn head_position(&self, head: &Head) -> Vector3<f32> {
        self.to_world_point(head.position)
    }

    /// Yaw of the frame around +Y, measured from -Z toward -X.
    pub fn yaw(&self) -> Rad<f32> {
        let forward = self.to_world_direction(vec3(0.0, 0.0, -1.0));
        Rad((-forward.x).atan2(-forward.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rad};
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let t = RigidTransform::new(vec3(1.0, -2.0, 3.0), Quaternion::from_angle_y(Deg(70.0)));
        let p = vec3(0.3, 0.4, -5.0);
        assert_close((t * t.inverse()).transform_point(p), p);
        assert_close((t.inverse() * t).transform_point(p), p);
    }

    #[test]
    fn test_offset_from_identity_is_inverse_translation() {
        let frame = ReferenceFrame::tracking_origin()
            .offset_by(RigidTransform::from_translation(vec3(-2.0, -0.1, -3.0)));
        assert_close(frame.origin(), vec3(2.0, 0.1, 3.0));
    }

    #[test]
    fn test_starting_frame_maps_device_origin() {
        let frame = ReferenceFrame::starting_at(vec3(-5.0, 18.0, 5.0), Rad(FRAC_PI_2));
        assert_close(frame.origin(), vec3(-5.0, 18.0, 5.0));
        assert!((frame.yaw().0 - FRAC_PI_2).abs() < 1e-5);

        let head = Head::at(vec3(0.0, 1.6, -1.0));
        // Facing -X after a quarter turn left, one metre ahead is -X
        assert_close(frame.head_position(&head), vec3(-6.0, 19.6, 5.0));
    }

    #[test]
    fn test_teleport_places_origin_and_keeps_facing() {
        let frame = ReferenceFrame::starting_at(vec3(4.0, 0.0, 4.0), Rad(0.6));
        let moved = frame.teleported_to(vec3(-1.0, 2.0, 7.0));
        assert_close(moved.origin(), vec3(-1.0, 2.0, 7.0));
        assert!((moved.yaw().0 - 0.6).abs() < 1e-5);

        // Teleporting again does not accumulate the previous offset
        let again = moved.teleported_to(vec3(0.0, 0.0, 0.0));
        assert_close(again.origin(), vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_keeps_pivot_in_place() {
        let frame = ReferenceFrame::starting_at(vec3(3.0, 1.0, -2.0), Rad(0.0));
        let head = Head::at(vec3(0.4, 1.6, 0.2));
        let pivot = frame.head_position(&head);

        let turned = frame.rotated_about(pivot, Rad(0.5));
        assert_close(turned.head_position(&head), pivot);
        assert!((turned.yaw().0 - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_translated_moves_everything() {
        let frame = ReferenceFrame::starting_at(vec3(1.0, 1.0, 1.0), Rad(1.0));
        let head = Head::default();
        let before = frame.head_position(&head);
        let lifted = frame.translated(vec3(0.0, 0.25, 0.0));
        assert_close(lifted.head_position(&head), before + vec3(0.0, 0.25, 0.0));
    }

    #[test]
    fn test_teleport_and_rotation_do_not_commute() {
        let head = Head::at(vec3(0.5, 1.6, 0.3));
        let start = ReferenceFrame::tracking_origin();
        let destination = vec3(6.0, 0.1, -4.0);
        let angle = Rad(FRAC_PI_2);

        let rotate_then_teleport = {
            let turned = start.rotated_about(start.head_position(&head), angle);
            turned.teleported_to(destination)
        };
        let teleport_then_rotate = {
            let moved = start.teleported_to(destination);
            moved.rotated_about(moved.head_position(&head), angle)
        };

        assert_close(rotate_then_teleport.origin(), destination);

        let h = head.position;
        let expected = destination + h - Quaternion::from_angle_y(angle) * h;
        assert_close(teleport_then_rotate.origin(), expected);
        assert!((rotate_then_teleport.origin() - teleport_then_rotate.origin()).magnitude() > 0.1);

        // Both end up facing the same way
        assert!((rotate_then_teleport.yaw().0 - teleport_then_rotate.yaw().0).abs() < 1e-5);
    }
}
