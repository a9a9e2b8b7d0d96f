// Immersive navigation
//
// The headset pose is never moved directly. Teleports, turns and ground
// corrections all replace the reference frame the pose is measured against.

pub mod reference_frame;
pub mod vr_controls;

pub use reference_frame::{ReferenceFrame, RigidTransform};
pub use vr_controls::{NavigationEffect, SourceState, VrControls};
