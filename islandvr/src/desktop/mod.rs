pub mod desktop_controls;
pub mod movement;

pub use desktop_controls::{ClickTarget, DesktopControls, PointerLockState};
pub use movement::{Key, MovementState};
