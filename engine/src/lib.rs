pub mod camera;
pub mod logging;
mod macros;

pub use camera::{CameraRay, PerspectiveCamera};
