pub mod config;
pub mod debug_readout;
pub mod desktop;
mod error;
pub mod input_context;
pub mod physics;
pub mod session;
pub mod spatial;
pub mod teleport;
pub mod time;
pub mod vr;

use std::fmt;

pub use config::{NavigationConfig, TurnMode};
pub use debug_readout::DebugReadout;
pub use error::{NavError, NavResult};
pub use input_context::{Handedness, Head, InputContext, InputSource, InputSourceId};
pub use session::NavigationSession;
pub use spatial::{
    IntersectionResult, NavigableSurface, SpatialQueryEngine, SurfaceSpatialData, SurfaceTransform,
};
pub use time::Time;

/// Which controller currently drives the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavigationMode {
    #[default]
    Desktop,
    Vr,
}

impl NavigationMode {
    pub fn label(&self) -> &'static str {
        match self {
            NavigationMode::Desktop => "Desktop",
            NavigationMode::Vr => "VR",
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
