// Spatial queries against the navigable surfaces of the loaded scene.
//
// Raycasts (screen point, tracked pose, straight down) and the gravity clamp
// that both navigation modes share.

pub mod spatial_query;
pub mod surface;

pub use spatial_query::{IntersectionResult, SpatialQueryEngine, SurfaceSpatialData};
pub use surface::{NavigableSurface, SurfaceGeometry, SurfaceTransform};
