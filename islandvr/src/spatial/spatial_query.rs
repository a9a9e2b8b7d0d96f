use std::sync::Arc;

use cgmath::{vec3, InnerSpace, Vector3};
use engine::PerspectiveCamera;
use rapier3d::{
    parry::query::{Ray, RayCast},
    prelude::Collider,
};

use crate::{
    config::{HeightConfig, NavigationConfig},
    physics::util::{nvec_to_cgmath, vec_to_npoint, vec_to_nvec},
    teleport, NavigationMode,
};

use super::NavigableSurface;

/// A ray hit on a navigable surface. Produced fresh by every query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionResult {
    pub point: Vector3<f32>,
    /// Unit normal facing back toward the ray origin.
    pub normal: Vector3<f32>,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Spatial query interface over the navigable surfaces
/// Controllers only see this trait, never the collision shapes behind it
pub trait SpatialQueryEngine {
    /// Replace the whole surface set consulted by every later query
    fn set_navigable_surfaces(&mut self, surfaces: Vec<Arc<NavigableSurface>>);

    /// Nearest hit along a ray, within the maximum query distance
    fn cast_ray(&self, origin: Vector3<f32>, direction: Vector3<f32>)
        -> Option<IntersectionResult>;

    fn heights(&self) -> &HeightConfig;

    fn max_distance(&self) -> f32;

    fn surface_count(&self) -> usize;

    /// Ray from the camera eye through a pixel (origin top-left)
    fn raycast_from_screen_point(
        &self,
        screen_x: f32,
        screen_y: f32,
        camera: &PerspectiveCamera,
    ) -> Option<IntersectionResult> {
        let ray = camera.ray_through_screen_point(screen_x, screen_y);
        self.cast_ray(ray.origin, ray.direction)
    }

    /// Explicit ray, e.g. a tracked controller pointing along its local -Z
    fn raycast_from_pose(
        &self,
        origin: Vector3<f32>,
        forward: Vector3<f32>,
    ) -> Option<IntersectionResult> {
        self.cast_ray(origin, forward)
    }

    /// Straight down from `from`; only used for gravity
    fn raycast_downward(&self, from: Vector3<f32>) -> Option<IntersectionResult> {
        self.cast_ray(from, vec3(0.0, -1.0, 0.0))
    }

    fn compute_teleport_destination(
        &self,
        surface_point: Vector3<f32>,
        mode: NavigationMode,
    ) -> Vector3<f32> {
        teleport::compute_teleport_destination(surface_point, mode, self.heights())
    }

    /// Lift `position` so it stands on the surface below it. Never lowers it.
    /// With nothing below, the configured minimum height is used instead.
    fn clamp_to_ground(&self, position: Vector3<f32>, mode: NavigationMode) -> Vector3<f32> {
        let floor = match self.raycast_downward(position) {
            Some(hit) => teleport::compute_teleport_destination(hit.point, mode, self.heights()).y,
            None => self.heights().minimum_height_for(mode),
        };

        if position.y < floor {
            vec3(position.x, floor, position.z)
        } else {
            position
        }
    }
}

/// Navigable surfaces paired with the trimesh colliders built from them.
/// Surfaces are kept in registration order so equal-distance hits resolve
/// the same way on every call.
pub struct SurfaceSpatialData {
    surfaces: Vec<(Arc<NavigableSurface>, Collider)>,
    heights: HeightConfig,
    max_distance: f32,
}

impl SurfaceSpatialData {
    pub fn new(heights: HeightConfig, max_distance: f32) -> Self {
        Self {
            surfaces: Vec::new(),
            heights,
            max_distance,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.heights.clone(), config.raycast.max_distance)
    }

}

impl SpatialQueryEngine for SurfaceSpatialData {
    fn set_navigable_surfaces(&mut self, surfaces: Vec<Arc<NavigableSurface>>) {
        self.surfaces = surfaces
            .into_iter()
            .map(|surface| {
                let collider = surface.to_collider();
                (surface, collider)
            })
            .collect();

        engine::spatial_log!(
            DEBUG,
            "navigable surfaces replaced ({} surfaces)",
            self.surfaces.len()
        );
    }

    fn cast_ray(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
    ) -> Option<IntersectionResult> {
        let length = direction.magnitude();
        if !length.is_finite() || length <= f32::EPSILON {
            return None;
        }
        let direction = direction / length;

        let ray = Ray::new(vec_to_npoint(origin), vec_to_nvec(direction));
        let mut nearest: Option<IntersectionResult> = None;

        for (_, collider) in &self.surfaces {
            let Some(hit) = collider.shape().cast_ray_and_get_normal(
                collider.position(),
                &ray,
                self.max_distance,
                true,
            ) else {
                continue;
            };

            // First surface wins on exact ties
            if nearest.is_some_and(|n| n.distance <= hit.time_of_impact) {
                continue;
            }

            nearest = Some(IntersectionResult {
                point: origin + direction * hit.time_of_impact,
                normal: facing_normal(nvec_to_cgmath(hit.normal), direction),
                distance: hit.time_of_impact,
            });
        }

        nearest
    }

    fn heights(&self) -> &HeightConfig {
        &self.heights
    }

    fn max_distance(&self) -> f32 {
        self.max_distance
    }

    fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

fn facing_normal(normal: Vector3<f32>, direction: Vector3<f32>) -> Vector3<f32> {
    let length = normal.magnitude();
    if !length.is_finite() || length <= f32::EPSILON {
        return vec3(0.0, 1.0, 0.0);
    }
    let normal = normal / length;
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        normal
    }
}
