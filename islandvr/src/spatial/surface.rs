use cgmath::{vec3, InnerSpace, Quaternion, Vector3};
use rapier3d::prelude::{Collider, ColliderBuilder, Point, Real};

use crate::{
    physics::util::{isometry_from, vec_to_npoint},
    NavError, NavResult,
};

/// Placement of a surface in the world: rotation and uniform scale about the
/// local origin, then translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTransform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        SurfaceTransform {
            translation: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: 1.0,
        }
    }
}

impl SurfaceTransform {
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        SurfaceTransform {
            translation,
            ..SurfaceTransform::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn transform_point(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.rotation * (local * self.scale) + self.translation
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceGeometry {
    /// Flat rectangle in the local XZ plane, centred on the origin, facing +Y.
    Plane { width: f32, depth: f32 },
    /// Arbitrary triangles, e.g. a loaded model.
    TriangleMesh {
        vertices: Vec<Vector3<f32>>,
        indices: Vec<[u32; 3]>,
    },
}

/// Scene geometry that rays and ground probes may land on. The scene owns the
/// geometry; the navigation core only keeps shared handles to it.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigableSurface {
    name: String,
    geometry: SurfaceGeometry,
    transform: SurfaceTransform,
}

impl NavigableSurface {
    pub fn plane(
        name: impl Into<String>,
        width: f32,
        depth: f32,
        transform: SurfaceTransform,
    ) -> NavResult<Self> {
        let name = name.into();
        if !(width.is_finite() && width > 0.0 && depth.is_finite() && depth > 0.0) {
            return Err(NavError::invalid_surface(
                name,
                format!("plane extent {width} x {depth} must be positive"),
            ));
        }
        validate_transform(&name, &transform)?;

        Ok(NavigableSurface {
            name,
            geometry: SurfaceGeometry::Plane { width, depth },
            transform,
        })
    }

    pub fn triangle_mesh(
        name: impl Into<String>,
        vertices: Vec<Vector3<f32>>,
        indices: Vec<[u32; 3]>,
        transform: SurfaceTransform,
    ) -> NavResult<Self> {
        let name = name.into();
        if indices.is_empty() {
            return Err(NavError::invalid_surface(name, "mesh has no triangles"));
        }
        if let Some(v) = vertices
            .iter()
            .find(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(NavError::invalid_surface(
                name,
                format!("non-finite vertex {v:?}"),
            ));
        }
        if let Some(triangle) = indices
            .iter()
            .find(|t| t.iter().any(|&i| i as usize >= vertices.len()))
        {
            return Err(NavError::invalid_surface(
                name,
                format!(
                    "triangle {triangle:?} indexes past {} vertices",
                    vertices.len()
                ),
            ));
        }
        validate_transform(&name, &transform)?;

        Ok(NavigableSurface {
            name,
            geometry: SurfaceGeometry::TriangleMesh { vertices, indices },
            transform,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn transform(&self) -> &SurfaceTransform {
        &self.transform
    }

    /// Build the collision shape used for ray casting. Scale is baked into the
    /// vertices; rotation and translation become the collider position.
    pub(crate) fn to_collider(&self) -> Collider {
        let scale = self.transform.scale;
        let (vertices, indices): (Vec<Point<Real>>, Vec<[u32; 3]>) = match &self.geometry {
            SurfaceGeometry::Plane { width, depth } => {
                let hx = width * 0.5 * scale;
                let hz = depth * 0.5 * scale;
                let vertices = vec![
                    vec_to_npoint(vec3(-hx, 0.0, -hz)),
                    vec_to_npoint(vec3(-hx, 0.0, hz)),
                    vec_to_npoint(vec3(hx, 0.0, hz)),
                    vec_to_npoint(vec3(hx, 0.0, -hz)),
                ];
                // Counter-clockwise seen from +Y
                (vertices, vec![[0, 1, 2], [0, 2, 3]])
            }
            SurfaceGeometry::TriangleMesh { vertices, indices } => (
                vertices.iter().map(|v| vec_to_npoint(v * scale)).collect(),
                indices.clone(),
            ),
        };

        ColliderBuilder::trimesh(vertices, indices)
            .position(isometry_from(
                self.transform.translation,
                self.transform.rotation,
            ))
            .build()
    }
}

fn validate_transform(name: &str, transform: &SurfaceTransform) -> NavResult<()> {
    let t = transform.translation;
    let finite_translation = t.x.is_finite() && t.y.is_finite() && t.z.is_finite();
    let finite_scale = transform.scale.is_finite() && transform.scale > 0.0;
    let r = transform.rotation;
    let usable_rotation = r.s.is_finite()
        && r.v.x.is_finite()
        && r.v.y.is_finite()
        && r.v.z.is_finite()
        && r.magnitude() > 1e-6;
    if finite_translation && finite_scale && usable_rotation {
        Ok(())
    } else {
        Err(NavError::invalid_surface(
            name,
            format!("unusable transform {transform:?}"),
        ))
    }
}
