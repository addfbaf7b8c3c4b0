//! Hittable traits and HitInfo for ray-object intersection.

use lux_math::{Bounds, Ray, Tolerance, Vec3};

use crate::material::MaterialId;

/// Record of a ray-object intersection.
///
/// Created per intersection test and consumed immediately by the tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// Point of intersection
    pub pos: Vec3,
    /// Unit surface normal at the intersection
    pub normal: Vec3,
    /// The ray that produced the hit
    pub ray: Ray,
    /// Ray parameter of the intersection, always greater than the tolerance
    pub t: f32,
    /// Material of the surface that was hit
    pub material: MaterialId,
}

impl HitInfo {
    /// Flip the normal so it points against the incoming ray. Shapes report
    /// outward (or winding) normals; shading and surface offsets need the
    /// side the ray arrived from.
    #[inline]
    pub fn face_forward(mut self) -> Self {
        if self.ray.direction.dot(self.normal) > 0.0 {
            self.normal = -self.normal;
        }
        self
    }
}

/// Geometry that can be intersected by a ray.
pub trait Hittable: Send + Sync {
    /// Nearest intersection in front of the ray origin, or `None`.
    ///
    /// Hits at `t <= tol.epsilon` are rejected, as are tangential and
    /// parallel configurations.
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo>;
}

/// Hittable geometry with a finite extent, eligible for the BVH.
pub trait Bounded: Hittable {
    /// Axis-aligned box enclosing the whole shape.
    fn bounds(&self) -> Bounds;
}
