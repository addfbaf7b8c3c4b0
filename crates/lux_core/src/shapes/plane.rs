//! Infinite plane. Unbounded, so it never enters the BVH.

use lux_math::{Ray, Tolerance, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::hittable::{HitInfo, Hittable};
use crate::material::MaterialId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: MaterialId,
}

impl Plane {
    /// Create a plane through `point` with the given normal (normalized here).
    pub fn new(point: Vec3, normal: Vec3, material: MaterialId) -> SceneResult<Self> {
        if !(point.is_finite() && normal.is_finite()) {
            return Err(SceneError::NonFinite("plane"));
        }
        let normal = normal.try_normalize().ok_or(SceneError::ZeroNormal)?;
        Ok(Self {
            point,
            normal,
            material,
        })
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Plane {
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo> {
        let denom = self.normal.dot(ray.direction);

        // Ray is (nearly) parallel to the plane
        if tol.is_zero(denom) {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t <= tol.epsilon {
            return None;
        }

        Some(HitInfo {
            pos: ray.at(t),
            normal: self.normal,
            ray: *ray,
            t,
            material: self.material,
        })
    }
}
