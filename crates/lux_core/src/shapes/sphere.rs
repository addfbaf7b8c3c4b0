//! Sphere primitive.

use lux_math::{Bounds, Ray, Tolerance, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Bounded, HitInfo, Hittable};
use crate::material::MaterialId;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: MaterialId,
}

impl Sphere {
    /// Create a new sphere. The radius must be positive and finite.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> SceneResult<Self> {
        if !center.is_finite() {
            return Err(SceneError::NonFinite("sphere center"));
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::InvalidRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo> {
        // |O + tD - C|^2 = r^2  =>  a t^2 + b t + c = 0
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        // Tangent rays graze the surface; treat them as a miss
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        // t1 <= t2, so prefer t1 when it lies in front of the origin
        let t = if t1 > tol.epsilon {
            t1
        } else if t2 > tol.epsilon {
            t2
        } else {
            return None;
        };

        let pos = ray.at(t);
        let normal = (pos - self.center) / self.radius;

        Some(HitInfo {
            pos,
            normal: normal.normalize(),
            ray: *ray,
            t,
            material: self.material,
        })
    }
}

impl Bounded for Sphere {
    fn bounds(&self) -> Bounds {
        let r = Vec3::splat(self.radius);
        Bounds::from_points(self.center - r, self.center + r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, MaterialId(0)).unwrap()
    }

    #[test]
    fn test_sphere_hit_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = unit_sphere().intersect(&ray, Tolerance::DEFAULT).unwrap();

        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.pos - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        // Origin at the center: the near root is behind, the far root counts
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = unit_sphere().intersect(&ray, Tolerance::DEFAULT).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(unit_sphere().intersect(&ray, Tolerance::DEFAULT).is_none());
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z);
        assert!(unit_sphere().intersect(&ray, Tolerance::DEFAULT).is_none());
    }

    #[test]
    fn test_sphere_hits_lie_on_surface() {
        let sphere = Sphere::new(Vec3::new(1.0, -2.0, 3.0), 1.5, MaterialId(0)).unwrap();
        for i in 0..16 {
            let angle = i as f32 * 0.3;
            let origin = Vec3::new(angle.cos() * 6.0, angle.sin() * 6.0, -4.0);
            let target = sphere.center() + Vec3::new(0.3, -0.2, 0.1) * (i as f32 * 0.1);
            let ray = Ray::new(origin, target - origin);
            let hit = sphere.intersect(&ray, Tolerance::DEFAULT).unwrap();

            let dist = (hit.pos - sphere.center()).length();
            assert!((dist - sphere.radius()).abs() < 1e-3, "dist={dist}");
            assert!((hit.normal.length() - 1.0).abs() < 1e-4);

            // t satisfies the quadratic
            let oc = ray.origin - sphere.center();
            let d = ray.direction;
            let residual = d.length_squared() * hit.t * hit.t
                + 2.0 * d.dot(oc) * hit.t
                + oc.length_squared()
                - sphere.radius() * sphere.radius();
            assert!(residual.abs() < 1e-2 * d.length_squared(), "residual={residual}");
        }
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert!(matches!(
            Sphere::new(Vec3::ZERO, 0.0, MaterialId(0)),
            Err(SceneError::InvalidRadius(_))
        ));
        assert!(Sphere::new(Vec3::ZERO, -1.0, MaterialId(0)).is_err());
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, MaterialId(0)).is_err());
    }

    #[test]
    fn test_sphere_bounds() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, MaterialId(0)).unwrap();
        let b = sphere.bounds();
        assert_eq!(b.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(b.max, Vec3::new(1.5, 2.5, 3.5));
    }
}
