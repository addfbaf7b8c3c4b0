//! Finite, capped, axis-aligned cylinder.

use lux_math::{Axis, Bounds, Ray, Tolerance, Vec2, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Bounded, HitInfo, Hittable};
use crate::material::MaterialId;

/// A closed cylinder centered at `center`, extending `height / 2` along
/// `axis` in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    center: Vec3,
    radius: f32,
    height: f32,
    axis: Axis,
    material: MaterialId,
}

impl Cylinder {
    pub fn new(
        center: Vec3,
        radius: f32,
        height: f32,
        axis: Axis,
        material: MaterialId,
    ) -> SceneResult<Self> {
        if !center.is_finite() {
            return Err(SceneError::NonFinite("cylinder center"));
        }
        let valid = |x: f32| x > 0.0 && x.is_finite();
        if !(valid(radius) && valid(height)) {
            return Err(SceneError::InvalidCylinder { radius, height });
        }
        Ok(Self {
            center,
            radius,
            height,
            axis,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Split a vector into its component across the axis (the two remaining
    /// coordinates, in cyclic order) and its component along the axis.
    fn split(&self, v: Vec3) -> (Vec2, f32) {
        match self.axis {
            Axis::X => (Vec2::new(v.y, v.z), v.x),
            Axis::Y => (Vec2::new(v.z, v.x), v.y),
            Axis::Z => (Vec2::new(v.x, v.y), v.z),
        }
    }

    /// Inverse of [`Cylinder::split`].
    fn join(&self, radial: Vec2, along: f32) -> Vec3 {
        match self.axis {
            Axis::X => Vec3::new(along, radial.x, radial.y),
            Axis::Y => Vec3::new(radial.y, along, radial.x),
            Axis::Z => Vec3::new(radial.x, radial.y, along),
        }
    }

    /// Nearest hit on the curved surface, as `(t, normal)`.
    fn lateral_hit(
        &self,
        o: Vec2,
        o_along: f32,
        d: Vec2,
        d_along: f32,
        tol: Tolerance,
    ) -> Option<(f32, Vec3)> {
        let a = d.length_squared();
        // Ray runs parallel to the axis and can only hit the caps
        if tol.is_zero(a) {
            return None;
        }
        let b = 2.0 * o.dot(d);
        let c = o.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let half = self.height * 0.5;
        [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)]
            .into_iter()
            .find(|&t| t > tol.epsilon && (o_along + t * d_along).abs() <= half)
            .map(|t| {
                let radial = (o + t * d) / self.radius;
                (t, self.join(radial, 0.0).normalize())
            })
    }

    /// Nearest hit on either end cap, as `(t, normal)`.
    fn cap_hit(
        &self,
        o: Vec2,
        o_along: f32,
        d: Vec2,
        d_along: f32,
        tol: Tolerance,
    ) -> Option<(f32, Vec3)> {
        if tol.is_zero(d_along) {
            return None;
        }
        let half = self.height * 0.5;
        let r2 = self.radius * self.radius;

        [half, -half]
            .into_iter()
            .filter_map(|cap| {
                let t = (cap - o_along) / d_along;
                let inside = (o + t * d).length_squared() <= r2;
                (t > tol.epsilon && inside).then(|| (t, self.join(Vec2::ZERO, cap.signum())))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}

impl Hittable for Cylinder {
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo> {
        let (o, o_along) = self.split(ray.origin - self.center);
        let (d, d_along) = self.split(ray.direction);

        let lateral = self.lateral_hit(o, o_along, d, d_along, tol);
        let cap = self.cap_hit(o, o_along, d, d_along, tol);

        let (t, normal) = match (lateral, cap) {
            (Some(l), Some(c)) => {
                if l.0 <= c.0 {
                    l
                } else {
                    c
                }
            }
            (Some(l), None) => l,
            (None, Some(c)) => c,
            (None, None) => return None,
        };

        Some(HitInfo {
            pos: ray.at(t),
            normal,
            ray: *ray,
            t,
            material: self.material,
        })
    }
}

impl Bounded for Cylinder {
    fn bounds(&self) -> Bounds {
        let half = self.join(Vec2::splat(self.radius), self.height * 0.5);
        Bounds::from_points(self.center - half, self.center + half)
    }
}
