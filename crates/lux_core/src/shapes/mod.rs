//! Geometric primitives.
//!
//! Planes are unbounded and kept in a separate list on the scene; every other
//! primitive is a [`BoundedShape`] and lives in the BVH.

mod cylinder;
mod plane;
mod sphere;
mod triangle;

pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;
pub use triangle::Triangle;

use lux_math::{Bounds, Ray, Tolerance};

use crate::hittable::{Bounded, HitInfo, Hittable};
use crate::material::MaterialId;

/// Closed set of primitives stored in the BVH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundedShape {
    Sphere(Sphere),
    Triangle(Triangle),
    Cylinder(Cylinder),
}

impl BoundedShape {
    pub fn material(&self) -> MaterialId {
        match self {
            BoundedShape::Sphere(s) => s.material(),
            BoundedShape::Triangle(t) => t.material(),
            BoundedShape::Cylinder(c) => c.material(),
        }
    }
}

impl Hittable for BoundedShape {
    #[inline]
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo> {
        match self {
            BoundedShape::Sphere(s) => s.intersect(ray, tol),
            BoundedShape::Triangle(t) => t.intersect(ray, tol),
            BoundedShape::Cylinder(c) => c.intersect(ray, tol),
        }
    }
}

impl Bounded for BoundedShape {
    fn bounds(&self) -> Bounds {
        match self {
            BoundedShape::Sphere(s) => s.bounds(),
            BoundedShape::Triangle(t) => t.bounds(),
            BoundedShape::Cylinder(c) => c.bounds(),
        }
    }
}

impl From<Sphere> for BoundedShape {
    fn from(s: Sphere) -> Self {
        BoundedShape::Sphere(s)
    }
}

impl From<Triangle> for BoundedShape {
    fn from(t: Triangle) -> Self {
        BoundedShape::Triangle(t)
    }
}

impl From<Cylinder> for BoundedShape {
    fn from(c: Cylinder) -> Self {
        BoundedShape::Cylinder(c)
    }
}
