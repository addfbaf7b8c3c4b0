use crate::{Axis, Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// An empty box is represented by `min = +inf`, `max = -inf` on every axis so
/// that expanding it by anything yields exactly that thing. Boxes are only
/// grown through [`Bounds::expand`] and [`Bounds::expand_point`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// The empty box (contains nothing).
    pub const EMPTY: Bounds = Bounds {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a box from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box around a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// True if the box has not been expanded by anything yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to also enclose `other`.
    pub fn expand(&mut self, other: &Bounds) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow the box to also enclose the point `p`.
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box (zero for an empty box).
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Total surface area of the box. Zero for an empty box.
    pub fn area(&self) -> f32 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Axis with the largest extent. Ties resolve towards X, then Y.
    pub fn longest_axis(&self) -> Axis {
        let e = self.extent();
        let mut axis = Axis::X;
        if e.y > e.x {
            axis = Axis::Y;
        }
        if e.z > axis.of(e) {
            axis = Axis::Z;
        }
        axis
    }

    /// True if `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Bounds) -> bool {
        other.is_empty()
            || (self.min.cmple(other.min).all() && self.max.cmpge(other.max).all())
    }

    /// Slab test.
    ///
    /// Clips `ray_t` against the three slabs of the box and returns the
    /// remaining parameter range (entry, exit), or `None` when the ray misses
    /// the box inside `ray_t`. Touching a face counts as a hit so that flat
    /// boxes (axis-aligned triangles) are still reachable.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Interval> {
        let mut t = ray_t;
        for axis in Axis::ALL {
            let i = axis.index();
            let inv_d = 1.0 / ray.direction[i];
            let mut t0 = (self.min[i] - ray.origin[i]) * inv_d;
            let mut t1 = (self.max[i] - ray.origin[i]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // f32::max/min ignore NaN, which keeps parallel rays on a slab face
            // from poisoning the interval.
            t.min = t0.max(t.min);
            t.max = t1.min(t.max);
            if t.max < t.min {
                return None;
            }
        }
        Some(t)
    }
}
