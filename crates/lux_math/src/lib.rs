//! Lux math - the small numeric toolkit shared by the scene and renderer crates.
//!
//! Vectors come straight from glam; everything else here is ray-tracing
//! specific: intervals, bounding boxes, rays, the pinhole camera and the
//! explicit numeric tolerance used by every intersection routine.

// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod camera;
mod color;
mod interval;
mod ray;
mod tolerance;

pub use bounds::Bounds;
pub use camera::Camera;
pub use color::{color_from_rgb8, Color};
pub use interval::Interval;
pub use ray::Ray;
pub use tolerance::Tolerance;

/// Coordinate axis selector used by bounds, the BVH builder and cylinders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Component of `v` along this axis.
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        v[self.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_component() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.of(v), 1.0);
        assert_eq!(Axis::Y.of(v), 2.0);
        assert_eq!(Axis::Z.of(v), 3.0);
    }

    #[test]
    fn test_axis_index() {
        let indices: Vec<usize> = Axis::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
