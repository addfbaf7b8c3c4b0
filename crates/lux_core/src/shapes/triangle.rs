//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use lux_math::{Bounds, Ray, Tolerance, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Bounded, HitInfo, Hittable};
use crate::material::MaterialId;

/// A triangle, optionally carrying per-vertex normals for smooth shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Unit face normal, `(v1 - v0) x (v2 - v0)` normalized
    normal: Vec3,
    /// Length of the unnormalized face normal (twice the area)
    double_area: f32,
    /// Unit vertex normals, if constructed as a smooth triangle
    vertex_normals: Option<[Vec3; 3]>,
    material: MaterialId,
}

impl Triangle {
    /// Create a flat-shaded triangle. Collinear or coincident vertices are
    /// rejected.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> SceneResult<Self> {
        if !(v0.is_finite() && v1.is_finite() && v2.is_finite()) {
            return Err(SceneError::NonFinite("triangle vertex"));
        }

        let cross = (v1 - v0).cross(v2 - v0);
        let double_area = cross.length();
        if !(double_area > f32::MIN_POSITIVE) {
            return Err(SceneError::DegenerateTriangle);
        }

        Ok(Self {
            v0,
            v1,
            v2,
            normal: cross / double_area,
            double_area,
            vertex_normals: None,
            material,
        })
    }

    /// Create a triangle whose shading normal is interpolated from the three
    /// vertex normals. Each vertex normal must be non-zero.
    pub fn with_vertex_normals(
        vertices: [Vec3; 3],
        normals: [Vec3; 3],
        material: MaterialId,
    ) -> SceneResult<Self> {
        let mut tri = Self::new(vertices[0], vertices[1], vertices[2], material)?;

        let mut unit = [Vec3::ZERO; 3];
        for (i, n) in normals.iter().enumerate() {
            if !n.is_finite() {
                return Err(SceneError::NonFinite("triangle vertex normal"));
            }
            unit[i] = n.try_normalize().ok_or(SceneError::ZeroVertexNormal(i))?;
        }
        tri.vertex_normals = Some(unit);
        Ok(tri)
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Unit geometric normal.
    pub fn face_normal(&self) -> Vec3 {
        self.normal
    }

    pub fn vertex_normals(&self) -> Option<[Vec3; 3]> {
        self.vertex_normals
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Möller-Trumbore test returning `(t, u, v)`, where the hit point is
    /// `v0 + u * (v1 - v0) + v * (v2 - v0)`.
    pub fn barycentric_hit(&self, ray: &Ray, tol: Tolerance) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // |det| is |D . N| scaled by the triangle size; compare the cosine so
        // small triangles are not mistaken for parallel ones.
        if det.abs() < tol.epsilon * self.double_area * ray.direction.length() {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = inv_det * s.dot(h);
        if u < -tol.epsilon || u > 1.0 + tol.epsilon {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < -tol.epsilon || u + v > 1.0 + tol.epsilon {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        if t <= tol.epsilon {
            return None;
        }

        Some((t, u, v))
    }

    /// Shading normal at barycentric (`u`, `v`).
    fn shading_normal(&self, u: f32, v: f32) -> Vec3 {
        match self.vertex_normals {
            Some([n0, n1, n2]) => ((1.0 - u - v) * n0 + u * n1 + v * n2)
                .try_normalize()
                .unwrap_or(self.normal),
            None => self.normal,
        }
    }
}

impl Hittable for Triangle {
    fn intersect(&self, ray: &Ray, tol: Tolerance) -> Option<HitInfo> {
        let (t, u, v) = self.barycentric_hit(ray, tol)?;

        Some(HitInfo {
            pos: ray.at(t),
            normal: self.shading_normal(u, v),
            ray: *ray,
            t,
            material: self.material,
        })
    }
}

impl Bounded for Triangle {
    fn bounds(&self) -> Bounds {
        let mut b = Bounds::from_point(self.v0);
        b.expand_point(self.v1);
        b.expand_point(self.v2);
        b
    }
}
