//! Whitted-style shading with iterative mirror reflection.
//!
//! Each bounce finds the closest hit among the planes (linear scan) and the
//! BVH, adds the local Blinn-Phong lighting scaled by the current throughput,
//! then follows the mirror direction if the surface is reflective. There is
//! no recursion; the loop ends on a miss, a matte surface, the bounce limit
//! or when throughput drops below the cutoff.

use lux_core::{HitInfo, Hittable, Scene};
use lux_math::{Color, Interval, Ray, Tolerance, Vec3};

use crate::config::RenderConfig;

/// Result of tracing one primary ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceOutcome {
    pub color: Color,
    /// Loop iterations performed (primary hit plus reflections)
    pub bounces: u32,
    /// Throughput left when the loop ended
    pub throughput: f32,
}

/// Ray tracer over a borrowed scene.
#[derive(Debug, Clone, Copy)]
pub struct Tracer<'a> {
    scene: &'a Scene,
    tol: Tolerance,
    throughput_cutoff: f32,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, config: &RenderConfig) -> Self {
        Self {
            scene,
            tol: config.tolerance,
            throughput_cutoff: config.throughput_cutoff,
        }
    }

    /// Loop iterations needed to honor the scene's reflection limit.
    pub fn max_bounces(&self) -> u32 {
        self.scene.max_reflections().saturating_add(1)
    }

    /// Color seen along `ray`, following at most `max_bounces` segments.
    pub fn trace_ray(&self, ray: &Ray, max_bounces: u32) -> Color {
        self.trace(ray, max_bounces).color
    }

    /// Like [`Tracer::trace_ray`], also reporting how the loop ended.
    pub fn trace(&self, ray: &Ray, max_bounces: u32) -> TraceOutcome {
        let mut color = Color::ZERO;
        let mut throughput = 1.0f32;
        let mut current = *ray;
        let mut bounces = 0;

        while bounces < max_bounces {
            bounces += 1;

            let Some(hit) = self.closest_hit(&current) else {
                color += throughput * self.scene.background();
                break;
            };

            color += throughput * self.local_lighting(&hit);

            let reflectivity = self.scene.material(hit.material).reflectivity;
            if reflectivity <= 0.0 {
                break;
            }

            let d = current.direction;
            let n = hit.normal;
            let reflected = d - 2.0 * d.dot(n) * n;
            current = Ray::new(hit.pos + n * self.tol.epsilon, reflected);

            throughput *= reflectivity;
            if throughput < self.throughput_cutoff {
                break;
            }
        }

        TraceOutcome {
            color,
            bounces,
            throughput,
        }
    }

    /// Closest hit over planes and bounded shapes, with the normal facing
    /// against the ray.
    pub fn closest_hit(&self, ray: &Ray) -> Option<HitInfo> {
        let mut closest: Option<HitInfo> = None;
        let mut closest_t = f32::INFINITY;

        for plane in self.scene.planes() {
            if let Some(hit) = plane.intersect(ray, self.tol) {
                if hit.t < closest_t {
                    closest_t = hit.t;
                    closest = Some(hit);
                }
            }
        }

        // The nearest plane caps the BVH search
        let ray_t = Interval::from_min(self.tol.epsilon).with_max(closest_t);
        if let Some(hit) = self
            .scene
            .bvh()
            .closest_hit(self.scene.shapes(), ray, ray_t, self.tol)
        {
            closest = Some(hit);
        }

        closest.map(HitInfo::face_forward)
    }

    /// True if anything lies strictly between `origin` and `distance` along
    /// the unit vector `direction`.
    pub fn occluded(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool {
        let ray = Ray::new(origin, direction);
        let eps = self.tol.epsilon;

        let blocked_by_plane = self.scene.planes().iter().any(|plane| {
            plane
                .intersect(&ray, self.tol)
                .is_some_and(|hit| hit.t > eps && hit.t < distance)
        });
        if blocked_by_plane {
            return true;
        }

        self.scene
            .bvh()
            .traverse_first_hit(self.scene.shapes(), &ray, Interval::new(eps, distance), self.tol)
            .is_some_and(|hit| hit.t < distance)
    }

    /// Ambient plus unshadowed diffuse and specular light at a hit point.
    /// Reflection is handled by the caller.
    pub fn local_lighting(&self, hit: &HitInfo) -> Color {
        let hit = hit.face_forward();
        let mat = self.scene.material(hit.material);
        let n = hit.normal;
        let p = hit.pos + n * self.tol.epsilon;
        let view = hit.ray.direction.normalize_or_zero();

        let ambient_factor = self.scene.ambient() * (1.0 - mat.reflectivity);
        let mut color = mat.color * ambient_factor;

        for light in self.scene.lights() {
            let to_light = light.position - p;
            let distance = to_light.length();
            let Some(l) = to_light.try_normalize() else {
                continue;
            };

            if self.occluded(p, l, distance) {
                continue;
            }

            let diffuse_factor =
                (1.0 - ambient_factor) * (1.0 - mat.reflectivity) * n.dot(l).max(0.0);
            let diffuse = mat.color * light.color * diffuse_factor;

            let h = (l - view).normalize_or_zero();
            let specular = mat.specular
                * mat.specular_factor
                * n.dot(h).max(0.0).powf(mat.shininess)
                * light.color;

            color += diffuse + specular;
        }

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{Material, SceneBuilder};

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    /// Mirror floor at z = 0 facing up, one light above, nothing else.
    fn mirror_scene(background: Color) -> Scene {
        let mut b = SceneBuilder::new(8, 8, 4);
        b.set_ambient(0.2).set_background(background);
        let mirror = b
            .add_material(Material::new(Color::new(0.3, 0.6, 0.9), 1.0))
            .unwrap();
        b.add_plane(Vec3::ZERO, Vec3::Z, mirror).unwrap();
        b.add_light(Vec3::new(0.0, 0.0, 10.0), Color::ONE);
        b.build().unwrap()
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = mirror_scene(Color::new(0.1, 0.2, 0.3));
        let tracer = Tracer::new(&scene, &config());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert_eq!(tracer.trace_ray(&ray, 5), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_reflective_plane_adds_background_and_local_shading() {
        let background = Color::new(0.1, 0.2, 0.3);
        let scene = mirror_scene(background);
        let tracer = Tracer::new(&scene, &config());

        let ray = Ray::new(Vec3::new(-2.0, 0.0, 2.0), Vec3::new(1.0, 0.0, -1.0));
        let hit = tracer.closest_hit(&ray).unwrap();
        let local = tracer.local_lighting(&hit);

        let outcome = tracer.trace(&ray, 5);
        assert_eq!(outcome.bounces, 2);
        assert!((outcome.color - (local + background * 1.0)).length() < 1e-5);

        // A perfect mirror has no ambient or diffuse term, only the highlight
        assert!(local.x >= 0.0 && local.x <= 0.5 + 1e-5);
    }

    #[test]
    fn test_matte_surface_stops_after_one_bounce() {
        let mut b = SceneBuilder::new(8, 8, 4);
        let matte = b.add_material(Material::new(Color::ONE, 0.0)).unwrap();
        b.add_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, matte).unwrap();
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let outcome = tracer.trace(&ray, 10);
        assert_eq!(outcome.bounces, 1);
        assert_eq!(outcome.throughput, 1.0);
        // No lights: ambient only
        assert!((outcome.color - Color::splat(0.1)).length() < 1e-5);
    }

    #[test]
    fn test_throughput_cutoff_terminates_between_mirrors() {
        // Two half-silvered planes facing each other
        let mut b = SceneBuilder::new(8, 8, 1000);
        let half = b.add_material(Material::new(Color::ONE, 0.5)).unwrap();
        b.add_plane(Vec3::ZERO, Vec3::Z, half).unwrap();
        b.add_plane(Vec3::new(0.0, 0.0, 4.0), -Vec3::Z, half).unwrap();
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.1, 0.0, -1.0));
        let outcome = tracer.trace(&ray, tracer.max_bounces());
        // 0.5^10 < 0.001 <= 0.5^9
        assert_eq!(outcome.bounces, 10);
        assert!(outcome.throughput < 0.001);
    }

    #[test]
    fn test_bounce_limit_is_respected() {
        let mut b = SceneBuilder::new(8, 8, 2);
        let mirror = b.add_material(Material::new(Color::ONE, 1.0)).unwrap();
        b.add_plane(Vec3::ZERO, Vec3::Z, mirror).unwrap();
        b.add_plane(Vec3::new(0.0, 0.0, 4.0), -Vec3::Z, mirror).unwrap();
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.1, 0.0, -1.0));
        let outcome = tracer.trace(&ray, tracer.max_bounces());
        assert_eq!(outcome.bounces, 3);
        assert_eq!(outcome.throughput, 1.0);
    }

    #[test]
    fn test_shadowed_point_gets_ambient_only() {
        let mut b = SceneBuilder::new(8, 8, 0);
        b.set_ambient(0.25);
        let floor = b.add_material(Material::new(Color::ONE, 0.0)).unwrap();
        b.add_plane(Vec3::ZERO, Vec3::Z, floor).unwrap();
        b.add_sphere(Vec3::new(0.0, 0.0, 3.0), 1.0, floor).unwrap();
        b.add_light(Vec3::new(0.0, 0.0, 10.0), Color::ONE);
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        // Directly under the sphere: in shadow
        let ray = Ray::new(Vec3::new(0.0, -3.0, 1.0), Vec3::new(0.0, 3.0, -1.0));
        let hit = tracer.closest_hit(&ray).unwrap();
        assert!(hit.pos.length() < 1e-3);
        assert!((tracer.local_lighting(&hit) - Color::splat(0.25)).length() < 1e-5);

        // Well away from the sphere: lit
        let ray = Ray::new(Vec3::new(8.0, -3.0, 1.0), Vec3::new(0.0, 3.0, -1.0));
        let hit = tracer.closest_hit(&ray).unwrap();
        assert!(tracer.local_lighting(&hit).x > 0.5);
    }

    #[test]
    fn test_occluder_beyond_light_casts_no_shadow() {
        let mut b = SceneBuilder::new(8, 8, 0);
        let m = b.add_material(Material::default()).unwrap();
        b.add_sphere(Vec3::new(0.0, 0.0, 20.0), 1.0, m).unwrap();
        b.add_plane(Vec3::new(0.0, 0.0, 30.0), Vec3::Z, m).unwrap();
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        assert!(!tracer.occluded(Vec3::ZERO, Vec3::Z, 10.0));
        assert!(tracer.occluded(Vec3::ZERO, Vec3::Z, 25.0));
    }

    #[test]
    fn test_closest_hit_prefers_nearer_of_plane_and_shape() {
        let mut b = SceneBuilder::new(8, 8, 0);
        let a = b.add_material(Material::default()).unwrap();
        let c = b.add_material(Material::new(Color::ONE, 0.0)).unwrap();
        b.add_plane(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y, a).unwrap();
        b.add_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, c).unwrap();
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        let hit = tracer.closest_hit(&Ray::new(Vec3::ZERO, Vec3::Y)).unwrap();
        assert_eq!(hit.material, c);
        assert!((hit.t - 4.0).abs() < 1e-5);

        let hit = tracer
            .closest_hit(&Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Y))
            .unwrap();
        assert_eq!(hit.material, a);
    }

    #[test]
    fn test_mirror_hit_from_behind_reflects_away() {
        let scene = mirror_scene(Color::ZERO);
        let tracer = Tracer::new(&scene, &config());

        // From below the floor, which faces +Z
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::new(1.0, 0.0, 1.0));
        let hit = tracer.closest_hit(&ray).unwrap();
        assert_eq!(hit.normal, -Vec3::Z);

        // The reflected ray leaves the plane instead of hitting it again
        let outcome = tracer.trace(&ray, tracer.max_bounces());
        assert_eq!(outcome.bounces, 2);
    }

    #[test]
    fn test_reversed_winding_triangle_is_lit_from_viewer_side() {
        let mut b = SceneBuilder::new(8, 8, 0);
        let matte = b
            .add_material(Material::new(Color::ONE, 0.0).with_specular(Color::ZERO, 0.0))
            .unwrap();
        // Winding gives a -Z face normal
        b.add_triangle(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            matte,
        )
        .unwrap();
        b.add_light(Vec3::new(0.0, 0.0, 5.0), Color::ONE);
        let scene = b.build().unwrap();
        let tracer = Tracer::new(&scene, &config());

        let ray = Ray::new(Vec3::new(0.1, 0.0, 3.0), -Vec3::Z);
        let hit = tracer.closest_hit(&ray).unwrap();
        assert_eq!(hit.normal, Vec3::Z);

        let p = hit.pos + hit.normal * Tolerance::DEFAULT.epsilon;
        let to_light = Vec3::new(0.0, 0.0, 5.0) - p;
        assert!(!tracer.occluded(p, to_light.normalize(), to_light.length()));

        // Ambient 0.1 plus almost full diffuse
        let lit = tracer.local_lighting(&hit);
        assert!(lit.x > 0.9, "lit = {lit}");
    }
}
