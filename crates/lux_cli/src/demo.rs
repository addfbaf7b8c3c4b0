//! Built-in scene used when no scene file is given.

use lux_core::{Material, Scene, SceneBuilder, SceneResult};
use lux_math::{Axis, Color, Vec3};

/// Sky-blue backdrop, a slightly reflective floor, two mirror spheres, a
/// matte sphere, a cylinder and a smooth-shaded triangle under two lights.
pub fn demo_scene(width: u32, height: u32, max_reflections: u32) -> SceneResult<Scene> {
    let mut b = SceneBuilder::new(width, height, max_reflections);
    b.set_background_rgb8(135, 206, 235).set_ambient(0.15);
    b.set_camera(Vec3::new(0.0, -8.0, 2.5), Vec3::new(0.0, 1.0, -0.2), 60.0)?;

    let floor = b.add_material(Material::new(Color::splat(0.75), 0.25))?;
    let mirror = b.add_material(
        Material::new(Color::splat(0.9), 0.85)
            .with_specular(Color::ONE, 0.8)
            .with_shininess(64.0),
    )?;
    let red = b.add_material(Material::new(Color::new(0.85, 0.2, 0.15), 0.0))?;
    let gold = b.add_material(
        Material::new(Color::new(0.9, 0.7, 0.2), 0.4)
            .with_specular(Color::new(1.0, 0.9, 0.6), 0.6)
            .with_shininess(32.0),
    )?;
    let teal = b.add_material(Material::new(Color::new(0.1, 0.6, 0.55), 0.1))?;

    b.add_plane(Vec3::ZERO, Vec3::Z, floor)?
        .add_sphere(Vec3::new(-1.6, 1.0, 1.0), 1.0, mirror)?
        .add_sphere(Vec3::new(1.5, 0.0, 0.8), 0.8, red)?
        .add_sphere(Vec3::new(0.2, 3.5, 1.5), 1.5, mirror)?
        .add_cylinder(Vec3::new(3.2, 2.5, 1.0), 0.5, 2.0, Axis::Z, gold)?
        .add_smooth_triangle(
            [
                Vec3::new(-4.5, 2.0, 0.0),
                Vec3::new(-2.5, 4.0, 0.0),
                Vec3::new(-3.5, 3.0, 2.5),
            ],
            [
                Vec3::new(-1.0, -0.4, 0.3),
                Vec3::new(0.4, -1.0, 0.3),
                Vec3::new(-0.2, -0.7, 1.0),
            ],
            teal,
        )?;

    b.add_light(Vec3::new(4.0, -6.0, 8.0), Color::splat(0.9))
        .add_light(Vec3::new(-6.0, -2.0, 5.0), Color::new(0.4, 0.4, 0.5));

    b.build()
}
