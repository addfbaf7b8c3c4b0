//! Scene container and builder.
//!
//! A [`Scene`] is assembled once through [`SceneBuilder`] and is read-only
//! afterwards, so render threads can share it behind an `Arc` without locks.
//! Only the camera pose changes during interactive rendering, and the
//! renderer keeps its own copy of it.

use lux_math::{color_from_rgb8, Axis, Camera, Color, Vec3};

use crate::bvh::Bvh;
use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::material::{Material, MaterialId};
use crate::shapes::{BoundedShape, Cylinder, Plane, Sphere, Triangle};

/// Immutable scene: settings, lights, materials and geometry plus the BVH
/// over all bounded shapes.
#[derive(Debug, Clone)]
pub struct Scene {
    width: u32,
    height: u32,
    max_reflections: u32,
    ambient: f32,
    background: Color,
    camera: Camera,
    lights: Vec<Light>,
    materials: Vec<Material>,
    planes: Vec<Plane>,
    shapes: Vec<BoundedShape>,
    bvh: Bvh,
}

impl Scene {
    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maximum number of mirror bounces after the primary hit.
    pub fn max_reflections(&self) -> u32 {
        self.max_reflections
    }

    /// Ambient light level in [0, 1].
    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Initial camera pose.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Look up a material. Ids are only handed out by the builder of this
    /// scene, so the lookup cannot fail for geometry stored here.
    #[inline]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn shapes(&self) -> &[BoundedShape] {
        &self.shapes
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }
}

/// Incremental scene construction with validation.
///
/// # Example
/// ```
/// use lux_core::{Material, SceneBuilder};
/// use lux_math::{Color, Vec3};
///
/// let mut builder = SceneBuilder::new(320, 240, 3);
/// let red = builder.add_material(Material::new(Color::new(1.0, 0.0, 0.0), 0.0)).unwrap();
/// builder.add_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, red).unwrap();
/// builder.add_light(Vec3::new(0.0, 0.0, 10.0), Color::ONE);
/// let scene = builder.build().unwrap();
/// assert_eq!(scene.shapes().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    width: u32,
    height: u32,
    max_reflections: u32,
    ambient: f32,
    background: Color,
    camera: Camera,
    lights: Vec<Light>,
    materials: Vec<Material>,
    planes: Vec<Plane>,
    shapes: Vec<BoundedShape>,
}

impl SceneBuilder {
    pub fn new(width: u32, height: u32, max_reflections: u32) -> Self {
        Self {
            width,
            height,
            max_reflections,
            ambient: 0.1,
            background: Color::ZERO,
            camera: Camera::default(),
            lights: Vec::new(),
            materials: Vec::new(),
            planes: Vec::new(),
            shapes: Vec::new(),
        }
    }

    pub fn set_ambient(&mut self, ambient: f32) -> &mut Self {
        self.ambient = ambient;
        self
    }

    pub fn set_background(&mut self, background: Color) -> &mut Self {
        self.background = background;
        self
    }

    /// Background from 0-255 channels.
    pub fn set_background_rgb8(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.background = color_from_rgb8(r, g, b);
        self
    }

    /// Set the camera pose. `fov` is the vertical field of view in degrees.
    pub fn set_camera(
        &mut self,
        position: Vec3,
        direction: Vec3,
        fov: f32,
    ) -> SceneResult<&mut Self> {
        if !(position.is_finite() && direction.is_finite()) {
            return Err(SceneError::NonFinite("camera"));
        }
        if direction.length_squared() == 0.0 {
            return Err(SceneError::InvalidCamera("view direction is zero".into()));
        }
        if !(fov > 0.0 && fov < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "field of view must lie in (0, 180) degrees, got {fov}"
            )));
        }
        self.camera = Camera::new(position, direction, fov);
        Ok(self)
    }

    /// Register a material and return its handle.
    pub fn add_material(&mut self, material: Material) -> SceneResult<MaterialId> {
        material.validate()?;
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        Ok(id)
    }

    pub fn add_light(&mut self, position: Vec3, color: Color) -> &mut Self {
        self.lights.push(Light::new(position, color));
        self
    }

    pub fn add_plane(
        &mut self,
        point: Vec3,
        normal: Vec3,
        material: MaterialId,
    ) -> SceneResult<&mut Self> {
        self.check_material(material)?;
        self.planes.push(Plane::new(point, normal, material)?);
        Ok(self)
    }

    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        material: MaterialId,
    ) -> SceneResult<&mut Self> {
        self.check_material(material)?;
        self.shapes.push(Sphere::new(center, radius, material)?.into());
        Ok(self)
    }

    pub fn add_triangle(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        material: MaterialId,
    ) -> SceneResult<&mut Self> {
        self.check_material(material)?;
        self.shapes.push(Triangle::new(a, b, c, material)?.into());
        Ok(self)
    }

    /// Triangle shaded with normals interpolated from the vertex normals.
    pub fn add_smooth_triangle(
        &mut self,
        vertices: [Vec3; 3],
        normals: [Vec3; 3],
        material: MaterialId,
    ) -> SceneResult<&mut Self> {
        self.check_material(material)?;
        self.shapes
            .push(Triangle::with_vertex_normals(vertices, normals, material)?.into());
        Ok(self)
    }

    pub fn add_cylinder(
        &mut self,
        center: Vec3,
        radius: f32,
        height: f32,
        axis: Axis,
        material: MaterialId,
    ) -> SceneResult<&mut Self> {
        self.check_material(material)?;
        self.shapes
            .push(Cylinder::new(center, radius, height, axis, material)?.into());
        Ok(self)
    }

    fn check_material(&self, id: MaterialId) -> SceneResult<()> {
        if id.index() < self.materials.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownMaterial(format!("#{}", id.index())))
        }
    }

    /// Validate the settings, build the BVH and freeze the scene.
    pub fn build(self) -> SceneResult<Scene> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.ambient.is_finite() && self.background.is_finite()) {
            return Err(SceneError::NonFinite("scene settings"));
        }
        if self
            .lights
            .iter()
            .any(|l| !(l.position.is_finite() && l.color.is_finite()))
        {
            return Err(SceneError::NonFinite("light"));
        }

        let bvh = Bvh::build(&self.shapes);

        log::info!(
            "Scene built: {}x{}, {} shapes, {} planes, {} lights, {} materials, {} BVH nodes",
            self.width,
            self.height,
            self.shapes.len(),
            self.planes.len(),
            self.lights.len(),
            self.materials.len(),
            bvh.nodes().len()
        );

        Ok(Scene {
            width: self.width,
            height: self.height,
            max_reflections: self.max_reflections,
            ambient: self.ambient.clamp(0.0, 1.0),
            background: self.background,
            camera: self.camera,
            lights: self.lights,
            materials: self.materials,
            planes: self.planes,
            shapes: self.shapes,
            bvh,
        })
    }
}
