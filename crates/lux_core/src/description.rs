//! JSON scene description.
//!
//! A serde mirror of the [`SceneBuilder`] API. Materials are named and
//! objects refer to them by name:
//!
//! ```json
//! {
//!   "width": 640, "height": 480, "max_reflections": 3,
//!   "ambient": 0.1, "background": [0.1, 0.1, 0.2],
//!   "camera": { "position": [0, -6, 1], "direction": [0, 1, 0], "fov": 60 },
//!   "materials": [ { "name": "red", "color": [1, 0, 0], "reflectivity": 0.2 } ],
//!   "lights": [ { "position": [3, -4, 8], "color": [1, 1, 1] } ],
//!   "objects": [ { "type": "sphere", "center": [0, 0, 1], "radius": 1, "material": "red" } ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lux_math::{Axis, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::material::{Material, MaterialId};
use crate::scene::{Scene, SceneBuilder};

type Triple = [f32; 3];

fn default_reflections() -> u32 {
    3
}

fn default_ambient() -> f32 {
    0.1
}

fn default_fov() -> f32 {
    60.0
}

fn default_specular() -> Triple {
    [1.0, 1.0, 1.0]
}

fn default_specular_factor() -> f32 {
    0.5
}

fn default_shininess() -> f32 {
    8.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_reflections")]
    pub max_reflections: u32,
    #[serde(default = "default_ambient")]
    pub ambient: f32,
    #[serde(default)]
    pub background: Triple,
    pub camera: CameraDescription,
    #[serde(default)]
    pub materials: Vec<MaterialDescription>,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraDescription {
    pub position: Triple,
    pub direction: Triple,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialDescription {
    pub name: String,
    pub color: Triple,
    #[serde(default)]
    pub reflectivity: f32,
    #[serde(default = "default_specular")]
    pub specular: Triple,
    #[serde(default = "default_specular_factor")]
    pub specular_factor: f32,
    #[serde(default = "default_shininess")]
    pub shininess: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightDescription {
    pub position: Triple,
    pub color: Triple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisDescription {
    X,
    Y,
    #[default]
    Z,
}

impl From<AxisDescription> for Axis {
    fn from(a: AxisDescription) -> Self {
        match a {
            AxisDescription::X => Axis::X,
            AxisDescription::Y => Axis::Y,
            AxisDescription::Z => Axis::Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ObjectDescription {
    Sphere {
        center: Triple,
        radius: f32,
        material: String,
    },
    Plane {
        point: Triple,
        normal: Triple,
        material: String,
    },
    Triangle {
        vertices: [Triple; 3],
        material: String,
    },
    SmoothTriangle {
        vertices: [Triple; 3],
        normals: [Triple; 3],
        material: String,
    },
    Cylinder {
        center: Triple,
        radius: f32,
        height: f32,
        #[serde(default)]
        axis: AxisDescription,
        material: String,
    },
}

impl ObjectDescription {
    fn material(&self) -> &str {
        match self {
            ObjectDescription::Sphere { material, .. }
            | ObjectDescription::Plane { material, .. }
            | ObjectDescription::Triangle { material, .. }
            | ObjectDescription::SmoothTriangle { material, .. }
            | ObjectDescription::Cylinder { material, .. } => material,
        }
    }
}

fn vec3s(v: [Triple; 3]) -> [Vec3; 3] {
    v.map(Vec3::from)
}

impl SceneDescription {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build the described scene.
    pub fn into_scene(self) -> SceneResult<Scene> {
        let mut builder = SceneBuilder::new(self.width, self.height, self.max_reflections);
        builder
            .set_ambient(self.ambient)
            .set_background(Vec3::from(self.background));
        builder.set_camera(
            Vec3::from(self.camera.position),
            Vec3::from(self.camera.direction),
            self.camera.fov,
        )?;

        let mut ids: HashMap<String, MaterialId> = HashMap::new();
        for m in self.materials {
            let material = Material::new(Vec3::from(m.color), m.reflectivity)
                .with_specular(Vec3::from(m.specular), m.specular_factor)
                .with_shininess(m.shininess);
            let id = builder.add_material(material)?;
            ids.insert(m.name, id);
        }

        for light in &self.lights {
            builder.add_light(Vec3::from(light.position), Vec3::from(light.color));
        }

        for object in self.objects {
            let id = *ids
                .get(object.material())
                .ok_or_else(|| SceneError::UnknownMaterial(object.material().to_string()))?;

            match object {
                ObjectDescription::Sphere { center, radius, .. } => {
                    builder.add_sphere(center.into(), radius, id)?;
                }
                ObjectDescription::Plane { point, normal, .. } => {
                    builder.add_plane(point.into(), normal.into(), id)?;
                }
                ObjectDescription::Triangle { vertices, .. } => {
                    let [a, b, c] = vec3s(vertices);
                    builder.add_triangle(a, b, c, id)?;
                }
                ObjectDescription::SmoothTriangle {
                    vertices, normals, ..
                } => {
                    builder.add_smooth_triangle(vec3s(vertices), vec3s(normals), id)?;
                }
                ObjectDescription::Cylinder {
                    center,
                    radius,
                    height,
                    axis,
                    ..
                } => {
                    builder.add_cylinder(center.into(), radius, height, axis.into(), id)?;
                }
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "width": 32,
        "height": 24,
        "background": [0.1, 0.2, 0.3],
        "camera": { "position": [0, -5, 1], "direction": [0, 1, 0] },
        "materials": [
            { "name": "floor", "color": [0.8, 0.8, 0.8], "reflectivity": 0.5 },
            { "name": "red", "color": [1, 0, 0], "shininess": 32 }
        ],
        "lights": [ { "position": [0, 0, 10], "color": [1, 1, 1] } ],
        "objects": [
            { "type": "plane", "point": [0, 0, 0], "normal": [0, 0, 1], "material": "floor" },
            { "type": "sphere", "center": [0, 0, 1], "radius": 1, "material": "red" },
            { "type": "triangle", "vertices": [[0, 2, 0], [1, 2, 0], [0, 2, 1]], "material": "red" },
            { "type": "cylinder", "center": [2, 0, 1], "radius": 0.5, "height": 2, "axis": "y", "material": "red" }
        ]
    }"#;

    #[test]
    fn test_description_parses_and_builds() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        assert_eq!(desc.max_reflections, 3);
        assert_eq!(desc.camera.fov, 60.0);
        assert_eq!(desc.materials[0].specular, [1.0, 1.0, 1.0]);

        let scene = desc.into_scene().unwrap();
        assert_eq!(scene.planes().len(), 1);
        assert_eq!(scene.shapes().len(), 3);
        assert_eq!(scene.materials()[1].shininess, 32.0);
        assert_eq!(scene.background(), Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_description_unknown_material() {
        let json = r#"{
            "width": 4, "height": 4,
            "camera": { "position": [0, 0, 0], "direction": [0, 1, 0] },
            "objects": [ { "type": "sphere", "center": [0, 3, 0], "radius": 1, "material": "gold" } ]
        }"#;
        let err = SceneDescription::from_json(json).unwrap().into_scene().unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial(name) if name == "gold"));
    }

    #[test]
    fn test_description_rejects_malformed_json() {
        let err = SceneDescription::from_json("{ \"width\": 4 ").unwrap_err();
        assert!(matches!(err, SceneError::Json(_)));

        let json = r#"{ "width": 4, "height": 4,
            "camera": { "position": [0, 0, 0], "direction": [0, 1, 0] },
            "objects": [ { "type": "torus", "material": "x" } ] }"#;
        assert!(SceneDescription::from_json(json).is_err());
    }

    #[test]
    fn test_description_missing_file() {
        let err = SceneDescription::from_path("/nonexistent/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }

    #[test]
    fn test_description_json_roundtrip() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        let again = SceneDescription::from_json(&desc.to_json().unwrap()).unwrap();
        assert_eq!(desc, again);
    }
}
