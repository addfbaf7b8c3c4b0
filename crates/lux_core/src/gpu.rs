//! GPU-friendly flattening of a scene.
//!
//! Every array holds `#[repr(C)]` plain-old-data structs laid out in 16-byte
//! rows, ready to be copied into storage buffers as is. Bounded shapes are
//! split into one array per kind; BVH leaves address the `primitives` list,
//! which records the kind and per-kind index of each shape in leaf order.

use bytemuck::{Pod, Zeroable};
use lux_math::Vec3;

use crate::bvh::BvhNode;
use crate::scene::Scene;
use crate::shapes::BoundedShape;

/// Tag stored in [`GpuPrimitive::kind`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuShapeKind {
    Sphere = 0,
    Triangle = 1,
    Cylinder = 2,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuHeader {
    /// rgb background, w = ambient level
    pub background: [f32; 4],
    /// xyz camera position, w = vertical fov in degrees
    pub camera_position: [f32; 4],
    /// xyz unit view direction, w unused
    pub camera_direction: [f32; 4],
    pub width: u32,
    pub height: u32,
    pub max_reflections: u32,
    pub num_lights: u32,
    pub num_materials: u32,
    pub num_planes: u32,
    pub num_spheres: u32,
    pub num_triangles: u32,
    pub num_cylinders: u32,
    pub num_nodes: u32,
    pub num_primitives: u32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    /// rgb diffuse, w = specular factor
    pub color: [f32; 4],
    /// rgb specular tint, w = shininess
    pub specular: [f32; 4],
    pub reflectivity: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuPlane {
    pub point: [f32; 3],
    pub material: u32,
    pub normal: [f32; 3],
    pub _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: u32,
    pub _pad: [u32; 3],
}

/// Flat triangles repeat the face normal in all three vertex normals.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 4],
    pub v1: [f32; 4],
    pub v2: [f32; 4],
    pub n0: [f32; 4],
    pub n1: [f32; 4],
    pub n2: [f32; 4],
    pub material: u32,
    pub _pad: [u32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuCylinder {
    pub center: [f32; 3],
    pub radius: f32,
    pub height: f32,
    /// 0 = X, 1 = Y, 2 = Z
    pub axis: u32,
    pub material: u32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuNode {
    pub bounds_min: [f32; 3],
    /// -1 for leaves
    pub left: i32,
    pub bounds_max: [f32; 3],
    /// -1 for leaves
    pub right: i32,
    pub first_primitive: u32,
    /// 0 for internal nodes
    pub primitive_count: u32,
    pub _pad: [u32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuPrimitive {
    pub kind: u32,
    pub index: u32,
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

impl From<&BvhNode> for GpuNode {
    fn from(node: &BvhNode) -> Self {
        Self {
            bounds_min: node.bounds.min.to_array(),
            left: node.left,
            bounds_max: node.bounds.max.to_array(),
            right: node.right,
            first_primitive: node.shape_index,
            primitive_count: node.shape_count,
            _pad: [0; 2],
        }
    }
}

/// A scene flattened into GPU-uploadable arrays.
#[derive(Debug, Clone)]
pub struct GpuScene {
    pub header: GpuHeader,
    pub materials: Vec<GpuMaterial>,
    pub lights: Vec<GpuLight>,
    pub planes: Vec<GpuPlane>,
    pub spheres: Vec<GpuSphere>,
    pub triangles: Vec<GpuTriangle>,
    pub cylinders: Vec<GpuCylinder>,
    pub nodes: Vec<GpuNode>,
    pub primitives: Vec<GpuPrimitive>,
}

impl GpuScene {
    pub fn from_scene(scene: &Scene) -> Self {
        let materials = scene
            .materials()
            .iter()
            .map(|m| GpuMaterial {
                color: vec4(m.color, m.specular_factor),
                specular: vec4(m.specular, m.shininess),
                reflectivity: m.reflectivity,
                _pad: [0.0; 3],
            })
            .collect();

        let lights = scene
            .lights()
            .iter()
            .map(|l| GpuLight {
                position: vec4(l.position, 1.0),
                color: vec4(l.color, 0.0),
            })
            .collect();

        let planes = scene
            .planes()
            .iter()
            .map(|p| GpuPlane {
                point: p.point().to_array(),
                material: p.material().index() as u32,
                normal: p.normal().to_array(),
                _pad: 0,
            })
            .collect();

        // Split shapes by kind, remembering where each one landed
        let mut spheres = Vec::new();
        let mut triangles = Vec::new();
        let mut cylinders = Vec::new();
        let mut slots = Vec::with_capacity(scene.shapes().len());
        for shape in scene.shapes() {
            let slot = match shape {
                BoundedShape::Sphere(s) => {
                    spheres.push(GpuSphere {
                        center: s.center().to_array(),
                        radius: s.radius(),
                        material: s.material().index() as u32,
                        _pad: [0; 3],
                    });
                    (GpuShapeKind::Sphere, spheres.len() - 1)
                }
                BoundedShape::Triangle(t) => {
                    let [v0, v1, v2] = t.vertices();
                    let n = t.face_normal();
                    let [n0, n1, n2] = t.vertex_normals().unwrap_or([n, n, n]);
                    triangles.push(GpuTriangle {
                        v0: vec4(v0, 1.0),
                        v1: vec4(v1, 1.0),
                        v2: vec4(v2, 1.0),
                        n0: vec4(n0, 0.0),
                        n1: vec4(n1, 0.0),
                        n2: vec4(n2, 0.0),
                        material: t.material().index() as u32,
                        _pad: [0; 3],
                    });
                    (GpuShapeKind::Triangle, triangles.len() - 1)
                }
                BoundedShape::Cylinder(c) => {
                    cylinders.push(GpuCylinder {
                        center: c.center().to_array(),
                        radius: c.radius(),
                        height: c.height(),
                        axis: c.axis().index() as u32,
                        material: c.material().index() as u32,
                        _pad: 0,
                    });
                    (GpuShapeKind::Cylinder, cylinders.len() - 1)
                }
            };
            slots.push(slot);
        }

        let bvh = scene.bvh();
        let nodes: Vec<GpuNode> = bvh.nodes().iter().map(GpuNode::from).collect();
        let primitives: Vec<GpuPrimitive> = bvh
            .shape_indices()
            .iter()
            .map(|&i| {
                let (kind, index) = slots[i];
                GpuPrimitive {
                    kind: kind as u32,
                    index: index as u32,
                }
            })
            .collect();

        let camera = scene.camera();
        let header = GpuHeader {
            background: vec4(scene.background(), scene.ambient()),
            camera_position: vec4(camera.position, camera.fov),
            camera_direction: vec4(camera.direction, 0.0),
            width: scene.width(),
            height: scene.height(),
            max_reflections: scene.max_reflections(),
            num_lights: scene.lights().len() as u32,
            num_materials: scene.materials().len() as u32,
            num_planes: scene.planes().len() as u32,
            num_spheres: spheres.len() as u32,
            num_triangles: triangles.len() as u32,
            num_cylinders: cylinders.len() as u32,
            num_nodes: nodes.len() as u32,
            num_primitives: primitives.len() as u32,
            _pad: 0,
        };

        Self {
            header,
            materials,
            lights,
            planes,
            spheres,
            triangles,
            cylinders,
            nodes,
            primitives,
        }
    }

    /// Named byte views of every buffer, header first.
    pub fn as_bytes(&self) -> [(&'static str, &[u8]); 9] {
        [
            ("header", bytemuck::bytes_of(&self.header)),
            ("materials", bytemuck::cast_slice(&self.materials)),
            ("lights", bytemuck::cast_slice(&self.lights)),
            ("planes", bytemuck::cast_slice(&self.planes)),
            ("spheres", bytemuck::cast_slice(&self.spheres)),
            ("triangles", bytemuck::cast_slice(&self.triangles)),
            ("cylinders", bytemuck::cast_slice(&self.cylinders)),
            ("nodes", bytemuck::cast_slice(&self.nodes)),
            ("primitives", bytemuck::cast_slice(&self.primitives)),
        ]
    }
}
