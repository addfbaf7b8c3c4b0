//! Lux core - scene description, geometry and acceleration structure.
//!
//! Scenes are assembled with [`SceneBuilder`] (or loaded from a JSON
//! [`SceneDescription`]) and are immutable once built. Bounded shapes are
//! indexed by a flat, SAH-built [`Bvh`]; planes are kept in a separate list.

pub mod bvh;
pub mod description;
pub mod error;
pub mod gpu;
pub mod hittable;
pub mod light;
pub mod material;
pub mod scene;
pub mod shapes;

pub use bvh::{Bvh, BvhNode, BIN_COUNT, LEAF_THRESHOLD};
pub use description::SceneDescription;
pub use error::{SceneError, SceneResult};
pub use gpu::GpuScene;
pub use hittable::{Bounded, HitInfo, Hittable};
pub use light::Light;
pub use material::{Material, MaterialId};
pub use scene::{Scene, SceneBuilder};
pub use shapes::{BoundedShape, Cylinder, Plane, Sphere, Triangle};
