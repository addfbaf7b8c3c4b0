//! Scene construction errors.
//!
//! Only invariant violations detected while building a scene surface as
//! errors. Numerical degeneracy during intersection is never an error; it is
//! simply reported as a miss.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Sphere radius must be positive, got {0}")]
    InvalidRadius(f32),

    #[error("Cylinder dimensions must be positive, got radius {radius} and height {height}")]
    InvalidCylinder { radius: f32, height: f32 },

    #[error("Plane normal must not be zero")]
    ZeroNormal,

    #[error("Triangle vertices are collinear or coincident")]
    DegenerateTriangle,

    #[error("Triangle vertex normal {0} is zero")]
    ZeroVertexNormal(usize),

    #[error("Reflectivity must lie in [0, 1], got {0}")]
    InvalidReflectivity(f32),

    #[error("Shininess must be non-negative, got {0}")]
    InvalidShininess(f32),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Image resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
