//! Surface materials for Phong/Blinn shading with mirror reflection.

use lux_math::{Color, Vec3};

use crate::error::{SceneError, SceneResult};

/// Handle to a material stored in a [`Scene`](crate::Scene).
///
/// Shapes and hits refer to materials through this index, so a material is
/// never copied per hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) u32);

impl MaterialId {
    /// Position of the material in the scene's material table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Material properties.
///
/// Immutable once added to a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse color (RGB, 0-1)
    pub color: Color,

    /// Specular highlight tint
    pub specular: Color,

    /// Strength of the specular highlight
    pub specular_factor: f32,

    /// Blinn exponent
    pub shininess: f32,

    /// Mirror reflectivity (0 = matte, 1 = perfect mirror)
    pub reflectivity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.5),
            specular: Color::ONE,
            specular_factor: 0.5,
            shininess: 8.0,
            reflectivity: 0.0,
        }
    }
}

impl Material {
    /// Create a material with the given diffuse color and reflectivity.
    pub fn new(color: Color, reflectivity: f32) -> Self {
        Self {
            color,
            reflectivity,
            ..Default::default()
        }
    }

    /// Set the specular tint and strength.
    pub fn with_specular(mut self, specular: Color, factor: f32) -> Self {
        self.specular = specular;
        self.specular_factor = factor;
        self
    }

    /// Set the Blinn exponent.
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    /// Check the material invariants.
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.color.is_finite()
            && self.specular.is_finite()
            && self.specular_factor.is_finite())
        {
            return Err(SceneError::NonFinite("material"));
        }
        if !(0.0..=1.0).contains(&self.reflectivity) {
            return Err(SceneError::InvalidReflectivity(self.reflectivity));
        }
        if !(self.shininess >= 0.0) {
            return Err(SceneError::InvalidShininess(self.shininess));
        }
        Ok(())
    }
}
