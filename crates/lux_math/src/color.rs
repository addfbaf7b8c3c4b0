//! Color helpers.

use crate::Vec3;

/// Linear RGB color. Channels are nominally in [0, 1] but may exceed that
/// range until presentation clamps them.
pub type Color = Vec3;

/// Convert 8-bit channels to a linear color (no gamma decoding).
pub fn color_from_rgb8(r: u8, g: u8, b: u8) -> Color {
    Color::new(r as f32, g as f32, b as f32) / 255.0
}
