//! Stratified sub-pixel sampling.
//!
//! Each pixel is divided into a `grid x grid` lattice of cells. The n-th
//! sample of a pixel lands in cell `(n % grid, (n / grid) % grid)`, jittered
//! uniformly inside that cell, so successive passes sweep the pixel in a
//! fixed order while still covering it randomly.

use lux_math::Vec2;
use rand::Rng;

/// Default anti-aliasing grid size.
pub const DEFAULT_GRID_SIZE: u32 = 4;

/// Offset inside the pixel, in [0, 1)^2, for the sample that follows
/// `samples` previous ones. The very first sample goes through the pixel
/// center so a single pass gives a clean preview.
pub fn sample_offset<R: Rng + ?Sized>(samples: u32, grid: u32, rng: &mut R) -> Vec2 {
    if samples == 0 || grid == 0 {
        return Vec2::splat(0.5);
    }

    let a = grid as f32;
    let cell_x = (samples % grid) as f32;
    let cell_y = ((samples / grid) % grid) as f32;

    let jitter_x: f32 = rng.gen_range(-0.5..0.5);
    let jitter_y: f32 = rng.gen_range(-0.5..0.5);

    Vec2::new(
        (cell_x + 0.5 + jitter_x) / a,
        (cell_y + 0.5 + jitter_y) / a,
    )
}
