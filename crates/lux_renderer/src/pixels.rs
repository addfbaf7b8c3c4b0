//! Progressive pixel accumulation buffer.
//!
//! Each row holds running color sums and sample counts behind its own mutex,
//! plus a ready flag. Render tasks publish a row by setting its flag with
//! release ordering after committing samples; the presenter claims it with
//! an acquiring swap before reading.

use std::sync::atomic::{AtomicBool, Ordering};

use lux_math::Color;
use parking_lot::Mutex;
use rayon::prelude::*;

/// Bytes per presented pixel (RGB8).
pub const CHANNELS: usize = 3;

/// Accumulated samples of one image row.
#[derive(Debug, Clone)]
pub struct PixelRow {
    pub colors: Vec<Color>,
    pub samples: Vec<u32>,
}

impl PixelRow {
    fn new(width: usize) -> Self {
        Self {
            colors: vec![Color::ZERO; width],
            samples: vec![0; width],
        }
    }

    fn clear(&mut self) {
        self.colors.fill(Color::ZERO);
        self.samples.fill(0);
    }

    /// Average color of pixel `x`, black if it has no samples yet.
    pub fn average(&self, x: usize) -> Color {
        match self.samples[x] {
            0 => Color::ZERO,
            n => self.colors[x] / n as f32,
        }
    }
}

pub struct Pixels {
    width: usize,
    height: usize,
    rows: Vec<Mutex<PixelRow>>,
    ready: Vec<AtomicBool>,
}

impl Pixels {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            rows: (0..height).map(|_| Mutex::new(PixelRow::new(width))).collect(),
            ready: (0..height).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Copy of the sample counts of row `y`.
    pub fn row_sample_counts(&self, y: usize) -> Vec<u32> {
        self.rows[y].lock().samples.clone()
    }

    /// Add one sample per pixel of row `y`.
    pub fn accumulate_row(&self, y: usize, colors: &[Color]) {
        let mut row = self.rows[y].lock();
        for (x, c) in colors.iter().enumerate().take(self.width) {
            row.colors[x] += *c;
            row.samples[x] += 1;
        }
    }

    /// Snapshot of row `y`.
    pub fn row(&self, y: usize) -> PixelRow {
        self.rows[y].lock().clone()
    }

    pub fn sample_count(&self, x: usize, y: usize) -> u32 {
        self.rows[y].lock().samples[x]
    }

    /// Average color of one pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.rows[y].lock().average(x)
    }

    /// Publish row `y` to the presenter.
    pub fn mark_row_ready(&self, y: usize) {
        self.ready[y].store(true, Ordering::Release);
    }

    pub fn is_row_ready(&self, y: usize) -> bool {
        self.ready[y].load(Ordering::Acquire)
    }

    /// Claim row `y` for presentation, clearing its flag.
    pub fn take_row_ready(&self, y: usize) -> bool {
        self.ready[y].swap(false, Ordering::AcqRel)
    }

    /// Zero all accumulators and ready flags. Callers must make sure no
    /// render task is running.
    pub fn reset(&self) {
        for (row, ready) in self.rows.iter().zip(&self.ready) {
            ready.store(false, Ordering::Release);
            row.lock().clear();
        }
    }

    /// Convert every ready row into `out` (RGB8, row-major) and clear the
    /// flags. Returns the number of rows written.
    pub fn present_ready_rows(&self, out: &mut [u8], gamma: f32) -> usize {
        let stride = self.width * CHANNELS;
        if stride == 0 {
            return 0;
        }
        out.par_chunks_mut(stride)
            .take(self.height)
            .enumerate()
            .filter(|(y, _)| self.take_row_ready(*y))
            .map(|(y, dst)| {
                let row = self.rows[y].lock();
                write_row(&row, dst, gamma);
            })
            .count()
    }

    /// Convert the whole buffer to RGB8, ignoring ready flags.
    pub fn to_rgb8(&self, gamma: f32) -> Vec<u8> {
        let mut out = vec![0u8; self.width * self.height * CHANNELS];
        if self.width == 0 {
            return out;
        }
        out.par_chunks_mut(self.width * CHANNELS)
            .zip(self.rows.par_iter())
            .for_each(|(dst, row)| write_row(&row.lock(), dst, gamma));
        out
    }
}

fn write_row(row: &PixelRow, dst: &mut [u8], gamma: f32) {
    for (x, px) in dst.chunks_exact_mut(CHANNELS).enumerate() {
        px.copy_from_slice(&color_to_rgb8(row.average(x), gamma));
    }
}

/// Gamma-encode a linear channel. A gamma of 1 leaves the value untouched.
#[inline]
pub fn linear_to_gamma(linear: f32, gamma: f32) -> f32 {
    if gamma == 1.0 {
        linear
    } else if linear > 0.0 {
        linear.powf(1.0 / gamma)
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB: gamma, clamp to [0, 1], round.
pub fn color_to_rgb8(color: Color, gamma: f32) -> [u8; 3] {
    let channel = |c: f32| (linear_to_gamma(c, gamma).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}
