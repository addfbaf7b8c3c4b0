use lux_math::Tolerance;

use crate::sampler::DEFAULT_GRID_SIZE;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Worker threads; `None` uses the available hardware parallelism
    pub threads: Option<usize>,
    /// Refinement passes for batch rendering (one sample per pixel each)
    pub passes: u32,
    /// Anti-aliasing stratification grid (cells per pixel side)
    pub grid_size: u32,
    /// Reflection bounces stop once throughput falls below this
    pub throughput_cutoff: f32,
    /// Presentation gamma; 1.0 means a plain clamp
    pub gamma: f32,
    /// Intersection and surface offset tolerance
    pub tolerance: Tolerance,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: None,
            passes: 17,
            grid_size: DEFAULT_GRID_SIZE,
            throughput_cutoff: 0.001,
            gamma: 1.0,
            tolerance: Tolerance::DEFAULT,
        }
    }
}

impl RenderConfig {
    /// Number of worker threads to start.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
