//! Lux renderer - progressive multi-threaded Whitted-style ray tracing.
//!
//! A fixed pool of worker threads refines the image one row per task, adding
//! one stratified sample per pixel and pass. Rows are flagged ready as they
//! complete so a presenter can pick them up while rendering continues.

mod config;
mod error;
mod pixels;
mod pool;
mod progressive;
mod sampler;
mod tracer;

pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use pixels::{color_to_rgb8, linear_to_gamma, PixelRow, Pixels, CHANNELS};
pub use pool::{AbortHandle, ThreadPool};
pub use progressive::{render_image, ProgressiveRenderer};
pub use sampler::{sample_offset, DEFAULT_GRID_SIZE};
pub use tracer::{TraceOutcome, Tracer};
