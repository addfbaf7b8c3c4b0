//! Progressive refinement driver.
//!
//! Each call to [`ProgressiveRenderer::refine`] queues one task per image
//! row; the task adds one stratified sample to every pixel of its row and
//! then flags the row ready. Camera changes drain the pool before resetting
//! the accumulators, so no worker can write into a freshly cleared buffer.

use std::sync::Arc;
use std::time::Instant;

use lux_core::Scene;
use lux_math::{Camera, Color, Vec3};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::pixels::Pixels;
use crate::pool::{AbortHandle, ThreadPool};
use crate::sampler::sample_offset;
use crate::tracer::Tracer;

pub struct ProgressiveRenderer {
    scene: Arc<Scene>,
    camera: Camera,
    config: Arc<RenderConfig>,
    pixels: Arc<Pixels>,
    pool: ThreadPool,
}

/// Everything a row task needs, shared between the tasks of one pass.
struct PassContext {
    scene: Arc<Scene>,
    camera: Camera,
    config: Arc<RenderConfig>,
    pixels: Arc<Pixels>,
    abort: AbortHandle,
}

impl ProgressiveRenderer {
    /// Start a renderer with the scene's initial camera and
    /// `config.thread_count()` workers.
    pub fn new(scene: Arc<Scene>, config: RenderConfig) -> RenderResult<Self> {
        let pool = ThreadPool::new(config.thread_count())?;
        let pixels = Arc::new(Pixels::new(scene.width(), scene.height()));
        Ok(Self {
            camera: *scene.camera(),
            scene,
            config: Arc::new(config),
            pixels,
            pool,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Queue one sample per pixel, one task per row. Returns immediately.
    pub fn refine(&self) {
        let ctx = Arc::new(PassContext {
            scene: Arc::clone(&self.scene),
            camera: self.camera,
            config: Arc::clone(&self.config),
            pixels: Arc::clone(&self.pixels),
            abort: self.pool.abort_handle(),
        });

        for y in 0..self.pixels.height() {
            let ctx = Arc::clone(&ctx);
            self.pool.enqueue(move || render_row(&ctx, y));
        }
    }

    /// Block until every queued pass has finished.
    pub fn wait(&self) {
        self.pool.wait();
    }

    /// Drop pending work, wait for running rows to bail out, then zero the
    /// accumulators and ready flags.
    pub fn clear(&self) {
        self.pool.clear_tasks();
        self.pixels.reset();
    }

    /// Run `passes` refinement passes to completion.
    pub fn render_passes(&self, passes: u32) {
        let start = Instant::now();
        for _ in 0..passes {
            self.refine();
        }
        self.wait();
        log::info!(
            "Rendered {} passes at {}x{} on {} threads in {:.2?}",
            passes,
            self.pixels.width(),
            self.pixels.height(),
            self.pool.size(),
            start.elapsed()
        );
    }

    /// Replace the camera pose. An invalid camera is rejected before any
    /// work is discarded.
    pub fn set_camera(&mut self, camera: Camera) -> RenderResult<()> {
        if !(camera.position.is_finite() && camera.direction.is_finite()) {
            return Err(RenderError::InvalidCamera("non-finite pose".into()));
        }
        if !camera.direction.is_normalized() {
            return Err(RenderError::InvalidCamera(
                "view direction must be a unit vector".into(),
            ));
        }
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(RenderError::InvalidCamera(format!(
                "field of view must lie in (0, 180) degrees, got {}",
                camera.fov
            )));
        }

        self.clear();
        self.camera = camera;
        Ok(())
    }

    /// Move in the camera frame, see [`Camera::translate_local`].
    pub fn move_camera(&mut self, delta: Vec3) {
        self.clear();
        self.camera.translate_local(delta);
    }

    pub fn rotate_camera(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.clear();
        self.camera.rotate_euler(dx, dy, sensitivity);
    }

    pub fn zoom_camera(&mut self, scroll: f32) {
        self.clear();
        self.camera.zoom(scroll);
    }

    /// Copy finished rows into an RGB8 frame, see [`Pixels::present_ready_rows`].
    pub fn present_ready_rows(&self, frame: &mut [u8]) -> usize {
        self.pixels.present_ready_rows(frame, self.config.gamma)
    }

    /// Whole image as RGB8.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.to_rgb8(self.config.gamma)
    }
}

impl Drop for ProgressiveRenderer {
    fn drop(&mut self) {
        // Don't let the pool finish stale passes on shutdown
        self.pool.clear_tasks();
    }
}

fn render_row(ctx: &PassContext, y: usize) {
    let width = ctx.pixels.width();
    let height = ctx.pixels.height();
    let tracer = Tracer::new(&ctx.scene, &ctx.config);
    let max_bounces = tracer.max_bounces();
    let mut rng = rand::thread_rng();

    // Another pass may be on this row too; a stale count only repeats a stratum
    let samples = ctx.pixels.row_sample_counts(y);
    let mut colors = Vec::with_capacity(width);

    for (x, &n) in samples.iter().enumerate() {
        if ctx.abort.should_abort() {
            return;
        }
        let offset = sample_offset(n, ctx.config.grid_size, &mut rng);
        let ray = ctx.camera.ray(
            x as f32 + offset.x,
            y as f32 + offset.y,
            width as u32,
            height as u32,
        );
        let color: Color = tracer.trace_ray(&ray, max_bounces);
        colors.push(color);
    }

    ctx.pixels.accumulate_row(y, &colors);
    ctx.pixels.mark_row_ready(y);
}

/// Render `scene` in batch mode and return the RGB8 image.
pub fn render_image(scene: Scene, config: &RenderConfig) -> RenderResult<Vec<u8>> {
    let renderer = ProgressiveRenderer::new(Arc::new(scene), config.clone())?;
    renderer.render_passes(config.passes);
    Ok(renderer.to_rgb8())
}
