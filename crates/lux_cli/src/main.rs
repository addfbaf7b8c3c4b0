//! Lux batch renderer.
//!
//! Renders a JSON scene file (or the built-in demo scene) with a fixed
//! number of progressive passes and writes the result as an image whose
//! format follows the output extension.

mod demo;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lux_core::{GpuScene, Scene, SceneDescription};
use lux_renderer::{render_image, RenderConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Render a lux scene to an image")]
struct Args {
    /// JSON scene description; the demo scene is used when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Output image (.ppm, .png, ...)
    #[arg(short, long, default_value = "output.ppm")]
    output: PathBuf,

    /// Demo scene width
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Demo scene height
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Demo scene reflection limit
    #[arg(long, default_value_t = 6)]
    reflections: u32,

    /// Refinement passes (samples per pixel)
    #[arg(short, long)]
    passes: Option<u32>,

    /// Worker threads, defaults to the number of cores
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output gamma
    #[arg(long)]
    gamma: Option<f32>,

    /// Also write the flattened GPU buffers into this directory
    #[arg(long)]
    gpu_dump: Option<PathBuf>,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        let defaults = RenderConfig::default();
        RenderConfig {
            threads: self.threads,
            passes: self.passes.unwrap_or(defaults.passes),
            gamma: self.gamma.unwrap_or(defaults.gamma),
            ..defaults
        }
    }

    fn load_scene(&self) -> Result<Scene> {
        match &self.scene {
            Some(path) => {
                log::info!("Loading scene from {}", path.display());
                let description = SceneDescription::from_path(path)
                    .with_context(|| format!("Failed to read scene {}", path.display()))?;
                description
                    .into_scene()
                    .with_context(|| format!("Invalid scene {}", path.display()))
            }
            None => {
                log::info!("No scene file given, using the demo scene");
                demo::demo_scene(self.width, self.height, self.reflections)
                    .context("Failed to build demo scene")
            }
        }
    }
}

fn dump_gpu_buffers(scene: &Scene, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let gpu = GpuScene::from_scene(scene);
    for (name, bytes) in gpu.as_bytes() {
        let path = dir.join(format!("{name}.bin"));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    }
    log::info!("GPU buffers written to {}", dir.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = args.render_config();
    let scene = args.load_scene()?;

    if let Some(dir) = &args.gpu_dump {
        dump_gpu_buffers(&scene, dir)?;
    }

    let (width, height) = (scene.width(), scene.height());
    log::info!(
        "Rendering {}x{} with {} passes on {} threads",
        width,
        height,
        config.passes,
        config.thread_count()
    );

    let pixels = render_image(scene, &config).context("Failed to start renderer")?;

    image::save_buffer(&args.output, &pixels, width, height, image::ColorType::Rgb8)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
