//! Renderer errors.

use thiserror::Error;

/// Errors that can occur while setting up rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Thread pool needs at least one worker")]
    NoWorkers,

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Failed to spawn worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
