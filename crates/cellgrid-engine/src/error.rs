use std::path::PathBuf;

use cellgrid_grid::GridError;
use thiserror::Error;

use crate::bridge::Domain;

/// Fatal pipeline errors. Nothing in the pipeline retries; every variant aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No adapter, or the device could not be created.
    #[error("GPU initialization failed: {0}")]
    Init(String),

    /// No shared graphics/compute context can be built on this platform or adapter.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The offscreen target cannot back a canvas of the requested size/format.
    #[error("offscreen framebuffer incomplete: {0}")]
    FramebufferIncomplete(String),

    #[error("failed to read kernel source {}", path.display())]
    KernelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kernel build failed: {0}")]
    KernelBuild(String),

    /// Acquire/release called from the wrong ownership state.
    #[error("shared canvas is owned by {actual:?}, expected {expected:?}")]
    Ownership { expected: Domain, actual: Domain },

    #[error("GPU device error: {0}")]
    Device(String),

    #[error("result read-back failed: {0}")]
    Readback(String),

    /// Grid configuration, capacity, or geometry error (raised before any GPU work).
    #[error(transparent)]
    Layout(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// True for the "more shapes than cells" rejection.
    pub fn is_capacity(&self) -> bool {
        matches!(self, PipelineError::Layout(GridError::Capacity { .. }))
    }
}
