//! cellgrid engine crate.
//!
//! Owns the GPU side of the pipeline: a shared wgpu context, the outline
//! rasterizer, the canvas hand-off between graphics and compute, and the
//! compute reducer. Geometry and text output live in `cellgrid_grid`.

pub mod bridge;
pub mod compute;
pub mod device;
pub mod logging;
pub mod pipeline;
pub mod preview;
pub mod render;

mod error;

pub use error::{PipelineError, Result};
pub use pipeline::{run_offscreen, run_with_context, KernelConfig, RunConfig, RunOutput};
