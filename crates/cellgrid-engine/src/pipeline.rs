//! Single-shot offscreen run: pack → rasterize → hand off → reduce → present.

use std::path::PathBuf;

use cellgrid_grid::{pack_catalog, render_cells, GlyphMode, Grid, PackedShape, ShapeCatalog};
use serde::{Deserialize, Serialize};

use crate::bridge::SharedCanvas;
use crate::compute::{Kernel, KernelSource, Reducer, DEFAULT_ENTRY_POINT};
use crate::device::{GpuInit, SharedContext};
use crate::error::Result;
use crate::render::{rasterize, CanvasFormat, OffscreenTarget, Orientation, OutlineRenderer, RenderCtx};

/// Where the reduction kernel comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// WGSL file; `None` selects the built-in kernel matching the glyph mode.
    pub path: Option<PathBuf>,
    pub entry_point: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            path: None,
            entry_point: DEFAULT_ENTRY_POINT.to_owned(),
        }
    }
}

impl KernelConfig {
    /// Loads the configured file, or picks `threshold` for binary glyphs and
    /// `intensity` for numeric ones.
    pub fn source(&self, glyphs: GlyphMode) -> Result<KernelSource> {
        match (&self.path, glyphs) {
            (Some(path), _) => KernelSource::load(path),
            (None, GlyphMode::Binary { .. }) => Ok(KernelSource::builtin_threshold()),
            (None, GlyphMode::Numeric { .. }) => Ok(KernelSource::builtin_intensity()),
        }
    }
}

/// Parameters of one offscreen run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub kernel: KernelConfig,
    pub glyphs: GlyphMode,
    pub canvas_format: CanvasFormat,
    pub gpu: GpuInit,
}

impl RunConfig {
    /// Intensity readout: built-in `intensity` kernel, values printed `width` wide.
    pub fn numeric(width: usize) -> Self {
        Self {
            glyphs: GlyphMode::Numeric { width },
            ..Self::default()
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Canvas-sized kernel output, row-major.
    pub values: Vec<u32>,
    /// Presented text of the occupied cells.
    pub text: String,
    /// Number of occupied cells.
    pub cell_count: usize,
}

/// Runs the whole pipeline on a fresh headless context.
///
/// Capacity and kernel validation happen before any GPU object is created.
pub fn run_offscreen(grid: &Grid, catalog: &ShapeCatalog, config: &RunConfig) -> Result<RunOutput> {
    let packed = pack_catalog(grid, catalog)?;
    let kernel = Kernel::build(
        config.kernel.source(config.glyphs)?,
        &config.kernel.entry_point,
        grid.workgroup_edge(),
    )?;

    let ctx = SharedContext::headless(&config.gpu)?;
    let output = run_with_context(&ctx, grid, &packed, &kernel, config);

    drop(ctx);
    log::debug!("context released");
    output
}

/// Runs one pass on an existing context.
///
/// GPU objects are released in order: reducer, canvas, outline meshes.
pub fn run_with_context(
    ctx: &SharedContext,
    grid: &Grid,
    packed: &[PackedShape],
    kernel: &Kernel,
    config: &RunConfig,
) -> Result<RunOutput> {
    log::info!(
        "running {} shapes on a {}x{} grid ({}x{} px)",
        packed.len(),
        grid.rows(),
        grid.cols(),
        grid.canvas_width(),
        grid.canvas_height()
    );

    let target = OffscreenTarget::allocate(ctx, grid, config.canvas_format)?;

    let mut renderer = OutlineRenderer::new();
    let rctx = RenderCtx::new(ctx.device(), ctx.queue(), target.format(), Orientation::Canvas);
    renderer.upload(&rctx, packed);

    let mut canvas = SharedCanvas::new(target);
    rasterize(ctx, &mut renderer, &canvas)?;

    let reducer = Reducer::build(ctx, grid, kernel)?;

    let lease = canvas.acquire(ctx)?;
    let reduced = reducer.run(ctx, &lease);
    lease.release()?;
    let values = reduced?;

    drop(reducer);
    drop(canvas);
    drop(renderer);
    log::debug!("reducer, canvas and meshes released");

    let text = render_cells(grid, &values, packed.len(), config.glyphs)?;
    Ok(RunOutput {
        values,
        text,
        cell_count: packed.len(),
    })
}
