//! `cellgrid [--preview] [CONFIG]`
//!
//! Packs the shape catalog into the grid, runs it through the GPU and prints
//! the per-cell text to stdout. With `--preview` the outlines are shown in a
//! window instead.

mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use cellgrid_engine::logging::{init_logging, LoggingConfig};
use cellgrid_engine::preview::Preview;
use cellgrid_engine::run_offscreen;
use cellgrid_grid::pack_catalog;

use crate::config::{Args, StudioConfig};

fn main() -> ExitCode {
    let loaded = Args::parse(std::env::args().skip(1)).and_then(|args| {
        let path = args.resolve_config_path();
        let config = StudioConfig::load_from(path.as_deref())?;
        Ok((args, config))
    });

    let env_filter = loaded.as_ref().ok().and_then(|(_, c)| c.log_filter.clone());
    init_logging(LoggingConfig {
        env_filter,
        ..Default::default()
    });

    match loaded.and_then(|(args, config)| run(&config, args.preview)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &StudioConfig, preview: bool) -> Result<()> {
    let grid = config.grid.build().context("invalid grid configuration")?;
    let catalog = config.catalog()?;

    if preview {
        let packed = pack_catalog(&grid, &catalog)?;
        log::info!("previewing {} shapes", packed.len());
        return Preview::run(grid, packed, config.preview_config(), config.gpu_init());
    }

    let output = run_offscreen(&grid, &catalog, &config.run_config())?;
    log::info!("rendered {} cells", output.cell_count);
    print!("{}", output.text);
    Ok(())
}
