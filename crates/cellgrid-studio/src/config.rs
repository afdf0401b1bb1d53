use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cellgrid_engine::device::GpuInit;
use cellgrid_engine::preview::PreviewConfig;
use cellgrid_engine::render::CanvasFormat;
use cellgrid_engine::{KernelConfig, RunConfig};
use cellgrid_grid::{GlyphMode, GridConfig, ShapeCatalog};
use serde::{Deserialize, Serialize};
use winit::dpi::LogicalSize;

/// Environment variable naming the config file when no path argument is given.
pub const CONFIG_ENV: &str = "CELLGRID_CONFIG";

/// Command line: `cellgrid [--preview] [CONFIG]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub preview: bool,
    pub config_path: Option<PathBuf>,
}

impl Args {
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Args::default();
        for arg in args {
            match arg.as_str() {
                "--preview" => out.preview = true,
                flag if flag.starts_with("--") => bail!("unknown flag `{flag}`"),
                path => {
                    if out.config_path.is_some() {
                        bail!("more than one config path given");
                    }
                    out.config_path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(out)
    }

    /// Positional path first, then `CELLGRID_CONFIG`.
    pub fn resolve_config_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    Low,
    #[default]
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuSection {
    pub power_preference: PowerPreference,
    pub force_fallback_adapter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSection {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

impl Default for PreviewSection {
    fn default() -> Self {
        let defaults = PreviewConfig::default();
        Self {
            title: defaults.title,
            width: defaults.initial_size.width,
            height: defaults.initial_size.height,
        }
    }
}

/// Everything the studio reads from its JSON config file.
///
/// Every field is optional; an absent file means all defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub grid: GridConfig,
    pub kernel: KernelConfig,
    pub glyphs: GlyphMode,
    pub canvas_format: CanvasFormat,
    /// Replaces the built-in catalog: shapes → sub-paths → flat `(x, y, z)`.
    pub shapes: Option<Vec<Vec<Vec<f32>>>>,
    pub preview: PreviewSection,
    pub gpu: GpuSection,
    /// `env_logger` filter; overrides `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl StudioConfig {
    /// Reads `path`, or returns defaults when there is none.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reads and parses a config file.
    ///
    /// A relative kernel path is taken relative to the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        if let (Some(kernel), Some(dir)) = (config.kernel.path.as_mut(), path.parent()) {
            if kernel.is_relative() {
                *kernel = dir.join(&*kernel);
            }
        }
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse config JSON")
    }

    pub fn catalog(&self) -> Result<ShapeCatalog> {
        match &self.shapes {
            Some(raw) => ShapeCatalog::from_coords(raw.clone()).context("invalid shape list"),
            None => Ok(ShapeCatalog::builtin()),
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            power_preference: match self.gpu.power_preference {
                PowerPreference::Low => wgpu::PowerPreference::LowPower,
                PowerPreference::High => wgpu::PowerPreference::HighPerformance,
            },
            force_fallback_adapter: self.gpu.force_fallback_adapter,
            ..GpuInit::default()
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            kernel: self.kernel.clone(),
            glyphs: self.glyphs,
            canvas_format: self.canvas_format,
            gpu: self.gpu_init(),
        }
    }

    pub fn preview_config(&self) -> PreviewConfig {
        PreviewConfig {
            title: self.preview.title.clone(),
            initial_size: LogicalSize::new(self.preview.width, self.preview.height),
        }
    }
}
