use cellgrid_grid::Grid;
use serde::{Deserialize, Serialize};

use crate::device::SharedContext;
use crate::error::{PipelineError, Result};

/// Pixel format of the offscreen canvas.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasFormat {
    /// Single channel; the kernel reads `.r`.
    R8,
    /// RGBA, reduced to the red channel by the kernel.
    #[default]
    Rgba8,
}

impl CanvasFormat {
    #[inline]
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            CanvasFormat::R8 => wgpu::TextureFormat::R8Unorm,
            CanvasFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Usages the canvas needs: drawn by the rasterizer, read by the kernel.
pub const CANVAS_USAGES: wgpu::TextureUsages =
    wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::TEXTURE_BINDING);

/// Result of validating an offscreen target before any draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Renderable, but the compute stage cannot bind this format. Recoverable
    /// by falling back to `Rgba8Unorm`.
    Unsupported(String),
    /// Cannot be used at all.
    Incomplete(String),
}

/// Classifies a `width × height` target of `format` against device limits
/// and the adapter's allowed usages for that format.
pub fn check_framebuffer(
    width: u32,
    height: u32,
    max_dimension: u32,
    format: wgpu::TextureFormat,
    allowed: wgpu::TextureUsages,
) -> FramebufferStatus {
    if width == 0 || height == 0 {
        return FramebufferStatus::Incomplete(format!("zero-sized canvas {width}x{height}"));
    }
    if width > max_dimension || height > max_dimension {
        return FramebufferStatus::Incomplete(format!(
            "canvas {width}x{height} exceeds the device maximum of {max_dimension}"
        ));
    }
    if !allowed.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        return FramebufferStatus::Incomplete(format!("{format:?} is not renderable"));
    }
    if !allowed.contains(wgpu::TextureUsages::TEXTURE_BINDING) {
        return FramebufferStatus::Unsupported(format!(
            "{format:?} cannot be bound for compute reads"
        ));
    }
    FramebufferStatus::Complete
}

/// Offscreen color target sized exactly to the packed canvas.
pub struct OffscreenTarget {
    view: wgpu::TextureView,
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
}

impl OffscreenTarget {
    /// Validates and allocates the canvas texture.
    ///
    /// An unsupported format is logged and replaced by `Rgba8Unorm`; an
    /// incomplete target aborts with [`PipelineError::FramebufferIncomplete`].
    pub fn allocate(ctx: &SharedContext, grid: &Grid, requested: CanvasFormat) -> Result<Self> {
        let (width, height) = (grid.canvas_width(), grid.canvas_height());
        let max_dimension = ctx.limits().max_texture_dimension_2d;

        let status_of = |format: wgpu::TextureFormat| {
            let allowed = ctx.adapter().get_texture_format_features(format).allowed_usages;
            check_framebuffer(width, height, max_dimension, format, allowed)
        };

        let mut format = requested.texture_format();
        match status_of(format) {
            FramebufferStatus::Complete => {}
            FramebufferStatus::Incomplete(reason) => {
                return Err(PipelineError::FramebufferIncomplete(reason));
            }
            FramebufferStatus::Unsupported(reason) => {
                log::warn!("framebuffer unsupported ({reason}); falling back to Rgba8Unorm");
                format = wgpu::TextureFormat::Rgba8Unorm;
                if let FramebufferStatus::Incomplete(reason) | FramebufferStatus::Unsupported(reason) =
                    status_of(format)
                {
                    return Err(PipelineError::FramebufferIncomplete(reason));
                }
            }
        }

        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("cellgrid canvas"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: CANVAS_USAGES,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("allocated {width}x{height} {format:?} canvas");

        Ok(Self {
            view,
            texture,
            format,
        })
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FMT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    #[test]
    fn complete_when_renderable_and_bindable() {
        assert_eq!(
            check_framebuffer(960, 1920, 8192, FMT, CANVAS_USAGES),
            FramebufferStatus::Complete
        );
    }

    #[test]
    fn zero_extent_is_incomplete() {
        assert!(matches!(
            check_framebuffer(0, 8, 8192, FMT, CANVAS_USAGES),
            FramebufferStatus::Incomplete(_)
        ));
    }

    #[test]
    fn oversized_canvas_is_incomplete() {
        assert!(matches!(
            check_framebuffer(4096, 16, 2048, FMT, CANVAS_USAGES),
            FramebufferStatus::Incomplete(_)
        ));
    }

    #[test]
    fn non_renderable_format_is_incomplete() {
        let allowed = wgpu::TextureUsages::TEXTURE_BINDING;
        assert!(matches!(
            check_framebuffer(8, 8, 8192, FMT, allowed),
            FramebufferStatus::Incomplete(_)
        ));
    }

    #[test]
    fn render_only_format_is_unsupported() {
        let allowed = wgpu::TextureUsages::RENDER_ATTACHMENT;
        assert!(matches!(
            check_framebuffer(8, 8, 8192, FMT, allowed),
            FramebufferStatus::Unsupported(_)
        ));
    }

    #[test]
    fn canvas_needs_no_copy_usage() {
        assert!(!CANVAS_USAGES.contains(wgpu::TextureUsages::COPY_SRC));
        assert_eq!(
            check_framebuffer(8, 8, 8192, FMT, CANVAS_USAGES),
            FramebufferStatus::Complete
        );
    }

    #[test]
    fn canvas_format_maps_to_texture_format() {
        assert_eq!(CanvasFormat::R8.texture_format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(CanvasFormat::default().texture_format(), FMT);
    }
}
