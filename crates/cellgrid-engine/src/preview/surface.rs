use anyhow::{Context, Result};
use cellgrid_grid::{Grid, PackedShape};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{GpuInit, SharedContext, WindowProvider};
use crate::render::{Orientation, OutlineRenderer, RenderCtx, RenderTarget};

/// Largest viewport with the canvas aspect ratio that fits the surface,
/// anchored at the bottom-left corner. Returns `[x, y, width, height]`.
pub fn letterbox(canvas: (u32, u32), surface: (u32, u32)) -> [f32; 4] {
    let (cw, ch) = (canvas.0.max(1) as f32, canvas.1.max(1) as f32);
    let (sw, sh) = (surface.0 as f32, surface.1 as f32);

    let scale = (sw / cw).min(sh / ch);
    let (w, h) = (cw * scale, ch * scale);
    [0.0, sh - h, w, h]
}

/// Window-bound GPU state. Field order is drop order.
pub(crate) struct PreviewGpu<'w> {
    renderer: OutlineRenderer,
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    canvas: (u32, u32),
    ctx: SharedContext,
}

impl<'w> PreviewGpu<'w> {
    pub(crate) fn new(
        window: &'w Window,
        init: &GpuInit,
        grid: &Grid,
        shapes: &[PackedShape],
    ) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let provider = WindowProvider::new(window);
        let (ctx, surface) = pollster::block_on(SharedContext::new(&provider, init))
            .context("GPU initialization failed for preview window")?;
        let surface = surface.context("window provider returned no surface")?;

        let caps = surface.get_capabilities(ctx.adapter());
        let format = choose_surface_format(&caps).context("no supported surface formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(ctx.device(), &config);

        let mut renderer = OutlineRenderer::new();
        let rctx = RenderCtx::new(ctx.device(), ctx.queue(), format, Orientation::Screen);
        renderer.upload(&rctx, shapes);

        Ok(Self {
            renderer,
            surface,
            config,
            size,
            canvas: (grid.canvas_width(), grid.canvas_height()),
            ctx,
        })
    }

    /// Zero-sized surfaces cannot be configured; the resize is deferred.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.ctx.device(), &self.config);
    }

    /// Draws one frame. Only out-of-memory is fatal; other surface errors skip it.
    pub(crate) fn draw(&mut self) -> Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(());
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(self.ctx.device(), &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                anyhow::bail!("surface out of memory");
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return Ok(());
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cellgrid preview encoder"),
            });

        let rctx = RenderCtx::new(
            self.ctx.device(),
            self.ctx.queue(),
            self.config.format,
            Orientation::Screen,
        );
        let viewport = letterbox(self.canvas, (self.config.width, self.config.height));
        {
            let mut target = RenderTarget::new(&mut encoder, &view).with_viewport(viewport);
            self.renderer.render(&rctx, &mut target, wgpu::Color::BLACK);
        }

        self.ctx.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    preferred
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.first().copied())
}
