use crate::bridge::SharedCanvas;
use crate::device::SharedContext;
use crate::error::Result;

use super::{Orientation, OutlineRenderer, RenderCtx, RenderTarget};

/// Draws every uploaded outline into the shared canvas and waits for the GPU.
///
/// The canvas is cleared to transparent black first, so unlit pixels read 0.
/// Fails with an ownership error if compute currently holds the canvas.
pub fn rasterize(
    ctx: &SharedContext,
    renderer: &mut OutlineRenderer,
    canvas: &SharedCanvas,
) -> Result<()> {
    let view = canvas.render_view()?;
    let rctx = RenderCtx::new(ctx.device(), ctx.queue(), canvas.format(), Orientation::Canvas);

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cellgrid rasterize encoder"),
        });

    {
        let mut target = RenderTarget::new(&mut encoder, view);
        renderer.render(&rctx, &mut target, wgpu::Color::TRANSPARENT);
    }

    ctx.queue().submit(Some(encoder.finish()));
    ctx.finish()?;

    log::debug!("rasterized {} sub-paths", renderer.mesh_count());
    Ok(())
}
