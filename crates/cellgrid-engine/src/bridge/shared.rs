use crate::device::SharedContext;
use crate::error::{PipelineError, Result};
use crate::render::OffscreenTarget;

/// Which pipeline stage currently owns the shared canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Domain {
    Graphics,
    Compute,
}

/// Two-state ownership machine. Starts in [`Domain::Graphics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    domain: Domain,
}

impl Default for Ownership {
    fn default() -> Self {
        Self {
            domain: Domain::Graphics,
        }
    }
}

impl Ownership {
    #[inline]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Graphics → Compute.
    pub fn acquire(&mut self) -> Result<()> {
        self.transition(Domain::Graphics, Domain::Compute)
    }

    /// Compute → Graphics.
    pub fn release(&mut self) -> Result<()> {
        self.transition(Domain::Compute, Domain::Graphics)
    }

    /// Fails unless the current owner is `expected`.
    pub fn require(&self, expected: Domain) -> Result<()> {
        if self.domain != expected {
            return Err(PipelineError::Ownership {
                expected,
                actual: self.domain,
            });
        }
        Ok(())
    }

    fn transition(&mut self, from: Domain, to: Domain) -> Result<()> {
        self.require(from)?;
        self.domain = to;
        Ok(())
    }
}

/// The rendered canvas plus its ownership state.
pub struct SharedCanvas {
    target: OffscreenTarget,
    ownership: Ownership,
}

impl SharedCanvas {
    pub fn new(target: OffscreenTarget) -> Self {
        Self {
            target,
            ownership: Ownership::default(),
        }
    }

    #[inline]
    pub fn domain(&self) -> Domain {
        self.ownership.domain()
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.target.format()
    }

    /// Color attachment view; only available while graphics owns the canvas.
    pub fn render_view(&self) -> Result<&wgpu::TextureView> {
        self.ownership.require(Domain::Graphics)?;
        Ok(self.target.view())
    }

    /// Hands the canvas to the compute stage.
    ///
    /// Blocks until all queued graphics work has completed, then returns a
    /// lease that releases the canvas back to graphics when dropped.
    pub fn acquire<'a>(&'a mut self, ctx: &'a SharedContext) -> Result<ComputeLease<'a>> {
        self.ownership.require(Domain::Graphics)?;
        ctx.finish()?;
        self.ownership.acquire()?;
        log::debug!("canvas acquired by compute");

        Ok(ComputeLease {
            canvas: self,
            ctx,
            released: false,
        })
    }
}

/// Scoped compute ownership of a [`SharedCanvas`].
///
/// Release runs on [`ComputeLease::release`] or on drop, whichever comes
/// first, including when the dispatch in between failed.
pub struct ComputeLease<'a> {
    canvas: &'a mut SharedCanvas,
    ctx: &'a SharedContext,
    released: bool,
}

impl ComputeLease<'_> {
    /// Read-only view of the canvas for kernel binding.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        self.canvas.target.view()
    }

    /// Releases explicitly, surfacing any device error from the final wait.
    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        // Ownership returns to graphics even if the wait fails.
        let waited = self.ctx.finish();
        self.canvas.ownership.release()?;
        log::debug!("canvas released to graphics");
        waited
    }
}

impl Drop for ComputeLease<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            log::error!("releasing canvas failed: {e}");
        }
    }
}
