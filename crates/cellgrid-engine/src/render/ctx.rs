/// Row order of the render target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Offscreen canvas read back row-major: row 0 holds NDC y = -1.
    Canvas,
    /// Window surface: NDC y = -1 at the bottom of the screen.
    Screen,
}

/// Renderer-facing context (device/queue + target format + row order).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
    pub orientation: Orientation,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target_format: wgpu::TextureFormat,
        orientation: Orientation,
    ) -> Self {
        Self {
            device,
            queue,
            target_format,
            orientation,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// Optional `[x, y, width, height]` viewport in target pixels; `None` = whole target.
    pub viewport: Option<[f32; 4]>,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self {
            encoder,
            color_view,
            viewport: None,
        }
    }

    #[inline]
    pub fn with_viewport(mut self, viewport: [f32; 4]) -> Self {
        self.viewport = Some(viewport);
        self
    }
}
