/// Initialization parameters for the shared GPU context.
///
/// Add fields only when a concrete adapter or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Force a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// The pipeline itself needs none; keep empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the device.
    ///
    /// `None` requests downlevel defaults raised to the adapter's texture
    /// resolution, which covers large canvases on modest hardware.
    pub required_limits: Option<wgpu::Limits>,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: None,
        }
    }
}
