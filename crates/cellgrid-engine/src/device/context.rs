use super::{GpuInit, Platform, SharedSurfaceProvider};
use crate::error::{PipelineError, Result};

/// One wgpu device + queue shared by the rasterizer and the compute reducer.
///
/// Both stages record into the same queue, so the rendered texture can be
/// bound by the kernel without leaving GPU memory.
///
/// Field order is drop order: queue and device go before adapter and instance.
pub struct SharedContext {
    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    // Held only to fix its drop position.
    _instance: wgpu::Instance,
    platform: Platform,
}

impl SharedContext {
    /// Creates the context (and the provider's surface, if it has one).
    ///
    /// Fails with [`PipelineError::UnsupportedPlatform`] when the provider has
    /// no bridge for the platform or the adapter cannot run compute shaders.
    pub async fn new<'w, P>(
        provider: &P,
        init: &GpuInit,
    ) -> Result<(Self, Option<wgpu::Surface<'w>>)>
    where
        P: SharedSurfaceProvider<'w>,
    {
        let platform = provider.platform()?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let surface = provider.create_surface(&instance)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .map_err(|e| PipelineError::Init(format!("failed to find a suitable GPU adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!(
            "adapter: {} ({:?}, {:?}) on {:?}",
            info.name,
            info.backend,
            info.device_type,
            platform
        );

        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
            return Err(PipelineError::UnsupportedPlatform(format!(
                "adapter {} has no compute shader support",
                info.name
            )));
        }

        let required_limits = init.required_limits.clone().unwrap_or_else(|| {
            wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits())
        });

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cellgrid device"),
                required_features: init.required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| PipelineError::Init(format!("failed to create wgpu device/queue: {e}")))?;

        Ok((
            Self {
                queue,
                device,
                adapter,
                _instance: instance,
                platform,
            },
            surface,
        ))
    }

    /// Blocking wrapper around [`SharedContext::new`] for offscreen use.
    pub fn headless(init: &GpuInit) -> Result<Self> {
        let (ctx, _) = pollster::block_on(Self::new(&super::HeadlessProvider, init))?;
        Ok(ctx)
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    #[inline]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Limits granted to the device.
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Blocks until every submitted command buffer has completed.
    ///
    /// This is the pipeline's full flush/finish point.
    pub fn finish(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map(|_| ())
            .map_err(|e| PipelineError::Device(e.to_string()))
    }
}
