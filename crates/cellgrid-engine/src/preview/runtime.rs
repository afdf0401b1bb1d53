use anyhow::{Context, Result};
use cellgrid_grid::{Grid, PackedShape};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::device::GpuInit;

use super::surface::PreviewGpu;

/// Preview window configuration.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: "cellgrid".to_string(),
            initial_size: LogicalSize::new(480.0, 960.0),
        }
    }
}

/// Entry point for the preview window.
pub struct Preview;

impl Preview {
    /// Opens the window and blocks until it is closed.
    pub fn run(
        grid: Grid,
        shapes: Vec<PackedShape>,
        config: PreviewConfig,
        gpu_init: GpuInit,
    ) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = PreviewState::new(grid, shapes, config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct PreviewWindow {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: PreviewGpu<'this>,
}

struct PreviewState {
    grid: Grid,
    shapes: Vec<PackedShape>,
    config: PreviewConfig,
    gpu_init: GpuInit,

    window: Option<PreviewWindow>,
    error: Option<anyhow::Error>,
}

impl PreviewState {
    fn new(grid: Grid, shapes: Vec<PackedShape>, config: PreviewConfig, gpu_init: GpuInit) -> Self {
        Self {
            grid,
            shapes,
            config,
            gpu_init,
            window: None,
            error: None,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<PreviewWindow> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        PreviewWindowTryBuilder {
            window,
            gpu_builder: |w| PreviewGpu::new(w, &self.gpu_init, &self.grid, &self.shapes),
        }
        .try_build()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        log::error!("preview failed: {e:#}");
        self.error = Some(e);
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for PreviewState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window(event_loop) {
            Ok(window) => {
                window.with_window(|w| w.request_redraw());
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(window) = &self.window {
            window.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("escape pressed, closing preview");
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                window.with_gpu_mut(|gpu| gpu.resize(new_size));
                window.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = window.with_window(|w| w.inner_size());
                window.with_gpu_mut(|gpu| gpu.resize(new_size));
                window.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = window.with_gpu_mut(|gpu| gpu.draw()) {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
