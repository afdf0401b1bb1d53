use raw_window_handle::{HasDisplayHandle, RawDisplayHandle};
use winit::window::Window;

use crate::error::{PipelineError, Result};

/// Native platform family the shared context is built on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Platform {
    /// No window; the canvas only lives offscreen.
    Headless,
    X11,
    Wayland,
    Windows,
    MacOs,
    Ios,
    Android,
}

/// Capability interface for building a graphics/compute context that both
/// stages can share.
///
/// Implementations expose only what the buffer bridge needs: which native
/// platform they sit on, and (for windowed use) a presentation surface. A
/// platform without an implementation is reported as
/// [`PipelineError::UnsupportedPlatform`].
pub trait SharedSurfaceProvider<'w> {
    fn platform(&self) -> Result<Platform>;

    /// Creates the presentation surface, or `None` for offscreen-only providers.
    fn create_surface(&self, instance: &wgpu::Instance) -> Result<Option<wgpu::Surface<'w>>>;
}

/// Offscreen provider: no window, no surface.
#[derive(Debug, Default, Copy, Clone)]
pub struct HeadlessProvider;

impl<'w> SharedSurfaceProvider<'w> for HeadlessProvider {
    fn platform(&self) -> Result<Platform> {
        Ok(Platform::Headless)
    }

    fn create_surface(&self, _instance: &wgpu::Instance) -> Result<Option<wgpu::Surface<'w>>> {
        Ok(None)
    }
}

/// Provider backed by a `winit` window; the surface borrows the window.
pub struct WindowProvider<'w> {
    window: &'w Window,
}

impl<'w> WindowProvider<'w> {
    pub fn new(window: &'w Window) -> Self {
        Self { window }
    }
}

impl<'w> SharedSurfaceProvider<'w> for WindowProvider<'w> {
    fn platform(&self) -> Result<Platform> {
        let handle = self
            .window
            .display_handle()
            .map_err(|e| PipelineError::UnsupportedPlatform(format!("no display handle: {e}")))?;
        platform_of(handle.as_raw())
    }

    fn create_surface(&self, instance: &wgpu::Instance) -> Result<Option<wgpu::Surface<'w>>> {
        instance
            .create_surface(self.window)
            .map(Some)
            .map_err(|e| PipelineError::Init(format!("failed to create wgpu surface: {e}")))
    }
}

/// Maps a native display handle to a supported platform.
pub(crate) fn platform_of(raw: RawDisplayHandle) -> Result<Platform> {
    match raw {
        RawDisplayHandle::Xlib(_) | RawDisplayHandle::Xcb(_) => Ok(Platform::X11),
        RawDisplayHandle::Wayland(_) => Ok(Platform::Wayland),
        RawDisplayHandle::Windows(_) => Ok(Platform::Windows),
        RawDisplayHandle::AppKit(_) => Ok(Platform::MacOs),
        RawDisplayHandle::UiKit(_) => Ok(Platform::Ios),
        RawDisplayHandle::Android(_) => Ok(Platform::Android),
        // The pipeline blocks on read-back, which the web backends cannot do.
        other => Err(PipelineError::UnsupportedPlatform(format!(
            "no shared context bridge for display handle {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use raw_window_handle::{
        AppKitDisplayHandle, OrbitalDisplayHandle, WebDisplayHandle, WindowsDisplayHandle,
        XlibDisplayHandle,
    };

    use super::*;

    #[test]
    fn headless_has_no_surface_requirement() {
        assert_eq!(HeadlessProvider.platform().unwrap(), Platform::Headless);
    }

    #[test]
    fn desktop_handles_are_supported() {
        let xlib = RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0));
        assert_eq!(platform_of(xlib).unwrap(), Platform::X11);

        let win = RawDisplayHandle::Windows(WindowsDisplayHandle::new());
        assert_eq!(platform_of(win).unwrap(), Platform::Windows);

        let mac = RawDisplayHandle::AppKit(AppKitDisplayHandle::new());
        assert_eq!(platform_of(mac).unwrap(), Platform::MacOs);
    }

    #[test]
    fn unbridged_handles_are_rejected() {
        let web = RawDisplayHandle::Web(WebDisplayHandle::new());
        assert!(matches!(
            platform_of(web),
            Err(PipelineError::UnsupportedPlatform(_))
        ));

        let orbital = RawDisplayHandle::Orbital(OrbitalDisplayHandle::new());
        assert!(platform_of(orbital).is_err());
    }
}
