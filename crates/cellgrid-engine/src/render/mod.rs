//! Outline rasterization.
//!
//! The renderer draws packed shapes as closed line loops in a flat color,
//! either into the offscreen canvas (pipeline runs) or into a window surface
//! (preview).
//!
//! Convention:
//! - Vertices arrive already packed into canvas NDC; there is no transform.
//! - [`Orientation::Canvas`] flips y so canvas row 0 corresponds to NDC y = -1.

mod ctx;
mod offscreen;
mod outline;
mod target;

pub use ctx::{Orientation, RenderCtx, RenderTarget};
pub use offscreen::rasterize;
pub use outline::OutlineRenderer;
pub use target::{check_framebuffer, CanvasFormat, FramebufferStatus, OffscreenTarget, CANVAS_USAGES};
