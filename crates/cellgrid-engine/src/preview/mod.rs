//! On-screen preview of the packed outlines.
//!
//! Draws the same geometry the offscreen run rasterizes, into a window,
//! redrawing continuously until Escape or close. No reduction happens here.

mod runtime;
mod surface;

pub use runtime::{Preview, PreviewConfig};
pub use surface::letterbox;
