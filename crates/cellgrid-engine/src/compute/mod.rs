//! Compute reduction of the shared canvas.
//!
//! A kernel is WGSL with one compute entry point and two bindings in group 0:
//!
//! | binding | type                                   | meaning              |
//! |---------|----------------------------------------|----------------------|
//! | 0       | `texture_2d<f32>`                      | the rendered canvas  |
//! | 1       | `var<storage, read_write> array<u32>`  | one value per pixel  |
//!
//! The work-group is either fixed at `E×E×1` or driven by `override WG_X` and
//! `override WG_Y`, which the reducer sets to `E`.

mod kernel;
mod reducer;

pub use kernel::{Kernel, KernelSource, DEFAULT_ENTRY_POINT};
pub use reducer::{dispatch_extent, Reducer};
