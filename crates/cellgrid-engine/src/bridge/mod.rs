//! Zero-copy hand-off of the rendered canvas to the compute stage.
//!
//! The canvas texture never leaves GPU memory. What moves between the
//! rasterizer and the reducer is ownership: `acquire` and `release` are the
//! only transitions, and each one waits for the queue to drain so the two
//! domains never touch the texture at the same time.

mod shared;

pub use shared::{ComputeLease, Domain, Ownership, SharedCanvas};
