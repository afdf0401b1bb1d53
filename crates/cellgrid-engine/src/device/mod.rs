//! Shared GPU context.
//!
//! This module is responsible for:
//! - abstracting native platform access behind `SharedSurfaceProvider`
//! - creating the wgpu Instance/Adapter/Device/Queue shared by render and compute
//! - the blocking finish point between pipeline stages

mod context;
mod init;
mod provider;

pub use context::SharedContext;
pub use init::GpuInit;
pub use provider::{HeadlessProvider, Platform, SharedSurfaceProvider, WindowProvider};
