//! GPU device + surface management.
//!
//! `Gpu` owns the wgpu device and the window's swapchain; `WgpuGfx` layers the
//! stateful graphics capability set on top of it.

mod backend;
mod context;
mod init;
mod surface;

pub use backend::{BufferId, ProgramId, ShaderId, VertexArrayId, WgpuGfx};
pub use context::Gpu;
pub use init::{GpuInit, SurfaceEncoding};
pub use surface::SurfaceErrorAction;
