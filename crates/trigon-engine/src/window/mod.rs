//! Native window + rendering context.
//!
//! `WinitContext` owns the `winit` EventLoop and Window and the wgpu-backed
//! graphics state, and exposes them through [`ContextProvider`](crate::core::ContextProvider).

mod config;
mod runtime;

pub use config::{ContextHints, WindowConfig};
pub use runtime::WinitContext;
