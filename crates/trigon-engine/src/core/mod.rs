//! Program skeleton shared by every sample.
//!
//! A program is an [`App`] plus a [`FrameConfig`]. [`launch`] creates the
//! native context and hands it to [`run`], which wires the viewport resize
//! reaction, builds resources once and drives the [`FrameLoop`] until the
//! context reports close-requested.

mod app;
mod context;
mod frame_loop;
mod launch;
mod resources;

pub use app::App;
pub use context::{ContextProvider, ResizeHandler, ViewportResizer};
pub use frame_loop::{FrameConfig, FrameLoop, LoopState};
pub use launch::{launch, run, LaunchConfig, LaunchError};
pub use resources::{GpuResourceSet, MeshDesc, ResourceError, ShaderFailurePolicy, ShaderSources, ShaderStep};
