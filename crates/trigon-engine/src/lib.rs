//! Trigon engine crate.
//!
//! Window + context creation, the stateful graphics capability set and its
//! wgpu backend, and the frame loop the sample programs share.

pub mod core;
pub mod device;
pub mod gfx;
pub mod shader;
pub mod window;
pub mod input;

pub mod logging;
pub mod coords;
pub mod paint;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
