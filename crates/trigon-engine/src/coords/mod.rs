//! Framebuffer coordinate types.
//!
//! Pixel space, origin top-left. Vertex data itself lives in normalized
//! device coordinates and never passes through here.

mod viewport;

pub use viewport::Viewport;
