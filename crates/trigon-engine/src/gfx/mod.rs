//! Graphics capability set.
//!
//! [`Gfx`] is the seam between the core (resource setup, frame loop, resize
//! reaction) and a concrete backend. The model is a small stateful pipeline:
//! objects are created, bound, then consumed by the next call, and a draw
//! uses whatever program and vertex array are current.
//!
//! `device::WgpuGfx` implements it on wgpu; `testing::RecordingGfx` records
//! the calls for tests.

mod layout;

pub use layout::{BufferUsage, ComponentType, Primitive, VertexAttribute};

use std::fmt::Debug;

use crate::coords::Viewport;
use crate::paint::Color;
use crate::shader::{BuildStatus, ShaderStage};

pub trait Gfx {
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;
    type Shader: Copy + Debug;
    type Program: Copy + Debug;

    /// Maps normalized device coordinates onto this framebuffer region.
    fn set_viewport(&mut self, viewport: Viewport);

    fn create_vertex_array(&mut self) -> Self::VertexArray;
    fn create_buffer(&mut self) -> Self::Buffer;

    /// Makes `vertex_array` current; attribute descriptions and draws use it.
    fn bind_vertex_array(&mut self, vertex_array: Self::VertexArray);

    /// Makes `buffer` the vertex-data target for uploads and attributes.
    fn bind_vertex_buffer(&mut self, buffer: Self::Buffer);

    /// Uploads `data` into the bound vertex buffer.
    fn upload_vertex_data(&mut self, data: &[u8], usage: BufferUsage);

    /// Enables `attribute` on the bound vertex array, sourcing it from the
    /// bound vertex buffer.
    fn enable_vertex_attribute(&mut self, attribute: VertexAttribute);

    /// Compiles a stage unit. Always yields a handle; query
    /// [`shader_status`](Gfx::shader_status) for the outcome.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Self::Shader;
    fn shader_status(&self, shader: Self::Shader) -> BuildStatus;

    /// Links a vertex and a fragment unit into a program. Always yields a
    /// handle; query [`program_status`](Gfx::program_status) for the outcome.
    fn link_program(&mut self, vertex: Self::Shader, fragment: Self::Shader) -> Self::Program;
    fn program_status(&self, program: Self::Program) -> BuildStatus;

    fn use_program(&mut self, program: Self::Program);

    /// Releases a stage unit. Programs already linked from it are unaffected.
    fn release_shader(&mut self, shader: Self::Shader);

    fn set_clear_color(&mut self, color: Color);

    /// Clears the color buffer to the current clear color.
    fn clear(&mut self);

    /// Draws `count` vertices starting at `first` from the current vertex
    /// array with the current program.
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}
