//! Test doubles for the graphics capability set and the context provider.
//!
//! `RecordingGfx` logs every call into a shared [`CallLog`]; `ScriptedContext`
//! replays a fixed script of window events (key presses, resizes, a close
//! button) and logs its own calls into the same log, so tests can assert on
//! the exact interleaving after the context has been consumed.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::core::{ContextProvider, ResizeHandler};
use crate::gfx::{BufferUsage, Gfx, Primitive, VertexAttribute};
use crate::input::Key;
use crate::paint::Color;
use crate::shader::{BuildStatus, InfoLog, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetViewport(Viewport),
    CreateVertexArray(u32),
    CreateBuffer(u32),
    BindVertexArray(u32),
    BindVertexBuffer(u32),
    UploadVertexData { bytes: Vec<u8>, usage: BufferUsage },
    EnableVertexAttribute(VertexAttribute),
    CompileShader { id: u32, stage: ShaderStage },
    LinkProgram { id: u32, vertex: u32, fragment: u32 },
    UseProgram(u32),
    ReleaseShader(u32),
    SetClearColor(Color),
    Clear,
    DrawArrays { primitive: Primitive, first: u32, count: u32 },

    RequestClose,
    SwapBuffers,
    PollEvents,
    Terminate,
}

/// Shared, append-only call log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn draws(&self) -> Vec<(Primitive, u32, u32)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::DrawArrays { primitive, first, count } => Some((*primitive, *first, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::SetViewport(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn clear_colors(&self) -> Vec<Color> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::SetClearColor(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    /// Every upload, decoded back into floats.
    pub fn uploads(&self) -> Vec<(Vec<f32>, BufferUsage)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::UploadVertexData { bytes, usage } => Some((
                    bytes
                        .chunks_exact(4)
                        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                        .collect(),
                    *usage,
                )),
                _ => None,
            })
            .collect()
    }

    /// Number of completed frames, counted by swaps.
    pub fn frames(&self) -> usize {
        self.count(|c| *c == Call::SwapBuffers)
    }
}

/// [`Gfx`] that records calls and simulates compile/link outcomes.
///
/// A stage listed with [`failing_compile`](Self::failing_compile) fails to
/// compile; a program fails to link when either unit failed or when
/// [`failing_link`](Self::failing_link) was set.
#[derive(Debug, Default)]
pub struct RecordingGfx {
    log: CallLog,
    next_id: u32,
    failing_stages: HashSet<ShaderStage>,
    failing_link: bool,
    shaders: Vec<(u32, BuildStatus)>,
    programs: Vec<(u32, BuildStatus)>,
}

impl RecordingGfx {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing_compile(mut self, stage: ShaderStage) -> Self {
        self.failing_stages.insert(stage);
        self
    }

    pub fn failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn lookup(list: &[(u32, BuildStatus)], id: u32) -> BuildStatus {
        list.iter()
            .find(|(i, _)| *i == id)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| BuildStatus::Failed(InfoLog::new(format!("no object {id}"))))
    }
}

impl Gfx for RecordingGfx {
    type Buffer = u32;
    type VertexArray = u32;
    type Shader = u32;
    type Program = u32;

    fn set_viewport(&mut self, viewport: Viewport) {
        self.log.push(Call::SetViewport(viewport));
    }

    fn create_vertex_array(&mut self) -> u32 {
        let id = self.next();
        self.log.push(Call::CreateVertexArray(id));
        id
    }

    fn create_buffer(&mut self) -> u32 {
        let id = self.next();
        self.log.push(Call::CreateBuffer(id));
        id
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        self.log.push(Call::BindVertexArray(vertex_array));
    }

    fn bind_vertex_buffer(&mut self, buffer: u32) {
        self.log.push(Call::BindVertexBuffer(buffer));
    }

    fn upload_vertex_data(&mut self, data: &[u8], usage: BufferUsage) {
        self.log.push(Call::UploadVertexData {
            bytes: data.to_vec(),
            usage,
        });
    }

    fn enable_vertex_attribute(&mut self, attribute: VertexAttribute) {
        self.log.push(Call::EnableVertexAttribute(attribute));
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> u32 {
        let id = self.next();
        let status = if self.failing_stages.contains(&stage) {
            BuildStatus::Failed(InfoLog::new(format!("0:1(1): error: scripted {stage} failure")))
        } else {
            BuildStatus::Success
        };
        self.shaders.push((id, status));
        self.log.push(Call::CompileShader { id, stage });
        id
    }

    fn shader_status(&self, shader: u32) -> BuildStatus {
        Self::lookup(&self.shaders, shader)
    }

    fn link_program(&mut self, vertex: u32, fragment: u32) -> u32 {
        let id = self.next();
        let units_ok = self.shader_status(vertex).is_success() && self.shader_status(fragment).is_success();
        let status = if units_ok && !self.failing_link {
            BuildStatus::Success
        } else {
            BuildStatus::Failed(InfoLog::new("error: scripted link failure"))
        };
        self.programs.push((id, status));
        self.log.push(Call::LinkProgram { id, vertex, fragment });
        id
    }

    fn program_status(&self, program: u32) -> BuildStatus {
        Self::lookup(&self.programs, program)
    }

    fn use_program(&mut self, program: u32) {
        self.log.push(Call::UseProgram(program));
    }

    fn release_shader(&mut self, shader: u32) {
        self.log.push(Call::ReleaseShader(shader));
    }

    fn set_clear_color(&mut self, color: Color) {
        self.log.push(Call::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.log.push(Call::Clear);
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.log.push(Call::DrawArrays {
            primitive,
            first,
            count,
        });
    }
}

/// Upper bound on polls before a [`ScriptedContext`] reports close-requested.
pub const MAX_POLLS: u64 = 1_000;

/// [`ContextProvider`] driven by a fixed event script.
///
/// Events are keyed by poll number: the first `poll_events` call is poll 1.
/// Unless closed earlier, the context reports close-requested after
/// [`MAX_POLLS`] polls so a broken loop cannot spin forever.
pub struct ScriptedContext {
    gfx: RecordingGfx,
    log: CallLog,
    size: (u32, u32),
    polls: u64,
    close_requested: bool,
    close_at: Option<u64>,
    key_press_at: Vec<(Key, u64)>,
    key_release_at: Vec<(Key, u64)>,
    resize_at: Vec<(u64, u32, u32)>,
    keys_down: HashSet<Key>,
    handler: Option<Box<dyn ResizeHandler<RecordingGfx>>>,
}

impl ScriptedContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_gfx(width, height, RecordingGfx::default())
    }

    pub fn with_gfx(width: u32, height: u32, gfx: RecordingGfx) -> Self {
        let log = gfx.log();
        Self {
            gfx,
            log,
            size: (width, height),
            polls: 0,
            close_requested: false,
            close_at: None,
            key_press_at: Vec::new(),
            key_release_at: Vec::new(),
            resize_at: Vec::new(),
            keys_down: HashSet::new(),
            handler: None,
        }
    }

    /// The window's close button is pressed during poll `poll`.
    pub fn close_at(mut self, poll: u64) -> Self {
        self.close_at = Some(poll);
        self
    }

    /// `key` goes down during poll `poll` and stays down.
    pub fn press_at(mut self, key: Key, poll: u64) -> Self {
        self.key_press_at.push((key, poll));
        self
    }

    pub fn release_at(mut self, key: Key, poll: u64) -> Self {
        self.key_release_at.push((key, poll));
        self
    }

    /// The framebuffer becomes `width` x `height` during poll `poll`.
    pub fn resize_at(mut self, poll: u64, width: u32, height: u32) -> Self {
        self.resize_at.push((poll, width, height));
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl ContextProvider for ScriptedContext {
    type Gfx = RecordingGfx;

    fn gfx(&mut self) -> &mut RecordingGfx {
        &mut self.gfx
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_resize_handler(&mut self, handler: Box<dyn ResizeHandler<RecordingGfx>>) {
        self.handler = Some(handler);
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn request_close(&mut self) {
        self.log.push(Call::RequestClose);
        self.close_requested = true;
    }

    fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn swap_buffers(&mut self) {
        self.log.push(Call::SwapBuffers);
    }

    fn poll_events(&mut self) {
        self.polls += 1;
        let poll = self.polls;
        self.log.push(Call::PollEvents);

        for (key, _) in self.key_press_at.iter().filter(|(_, at)| *at == poll) {
            self.keys_down.insert(*key);
        }
        for (key, _) in self.key_release_at.iter().filter(|(_, at)| *at == poll) {
            self.keys_down.remove(key);
        }

        let resizes: Vec<(u32, u32)> = self
            .resize_at
            .iter()
            .filter(|(at, _, _)| *at == poll)
            .map(|(_, w, h)| (*w, *h))
            .collect();
        for (w, h) in resizes {
            self.size = (w, h);
            if let Some(handler) = self.handler.as_mut() {
                handler.on_framebuffer_resize(&mut self.gfx, w, h);
            }
        }

        if self.close_at == Some(poll) || poll >= MAX_POLLS {
            self.close_requested = true;
        }
    }

    fn terminate(self) {
        self.log.push(Call::Terminate);
    }
}
