use std::collections::HashMap;
use std::ops::Range;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::gfx::{BufferUsage, Gfx, Primitive, VertexAttribute};
use crate::paint::Color;
use crate::shader::{self, BuildStatus, CompiledUnit, InfoLog, LinkedStages, ShaderStage, StageInput};

use super::{Gpu, SurfaceErrorAction};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexArrayId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u32);

struct ShaderObject {
    status: BuildStatus,
    unit: Option<CompiledUnit>,
    module: Option<wgpu::ShaderModule>,
}

struct LinkedProgram {
    stages: LinkedStages,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

struct ProgramObject {
    status: BuildStatus,
    linked: Option<LinkedProgram>,
}

#[derive(Default)]
struct VertexArrayObject {
    /// Enabled attributes with the buffer that was bound when each was described.
    attributes: Vec<(VertexAttribute, BufferId)>,
}

/// One vertex buffer slot of a pipeline.
struct BufferSlot {
    buffer: BufferId,
    stride: u64,
    attributes: Vec<wgpu::VertexAttribute>,
}

/// A draw as recorded, with the state that was current at the call.
#[derive(Debug, Copy, Clone)]
struct DrawCall {
    program: Option<ProgramId>,
    vertex_array: Option<VertexArrayId>,
    primitive: Primitive,
    first: u32,
    count: u32,
    viewport: Viewport,
}

/// A draw resolved to GPU objects, ready to encode.
struct PreparedDraw {
    pipeline: wgpu::RenderPipeline,
    buffers: Vec<wgpu::Buffer>,
    viewport: (f32, f32, f32, f32),
    vertices: Range<u32>,
}

type PipelineKey = (ProgramId, VertexArrayId, Primitive);

/// [`Gfx`] on top of wgpu.
///
/// Binding state lives on the CPU side. Clears and draws are recorded during
/// the frame and encoded into a single render pass by [`present`](Self::present).
/// Render pipelines are built lazily per (program, vertex array, primitive)
/// and cached; a combination that cannot be built is remembered and skipped.
pub struct WgpuGfx {
    gpu: Gpu,

    buffers: Vec<Option<wgpu::Buffer>>,
    vertex_arrays: Vec<VertexArrayObject>,
    shaders: Vec<Option<ShaderObject>>,
    programs: Vec<ProgramObject>,
    pipelines: HashMap<PipelineKey, Option<wgpu::RenderPipeline>>,

    bound_vertex_array: Option<VertexArrayId>,
    bound_buffer: Option<BufferId>,
    current_program: Option<ProgramId>,

    viewport: Viewport,
    clear_color: Color,

    pending_clear: Option<Color>,
    pending_draws: Vec<DrawCall>,

    warned_skipped_draw: bool,
}

impl WgpuGfx {
    pub fn new(gpu: Gpu) -> Self {
        let size = gpu.size();
        Self {
            gpu,
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            shaders: Vec::new(),
            programs: Vec::new(),
            pipelines: HashMap::new(),
            bound_vertex_array: None,
            bound_buffer: None,
            current_program: None,
            viewport: Viewport::from_size(size.width, size.height),
            clear_color: Color::BLACK,
            pending_clear: None,
            pending_draws: Vec::new(),
            warned_skipped_draw: false,
        }
    }

    /// Current drawable size (physical pixels).
    pub fn surface_size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    /// Reconfigures the swapchain. The viewport is left alone.
    pub fn resize_surface(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Encodes the recorded clear and draws into one pass and presents it.
    ///
    /// A frame with nothing recorded still presents, loading the previous
    /// contents. Minimized windows skip the frame.
    pub fn present(&mut self) -> Result<(), SurfaceErrorAction> {
        let clear = self.pending_clear.take();
        let draws = std::mem::take(&mut self.pending_draws);

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let prepared: Vec<PreparedDraw> = draws
            .iter()
            .filter_map(|d| self.prepare_draw(d, size))
            .collect();

        let mut frame = self.gpu.acquire_frame()?;

        let load = match clear {
            Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        // Render pass borrows the encoder; dropped before the frame is presented.
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for d in &prepared {
                let (x, y, w, h) = d.viewport;
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);
                rpass.set_pipeline(&d.pipeline);
                for (slot, buffer) in d.buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                rpass.draw(d.vertices.clone(), 0..1);
            }
        }

        self.gpu.present_frame(frame);
        Ok(())
    }

    fn skip_draw(&mut self, reason: std::fmt::Arguments<'_>) {
        if !self.warned_skipped_draw {
            log::warn!("draw skipped: {reason}");
            self.warned_skipped_draw = true;
        }
    }

    fn prepare_draw(&mut self, d: &DrawCall, size: PhysicalSize<u32>) -> Option<PreparedDraw> {
        if d.count == 0 {
            return None;
        }

        let Some(program) = d.program else {
            self.skip_draw(format_args!("no program in use"));
            return None;
        };
        let Some(vertex_array) = d.vertex_array else {
            self.skip_draw(format_args!("no vertex array bound"));
            return None;
        };
        if self.program(program).and_then(|p| p.linked.as_ref()).is_none() {
            self.skip_draw(format_args!("{program:?} is not linked"));
            return None;
        }

        let viewport = d.viewport.clipped_to(size.width, size.height)?;
        let pipeline = self.pipeline_for(program, vertex_array, d.primitive)?;

        let slots = match self.buffer_slots(vertex_array) {
            Ok(s) => s,
            Err(msg) => {
                self.skip_draw(format_args!("{msg}"));
                return None;
            }
        };

        let end = d.first.checked_add(d.count)?;
        let mut buffers = Vec::with_capacity(slots.len());
        for slot in &slots {
            let Some(buffer) = self.buffer(slot.buffer) else {
                self.skip_draw(format_args!("{:?} has no data", slot.buffer));
                return None;
            };
            let available = buffer.size() / slot.stride;
            if u64::from(end) > available {
                self.skip_draw(format_args!(
                    "vertices {}..{end} exceed the {available} stored in {:?}",
                    d.first, slot.buffer
                ));
                return None;
            }
            buffers.push(buffer.clone());
        }

        Some(PreparedDraw {
            pipeline,
            buffers,
            viewport,
            vertices: d.first..end,
        })
    }

    fn pipeline_for(
        &mut self,
        program: ProgramId,
        vertex_array: VertexArrayId,
        primitive: Primitive,
    ) -> Option<wgpu::RenderPipeline> {
        let key = (program, vertex_array, primitive);
        if let Some(cached) = self.pipelines.get(&key) {
            return cached.clone();
        }

        let pipeline = match self.build_pipeline(program, vertex_array, primitive) {
            Ok(p) => Some(p),
            Err(msg) => {
                log::error!("cannot build pipeline for {program:?} with {vertex_array:?}: {msg}");
                None
            }
        };

        self.pipelines.insert(key, pipeline.clone());
        pipeline
    }

    fn build_pipeline(
        &self,
        program: ProgramId,
        vertex_array: VertexArrayId,
        primitive: Primitive,
    ) -> Result<wgpu::RenderPipeline, String> {
        let linked = self
            .program(program)
            .and_then(|p| p.linked.as_ref())
            .ok_or_else(|| "program is not linked".to_string())?;

        let slots = self.buffer_slots(vertex_array)?;

        for input in &linked.stages.vertex_inputs {
            let attr = slots
                .iter()
                .flat_map(|s| s.attributes.iter())
                .find(|a| a.shader_location == input.location)
                .ok_or_else(|| {
                    format!("vertex input at location {} has no enabled attribute", input.location)
                })?;

            let expected = expected_format(input)
                .ok_or_else(|| format!("unsupported vertex input type at location {}", input.location))?;
            if attr.format != expected {
                return Err(format!(
                    "location {} expects {expected:?}, layout provides {:?}",
                    input.location, attr.format
                ));
            }
        }

        let device = self.gpu.device();

        let layouts: Vec<wgpu::VertexBufferLayout<'_>> = slots
            .iter()
            .map(|s| wgpu::VertexBufferLayout {
                array_stride: s.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &s.attributes,
            })
            .collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trigon pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trigon pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &linked.vertex,
                entry_point: Some(linked.stages.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &layouts,
            },

            fragment: Some(wgpu::FragmentState {
                module: &linked.fragment,
                entry_point: Some(linked.stages.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: primitive.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built pipeline for {program:?} with {vertex_array:?} ({primitive:?})");
        Ok(pipeline)
    }

    /// Groups the vertex array's attributes per source buffer, in the order
    /// the buffers were first used.
    fn buffer_slots(&self, vertex_array: VertexArrayId) -> Result<Vec<BufferSlot>, String> {
        let vao = self
            .vertex_arrays
            .get(vertex_array.0 as usize)
            .ok_or_else(|| format!("{vertex_array:?} does not exist"))?;

        let mut slots: Vec<BufferSlot> = Vec::new();
        for (attr, buffer) in &vao.attributes {
            if attr.stride == 0 {
                return Err(format!("attribute {} has a zero stride", attr.location));
            }
            let format = attr
                .to_wgpu_format()
                .ok_or_else(|| format!("attribute {} has no vertex format", attr.location))?;
            let wgpu_attr = wgpu::VertexAttribute {
                format,
                offset: attr.offset,
                shader_location: attr.location,
            };

            match slots.iter_mut().find(|s| s.buffer == *buffer) {
                Some(slot) if slot.stride != attr.stride => {
                    return Err(format!(
                        "attributes sourced from {buffer:?} disagree on stride ({} vs {})",
                        slot.stride, attr.stride
                    ));
                }
                Some(slot) => slot.attributes.push(wgpu_attr),
                None => slots.push(BufferSlot {
                    buffer: *buffer,
                    stride: attr.stride,
                    attributes: vec![wgpu_attr],
                }),
            }
        }

        Ok(slots)
    }

    fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn shader(&self, id: ShaderId) -> Option<&ShaderObject> {
        self.shaders.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn program(&self, id: ProgramId) -> Option<&ProgramObject> {
        self.programs.get(id.0 as usize)
    }
}

fn expected_format(input: &StageInput) -> Option<wgpu::VertexFormat> {
    if !input.float32 {
        return None;
    }
    VertexAttribute::packed_f32(input.location, input.components).to_wgpu_format()
}

fn stage_label(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "trigon vertex unit",
        ShaderStage::Fragment => "trigon fragment unit",
    }
}

impl Gfx for WgpuGfx {
    type Buffer = BufferId;
    type VertexArray = VertexArrayId;
    type Shader = ShaderId;
    type Program = ProgramId;

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        self.vertex_arrays.push(VertexArrayObject::default());
        VertexArrayId(self.vertex_arrays.len() as u32 - 1)
    }

    fn create_buffer(&mut self) -> BufferId {
        self.buffers.push(None);
        BufferId(self.buffers.len() as u32 - 1)
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.bound_vertex_array = Some(vertex_array);
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) {
        self.bound_buffer = Some(buffer);
    }

    fn upload_vertex_data(&mut self, data: &[u8], usage: BufferUsage) {
        let Some(id) = self.bound_buffer else {
            log::warn!("vertex upload with no buffer bound; ignored");
            return;
        };
        let Some(slot) = self.buffers.get_mut(id.0 as usize) else {
            log::warn!("vertex upload into unknown {id:?}; ignored");
            return;
        };

        // Static data is never rewritten, so it gets no COPY_DST.
        let usage = match usage {
            BufferUsage::Static => wgpu::BufferUsages::VERTEX,
            BufferUsage::Dynamic => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        };

        *slot = Some(self.gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trigon vertex buffer"),
            contents: data,
            usage,
        }));
        log::debug!("uploaded {} bytes into {id:?}", data.len());
    }

    fn enable_vertex_attribute(&mut self, attribute: VertexAttribute) {
        let (Some(va), Some(buffer)) = (self.bound_vertex_array, self.bound_buffer) else {
            log::warn!("vertex attribute {} described without a bound vertex array and buffer", attribute.location);
            return;
        };
        let Some(vao) = self.vertex_arrays.get_mut(va.0 as usize) else {
            return;
        };

        vao.attributes.retain(|(a, _)| a.location != attribute.location);
        vao.attributes.push((attribute, buffer));

        // Cached pipelines captured the old layout.
        self.pipelines.retain(|(_, v, _), _| *v != va);
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderId {
        let object = match shader::compile_wgsl(stage, source) {
            Ok(unit) => {
                let module = self
                    .gpu
                    .device()
                    .create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(stage_label(stage)),
                        source: wgpu::ShaderSource::Wgsl(source.into()),
                    });
                ShaderObject {
                    status: BuildStatus::Success,
                    unit: Some(unit),
                    module: Some(module),
                }
            }
            Err(log) => ShaderObject {
                status: BuildStatus::Failed(log),
                unit: None,
                module: None,
            },
        };

        self.shaders.push(Some(object));
        ShaderId(self.shaders.len() as u32 - 1)
    }

    fn shader_status(&self, shader: ShaderId) -> BuildStatus {
        match self.shader(shader) {
            Some(object) => object.status.clone(),
            None => BuildStatus::Failed(InfoLog::new(format!("{shader:?} is not a live shader object"))),
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> ProgramId {
        let v = self.shader(vertex);
        let f = self.shader(fragment);

        let linked = shader::link_units(
            v.and_then(|o| o.unit.as_ref()),
            f.and_then(|o| o.unit.as_ref()),
        );
        let modules = (
            v.and_then(|o| o.module.clone()),
            f.and_then(|o| o.module.clone()),
        );

        let object = match (linked, modules) {
            (Ok(stages), (Some(vertex), Some(fragment))) => ProgramObject {
                status: BuildStatus::Success,
                linked: Some(LinkedProgram {
                    stages,
                    vertex,
                    fragment,
                }),
            },
            (Ok(_), _) => ProgramObject {
                status: BuildStatus::Failed(InfoLog::new("link error: stage module is missing")),
                linked: None,
            },
            (Err(log), _) => ProgramObject {
                status: BuildStatus::Failed(log),
                linked: None,
            },
        };

        self.programs.push(object);
        ProgramId(self.programs.len() as u32 - 1)
    }

    fn program_status(&self, program: ProgramId) -> BuildStatus {
        match self.program(program) {
            Some(object) => object.status.clone(),
            None => BuildStatus::Failed(InfoLog::new(format!("{program:?} does not exist"))),
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn release_shader(&mut self, shader: ShaderId) {
        if let Some(slot) = self.shaders.get_mut(shader.0 as usize) {
            *slot = None;
        }
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        // Anything drawn before the clear is overwritten by it.
        self.pending_draws.clear();
        self.pending_clear = Some(self.clear_color);
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.pending_draws.push(DrawCall {
            program: self.current_program,
            vertex_array: self.bound_vertex_array,
            primitive,
            first,
            count,
            viewport: self.viewport,
        });
    }
}
