use std::fmt;

use crate::gfx::{BufferUsage, Gfx, Primitive, VertexAttribute};
use crate::shader::{BuildStatus, InfoLog, ShaderStage};

/// Vertex data plus the layout describing it.
#[derive(Debug, Copy, Clone)]
pub struct MeshDesc<'a> {
    /// Flat vertex stream, `attribute.stride / 4` floats per vertex.
    pub vertices: &'a [f32],
    pub attribute: VertexAttribute,
    pub primitive: Primitive,
}

/// WGSL sources of the two stage units.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// What a compile or link failure does to startup.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ShaderFailurePolicy {
    /// Log the diagnostic and keep going; draws with the program render nothing.
    #[default]
    LogAndContinue,
    /// Log the diagnostic and fail the build.
    Abort,
}

/// Which build step a shader failure came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStep {
    Compile(ShaderStage),
    Link,
}

impl fmt::Display for ShaderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStep::Compile(stage) => write!(f, "{stage} shader compilation"),
            ShaderStep::Link => f.write_str("shader program link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Vertex data does not match its layout. Detected before any GPU call.
    Layout(String),
    /// A shader step failed under [`ShaderFailurePolicy::Abort`].
    Shader { step: ShaderStep, log: InfoLog },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Layout(msg) => write!(f, "invalid vertex layout: {msg}"),
            ResourceError::Shader { step, log } => write!(f, "{step} failed:\n{log}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Everything one draw call needs: vertex buffer, vertex array describing it,
/// and the linked program.
///
/// Built once; the frame loop only binds and draws.
#[derive(Debug)]
pub struct GpuResourceSet<G: Gfx> {
    vertex_array: G::VertexArray,
    buffer: G::Buffer,
    program: G::Program,
    primitive: Primitive,
    vertex_count: u32,
    linked: bool,
}

impl<G: Gfx> GpuResourceSet<G> {
    /// Builds the set. Call order is significant and matches what a stateful
    /// backend expects:
    ///
    /// 1. create vertex array and buffer
    /// 2. bind the vertex array
    /// 3. bind the buffer, upload the vertices (static)
    /// 4. enable + describe the attribute
    /// 5. compile and check the vertex unit
    /// 6. compile and check the fragment unit
    /// 7. link and check the program
    /// 8. use the program, release both units
    ///
    /// Under [`ShaderFailurePolicy::LogAndContinue`] shader failures are logged
    /// and the set is still returned.
    pub fn build(
        gfx: &mut G,
        mesh: &MeshDesc<'_>,
        shaders: &ShaderSources<'_>,
        policy: ShaderFailurePolicy,
    ) -> Result<Self, ResourceError> {
        let vertex_count = mesh
            .attribute
            .check_stream(mesh.vertices.len())
            .map_err(ResourceError::Layout)?;

        let vertex_array = gfx.create_vertex_array();
        let buffer = gfx.create_buffer();

        gfx.bind_vertex_array(vertex_array);

        gfx.bind_vertex_buffer(buffer);
        gfx.upload_vertex_data(bytemuck::cast_slice(mesh.vertices), BufferUsage::Static);

        gfx.enable_vertex_attribute(mesh.attribute);

        let vertex = gfx.compile_shader(ShaderStage::Vertex, shaders.vertex);
        let vertex_ok = check(gfx.shader_status(vertex), ShaderStep::Compile(ShaderStage::Vertex), policy)?;

        let fragment = gfx.compile_shader(ShaderStage::Fragment, shaders.fragment);
        let fragment_ok = check(gfx.shader_status(fragment), ShaderStep::Compile(ShaderStage::Fragment), policy)?;

        let program = gfx.link_program(vertex, fragment);
        let linked = check(gfx.program_status(program), ShaderStep::Link, policy)?;

        gfx.use_program(program);

        // The program keeps its own copy of the compiled stages.
        gfx.release_shader(vertex);
        gfx.release_shader(fragment);

        log::debug!(
            "resource set ready: {vertex_count} vertices, vertex={vertex_ok} fragment={fragment_ok} linked={linked}"
        );

        Ok(Self {
            vertex_array,
            buffer,
            program,
            primitive: mesh.primitive,
            vertex_count,
            linked,
        })
    }

    /// Re-selects the program and the vertex array.
    pub fn bind(&self, gfx: &mut G) {
        gfx.use_program(self.program);
        gfx.bind_vertex_array(self.vertex_array);
    }

    /// Draws every vertex, starting at offset 0.
    pub fn draw(&self, gfx: &mut G) {
        gfx.draw_arrays(self.primitive, 0, self.vertex_count);
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// False when compile or link failed; drawing then renders nothing.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn buffer(&self) -> G::Buffer {
        self.buffer
    }
}

fn check(status: BuildStatus, step: ShaderStep, policy: ShaderFailurePolicy) -> Result<bool, ResourceError> {
    match status {
        BuildStatus::Success => Ok(true),
        BuildStatus::Failed(log) => {
            log::error!("{step} failed:\n{log}");
            match policy {
                ShaderFailurePolicy::LogAndContinue => Ok(false),
                ShaderFailurePolicy::Abort => Err(ResourceError::Shader { step, log }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, CallLog, RecordingGfx};

    const TRIANGLE: [f32; 9] = [
        -0.5, -0.5, 0.0, //
        0.5, -0.5, 0.0, //
        0.0, 0.5, 0.0,
    ];

    fn mesh() -> MeshDesc<'static> {
        MeshDesc {
            vertices: &TRIANGLE,
            attribute: VertexAttribute::packed_f32(0, 3),
            primitive: Primitive::TriangleList,
        }
    }

    const SOURCES: ShaderSources<'static> = ShaderSources {
        vertex: "vs",
        fragment: "fs",
    };

    fn build(gfx: &mut RecordingGfx, policy: ShaderFailurePolicy) -> Result<GpuResourceSet<RecordingGfx>, ResourceError> {
        GpuResourceSet::build(gfx, &mesh(), &SOURCES, policy)
    }

    #[test]
    fn build_follows_the_setup_order() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone());

        let set = build(&mut gfx, ShaderFailurePolicy::default()).unwrap();
        assert!(set.is_linked());
        assert_eq!(set.vertex_count(), 3);

        let calls = log.calls();
        assert_eq!(calls.len(), 12);
        assert!(matches!(calls[0], Call::CreateVertexArray(_)));
        assert!(matches!(calls[1], Call::CreateBuffer(_)));
        assert!(matches!(calls[2], Call::BindVertexArray(_)));
        assert!(matches!(calls[3], Call::BindVertexBuffer(_)));
        assert!(matches!(calls[4], Call::UploadVertexData { .. }));
        assert_eq!(calls[5], Call::EnableVertexAttribute(VertexAttribute::packed_f32(0, 3)));
        assert!(matches!(calls[6], Call::CompileShader { stage: ShaderStage::Vertex, .. }));
        assert!(matches!(calls[7], Call::CompileShader { stage: ShaderStage::Fragment, .. }));
        assert!(matches!(calls[8], Call::LinkProgram { .. }));
        assert!(matches!(calls[9], Call::UseProgram(_)));
        assert!(matches!(calls[10], Call::ReleaseShader(_)));
        assert!(matches!(calls[11], Call::ReleaseShader(_)));
    }

    #[test]
    fn ids_flow_between_calls() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone());
        let set = build(&mut gfx, ShaderFailurePolicy::default()).unwrap();

        let calls = log.calls();
        let Call::CreateVertexArray(vao) = calls[0] else { panic!("expected vertex array") };
        let Call::CreateBuffer(vbo) = calls[1] else { panic!("expected buffer") };
        assert_eq!(calls[2], Call::BindVertexArray(vao));
        assert_eq!(calls[3], Call::BindVertexBuffer(vbo));
        assert_eq!(set.buffer(), vbo);

        let Call::CompileShader { id: vs, .. } = calls[6] else { panic!("expected vertex unit") };
        let Call::CompileShader { id: fs, .. } = calls[7] else { panic!("expected fragment unit") };
        let Call::LinkProgram { id: program, vertex, fragment } = calls[8] else { panic!("expected link") };
        assert_eq!((vertex, fragment), (vs, fs));
        assert_eq!(calls[9], Call::UseProgram(program));
        assert_eq!(calls[10], Call::ReleaseShader(vs));
        assert_eq!(calls[11], Call::ReleaseShader(fs));
    }

    #[test]
    fn upload_is_the_nine_floats_as_static_data() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone());
        build(&mut gfx, ShaderFailurePolicy::default()).unwrap();

        assert_eq!(log.uploads(), vec![(TRIANGLE.to_vec(), BufferUsage::Static)]);
    }

    #[test]
    fn vertex_compile_failure_continues_by_default() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone()).failing_compile(ShaderStage::Vertex);

        let set = build(&mut gfx, ShaderFailurePolicy::LogAndContinue).unwrap();

        assert!(!set.is_linked());
        // Setup still ran to the end.
        assert_eq!(log.count(|c| matches!(c, Call::ReleaseShader(_))), 2);
        assert_eq!(log.count(|c| matches!(c, Call::UseProgram(_))), 1);
    }

    #[test]
    fn fragment_compile_failure_continues_by_default() {
        let mut gfx = RecordingGfx::default().failing_compile(ShaderStage::Fragment);
        let set = build(&mut gfx, ShaderFailurePolicy::LogAndContinue).unwrap();
        assert!(!set.is_linked());
    }

    #[test]
    fn link_failure_continues_by_default() {
        let mut gfx = RecordingGfx::default().failing_link();
        let set = build(&mut gfx, ShaderFailurePolicy::LogAndContinue).unwrap();
        assert!(!set.is_linked());
    }

    #[test]
    fn abort_policy_stops_at_the_first_failure() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone()).failing_compile(ShaderStage::Vertex);

        let err = build(&mut gfx, ShaderFailurePolicy::Abort).unwrap_err();

        assert!(matches!(
            err,
            ResourceError::Shader { step: ShaderStep::Compile(ShaderStage::Vertex), .. }
        ));
        assert_eq!(log.count(|c| matches!(c, Call::LinkProgram { .. })), 0);
    }

    #[test]
    fn abort_policy_reports_link_failure() {
        let mut gfx = RecordingGfx::default().failing_link();
        let err = build(&mut gfx, ShaderFailurePolicy::Abort).unwrap_err();
        assert!(matches!(err, ResourceError::Shader { step: ShaderStep::Link, .. }));
        assert!(err.to_string().starts_with("shader program link failed"));
    }

    #[test]
    fn mismatched_layout_is_rejected_before_any_call() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone());
        let bad = MeshDesc {
            vertices: &TRIANGLE[..8],
            ..mesh()
        };

        let err = GpuResourceSet::build(&mut gfx, &bad, &SOURCES, ShaderFailurePolicy::default()).unwrap_err();

        assert!(matches!(err, ResourceError::Layout(_)));
        assert!(log.calls().is_empty());
    }

    #[test]
    fn bind_and_draw() {
        let log = CallLog::default();
        let mut gfx = RecordingGfx::new(log.clone());
        let set = build(&mut gfx, ShaderFailurePolicy::default()).unwrap();
        let before = log.calls().len();

        set.bind(&mut gfx);
        set.draw(&mut gfx);

        let calls = log.calls();
        assert!(matches!(calls[before], Call::UseProgram(_)));
        assert!(matches!(calls[before + 1], Call::BindVertexArray(_)));
        assert_eq!(log.draws(), vec![(Primitive::TriangleList, 0, 3)]);
    }
}
