use trigon_engine::core::{App, GpuResourceSet, MeshDesc, ResourceError, ShaderFailurePolicy, ShaderSources};
use trigon_engine::gfx::{Gfx, Primitive, VertexAttribute};

/// One triangle in normalized device coordinates, 3 floats per vertex.
pub const TRIANGLE_VERTICES: [f32; 9] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.0, 0.5, 0.0,
];

/// Pass-through vertex stage and a constant orange fragment stage.
pub const TRIANGLE_SHADERS: ShaderSources<'static> = ShaderSources {
    vertex: include_str!("../shaders/triangle.vert.wgsl"),
    fragment: include_str!("../shaders/triangle.frag.wgsl"),
};

/// Builds the triangle's resources once and draws it every frame.
pub struct Triangle<G: Gfx> {
    policy: ShaderFailurePolicy,
    resources: Option<GpuResourceSet<G>>,
}

impl<G: Gfx> Default for Triangle<G> {
    fn default() -> Self {
        Self::new(ShaderFailurePolicy::default())
    }
}

impl<G: Gfx> Triangle<G> {
    pub fn new(policy: ShaderFailurePolicy) -> Self {
        Self {
            policy,
            resources: None,
        }
    }

    pub fn resources(&self) -> Option<&GpuResourceSet<G>> {
        self.resources.as_ref()
    }
}

impl<G: Gfx> App<G> for Triangle<G> {
    fn setup(&mut self, gfx: &mut G) -> Result<(), ResourceError> {
        let mesh = MeshDesc {
            vertices: &TRIANGLE_VERTICES,
            attribute: VertexAttribute::packed_f32(0, 3),
            primitive: Primitive::TriangleList,
        };

        let set = GpuResourceSet::build(gfx, &mesh, &TRIANGLE_SHADERS, self.policy)?;
        if !set.is_linked() {
            log::warn!("triangle program is not linked; frames will only be cleared");
        }
        self.resources = Some(set);
        Ok(())
    }

    fn draw(&mut self, gfx: &mut G) {
        if let Some(set) = &self.resources {
            set.bind(gfx);
            set.draw(gfx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{triangle_frame, CLEAR_COLOR};
    use trigon_engine::core::{run, LaunchError};
    use trigon_engine::gfx::BufferUsage;
    use trigon_engine::input::Key;
    use trigon_engine::shader::{check_program, BuildStatus, ShaderStage};
    use trigon_engine::testing::{Call, RecordingGfx, ScriptedContext};

    #[test]
    fn embedded_shaders_compile_and_link() {
        assert_eq!(
            check_program(TRIANGLE_SHADERS.vertex, TRIANGLE_SHADERS.fragment),
            BuildStatus::Success
        );
    }

    #[test]
    fn uploads_the_nine_floats_once() {
        let ctx = ScriptedContext::new(800, 600).close_at(5);
        let log = ctx.log();

        run(ctx, triangle_frame(), &mut Triangle::default()).unwrap();

        assert_eq!(log.uploads(), vec![(TRIANGLE_VERTICES.to_vec(), BufferUsage::Static)]);
    }

    #[test]
    fn every_frame_clears_then_draws_three_vertices() {
        let ctx = ScriptedContext::new(800, 600).close_at(5);
        let log = ctx.log();

        let frames = run(ctx, triangle_frame(), &mut Triangle::default()).unwrap();

        assert_eq!(frames, 5);
        assert_eq!(log.draws(), vec![(Primitive::TriangleList, 0, 3); 5]);
        assert_eq!(log.clear_colors(), vec![CLEAR_COLOR; 5]);

        // Within a frame the clear precedes the draw, which precedes the swap.
        let calls = log.calls();
        let clear = calls.iter().position(|c| *c == Call::Clear).unwrap();
        let draw = calls.iter().position(|c| matches!(c, Call::DrawArrays { .. })).unwrap();
        let swap = calls.iter().position(|c| *c == Call::SwapBuffers).unwrap();
        assert!(clear < draw && draw < swap);
    }

    #[test]
    fn escape_ends_the_loop_at_the_next_check() {
        let ctx = ScriptedContext::new(800, 600).press_at(Key::Escape, 2);
        let log = ctx.log();

        let frames = run(ctx, triangle_frame(), &mut Triangle::default()).unwrap();

        assert_eq!(frames, 3);
        assert_eq!(log.count(|c| *c == Call::RequestClose), 1);
    }

    #[test]
    fn vertex_compile_failure_still_runs_the_loop() {
        let gfx = RecordingGfx::default().failing_compile(ShaderStage::Vertex);
        let ctx = ScriptedContext::with_gfx(800, 600, gfx).close_at(3);
        let log = ctx.log();
        let mut app = Triangle::default();

        let frames = run(ctx, triangle_frame(), &mut app).unwrap();

        assert_eq!(frames, 3);
        assert_eq!(log.frames(), 3);
        assert!(!app.resources().unwrap().is_linked());
    }

    #[test]
    fn link_failure_still_runs_the_loop() {
        let gfx = RecordingGfx::default().failing_link();
        let ctx = ScriptedContext::with_gfx(800, 600, gfx).close_at(2);

        let frames = run(ctx, triangle_frame(), &mut Triangle::default()).unwrap();

        assert_eq!(frames, 2);
    }

    #[test]
    fn abort_policy_exits_with_status_one() {
        let gfx = RecordingGfx::default().failing_compile(ShaderStage::Fragment);
        let ctx = ScriptedContext::with_gfx(800, 600, gfx).close_at(2);

        let err = run(ctx, triangle_frame(), &mut Triangle::new(ShaderFailurePolicy::Abort)).unwrap_err();

        assert!(matches!(err, LaunchError::Resources(_)));
        assert_eq!(err.status(), 1);
    }
}
