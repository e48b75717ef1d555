use crate::gfx::Gfx;
use crate::input::Key;
use crate::paint::Color;

use super::app::App;
use super::context::ContextProvider;

/// Per-program frame behavior shared by the loop.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameConfig {
    /// Key whose held state requests termination. `None` disables input handling.
    pub exit_key: Option<Key>,

    /// Color the framebuffer is cleared to at the start of each frame.
    /// `None` skips clearing.
    pub clear_color: Option<Color>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Drives presentation until the context reports close-requested.
///
/// One iteration: input check, clear, app draw, swap, poll. The
/// continue-condition is read before each iteration only, so a close
/// requested mid-iteration still lets that frame finish.
#[derive(Debug)]
pub struct FrameLoop {
    config: FrameConfig,
    frames: u64,
}

impl FrameLoop {
    pub fn new(config: FrameConfig) -> Self {
        Self { config, frames: 0 }
    }

    /// Completed iterations so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state<C: ContextProvider>(ctx: &C) -> LoopState {
        if ctx.should_close() {
            LoopState::Terminated
        } else {
            LoopState::Running
        }
    }

    /// Runs iterations until the loop leaves `Running`; returns the number of
    /// completed iterations.
    pub fn run<C, A>(&mut self, ctx: &mut C, app: &mut A) -> u64
    where
        C: ContextProvider,
        A: App<C::Gfx>,
    {
        while Self::state(ctx) == LoopState::Running {
            self.step(ctx, app);
        }

        log::debug!("frame loop terminated after {} frames", self.frames);
        self.frames
    }

    /// Runs exactly one iteration.
    pub fn step<C, A>(&mut self, ctx: &mut C, app: &mut A)
    where
        C: ContextProvider,
        A: App<C::Gfx>,
    {
        // Level check: holding the key re-requests every frame, which is harmless.
        if let Some(key) = self.config.exit_key
            && ctx.key_down(key)
        {
            ctx.request_close();
        }

        if let Some(color) = self.config.clear_color {
            let gfx = ctx.gfx();
            gfx.set_clear_color(color);
            gfx.clear();
        }

        app.draw(ctx.gfx());

        ctx.swap_buffers();
        ctx.poll_events();

        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Primitive;
    use crate::testing::{Call, ScriptedContext};

    struct Idle;
    impl<G: Gfx> App<G> for Idle {}

    struct OneTriangle;
    impl<G: Gfx> App<G> for OneTriangle {
        fn draw(&mut self, gfx: &mut G) {
            gfx.draw_arrays(Primitive::TriangleList, 0, 3);
        }
    }

    const GREEN: Color = Color::new(0.2, 0.5, 0.3, 1.0);

    fn escape_and_clear() -> FrameConfig {
        FrameConfig {
            exit_key: Some(Key::Escape),
            clear_color: Some(GREEN),
        }
    }

    #[test]
    fn runs_until_close_button() {
        let mut ctx = ScriptedContext::new(800, 600).close_at(3);
        let log = ctx.log();

        let frames = FrameLoop::new(FrameConfig::default()).run(&mut ctx, &mut Idle);

        assert_eq!(frames, 3);
        assert_eq!(log.frames(), 3);
        assert_eq!(FrameLoop::state(&ctx), LoopState::Terminated);
    }

    #[test]
    fn closed_context_runs_no_iteration() {
        let mut ctx = ScriptedContext::new(800, 600).close_at(1);
        ctx.poll_events();
        let log = ctx.log();

        assert_eq!(FrameLoop::new(FrameConfig::default()).run(&mut ctx, &mut Idle), 0);
        assert_eq!(log.frames(), 0);
    }

    #[test]
    fn iteration_order_is_input_clear_draw_swap_poll() {
        let mut ctx = ScriptedContext::new(800, 600);
        let log = ctx.log();

        FrameLoop::new(escape_and_clear()).step(&mut ctx, &mut OneTriangle);

        assert_eq!(
            log.calls(),
            vec![
                Call::SetClearColor(GREEN),
                Call::Clear,
                Call::DrawArrays { primitive: Primitive::TriangleList, first: 0, count: 3 },
                Call::SwapBuffers,
                Call::PollEvents,
            ]
        );
    }

    #[test]
    fn escape_held_terminates_after_the_observing_frame() {
        // Escape goes down during poll 2, so iteration 3 observes it.
        let mut ctx = ScriptedContext::new(800, 600).press_at(Key::Escape, 2);
        let log = ctx.log();

        let frames = FrameLoop::new(escape_and_clear()).run(&mut ctx, &mut OneTriangle);

        assert_eq!(frames, 3);
        assert_eq!(log.count(|c| *c == Call::RequestClose), 1);

        // The observing frame still completes: request, clear, draw, swap, poll.
        let calls = log.calls();
        let request = calls.iter().position(|c| *c == Call::RequestClose).unwrap();
        assert_eq!(calls[request + 1], Call::SetClearColor(GREEN));
        assert_eq!(calls.last(), Some(&Call::PollEvents));
    }

    #[test]
    fn escape_pressed_and_released_between_checks_is_missed() {
        // Level semantics: only the state at the check matters.
        let mut ctx = ScriptedContext::new(800, 600)
            .press_at(Key::Escape, 1)
            .release_at(Key::Escape, 1)
            .close_at(4);
        let log = ctx.log();

        let frames = FrameLoop::new(escape_and_clear()).run(&mut ctx, &mut Idle);

        assert_eq!(frames, 4);
        assert_eq!(log.count(|c| *c == Call::RequestClose), 0);
    }

    #[test]
    fn escape_ignored_without_exit_key() {
        let mut ctx = ScriptedContext::new(800, 600)
            .press_at(Key::Escape, 1)
            .close_at(3);
        let log = ctx.log();

        let frames = FrameLoop::new(FrameConfig::default()).run(&mut ctx, &mut Idle);

        assert_eq!(frames, 3);
        assert_eq!(log.count(|c| *c == Call::RequestClose), 0);
    }

    #[test]
    fn no_clear_without_clear_color() {
        let mut ctx = ScriptedContext::new(800, 600).close_at(2);
        let log = ctx.log();

        FrameLoop::new(FrameConfig::default()).run(&mut ctx, &mut Idle);

        assert_eq!(log.count(|c| *c == Call::Clear), 0);
        assert!(log.clear_colors().is_empty());
        assert!(log.draws().is_empty());
    }

    #[test]
    fn every_frame_clears_with_the_same_color() {
        let mut ctx = ScriptedContext::new(800, 600).close_at(5);
        let log = ctx.log();

        FrameLoop::new(escape_and_clear()).run(&mut ctx, &mut Idle);

        assert_eq!(log.count(|c| *c == Call::Clear), 5);
        assert!(log.clear_colors().iter().all(|c| *c == GREEN));
    }
}
