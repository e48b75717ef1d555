use crate::gfx::Gfx;

use super::resources::ResourceError;

/// Per-program hooks run by the launcher.
///
/// Startup, input, clearing, presentation and teardown are shared; a program
/// only supplies what it builds once and what it draws each frame.
pub trait App<G: Gfx> {
    /// Called once, after the context exists and before the first frame.
    fn setup(&mut self, gfx: &mut G) -> Result<(), ResourceError> {
        let _ = gfx;
        Ok(())
    }

    /// Called once per frame, after the clear and before the swap.
    fn draw(&mut self, gfx: &mut G) {
        let _ = gfx;
    }
}
