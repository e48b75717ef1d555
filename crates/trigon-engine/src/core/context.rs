use crate::coords::Viewport;
use crate::gfx::Gfx;
use crate::input::Key;

/// Reaction to framebuffer size changes.
///
/// Registered once with the context provider and invoked synchronously from
/// [`ContextProvider::poll_events`] for every resize it dispatches.
pub trait ResizeHandler<G: Gfx> {
    fn on_framebuffer_resize(&mut self, gfx: &mut G, width: u32, height: u32);
}

/// Keeps the viewport covering the whole framebuffer.
#[derive(Debug, Default, Copy, Clone)]
pub struct ViewportResizer;

impl<G: Gfx> ResizeHandler<G> for ViewportResizer {
    fn on_framebuffer_resize(&mut self, gfx: &mut G, width: u32, height: u32) {
        log::debug!("framebuffer resized to {width}x{height}");
        gfx.set_viewport(Viewport::from_size(width, height));
    }
}

/// Window + rendering context the frame loop runs against.
///
/// Creation (initialization, pre-creation hints, window creation, making
/// the context current and resolving graphics entry points) is left to each
/// implementation's constructor; a provider that exists is ready to draw.
pub trait ContextProvider {
    type Gfx: Gfx;

    /// Graphics calls against this provider's context.
    fn gfx(&mut self) -> &mut Self::Gfx;

    /// Current framebuffer size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Registers the resize reaction, replacing any previous one.
    fn set_resize_handler(&mut self, handler: Box<dyn ResizeHandler<Self::Gfx>>);

    /// True once closing was requested by the user or by [`request_close`](Self::request_close).
    fn should_close(&self) -> bool;

    fn request_close(&mut self);

    /// Level query: is `key` held right now.
    fn key_down(&self, key: Key) -> bool;

    /// Presents the frame drawn since the previous swap. May block on vsync.
    fn swap_buffers(&mut self);

    /// Processes pending window events, running the resize handler for each
    /// framebuffer resize before returning.
    fn poll_events(&mut self);

    /// Releases the context and then the window.
    fn terminate(self)
    where
        Self: Sized;
}
