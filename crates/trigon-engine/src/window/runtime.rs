use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::core::{ContextProvider, ResizeHandler};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction, WgpuGfx};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputState, Key};

use super::config::WindowConfig;

/// Pumps allowed while waiting for the platform to hand out the window.
const CREATE_ATTEMPTS: u32 = 200;
const CREATE_PUMP_TIMEOUT: Duration = Duration::from_millis(5);

/// [`ContextProvider`] backed by a winit window and a wgpu device.
///
/// The event loop is pumped instead of run, so control stays with the frame
/// loop: [`poll_events`](ContextProvider::poll_events) dispatches whatever is
/// pending and returns.
pub struct WinitContext {
    gfx: WgpuGfx,
    state: WindowState,
    event_loop: EventLoop<()>,
    resize_handler: Option<Box<dyn ResizeHandler<WgpuGfx>>>,
}

impl WinitContext {
    /// Initializes the platform, creates the window and acquires the device.
    ///
    /// Every failure here is a fatal startup error.
    pub fn create(config: &WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = WindowState::new(window_attributes(config));

        let mut attempts = 0;
        while state.window.is_none() {
            if let Some(err) = state.creation_error.take() {
                return Err(err);
            }
            anyhow::ensure!(
                attempts < CREATE_ATTEMPTS,
                "platform did not create the window after {CREATE_ATTEMPTS} event pumps"
            );
            attempts += 1;

            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(CREATE_PUMP_TIMEOUT), &mut state) {
                if let Some(err) = state.creation_error.take() {
                    return Err(err);
                }
                anyhow::bail!("event loop exited with code {code} before the window was created");
            }
        }

        let window = state
            .window
            .clone()
            .context("window missing after creation")?;
        log::info!(
            "window created: \"{}\" {}x{} (context {}.{})",
            config.title,
            config.width,
            config.height,
            config.hints.major,
            config.hints.minor
        );

        let gpu = pollster::block_on(Gpu::new(window, gpu_init)).context("failed to initialize the GPU device")?;

        // Resizes seen while creating the window are already reflected in the
        // surface size.
        state.pending_resizes.clear();

        Ok(Self {
            gfx: WgpuGfx::new(gpu),
            state,
            event_loop,
            resize_handler: None,
        })
    }
}

impl ContextProvider for WinitContext {
    type Gfx = WgpuGfx;

    fn gfx(&mut self) -> &mut WgpuGfx {
        &mut self.gfx
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.gfx.surface_size();
        (size.width, size.height)
    }

    fn set_resize_handler(&mut self, handler: Box<dyn ResizeHandler<WgpuGfx>>) {
        self.resize_handler = Some(handler);
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn request_close(&mut self) {
        if !self.state.close_requested {
            log::debug!("close requested");
        }
        self.state.close_requested = true;
    }

    fn key_down(&self, key: Key) -> bool {
        self.state.input.key_down(key)
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = &self.state.window {
            window.pre_present_notify();
        }

        match self.gfx.present() {
            Ok(()) | Err(SurfaceErrorAction::Reconfigured) | Err(SurfaceErrorAction::SkipFrame) => {}
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("surface lost beyond recovery; closing");
                self.state.close_requested = true;
            }
        }
    }

    fn poll_events(&mut self) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            log::debug!("event loop exited with code {code}");
            self.state.close_requested = true;
        }

        // Swapchain first, then the registered reaction.
        for size in std::mem::take(&mut self.state.pending_resizes) {
            self.gfx.resize_surface(size);
            if let Some(handler) = self.resize_handler.as_mut() {
                handler.on_framebuffer_resize(&mut self.gfx, size.width, size.height);
            }
        }
    }

    fn terminate(self) {
        let Self {
            gfx,
            state,
            event_loop,
            resize_handler,
        } = self;

        drop(resize_handler);
        drop(gfx);
        drop(state);
        drop(event_loop);
        log::debug!("context terminated");
    }
}

struct WindowState {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    creation_error: Option<anyhow::Error>,

    input: InputState,
    close_requested: bool,
    pending_resizes: Vec<PhysicalSize<u32>>,
}

impl WindowState {
    fn new(attributes: WindowAttributes) -> Self {
        Self {
            attributes,
            window: None,
            creation_error: None,
            input: InputState::default(),
            close_requested: false,
            pending_resizes: Vec::new(),
        }
    }

    /// Folds one window event into the state read by the provider.
    ///
    /// A scale-factor change is followed by its own `Resized` carrying the new
    /// physical size, so only `Resized` queues a resize.
    fn record(&mut self, event: &WindowEvent) {
        if let Some(ev) = translate_window_event(event) {
            self.input.apply_event(&ev);
        }

        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(new_size) => self.pending_resizes.push(*new_size),
            _ => {}
        }
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                self.creation_error = Some(anyhow::Error::new(e).context("failed to create window"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.record(&event);
    }
}

fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
}
