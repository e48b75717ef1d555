use std::fmt;
use std::process::ExitCode;

use crate::coords::Viewport;
use crate::device::{GpuInit, WgpuGfx};
use crate::gfx::Gfx;
use crate::logging::{LoggingConfig, init_logging};
use crate::window::{WindowConfig, WinitContext};

use super::app::App;
use super::context::{ContextProvider, ViewportResizer};
use super::frame_loop::{FrameConfig, FrameLoop};
use super::resources::ResourceError;

/// Everything a program chooses before startup.
#[derive(Debug, Clone, Default)]
pub struct LaunchConfig {
    pub window: WindowConfig,
    /// `None` derives the device parameters from the window's context hints.
    pub gpu: Option<GpuInit>,
    pub frame: FrameConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug)]
pub enum LaunchError {
    /// Window creation or device acquisition failed.
    Startup(anyhow::Error),
    /// `App::setup` rejected its resources.
    Resources(ResourceError),
}

impl LaunchError {
    /// Raw process status: -1 (as an unsigned byte) for startup, 1 for resources.
    pub fn status(&self) -> u8 {
        match self {
            LaunchError::Startup(_) => u8::MAX,
            LaunchError::Resources(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::Startup(e) => write!(f, "startup failed: {e:#}"),
            LaunchError::Resources(e) => write!(f, "resource setup failed: {e}"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Startup(e) => Some(&**e),
            LaunchError::Resources(e) => Some(e),
        }
    }
}

/// Runs `app` against an already created context, then terminates it.
///
/// Sets the viewport to the framebuffer, registers the viewport resizer,
/// runs setup and the frame loop. The context is terminated on every path.
/// Returns the number of frames presented.
pub fn run<C, A>(mut ctx: C, frame: FrameConfig, app: &mut A) -> Result<u64, LaunchError>
where
    C: ContextProvider,
    C::Gfx: 'static,
    A: App<C::Gfx>,
{
    let (width, height) = ctx.framebuffer_size();
    ctx.gfx().set_viewport(Viewport::from_size(width, height));
    ctx.set_resize_handler(Box::new(ViewportResizer));

    if let Err(e) = app.setup(ctx.gfx()) {
        ctx.terminate();
        return Err(LaunchError::Resources(e));
    }

    let mut frame_loop = FrameLoop::new(frame);
    let frames = frame_loop.run(&mut ctx, app);
    log::debug!("frame loop finished after {frames} frames");

    ctx.terminate();
    Ok(frames)
}

/// Full program lifecycle on the native window: logging, context creation,
/// [`run`], and the mapping to a process status.
pub fn launch<A>(config: LaunchConfig, mut app: A) -> ExitCode
where
    A: App<WgpuGfx>,
{
    init_logging(config.logging.clone());

    match try_launch(config, &mut app) {
        Ok(frames) => {
            log::info!("terminated normally after {frames} frames");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            e.exit_code()
        }
    }
}

fn try_launch<A: App<WgpuGfx>>(config: LaunchConfig, app: &mut A) -> Result<u64, LaunchError> {
    let gpu_init = config
        .gpu
        .unwrap_or_else(|| GpuInit::for_context(&config.window.hints));

    let ctx = WinitContext::create(&config.window, gpu_init).map_err(LaunchError::Startup)?;
    run(ctx, config.frame, app)
}
