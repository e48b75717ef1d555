use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::{self, SurfaceErrorAction};
use super::GpuInit;

/// Rendering context bound to one window.
///
/// Creating it is the entry-point resolution step: nothing can be drawn
/// before the adapter and device exist and the swapchain is configured.
pub struct Gpu {
    /// Keeps its own reference to the window, hence `'static`.
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

/// Swapchain image acquired for one frame, plus the encoder recording into it.
pub(crate) struct SwapchainFrame {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl Gpu {
    /// Binds a wgpu device to `window` and configures its swapchain.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(
            size.width > 0 && size.height > 0,
            "window reports a zero-sized framebuffer"
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.is_webgpu_compliant() {
            log::debug!("downlevel adapter: {:?}", downlevel.flags);
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trigon device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to load graphics device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = init
            .pick_format(&caps.formats)
            .context("surface supports no texture formats on this adapter")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: init.pick_alpha_mode(&caps.alpha_modes),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!("swapchain {format:?} {}x{} {:?}", size.width, size.height, config.present_mode);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Reconfigures the swapchain for `new_size`. A zero-sized (minimized)
    /// window keeps the previous configuration.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(&self.surface, &self.device, &mut self.config, &mut self.size, new_size);
    }

    /// Acquires the next swapchain image.
    ///
    /// Lost or outdated surfaces are reconfigured before the error is returned,
    /// so the next attempt can succeed.
    pub(crate) fn acquire_frame(&mut self) -> Result<SwapchainFrame, SurfaceErrorAction> {
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::error_action(&err);
                log::debug!("swapchain acquire failed ({err}); {action:?}");
                if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                return Err(action);
            }
        };

        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("trigon frame encoder"),
        });

        Ok(SwapchainFrame { texture, view, encoder })
    }

    /// Submits the frame's commands and queues its image for presentation.
    pub(crate) fn present_frame(&self, frame: SwapchainFrame) {
        let SwapchainFrame { texture, view, encoder } = frame;
        self.queue.submit(Some(encoder.finish()));
        drop(view);
        texture.present();
    }
}
