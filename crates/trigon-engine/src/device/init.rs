use crate::window::ContextHints;

/// How colors written to the swapchain are encoded.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SurfaceEncoding {
    /// Clear colors and fragment outputs are stored as given.
    #[default]
    Raw,
    /// Values are treated as linear and gamma-encoded on store.
    Srgb,
}

impl SurfaceEncoding {
    fn accepts(self, format: wgpu::TextureFormat) -> bool {
        format.is_srgb() == (self == SurfaceEncoding::Srgb)
    }
}

/// Device and swapchain parameters requested at startup.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub encoding: SurfaceEncoding,
    /// `Fifo` blocks presentation on vsync.
    pub present_mode: wgpu::PresentMode,
    /// Ignored when the surface does not offer it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            encoding: SurfaceEncoding::Raw,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// GPU parameters satisfying a requested context version.
    ///
    /// A 3.x context only guarantees the WebGL2/GLES 3.0 class of limits, so
    /// that is what gets requested; newer versions get wgpu's defaults. The
    /// swapchain stores colors unencoded, like a default GL framebuffer.
    pub fn for_context(hints: &ContextHints) -> Self {
        let required_limits = if hints.major < 4 {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };

        Self {
            required_limits,
            ..Self::default()
        }
    }

    /// First offered format matching the requested encoding, else the
    /// surface's first format.
    pub(crate) fn pick_format(&self, offered: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
        offered
            .iter()
            .copied()
            .find(|f| self.encoding.accepts(*f))
            .or_else(|| offered.first().copied())
    }

    /// The requested alpha mode when offered, otherwise `Opaque` when
    /// offered, otherwise whatever the surface lists first.
    pub(crate) fn pick_alpha_mode(&self, offered: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
        let wanted = self.alpha_mode.unwrap_or(wgpu::CompositeAlphaMode::Opaque);
        if offered.contains(&wanted) {
            return wanted;
        }
        offered.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}
