/// Options that must be fixed before the context is created.
///
/// The requested API version selects the device limits requested at startup
/// (see [`GpuInit::for_context`](crate::device::GpuInit::for_context)).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ContextHints {
    pub major: u8,
    pub minor: u8,
}

impl Default for ContextHints {
    fn default() -> Self {
        Self { major: 3, minor: 3 }
    }
}

/// Native window parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Initial size in physical pixels.
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub hints: ContextHints,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            hints: ContextHints::default(),
        }
    }
}

impl WindowConfig {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
