//! The three tutorial programs, as `App` implementations plus their frame
//! configuration. Each binary under `src/bin` only launches one of them.

mod triangle;
mod window_only;

pub use triangle::{Triangle, TRIANGLE_SHADERS, TRIANGLE_VERTICES};
pub use window_only::{HelloWindow, InputWindow};

use trigon_engine::core::{FrameConfig, LaunchConfig};
use trigon_engine::input::Key;
use trigon_engine::paint::Color;
use trigon_engine::window::WindowConfig;

/// Background of every program that clears.
pub const CLEAR_COLOR: Color = Color::new(0.2, 0.5, 0.3, 1.0);

/// Plain window: no input handling, no clearing.
pub fn hello_window_frame() -> FrameConfig {
    FrameConfig::default()
}

/// Escape closes the window; every frame starts cleared.
pub fn input_window_frame() -> FrameConfig {
    FrameConfig {
        exit_key: Some(Key::Escape),
        clear_color: Some(CLEAR_COLOR),
    }
}

pub fn triangle_frame() -> FrameConfig {
    input_window_frame()
}

/// 800x600 window titled `title` with the given frame behavior.
pub fn launch_config(title: &str, frame: FrameConfig) -> LaunchConfig {
    LaunchConfig {
        window: WindowConfig::titled(title),
        frame,
        ..LaunchConfig::default()
    }
}
