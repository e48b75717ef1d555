use std::process::ExitCode;

use trigon_engine::core::launch;
use trigon_samples::{input_window_frame, launch_config, InputWindow};

fn main() -> ExitCode {
    launch(launch_config("Input Window", input_window_frame()), InputWindow)
}
