use std::process::ExitCode;

use trigon_engine::core::launch;
use trigon_samples::{hello_window_frame, launch_config, HelloWindow};

fn main() -> ExitCode {
    launch(launch_config("Hello Window", hello_window_frame()), HelloWindow)
}
