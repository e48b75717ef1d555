use std::process::ExitCode;

use trigon_engine::core::launch;
use trigon_samples::{launch_config, triangle_frame, Triangle};

fn main() -> ExitCode {
    launch(launch_config("Triangle", triangle_frame()), Triangle::default())
}
