//! Shader build model.
//!
//! Stage units are compiled from WGSL and linked into programs. Both steps
//! report a [`BuildStatus`]; failures carry a bounded [`InfoLog`] with the
//! front end's diagnostic rendered against the source.

mod compile;
mod link;
mod status;

pub(crate) use compile::{compile_wgsl, CompiledUnit};
pub(crate) use link::{link_units, LinkedStages, StageInput};
pub use status::{BuildStatus, InfoLog, INFO_LOG_CAPACITY};

use std::fmt;

/// Pipeline stage a shader unit implements.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiles and links a vertex/fragment pair without a device.
///
/// Same checks a backend runs on `compile_shader` + `link_program`; the first
/// failing step's log is returned.
pub fn check_program(vertex: &str, fragment: &str) -> BuildStatus {
    let units = compile_wgsl(ShaderStage::Vertex, vertex)
        .and_then(|vs| compile_wgsl(ShaderStage::Fragment, fragment).map(|fs| (vs, fs)));

    match units.and_then(|(vs, fs)| link_units(Some(&vs), Some(&fs))) {
        Ok(_) => BuildStatus::Success,
        Err(log) => BuildStatus::Failed(log),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "@vertex fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 1.0); }";
    const FS: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

    #[test]
    fn valid_pair_checks_out() {
        assert_eq!(check_program(VS, FS), BuildStatus::Success);
    }

    #[test]
    fn compile_error_is_reported_before_linking() {
        let status = check_program("@vertex fn vs_main( {", FS);
        let log = status.info_log().expect("log");
        assert!(!log.is_empty());
        assert!(log.as_str().chars().count() < INFO_LOG_CAPACITY);
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        assert!(!check_program(FS, VS).is_success());
    }
}
