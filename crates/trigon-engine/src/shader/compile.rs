use super::{InfoLog, ShaderStage};

/// A stage unit that parsed and validated.
///
/// Keeps the naga IR so linking can inspect entry points and interfaces
/// without touching the GPU.
#[derive(Debug)]
pub(crate) struct CompiledUnit {
    pub stage: ShaderStage,
    pub module: naga::Module,
}

/// Parses and validates a WGSL stage unit.
///
/// The error text is the front end's diagnostic rendered against `source`.
pub(crate) fn compile_wgsl(stage: ShaderStage, source: &str) -> Result<CompiledUnit, InfoLog> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| InfoLog::new(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| InfoLog::new(e.emit_to_string(source)))?;

    log::trace!(
        "{stage} unit compiled: {} entry point(s), {} type(s)",
        module.entry_points.len(),
        module.types.len()
    );

    Ok(CompiledUnit { stage, module })
}
