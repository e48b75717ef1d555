use naga::{Binding, Handle, Module, Type, TypeInner};

use super::{CompiledUnit, InfoLog, ShaderStage};

/// A vertex-stage input declared with `@location`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct StageInput {
    pub location: u32,
    /// 1 for scalars, 2..=4 for vectors.
    pub components: u8,
    /// True for 32-bit float scalars/vectors.
    pub float32: bool,
}

/// Outcome of a successful link: entry points plus the vertex input interface
/// a vertex layout has to satisfy.
#[derive(Debug, Clone)]
pub(crate) struct LinkedStages {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub vertex_inputs: Vec<StageInput>,
}

#[derive(Debug, Clone, PartialEq)]
struct Varying {
    location: u32,
    ty: TypeInner,
}

/// Links a vertex and a fragment unit.
///
/// Fails when a unit is missing or belongs to the wrong stage, when a stage
/// has no entry point, or when the fragment stage reads a location the
/// vertex stage does not write with the same type.
pub(crate) fn link_units(
    vertex: Option<&CompiledUnit>,
    fragment: Option<&CompiledUnit>,
) -> Result<LinkedStages, InfoLog> {
    let vertex = require_unit(vertex, ShaderStage::Vertex)?;
    let fragment = require_unit(fragment, ShaderStage::Fragment)?;

    let vs = entry_point(vertex)?;
    let fs = entry_point(fragment)?;

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_varyings(&vertex.module, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = Vec::new();
    for arg in &fs.function.arguments {
        collect_varyings(&fragment.module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for input in &inputs {
        match outputs.iter().find(|o| o.location == input.location) {
            None => {
                return Err(InfoLog::new(format!(
                    "link error: fragment input at location {} is not written by the vertex stage",
                    input.location
                )));
            }
            Some(output) if output.ty != input.ty => {
                return Err(InfoLog::new(format!(
                    "link error: type mismatch at location {}: vertex writes {:?}, fragment reads {:?}",
                    input.location, output.ty, input.ty
                )));
            }
            Some(_) => {}
        }
    }

    let mut vertex_inputs = Vec::new();
    for arg in &vs.function.arguments {
        let mut vars = Vec::new();
        collect_varyings(&vertex.module, arg.ty, arg.binding.as_ref(), &mut vars);
        vertex_inputs.extend(vars.iter().map(stage_input));
    }

    Ok(LinkedStages {
        vertex_entry: vs.name.clone(),
        fragment_entry: fs.name.clone(),
        vertex_inputs,
    })
}

fn require_unit(unit: Option<&CompiledUnit>, stage: ShaderStage) -> Result<&CompiledUnit, InfoLog> {
    match unit {
        None => Err(InfoLog::new(format!(
            "link error: {stage} shader unit has not been compiled successfully"
        ))),
        Some(u) if u.stage != stage => Err(InfoLog::new(format!(
            "link error: {} unit attached in the {stage} slot",
            u.stage
        ))),
        Some(u) => Ok(u),
    }
}

fn entry_point(unit: &CompiledUnit) -> Result<&naga::EntryPoint, InfoLog> {
    let stage = unit.stage.to_naga();
    unit.module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage)
        .ok_or_else(|| InfoLog::new(format!("link error: no @{} entry point", unit.stage)))
}

/// Gathers `@location` bindings of a value, descending one level into structs.
/// Builtins are skipped.
fn collect_varyings(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        out.push(Varying {
                            location: *location,
                            ty: module.types[member.ty].inner.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn stage_input(v: &Varying) -> StageInput {
    let (components, scalar) = match &v.ty {
        TypeInner::Scalar(s) => (1, Some(*s)),
        TypeInner::Vector { size, scalar } => (*size as u8, Some(*scalar)),
        _ => (0, None),
    };

    StageInput {
        location: v.location,
        components,
        float32: scalar.is_some_and(|s| s.kind == naga::ScalarKind::Float && s.width == 4),
    }
}
