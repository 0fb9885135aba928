use geom_kernel::KernelSolidHandle;

use crate::kernel_ext::KernelBundle;
use crate::types::{OpError, SubPart};

/// How far a cutting tool reaches past each face it opens. Tools that end
/// exactly on a face leave coplanar contact the B-rep kernel rejects.
pub const TOOL_OVERSHOOT: f64 = 0.5;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Union,
    Subtract,
}

/// Combine `tool` into `target`. The target keeps its named faces; a
/// subtraction only cuts into them and a union only adds material.
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    target: SubPart,
    tool: &KernelSolidHandle,
    kind: BooleanKind,
) -> Result<SubPart, OpError> {
    let handle = match kind {
        BooleanKind::Union => kb.boolean_union(&target.solid, tool)?,
        BooleanKind::Subtract => kb.boolean_subtract(&target.solid, tool)?,
    };
    Ok(target.with_solid(handle))
}

/// `target` minus each tool in turn.
pub fn subtract_all(
    kb: &mut dyn KernelBundle,
    target: SubPart,
    tools: &[KernelSolidHandle],
) -> Result<SubPart, OpError> {
    tools.iter().try_fold(target, |part, tool| {
        execute_boolean(kb, part, tool, BooleanKind::Subtract)
    })
}
