use geom_kernel::{KernelError, TopoKind};
use part_types::TopoQuery;

use crate::kernel_ext::KernelBundle;
use crate::select;
use crate::types::{OpError, OpWarning, SubPart};

/// Chamfer the edges a query selects by `distance`.
///
/// A kernel without chamfer support leaves the edges sharp with a warning;
/// any other rejection fails the operation.
pub fn execute_chamfer(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    edges: &TopoQuery,
    distance: f64,
) -> Result<SubPart, OpError> {
    if distance <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "chamfer distance must be positive".to_string(),
        });
    }
    let ids = select::query(kb.as_introspect(), &part.solid, TopoKind::Edge, edges);
    if ids.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "chamfer query matched no edges".to_string(),
        });
    }

    match kb.chamfer_edges(&part.solid, &ids, distance) {
        Ok(handle) => {
            tracing::debug!(distance, edges = ids.len(), "chamfered");
            Ok(part.with_solid(handle))
        }
        Err(KernelError::NotSupported { operation }) => {
            let mut part = part;
            part.warn(OpWarning::BlendSkipped {
                operation,
                reason: format!("{} edges left sharp", ids.len()),
            });
            Ok(part)
        }
        Err(e) => Err(e.into()),
    }
}
