use geom_kernel::{KernelError, KernelId, KernelSolidHandle, TopoKind};
use part_types::TopoQuery;

use crate::kernel_ext::KernelBundle;
use crate::select;
use crate::types::{OpError, OpWarning, SubPart};

/// Attempt cap for the fillet-safety search.
pub const MAX_FILLET_ATTEMPTS: usize = 100;

/// Outcome of [`find_max_fillet_radius`].
#[derive(Debug, Clone)]
pub struct FilletSearch {
    /// Accepted radius, or 0 when nothing was accepted.
    pub radius: f64,
    pub succeeded: bool,
    /// Fillet calls made, accepted or not.
    pub attempts: usize,
    /// The filleted solid, or the untouched input when the search failed.
    pub body: KernelSolidHandle,
}

/// Find the largest radius, halving from `start_radius`, at which the
/// kernel accepts a fillet on `edges`.
///
/// Stops at the first accepted candidate. A kernel that cannot fillet at
/// all ends the search as exhausted. Errors other than a rejected fillet
/// are propagated.
pub fn find_max_fillet_radius(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    start_radius: f64,
    max_iterations: usize,
) -> Result<FilletSearch, OpError> {
    if !(start_radius > 0.0) || !start_radius.is_finite() {
        return Err(OpError::InvalidParameter {
            reason: format!("fillet search needs a positive start radius, got {}", start_radius),
        });
    }
    if edges.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "fillet search needs at least one edge".to_string(),
        });
    }

    let mut candidate = start_radius;
    let mut attempts = 0;
    while attempts < max_iterations {
        attempts += 1;
        match kb.fillet_edges(solid, edges, candidate) {
            Ok(body) => {
                tracing::debug!(radius = candidate, attempts, "fillet accepted");
                return Ok(FilletSearch {
                    radius: candidate,
                    succeeded: true,
                    attempts,
                    body,
                });
            }
            Err(KernelError::FilletFailed { reason }) => {
                tracing::debug!(radius = candidate, %reason, "fillet rejected");
                candidate /= 2.0;
            }
            Err(KernelError::NotSupported { operation }) => {
                tracing::debug!(%operation, "kernel cannot fillet");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(FilletSearch {
        radius: 0.0,
        succeeded: false,
        attempts,
        body: solid.clone(),
    })
}

/// Run the search on a sub-part, keeping the unfilleted solid and
/// recording a warning when it is exhausted.
pub fn fillet_with_search(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    edges: &[KernelId],
    start_radius: f64,
    max_iterations: usize,
) -> Result<(SubPart, FilletSearch), OpError> {
    let search = find_max_fillet_radius(kb, &part.solid, edges, start_radius, max_iterations)?;
    let mut part = part.with_solid(search.body.clone());
    if !search.succeeded {
        tracing::warn!(
            start_radius,
            attempts = search.attempts,
            "fillet search exhausted, edges left sharp"
        );
        part.warn(OpWarning::FilletSearchExhausted {
            start_radius,
            attempts: search.attempts,
        });
    }
    Ok((part, search))
}

/// Fillet the edges a query selects at a fixed radius.
///
/// A kernel without fillet support leaves the edges sharp with a warning.
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    edges: &TopoQuery,
    radius: f64,
) -> Result<SubPart, OpError> {
    if radius <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "fillet radius must be positive".to_string(),
        });
    }
    let ids = select::query(kb.as_introspect(), &part.solid, TopoKind::Edge, edges);
    if ids.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "fillet query matched no edges".to_string(),
        });
    }
    match kb.fillet_edges(&part.solid, &ids, radius) {
        Ok(handle) => Ok(part.with_solid(handle)),
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
