//! Tessellating assemblies: one mesh per group for previews, one merged
//! mesh for STL.

use geom_kernel::RenderMesh;
use part_ops::KernelBundle;
use part_stack::Assembly;
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::stl::{write_stl, StlFormat};

/// Chordal tolerance used when the caller does not pick one.
pub const DEFAULT_MESH_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshOptions {
    pub tolerance: f64,
    pub format: StlFormat,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MESH_TOLERANCE,
            format: StlFormat::Binary,
        }
    }
}

/// A group's bodies tessellated into one mesh.
#[derive(Debug, Clone)]
pub struct PreviewMesh {
    pub label: String,
    pub mesh: RenderMesh,
}

fn check_tolerance(tolerance: f64) -> Result<(), ExportError> {
    if tolerance > 0.0 && tolerance.is_finite() {
        Ok(())
    } else {
        Err(ExportError::InvalidTolerance { tolerance })
    }
}

/// Tessellate every group of `assembly`, in group order.
pub fn preview(
    kb: &mut dyn KernelBundle,
    assembly: &Assembly,
    tolerance: f64,
) -> Result<Vec<PreviewMesh>, ExportError> {
    check_tolerance(tolerance)?;
    let mut previews = Vec::with_capacity(assembly.groups.len());
    for group in &assembly.groups {
        let mut mesh = RenderMesh::empty();
        for body in &group.bodies {
            let part = kb
                .tessellate(body, tolerance)
                .map_err(|source| ExportError::Tessellation {
                    name: format!("{}/{}", assembly.label, group.label),
                    source,
                })?;
            mesh.append(&part);
        }
        tracing::debug!(
            group = %group.label,
            triangles = mesh.triangle_count(),
            "group tessellated"
        );
        previews.push(PreviewMesh {
            label: group.label.clone(),
            mesh,
        });
    }
    Ok(previews)
}

/// Every body of `assembly` merged into one mesh.
pub fn assembly_mesh(
    kb: &mut dyn KernelBundle,
    assembly: &Assembly,
    tolerance: f64,
) -> Result<RenderMesh, ExportError> {
    let mut merged = RenderMesh::empty();
    for group in preview(kb, assembly, tolerance)? {
        merged.append(&group.mesh);
    }
    Ok(merged)
}

/// STL bytes for the whole assembly, named after its root label.
pub fn export_mesh(
    kb: &mut dyn KernelBundle,
    assembly: &Assembly,
    options: &MeshOptions,
) -> Result<Vec<u8>, ExportError> {
    let mesh = assembly_mesh(kb, assembly, options.tolerance)?;
    write_stl(&mesh, &assembly.label, options.format)
}
