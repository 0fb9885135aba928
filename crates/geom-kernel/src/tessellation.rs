//! Tessellation wrapper with face-range metadata.
//!
//! Wraps truck-meshalgo to produce a RenderMesh whose FaceRange entries
//! carry the same face ids the introspection layer hands out.

use crate::truck_introspect::face_id;
use crate::types::*;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck Solid into a RenderMesh with per-face tracking.
pub fn tessellate_solid(
    solid: &TruckSolid,
    handle_id: u64,
    tolerance: f64,
) -> std::result::Result<RenderMesh, KernelError> {
    if !(tolerance > 0.0) {
        return Err(KernelError::TessellationFailed {
            reason: format!("tolerance must be positive, got {}", tolerance),
        });
    }
    let meshed_solid = solid.triangulation(tolerance);

    let mut mesh = RenderMesh::empty();
    let mut face_index = 0usize;

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let id = face_id(handle_id, face_index);
            face_index += 1;

            // Each meshed face's surface is Option<PolygonMesh>
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(mut face_mesh) = maybe_mesh else {
                tracing::warn!(face = face_index - 1, "face failed to triangulate");
                continue;
            };
            if !face.orientation() {
                face_mesh.invert();
            }

            let start_index = mesh.indices.len() as u32;
            let base_vertex = (mesh.vertices.len() / 3) as u32;

            let positions = face_mesh.positions();
            let normals = face_mesh.normals();

            for pos in positions {
                mesh.vertices
                    .extend_from_slice(&[pos[0] as f32, pos[1] as f32, pos[2] as f32]);
            }
            // Normals are indexed separately from positions; copy per position
            // when the counts line up, otherwise leave flat placeholders.
            if normals.len() == positions.len() {
                for n in normals {
                    mesh.normals
                        .extend_from_slice(&[n[0] as f32, n[1] as f32, n[2] as f32]);
                }
            } else {
                for _ in 0..positions.len() {
                    mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
                }
            }

            for tri in face_mesh.tri_faces() {
                for v in tri.iter() {
                    mesh.indices.push(v.pos as u32 + base_vertex);
                }
            }

            let end_index = mesh.indices.len() as u32;
            if end_index > start_index {
                mesh.face_ranges.push(FaceRange {
                    face_id: id,
                    start_index,
                    end_index,
                });
            }
        }
    }

    if mesh.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }
    Ok(mesh)
}
