//! STL from a RenderMesh, binary and ASCII.
//!
//! Facet normals are recomputed from the winding; the per-vertex normals
//! of the mesh are ignored.

use geom_kernel::RenderMesh;
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;

/// STL flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

/// Encode `mesh` in `format`. ASCII output is returned as its UTF-8 bytes.
pub fn write_stl(mesh: &RenderMesh, name: &str, format: StlFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        StlFormat::Binary => write_binary_stl(mesh, name),
        StlFormat::Ascii => write_ascii_stl(mesh, name).map(String::into_bytes),
    }
}

/// Binary STL:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - per triangle: 3×f32 normal, 3×(3×f32) vertices, u16 attribute = 50 bytes
pub fn write_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let tri_count = check_mesh(mesh, name)?;
    let mut buf = Vec::with_capacity(80 + 4 + tri_count * 50);

    let header = format!("binary STL: {}", name);
    let header = header.as_bytes();
    buf.extend_from_slice(&header[..header.len().min(80)]);
    buf.resize(80, 0u8);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for tri in mesh.indices.chunks_exact(3) {
        let corners = [
            vertex(mesh, tri[0]),
            vertex(mesh, tri[1]),
            vertex(mesh, tri[2]),
        ];
        for c in facet_normal(&corners) {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for corner in corners {
            for c in corner {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

pub fn write_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let tri_count = check_mesh(mesh, name)?;
    let mut out = String::with_capacity(tri_count * 300);
    out.push_str(&format!("solid {}\n", name));

    for tri in mesh.indices.chunks_exact(3) {
        let corners = [
            vertex(mesh, tri[0]),
            vertex(mesh, tri[1]),
            vertex(mesh, tri[2]),
        ];
        let [nx, ny, nz] = facet_normal(&corners);
        out.push_str(&format!("  facet normal {} {} {}\n", nx, ny, nz));
        out.push_str("    outer loop\n");
        for [x, y, z] in corners {
            out.push_str(&format!("      vertex {} {} {}\n", x, y, z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {}\n", name));
    Ok(out)
}

/// Triangle count, once every index is known to be in range.
fn check_mesh(mesh: &RenderMesh, name: &str) -> Result<usize, ExportError> {
    let tri_count = mesh.indices.len() / 3;
    if tri_count == 0 {
        return Err(ExportError::EmptyMesh {
            name: name.to_string(),
        });
    }
    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ExportError::IndexOutOfRange {
            name: name.to_string(),
            index,
            vertex_count,
        });
    }
    Ok(tri_count)
}

fn vertex(mesh: &RenderMesh, index: u32) -> [f32; 3] {
    let i = index as usize * 3;
    [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
}

/// Unit normal by the right-hand rule; +Z for degenerate triangles.
fn facet_normal([p0, p1, p2]: &[[f32; 3]; 3]) -> [f32; 3] {
    let a = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let b = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    let n = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}
