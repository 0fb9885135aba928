use std::path::PathBuf;

use geom_kernel::KernelError;

/// Errors while turning a built assembly into files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("mesh tolerance must be positive, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },

    #[error("{name}: mesh has no triangles")]
    EmptyMesh { name: String },

    #[error("{name}: index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange {
        name: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("{name}: tessellation failed: {source}")]
    Tessellation {
        name: String,
        #[source]
        source: KernelError,
    },

    #[error("{name}: STEP export failed: {source}")]
    Step {
        name: String,
        #[source]
        source: KernelError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
