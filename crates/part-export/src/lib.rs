//! Turning built assemblies into preview meshes, STL and STEP files.

pub mod errors;
pub mod mesh;
pub mod run;
pub mod step_export;
pub mod stl;

pub use errors::ExportError;
pub use mesh::{assembly_mesh, export_mesh, preview, MeshOptions, PreviewMesh, DEFAULT_MESH_TOLERANCE};
pub use run::{
    export_part, run, ExportedFile, PartExport, PartFailure, PartReport, PartSummary, RunOptions,
    RunReport,
};
pub use step_export::export_step;
pub use stl::{write_ascii_stl, write_binary_stl, write_stl, StlFormat};
