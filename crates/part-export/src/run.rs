//! Building and exporting several parts in one go.
//!
//! Every part is built and exported on its own: a failure is recorded
//! against that part and the run moves on to the next one. A failed part
//! leaves no files behind.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use part_config::ParameterSet;
use part_ops::KernelBundle;
use part_stack::{build_part, Assembly, BuildError, BuildOptions, BuildWarning, PartKind};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::mesh::{export_mesh, MeshOptions, DEFAULT_MESH_TOLERANCE};
use crate::step_export::export_step;
use crate::stl::StlFormat;

/// What to write for each part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Mesh export, or `None` to skip it.
    pub stl: Option<StlFormat>,
    pub step: bool,
    pub mesh_tolerance: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stl: Some(StlFormat::Binary),
            step: true,
            mesh_tolerance: DEFAULT_MESH_TOLERANCE,
        }
    }
}

/// One rendered output file, not yet on disk.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A built part with its rendered files.
#[derive(Debug, Clone)]
pub struct PartExport {
    pub kind: PartKind,
    pub assembly: Assembly,
    pub warnings: Vec<BuildWarning>,
    pub files: Vec<ExportedFile>,
}

/// Why a part produced no output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} failed at {}: {message}", .step.as_deref().unwrap_or("parameters"))]
pub struct PartFailure {
    pub kind: PartKind,
    /// The construction or export step, when there is one.
    pub step: Option<String>,
    pub message: String,
}

impl PartFailure {
    fn build(kind: PartKind, err: &BuildError) -> Self {
        Self {
            kind,
            step: err.step().map(str::to_string),
            message: err.to_string(),
        }
    }

    fn export(kind: PartKind, step: &str, err: &ExportError) -> Self {
        Self {
            kind,
            step: Some(step.to_string()),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSummary {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartReport {
    pub kind: PartKind,
    pub outcome: Result<PartSummary, PartFailure>,
}

/// Per-part outcomes of a run, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub parts: Vec<PartReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.parts.iter().filter(|p| p.outcome.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PartFailure> {
        self.parts.iter().filter_map(|p| p.outcome.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.parts.iter().all(|p| p.outcome.is_ok())
    }

    pub fn part(&self, kind: PartKind) -> Option<&PartReport> {
        self.parts.iter().find(|p| p.kind == kind)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.parts.len() - self.succeeded();
        writeln!(f, "{} built, {} failed", self.succeeded(), failed)?;
        for part in &self.parts {
            match &part.outcome {
                Ok(summary) => {
                    writeln!(f, "  {}: ok", part.kind)?;
                    for file in &summary.files {
                        writeln!(f, "      {}", file.display())?;
                    }
                    for warning in &summary.warnings {
                        writeln!(f, "      warning: {}", warning)?;
                    }
                }
                Err(failure) => writeln!(f, "  {}: FAILED {}", part.kind, failure)?,
            }
        }
        Ok(())
    }
}

/// Build `kind` and render the outputs `options` asks for, in memory.
pub fn export_part(
    kb: &mut dyn KernelBundle,
    kind: PartKind,
    params: &ParameterSet,
    build: &BuildOptions,
    options: &RunOptions,
) -> Result<PartExport, PartFailure> {
    let output = build_part(kb, kind, params, build).map_err(|e| PartFailure::build(kind, &e))?;

    let mut files = Vec::new();
    if let Some(format) = options.stl {
        let mesh = MeshOptions {
            tolerance: options.mesh_tolerance,
            format,
        };
        let bytes = export_mesh(kb, &output.assembly, &mesh)
            .map_err(|e| PartFailure::export(kind, "mesh export", &e))?;
        files.push(ExportedFile {
            name: format!("{}.stl", kind.slug()),
            bytes,
        });
    }
    if options.step {
        let name = format!("{}.step", kind.slug());
        let text = export_step(kb, &output.assembly, &name)
            .map_err(|e| PartFailure::export(kind, "STEP export", &e))?;
        files.push(ExportedFile {
            name,
            bytes: text.into_bytes(),
        });
    }

    Ok(PartExport {
        kind,
        assembly: output.assembly,
        warnings: output.warnings,
        files,
    })
}

/// Build and export each of `parts` into `out_dir`, independently.
#[tracing::instrument(skip_all, fields(parts = parts.len(), out_dir = %out_dir.display()))]
pub fn run(
    kb: &mut dyn KernelBundle,
    parts: &[PartKind],
    params: &ParameterSet,
    build: &BuildOptions,
    options: &RunOptions,
    out_dir: &Path,
) -> RunReport {
    let mut report = RunReport::default();
    for &kind in parts {
        let outcome = export_part(kb, kind, params, build, options).and_then(|export| {
            let files = write_files(kind, &export.files, out_dir)?;
            Ok(PartSummary {
                files,
                warnings: export.warnings,
            })
        });
        match &outcome {
            Ok(summary) => tracing::info!(
                part = %kind,
                files = summary.files.len(),
                warnings = summary.warnings.len(),
                "part exported"
            ),
            Err(failure) => tracing::warn!(
                part = %kind,
                step = failure.step.as_deref().unwrap_or("parameters"),
                error = %failure.message,
                "part failed"
            ),
        }
        report.parts.push(PartReport { kind, outcome });
    }
    report
}

/// Write all of a part's files, or none of them.
fn write_files(
    kind: PartKind,
    files: &[ExportedFile],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PartFailure> {
    let failed = |path: &Path, source| {
        PartFailure::export(
            kind,
            "write",
            &ExportError::Io {
                path: path.to_path_buf(),
                source,
            },
        )
    };

    fs::create_dir_all(out_dir).map_err(|e| failed(out_dir, e))?;
    let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
    for file in files {
        let path = out_dir.join(&file.name);
        if let Err(e) = fs::write(&path, &file.bytes) {
            let _ = fs::remove_file(&path);
            for done in &written {
                let _ = fs::remove_file(done);
            }
            return Err(failed(&path, e));
        }
        written.push(path);
    }
    Ok(written)
}
