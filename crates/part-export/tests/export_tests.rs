use geom_kernel::{MockKernel, TruckKernel};
use part_config::ParameterSet;
use part_export::*;
use part_stack::{BuildOptions, PartKind};

fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── Whole runs ───────────────────────────────────────────────────────────

#[test]
fn both_parts_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut kernel = MockKernel::new();
    let report = run(
        &mut kernel,
        &PartKind::ALL,
        &ParameterSet::new(),
        &BuildOptions::default(),
        &RunOptions::default(),
        dir.path(),
    );

    assert!(report.is_success(), "{}", report);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(
        files_in(dir.path()),
        vec![
            "external_fitting.step",
            "external_fitting.stl",
            "internal_funnel.step",
            "internal_funnel.stl",
        ]
    );

    let stl = std::fs::read(dir.path().join("external_fitting.stl")).unwrap();
    assert!(stl.starts_with(b"binary STL: External Fitting"));
    let triangles = u32::from_le_bytes([stl[80], stl[81], stl[82], stl[83]]) as usize;
    assert_eq!(stl.len(), 84 + triangles * 50);

    let step = std::fs::read_to_string(dir.path().join("internal_funnel.step")).unwrap();
    // base, socket thread, funnel
    assert_eq!(step.matches("MOCK_SOLID").count(), 3);
    assert!(report.to_string().starts_with("2 built, 0 failed"));
}

#[test]
fn a_failing_part_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let params = ParameterSet::new().with("funnel", "minimum_wall", 14.0);
    let mut kernel = MockKernel::new();
    let report = run(
        &mut kernel,
        &[PartKind::InternalFunnel, PartKind::ExternalFitting],
        &params,
        &BuildOptions::default(),
        &RunOptions::default(),
        dir.path(),
    );

    assert!(!report.is_success());
    assert_eq!(report.succeeded(), 1);
    let failures: Vec<&PartFailure> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, PartKind::InternalFunnel);
    assert_eq!(failures[0].step.as_deref(), Some("funnel"));

    assert_eq!(
        files_in(dir.path()),
        vec!["external_fitting.step", "external_fitting.stl"]
    );
    let text = report.to_string();
    assert!(text.contains("internal_funnel: FAILED"), "{}", text);
}

#[test]
fn bad_parameters_fail_before_any_step() {
    let dir = tempfile::tempdir().unwrap();
    let params = ParameterSet::new().with("funnel", "style", "square");
    let mut kernel = MockKernel::new();
    let report = run(
        &mut kernel,
        &[PartKind::InternalFunnel],
        &params,
        &BuildOptions::default(),
        &RunOptions::default(),
        dir.path(),
    );
    let outcome = &report.part(PartKind::InternalFunnel).unwrap().outcome;
    let failure = outcome.as_ref().unwrap_err();
    assert_eq!(failure.step.as_deref(), Some("parameters"));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn a_failed_write_removes_the_parts_other_files() {
    let dir = tempfile::tempdir().unwrap();
    // a directory where the STEP file should go
    std::fs::create_dir(dir.path().join("external_fitting.step")).unwrap();
    let mut kernel = MockKernel::new();
    let report = run(
        &mut kernel,
        &[PartKind::ExternalFitting],
        &ParameterSet::new(),
        &BuildOptions::default(),
        &RunOptions::default(),
        dir.path(),
    );

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.step.as_deref(), Some("write"));
    assert_eq!(files_in(dir.path()), vec!["external_fitting.step"]);
    assert!(dir.path().join("external_fitting.step").is_dir());
}

#[cfg(target_os = "linux")]
#[test]
fn a_file_that_fails_mid_write_is_removed() {
    let full = std::path::Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // opens fine, every write runs out of space
    std::os::unix::fs::symlink(full, dir.path().join("internal_funnel.step")).unwrap();
    let mut kernel = MockKernel::new();
    let report = run(
        &mut kernel,
        &[PartKind::InternalFunnel],
        &ParameterSet::new(),
        &BuildOptions::default(),
        &RunOptions::default(),
        dir.path(),
    );

    assert_eq!(report.succeeded(), 0);
    assert!(files_in(dir.path()).is_empty());
}

// ── Single parts ─────────────────────────────────────────────────────────

#[test]
fn ascii_mesh_without_step() {
    let mut kernel = MockKernel::new();
    let options = RunOptions {
        stl: Some(StlFormat::Ascii),
        step: false,
        ..RunOptions::default()
    };
    let export = export_part(
        &mut kernel,
        PartKind::ExternalFitting,
        &ParameterSet::new(),
        &BuildOptions::default(),
        &options,
    )
    .unwrap();

    assert_eq!(export.files.len(), 1);
    assert_eq!(export.files[0].name, "external_fitting.stl");
    let text = String::from_utf8(export.files[0].bytes.clone()).unwrap();
    assert!(text.starts_with("solid External Fitting\n"));
    assert!(text.ends_with("endsolid External Fitting\n"));
}

#[test]
fn preview_has_one_mesh_per_group() {
    let mut kernel = MockKernel::new();
    let export = export_part(
        &mut kernel,
        PartKind::InternalFunnel,
        &ParameterSet::new(),
        &BuildOptions::default(),
        &RunOptions {
            stl: None,
            step: false,
            ..RunOptions::default()
        },
    )
    .unwrap();
    assert!(export.files.is_empty());

    let meshes = preview(&mut kernel, &export.assembly, DEFAULT_MESH_TOLERANCE).unwrap();
    let labels: Vec<&str> = meshes.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["base", "filament funnel"]);
    assert!(meshes.iter().all(|m| m.mesh.triangle_count() > 0));

    let merged = assembly_mesh(&mut kernel, &export.assembly, DEFAULT_MESH_TOLERANCE).unwrap();
    let total: usize = meshes.iter().map(|m| m.mesh.triangle_count()).sum();
    assert_eq!(merged.triangle_count(), total);
}

#[test]
fn bad_tolerance_is_an_export_failure() {
    let mut kernel = MockKernel::new();
    let options = RunOptions {
        mesh_tolerance: 0.0,
        ..RunOptions::default()
    };
    let failure = export_part(
        &mut kernel,
        PartKind::ExternalFitting,
        &ParameterSet::new(),
        &BuildOptions::default(),
        &options,
    )
    .unwrap_err();
    assert_eq!(failure.step.as_deref(), Some("mesh export"));
}

// ── B-rep kernel ─────────────────────────────────────────────────────────

#[test]
fn every_part_exports_through_truck() {
    let options = RunOptions {
        mesh_tolerance: 0.05,
        ..RunOptions::default()
    };
    for kind in PartKind::ALL {
        let mut kernel = TruckKernel::new();
        let export = export_part(
            &mut kernel,
            kind,
            &ParameterSet::new(),
            &BuildOptions::default().without_labels(),
            &options,
        )
        .unwrap_or_else(|failure| panic!("{}", failure));

        let names: Vec<&str> = export.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![format!("{}.stl", kind.slug()), format!("{}.step", kind.slug())]);
        for file in &export.files {
            assert!(!file.bytes.is_empty(), "{} is empty", file.name);
        }
        let step = String::from_utf8_lossy(&export.files[1].bytes);
        assert!(step.contains("ISO-10303-21"), "{}", kind);
    }
}
