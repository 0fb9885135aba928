use part_ops::KernelBundle;
use part_stack::Assembly;

use crate::errors::ExportError;

/// Export every body of `assembly` as one STEP document.
///
/// Boundary export takes no tolerance. Kernels that cannot write some body
/// (thread bodies are the usual case) fail the whole document.
pub fn export_step(
    kb: &mut dyn KernelBundle,
    assembly: &Assembly,
    file_name: &str,
) -> Result<String, ExportError> {
    let bodies: Vec<_> = assembly.bodies().cloned().collect();
    let step = kb
        .export_step(&bodies, file_name)
        .map_err(|source| ExportError::Step {
            name: assembly.label.clone(),
            source,
        })?;
    tracing::debug!(
        part = %assembly.label,
        bodies = bodies.len(),
        bytes = step.len(),
        "STEP written"
    );
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_kernel::{ClosedCurve, Frame, Kernel, KernelError, MockKernel, Profile};
    use part_stack::assemble;

    #[test]
    fn one_entity_per_body() {
        let mut kb = MockKernel::new();
        let mut pairs = Vec::new();
        for label in ["a", "a", "b"] {
            let face = kb
                .make_profile_face(&Profile::new(ClosedCurve::circle(1.0)), &Frame::identity())
                .unwrap();
            pairs.push((label.to_string(), kb.extrude_face(face, 1.0).unwrap()));
        }
        let assembly = assemble("root", pairs);

        let step = export_step(&mut kb, &assembly, "root.step").unwrap();
        assert!(step.starts_with("ISO-10303-21;"));
        assert!(step.contains("FILE_NAME('root.step')"));
        assert_eq!(step.matches("MOCK_SOLID").count(), 3);
    }

    #[test]
    fn empty_assembly_is_reported() {
        let mut kb = MockKernel::new();
        let assembly = assemble("root", Vec::new());
        match export_step(&mut kb, &assembly, "root.step") {
            Err(ExportError::Step { name, source }) => {
                assert_eq!(name, "root");
                assert!(matches!(source, KernelError::ExportFailed { .. }));
            }
            other => panic!("expected a STEP error, got {:?}", other),
        }
    }
}
