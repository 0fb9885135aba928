use geom_kernel::{KernelIntrospect, KernelSolidHandle, LoftSection, Profile, TopoKind};
use part_types::{FaceName, Frame, SideDir};

use crate::kernel_ext::KernelBundle;
use crate::select::face_frame;
use crate::types::{FaceRegistry, OpError, SubPart};

/// Extrude a profile laid on `frame` along the frame's +Z by `depth`.
///
/// The end cap is registered as `Top`, the start cap as `Bottom`, and flat
/// sides facing a local axis direction as `Side`.
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    profile: &Profile,
    frame: &Frame,
    depth: f64,
) -> Result<SubPart, OpError> {
    if !(depth > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("extrude depth must be positive, got {}", depth),
        });
    }
    let face = kb.make_profile_face(profile, frame)?;
    let handle = kb.extrude_face(face, depth)?;
    let faces = name_faces(kb.as_introspect(), &handle, frame);
    tracing::debug!(depth, faces = faces.len(), "extruded profile");
    Ok(SubPart::new(handle, faces))
}

/// Loft through planar sections, first to last. Named like an extrusion
/// along the first section's Z.
pub fn execute_loft(kb: &mut dyn KernelBundle, sections: &[LoftSection]) -> Result<SubPart, OpError> {
    let Some(first) = sections.first() else {
        return Err(OpError::InvalidParameter {
            reason: "loft needs at least two sections".to_string(),
        });
    };
    let handle = kb.loft(sections)?;
    let faces = name_faces(kb.as_introspect(), &handle, &first.frame);
    Ok(SubPart::new(handle, faces))
}

/// Name the planar faces of a swept solid by comparing their normals
/// with the sweep frame's axes.
pub(crate) fn name_faces(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    frame: &Frame,
) -> FaceRegistry {
    let up = frame.z_axis();
    let mut face_dots: Vec<(Frame, f64, f64)> = introspect
        .compute_all_signatures(solid, TopoKind::Face)
        .into_iter()
        .filter(|(_, sig)| sig.is_type("planar"))
        .filter_map(|(_, sig)| {
            let n = sig.normal?;
            let c = sig.centroid?;
            Some((face_frame(&sig)?, dot(n, up), dot(c, up)))
        })
        .collect();

    // Descending by alignment, then by height along the sweep
    face_dots.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.2.total_cmp(&a.2)));

    let mut registry = FaceRegistry::new();
    let last = face_dots.len().saturating_sub(1);
    for (i, (face, d, _)) in face_dots.iter().enumerate() {
        if i == 0 && *d > 0.5 {
            registry.register(FaceName::Top, *face);
        } else if i == last && *d < -0.5 {
            registry.register(FaceName::Bottom, *face);
        } else if let Some(dir) = side_direction(frame, &face.z_axis()) {
            registry.register(FaceName::Side { dir }, *face);
        }
    }
    registry
}

fn side_direction(frame: &Frame, normal: &[f64; 3]) -> Option<SideDir> {
    SideDir::ALL
        .into_iter()
        .find(|dir| dot(frame.transform_vector(dir.direction()), *normal) > 1.0 - 1e-6)
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
