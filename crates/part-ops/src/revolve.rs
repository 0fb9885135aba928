use geom_kernel::{Profile, TopoKind};
use part_types::{FaceName, Frame};

use crate::kernel_ext::KernelBundle;
use crate::select::face_frame;
use crate::types::{FaceRegistry, OpError, SubPart};

/// Revolve a profile laid on `frame` by `angle` radians about an axis in
/// the profile plane.
///
/// For a partial turn the start cap (the original profile position) is
/// registered as `Bottom` and the end cap as `Top`. A full turn has no caps.
pub fn execute_revolve(
    kb: &mut dyn KernelBundle,
    profile: &Profile,
    frame: &Frame,
    axis_origin: [f64; 3],
    axis_direction: [f64; 3],
    angle: f64,
) -> Result<SubPart, OpError> {
    let face = kb.make_profile_face(profile, frame)?;
    let handle = kb.revolve_face(face, axis_origin, axis_direction, angle)?;

    let c = profile.center();
    let start = frame.transform_point([c[0], c[1], 0.0]);
    let mut caps: Vec<(Frame, f64)> = kb
        .as_introspect()
        .compute_all_signatures(&handle, TopoKind::Face)
        .into_iter()
        .filter(|(_, sig)| sig.is_type("planar"))
        .filter_map(|(_, sig)| {
            let f = face_frame(&sig)?;
            let o = f.origin();
            let d2 = (o[0] - start[0]).powi(2) + (o[1] - start[1]).powi(2) + (o[2] - start[2]).powi(2);
            Some((f, d2))
        })
        .collect();
    caps.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut faces = FaceRegistry::new();
    if let [(bottom, _), (top, _)] = caps.as_slice() {
        faces.register(FaceName::Bottom, *bottom);
        faces.register(FaceName::Top, *top);
    }
    tracing::debug!(angle, caps = caps.len(), "revolved profile");
    Ok(SubPart::new(handle, faces))
}
