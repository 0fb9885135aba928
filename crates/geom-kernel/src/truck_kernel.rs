//! TruckKernel: the Kernel traits on top of truck's B-rep modeling API.

use crate::primitives;
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::panic::{catch_unwind, AssertUnwindSafe};

// Import truck types selectively to avoid shadowing std::result::Result
use truck_meshalgo::analyzers::CalcVolume;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};
use truck_modeling::builder;
use truck_modeling::topology::{Face, Shell, Solid, Wire};
use truck_modeling::{InnerSpace, Matrix4, Point3, Rad, Vector3, Vector4};
use truck_stepio::out::{CompleteStepDisplay, StepHeaderDescriptor, StepModel};

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOL: f64 = 0.05;
/// Mesh tolerance for orientation and contact checks; only signs and
/// coarse extents are read from these meshes.
const COARSE_MESH_TOL: f64 = 0.1;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Standalone faces created by make_profile_face, awaiting a sweep.
    standalone_faces: HashMap<u64, (Face, Frame)>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    fn solid(&self, handle: &KernelSolidHandle) -> Result<&Solid, KernelError> {
        self.get_solid(handle).ok_or(KernelError::EntityNotFound {
            id: KernelId(handle.id()),
        })
    }

    fn take_face(&mut self, face: KernelId) -> Result<(Face, Frame), KernelError> {
        self.standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn to_matrix(frame: &Frame) -> Matrix4 {
    let c = frame.to_columns();
    let col = |i: usize| Vector4::new(c[i][0], c[i][1], c[i][2], c[i][3]);
    Matrix4::from_cols(col(0), col(1), col(2), col(3))
}

fn cap_error<E: std::fmt::Display>(e: E) -> KernelError {
    KernelError::LoftFailed {
        reason: format!("cap: {}", e),
    }
}

/// Closed shell from loft sides plus caps. truck's homotopy faces may come
/// out facing inwards, so the flipped set is tried before giving up.
fn close_loft(sides: Vec<Face>, bottom: Face, top: Face) -> Result<Solid, KernelError> {
    let shell_of = |sides: &[Face]| -> Shell {
        let mut faces = vec![bottom.clone(), top.clone()];
        faces.extend(sides.iter().cloned());
        faces.into()
    };
    if let Ok(solid) = Solid::try_new(vec![shell_of(&sides)]) {
        return Ok(solid);
    }
    let flipped: Vec<Face> = sides.iter().map(|f| f.inverse()).collect();
    Solid::try_new(vec![shell_of(&flipped)]).map_err(|e| KernelError::LoftFailed {
        reason: format!("loft shell is not a closed solid: {}", e),
    })
}

/// The boundary minus its edge on the axis, so that it starts and ends on
/// the axis. `None` when no edge lies on the axis.
fn lathe_wire(face: &Face, origin: Point3, axis: Vector3) -> Option<Wire> {
    let boundaries = face.boundaries();
    let [wire] = boundaries.as_slice() else {
        return None;
    };
    let on_axis = |p: Point3| (p - origin).cross(axis).magnitude() < 1e-9;
    let n = wire.len();
    let k = (0..n).find(|&k| on_axis(wire[k].front().point()) && on_axis(wire[k].back().point()))?;
    Some((1..n).map(|i| wire[(k + i) % n].clone()).collect())
}

fn signed_volume(solid: &Solid, tolerance: f64) -> f64 {
    solid.triangulation(tolerance).to_polygon().volume()
}

fn mesh_bounds(solid: &Solid) -> ([f64; 3], [f64; 3]) {
    let mesh = solid.triangulation(COARSE_MESH_TOL).to_polygon();
    mesh.positions().iter().fold(
        ([f64::INFINITY; 3], [f64::NEG_INFINITY; 3]),
        |(mut lo, mut hi), p| {
            for k in 0..3 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
            (lo, hi)
        },
    )
}

/// Two solids share no volume when their bounds overlap by at most the
/// boolean tolerance along some axis.
fn at_most_touching(a: &Solid, b: &Solid) -> bool {
    let (lo_a, hi_a) = mesh_bounds(a);
    let (lo_b, hi_b) = mesh_bounds(b);
    (0..3).any(|k| hi_a[k].min(hi_b[k]) - lo_a[k].max(lo_b[k]) <= BOOLEAN_TOL)
}

/// Run one of truck's boolean operations. Both a missing result and a
/// panic inside truck come back as `BooleanFailed`.
fn guarded<F>(operation: &str, op: F) -> Result<Solid, KernelError>
where
    F: FnOnce() -> Option<Solid>,
{
    match catch_unwind(AssertUnwindSafe(op)) {
        Ok(Some(solid)) => Ok(solid),
        Ok(None) => Err(KernelError::BooleanFailed {
            reason: format!("truck {}() returned None", operation),
        }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(operation, %message, "truck panicked in a boolean");
            Err(KernelError::BooleanFailed {
                reason: format!("truck {}() panicked: {}", operation, message),
            })
        }
    }
}

impl Kernel for TruckKernel {
    fn make_profile_face(
        &mut self,
        profile: &Profile,
        frame: &Frame,
    ) -> Result<KernelId, KernelError> {
        check_profile(profile)?;
        let face = primitives::profile_face(profile, frame)
            .map_err(|reason| KernelError::InvalidProfile { reason })?;
        let face_id = self.alloc_id();
        self.standalone_faces.insert(face_id.0, (face, *frame));
        Ok(face_id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let (truck_face, frame) = self.take_face(face)?;
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(KernelError::Other {
                message: format!("extrude depth must be positive, got {}", depth),
            });
        }
        let z = frame.z_axis();
        let sweep_vec = Vector3::new(z[0], z[1], z[2]) * depth;

        let solid = builder::tsweep(&truck_face, sweep_vec);
        Ok(self.store_solid(solid))
    }

    fn loft(&mut self, sections: &[LoftSection]) -> Result<KernelSolidHandle, KernelError> {
        if sections.len() < 2 {
            return Err(KernelError::LoftFailed {
                reason: format!("need at least two sections, got {}", sections.len()),
            });
        }
        for s in sections {
            check_profile(&s.profile)?;
            if !s.profile.holes.is_empty() {
                return Err(KernelError::NotSupported {
                    operation: "loft through sections with holes".to_string(),
                });
            }
        }
        let segments = sections[0].profile.boundary.segment_count();
        if sections
            .iter()
            .any(|s| s.profile.boundary.segment_count() != segments)
        {
            return Err(KernelError::LoftFailed {
                reason: "sections have different segment counts".to_string(),
            });
        }

        let wires: Vec<_> = sections
            .iter()
            .map(|s| primitives::curve_wire(&s.profile.boundary, &s.frame))
            .collect();

        let mut sides: Vec<Face> = Vec::new();
        for pair in wires.windows(2) {
            let band = builder::try_wire_homotopy(&pair[0], &pair[1]).map_err(|e| {
                KernelError::LoftFailed {
                    reason: e.to_string(),
                }
            })?;
            sides.extend(band.face_iter().cloned());
        }

        let bottom = builder::try_attach_plane(&[wires[0].inverse()]).map_err(cap_error)?;
        let top =
            builder::try_attach_plane(&[wires[wires.len() - 1].clone()]).map_err(cap_error)?;

        let solid = close_loft(sides, bottom, top)?;
        Ok(self.store_solid(solid))
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let (truck_face, _) = self.take_face(face)?;

        let origin = Point3::new(axis_origin[0], axis_origin[1], axis_origin[2]);
        let axis = Vector3::new(axis_direction[0], axis_direction[1], axis_direction[2]);
        if axis.magnitude() < 1e-12 {
            return Err(KernelError::Other {
                message: "revolve axis has zero length".to_string(),
            });
        }
        if !angle.is_finite() || angle.abs() < 1e-12 {
            return Err(KernelError::Other {
                message: "revolve angle must be non-zero".to_string(),
            });
        }

        let axis = axis.normalize();
        if let Some(open) = lathe_wire(&truck_face, origin, axis) {
            if angle.abs() < TAU - 1e-9 {
                return Err(KernelError::NotSupported {
                    operation: "partial revolve of a profile lying on its axis".to_string(),
                });
            }
            // cone() closes the poles instead of leaving degenerate edges
            let shell = builder::cone(&open, axis, Rad(TAU));
            let mut solid = Solid::try_new(vec![shell]).map_err(|e| KernelError::Other {
                message: format!("turned profile is not a closed solid: {}", e),
            })?;
            if signed_volume(&solid, COARSE_MESH_TOL) < 0.0 {
                solid.not();
            }
            return Ok(self.store_solid(solid));
        }

        let solid = builder::rsweep(&truck_face, origin, axis, Rad(angle));
        Ok(self.store_solid(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?.clone();
        let solid_b = self.solid(b)?.clone();

        // truck cannot merge faces in contact; such solids stay separate
        // shells of one solid
        if at_most_touching(&solid_a, &solid_b) {
            tracing::debug!("solids share no volume, joined as separate shells");
            let shells: Vec<Shell> = solid_a
                .into_boundaries()
                .into_iter()
                .chain(solid_b.into_boundaries())
                .collect();
            let joined = Solid::try_new(shells).map_err(|e| KernelError::BooleanFailed {
                reason: format!("joined shells: {}", e),
            })?;
            return Ok(self.store_solid(joined));
        }

        let result = guarded("or", || truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOL))?;
        Ok(self.store_solid(result))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?.clone();
        let mut solid_b = self.solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = guarded("and", || truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOL))?;
        Ok(self.store_solid(result))
    }

    fn fillet_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet_edges".to_string(),
        })
    }

    fn chamfer_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _distance: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "chamfer_edges".to_string(),
        })
    }

    fn transform_solid(
        &mut self,
        solid: &KernelSolidHandle,
        placement: &Frame,
    ) -> Result<KernelSolidHandle, KernelError> {
        let moved = builder::transformed(self.solid(solid)?, to_matrix(placement));
        Ok(self.store_solid(moved))
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        let truck_solid = self.solid(solid)?;
        tessellation::tessellate_solid(truck_solid, solid.id(), tolerance)
    }

    fn export_step(
        &mut self,
        solids: &[KernelSolidHandle],
        file_name: &str,
    ) -> Result<String, KernelError> {
        let mut faces: Vec<Face> = Vec::new();
        for handle in solids {
            for shell in self.solid(handle)?.boundaries() {
                faces.extend(shell.face_iter().cloned());
            }
        }
        if faces.is_empty() {
            return Err(KernelError::ExportFailed {
                reason: "no faces to export".to_string(),
            });
        }

        let shell: Shell = faces.into();
        let compressed = shell.compress();
        let step = CompleteStepDisplay::new(
            StepModel::from(&compressed),
            StepHeaderDescriptor {
                file_name: file_name.to_owned(),
                organization_system: "funnel-parts part-export".to_owned(),
                ..Default::default()
            },
        )
        .to_string();
        tracing::debug!(file_name, bytes = step.len(), "serialized STEP");
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KernelIntrospect;

    fn hex_prism(kernel: &mut TruckKernel) -> KernelSolidHandle {
        let face = kernel
            .make_profile_face(
                &Profile::new(ClosedCurve::regular_polygon(10.0, 6)),
                &Frame::identity(),
            )
            .unwrap();
        kernel.extrude_face(face, 5.0).unwrap()
    }

    #[test]
    fn test_truck_kernel_extrude_hexagon() {
        let mut kernel = TruckKernel::new();
        let handle = hex_prism(&mut kernel);

        let solid = kernel.get_solid(&handle).unwrap();
        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1);
        let faces: Vec<_> = boundaries[0].face_iter().collect();
        assert_eq!(faces.len(), 8, "Extruded hexagon should have 8 faces");
    }

    #[test]
    fn test_truck_kernel_extrude_follows_frame() {
        let mut kernel = TruckKernel::new();
        let frame = Frame::from_origin_normal([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]).unwrap();
        let face = kernel
            .make_profile_face(&Profile::new(ClosedCurve::regular_polygon(2.0, 4)), &frame)
            .unwrap();
        let handle = kernel.extrude_face(face, 3.0).unwrap();
        let solid = kernel.get_solid(&handle).unwrap();
        let max_x = solid.boundaries()[0]
            .vertex_iter()
            .map(|v| v.point()[0])
            .fold(f64::MIN, f64::max);
        assert!((max_x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_truck_kernel_rejects_bad_profile() {
        let mut kernel = TruckKernel::new();
        let bad = Profile::new(ClosedCurve::circle(1.0)).with_hole(ClosedCurve::circle(2.0));
        assert!(matches!(
            kernel.make_profile_face(&bad, &Frame::identity()),
            Err(KernelError::InvalidProfile { .. })
        ));
    }

    #[test]
    fn test_truck_kernel_transform_copies() {
        let mut kernel = TruckKernel::new();
        let handle = hex_prism(&mut kernel);
        let moved = kernel
            .transform_solid(&handle, &Frame::translation(0.0, 0.0, 10.0))
            .unwrap();
        let min_z = kernel.get_solid(&moved).unwrap().boundaries()[0]
            .vertex_iter()
            .map(|v| v.point()[2])
            .fold(f64::MAX, f64::min);
        assert!((min_z - 10.0).abs() < 1e-9);
        assert!(!kernel.list_faces(&handle).is_empty());
    }

    #[test]
    fn test_truck_kernel_fillet_not_supported() {
        let mut kernel = TruckKernel::new();
        let handle = hex_prism(&mut kernel);
        let edges = kernel.list_edges(&handle);
        assert!(matches!(
            kernel.fillet_edges(&handle, &edges, 0.5),
            Err(KernelError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_truck_kernel_tessellate_covers_indices() {
        let mut kernel = TruckKernel::new();
        let handle = hex_prism(&mut kernel);

        let mesh = kernel.tessellate(&handle, 0.1).unwrap();
        assert!(!mesh.vertices.is_empty(), "Mesh should have vertices");
        assert_eq!(mesh.face_ranges.len(), 8);

        let covered: u32 = mesh
            .face_ranges
            .iter()
            .map(|r| r.end_index - r.start_index)
            .sum();
        assert_eq!(covered, mesh.indices.len() as u32);
    }

    #[test]
    fn test_truck_kernel_lathe_faces_outward() {
        let mut kernel = TruckKernel::new();
        // disc, cone, cylinder, disc about Z
        let profile = Profile::new(ClosedCurve::Polyline {
            points: vec![[0.0, 0.0], [3.0, 0.0], [2.0, 1.0], [2.0, 4.0], [0.0, 4.0]],
        });
        let upright =
            Frame::rotation_about([0.0; 3], [1.0, 0.0, 0.0], std::f64::consts::FRAC_PI_2).unwrap();
        let face = kernel.make_profile_face(&profile, &upright).unwrap();
        let handle = kernel
            .revolve_face(face, [0.0; 3], [0.0, 0.0, 1.0], TAU)
            .unwrap();

        let pi = std::f64::consts::PI;
        let expected = pi * (9.0 + 6.0 + 4.0) / 3.0 + pi * 4.0 * 3.0;
        let volume = signed_volume(kernel.get_solid(&handle).unwrap(), 0.005);
        assert!((volume - expected).abs() < 0.03 * expected, "volume {}", volume);
    }

    #[test]
    fn test_truck_kernel_lathe_needs_a_full_turn() {
        let mut kernel = TruckKernel::new();
        let profile = Profile::new(ClosedCurve::Polyline {
            points: vec![[0.0, 0.0], [2.0, 0.0], [2.0, 3.0], [0.0, 3.0]],
        });
        let upright =
            Frame::rotation_about([0.0; 3], [1.0, 0.0, 0.0], std::f64::consts::FRAC_PI_2).unwrap();
        let face = kernel.make_profile_face(&profile, &upright).unwrap();
        assert!(matches!(
            kernel.revolve_face(face, [0.0; 3], [0.0, 0.0, 1.0], 1.0),
            Err(KernelError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_truck_kernel_drill_through_both_caps() {
        let mut kernel = TruckKernel::new();
        let block = hex_prism(&mut kernel);
        let face = kernel
            .make_profile_face(
                &Profile::new(ClosedCurve::circle(2.0)),
                &Frame::translation(0.0, 0.0, -1.0),
            )
            .unwrap();
        let drill = kernel.extrude_face(face, 7.0).unwrap();
        let holed = kernel.boolean_subtract(&block, &drill).unwrap();

        let solid = kernel.get_solid(&holed).unwrap();
        let before = signed_volume(kernel.get_solid(&block).unwrap(), 0.01);
        let after = signed_volume(solid, 0.01);
        let bore = std::f64::consts::PI * 4.0 * 5.0;
        assert!((before - after - bore).abs() < 0.05 * bore, "removed {}", before - after);
    }

    #[test]
    fn test_truck_kernel_stacked_prisms_stay_two_shells() {
        let mut kernel = TruckKernel::new();
        let lower = hex_prism(&mut kernel);
        let upper = kernel
            .transform_solid(&lower, &Frame::translation(0.0, 0.0, 5.0))
            .unwrap();
        let joined = kernel.boolean_union(&lower, &upper).unwrap();
        assert_eq!(kernel.get_solid(&joined).unwrap().boundaries().len(), 2);
        assert_eq!(kernel.tessellate(&joined, 0.1).unwrap().face_ranges.len(), 16);
    }

    #[test]
    fn test_truck_kernel_export_step_header() {
        let mut kernel = TruckKernel::new();
        let handle = hex_prism(&mut kernel);
        let step = kernel.export_step(&[handle], "hex.step").unwrap();
        assert!(step.contains("ISO-10303-21"));
        assert!(step.contains("hex.step"));
    }
}
