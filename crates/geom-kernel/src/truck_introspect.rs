//! KernelIntrospect for TruckKernel, wrapping truck topology queries.
//!
//! Entity ids are derived from the handle and the entity's position in the
//! solid's boundary iteration: `handle * 10000 + index` for faces and
//! `handle * 10000 + 1000 + index` for deduplicated edges.

use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;
use std::collections::{HashMap, HashSet};

use truck_modeling::geometry::{Curve, Surface};
use truck_modeling::topology::{Edge, Face, Solid};
use truck_modeling::{BoundedCurve, ParameterDivision1D};
use truck_topology::EdgeID;

const ID_STRIDE: u64 = 10000;
const EDGE_OFFSET: u64 = 1000;
/// Chord tolerance for sampling edge curves.
const SAMPLE_TOL: f64 = 0.01;

pub(crate) fn face_id(handle_id: u64, index: usize) -> KernelId {
    KernelId(handle_id * ID_STRIDE + index as u64)
}

fn edge_id(handle_id: u64, index: usize) -> KernelId {
    KernelId(handle_id * ID_STRIDE + EDGE_OFFSET + index as u64)
}

/// Split an id into (handle, local index, is_edge).
fn decode(id: KernelId) -> (KernelSolidHandle, usize, bool) {
    let local = id.0 % ID_STRIDE;
    let handle = KernelSolidHandle(id.0 / ID_STRIDE);
    if local >= EDGE_OFFSET {
        (handle, (local - EDGE_OFFSET) as usize, true)
    } else {
        (handle, local as usize, false)
    }
}

fn all_faces(solid: &Solid) -> Vec<&Face> {
    solid
        .boundaries()
        .iter()
        .flat_map(|shell| shell.face_iter())
        .collect()
}

fn unique_edges(solid: &Solid) -> Vec<Edge> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for shell in solid.boundaries().iter() {
        for edge in shell.edge_iter() {
            if seen.insert(edge.id()) {
                edges.push(edge.clone());
            }
        }
    }
    edges
}

impl KernelIntrospect for TruckKernel {
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        let Some(truck_solid) = self.get_solid(solid) else {
            return Vec::new();
        };
        (0..all_faces(truck_solid).len())
            .map(|i| face_id(solid.id(), i))
            .collect()
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        let Some(truck_solid) = self.get_solid(solid) else {
            return Vec::new();
        };
        (0..unique_edges(truck_solid).len())
            .map(|i| edge_id(solid.id(), i))
            .collect()
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        let (handle, index, is_edge) = decode(face);
        if is_edge {
            return Vec::new();
        }
        let Some(truck_solid) = self.get_solid(&handle) else {
            return Vec::new();
        };
        let faces = all_faces(truck_solid);
        let Some(target) = faces.get(index) else {
            return Vec::new();
        };

        let index_of: HashMap<_, usize> = unique_edges(truck_solid)
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();
        target
            .boundaries()
            .iter()
            .flat_map(|w| w.edge_iter())
            .filter_map(|e| index_of.get(&e.id()))
            .map(|&i| edge_id(handle.id(), i))
            .collect()
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        let (handle, index, is_edge) = decode(entity);
        let Some(truck_solid) = self.get_solid(&handle) else {
            return TopoSignature::empty();
        };
        match (kind, is_edge) {
            (TopoKind::Face, false) => all_faces(truck_solid)
                .get(index)
                .map(|f| face_signature(f))
                .unwrap_or_else(TopoSignature::empty),
            (TopoKind::Edge, true) => unique_edges(truck_solid)
                .get(index)
                .map(|e| {
                    let mut sig = edge_signature(e);
                    if sig.is_type("arc") && circle_pieces(truck_solid).contains(&e.id()) {
                        sig.surface_type = Some("circle".to_string());
                    }
                    sig
                })
                .unwrap_or_else(TopoSignature::empty),
            _ => TopoSignature::empty(),
        }
    }
}

/// Arcs that together close a whole circle. truck splits full turns into
/// several arcs, which still select as one circle.
fn circle_pieces(solid: &Solid) -> HashSet<EdgeID<Curve>> {
    let same_circle = |a: &TopoSignature, b: &TopoSignature| {
        match (a.centroid, b.centroid, a.radius, b.radius) {
            (Some(c0), Some(c1), Some(r0), Some(r1)) => {
                norm(sub(c0, c1)) < 1e-6 && (r0 - r1).abs() < 1e-6
            }
            _ => false,
        }
    };
    let mut pieces = HashSet::new();
    for face in all_faces(solid) {
        for wire in face.boundaries() {
            let sigs: Vec<TopoSignature> = wire.edge_iter().map(edge_signature).collect();
            let whole = sigs.len() > 1
                && sigs.iter().all(|s| s.is_type("arc") && same_circle(s, &sigs[0]));
            if whole {
                pieces.extend(wire.edge_iter().map(|e| e.id()));
            }
        }
    }
    pieces
}

fn sample_edge(edge: &Edge) -> Vec<[f64; 3]> {
    let curve = edge.oriented_curve();
    let range = curve.range_tuple();
    let (_params, points) = curve.parameter_division(range, SAMPLE_TOL);
    points.iter().map(|p| [p[0], p[1], p[2]]).collect()
}

fn face_signature(face: &Face) -> TopoSignature {
    let surface = face.oriented_surface();
    let surface_type = classify_surface(&surface);

    // Boundary polygons, one per wire, without the repeated joint points.
    let loops: Vec<Vec<[f64; 3]>> = face
        .boundaries()
        .iter()
        .map(|wire| {
            let mut pts = Vec::new();
            for edge in wire.edge_iter() {
                let mut s = sample_edge(edge);
                s.pop();
                pts.extend(s);
            }
            pts
        })
        .collect();

    match &surface {
        Surface::Plane(plane) => {
            let n = plane.normal();
            let normal = [n[0], n[1], n[2]];
            let (centroid, area) = planar_moments(&loops, normal);
            TopoSignature {
                surface_type: Some(surface_type),
                area: Some(area),
                centroid: Some(centroid),
                normal: Some(normal),
                axis: None,
                radius: None,
                length: None,
            }
        }
        _ => {
            let pts: Vec<[f64; 3]> = loops.into_iter().flatten().collect();
            TopoSignature {
                surface_type: Some(surface_type),
                area: None,
                centroid: Some(mean(&pts)),
                normal: None,
                axis: None,
                radius: None,
                length: None,
            }
        }
    }
}

fn edge_signature(edge: &Edge) -> TopoSignature {
    let pts = sample_edge(edge);
    let length: f64 = pts.windows(2).map(|w| norm(sub(w[1], w[0]))).sum();

    let is_line = matches!(edge.oriented_curve(), Curve::Line(_));
    if is_line || pts.len() < 3 {
        let (a, b) = (pts[0], pts[pts.len() - 1]);
        return TopoSignature {
            surface_type: Some("line".to_string()),
            area: None,
            centroid: Some(scale(add(a, b), 0.5)),
            normal: None,
            axis: Some(normalize(sub(b, a))),
            radius: None,
            length: Some(length),
        };
    }

    let closed = norm(sub(pts[0], pts[pts.len() - 1])) < 1e-9;
    let k = pts.len() / 3;
    let (a, b, c) = if closed {
        (pts[0], pts[k], pts[2 * k])
    } else {
        (pts[0], pts[pts.len() / 2], pts[pts.len() - 1])
    };
    match circumcircle(a, b, c) {
        Some((center, radius, axis)) => TopoSignature {
            surface_type: Some(if closed { "circle" } else { "arc" }.to_string()),
            area: None,
            centroid: Some(center),
            normal: None,
            axis: Some(axis),
            radius: Some(radius),
            length: Some(length),
        },
        None => TopoSignature {
            surface_type: Some("nurbs".to_string()),
            area: None,
            centroid: Some(mean(&pts)),
            normal: None,
            axis: None,
            radius: None,
            length: Some(length),
        },
    }
}

fn classify_surface(surface: &Surface) -> String {
    match surface {
        Surface::Plane(_) => "planar".to_string(),
        Surface::RevolutedCurve(_) => "revolved".to_string(),
        Surface::BSplineSurface(_) => "nurbs".to_string(),
        Surface::NurbsSurface(_) => "nurbs".to_string(),
    }
}

/// Signed area and centroid of planar loops measured along `normal`.
/// Holes wind the other way and subtract.
fn planar_moments(loops: &[Vec<[f64; 3]>], normal: [f64; 3]) -> ([f64; 3], f64) {
    let mut area = 0.0;
    let mut moment = [0.0; 3];
    for pts in loops.iter().filter(|l| l.len() >= 3) {
        let origin = pts[0];
        for w in pts[1..].windows(2) {
            let tri = 0.5 * dot(cross(sub(w[0], origin), sub(w[1], origin)), normal);
            let c = scale(add(add(origin, w[0]), w[1]), 1.0 / 3.0);
            area += tri;
            moment = add(moment, scale(c, tri));
        }
    }
    if area.abs() < 1e-12 {
        let all: Vec<[f64; 3]> = loops.iter().flatten().copied().collect();
        return (mean(&all), 0.0);
    }
    (scale(moment, 1.0 / area), area.abs())
}

/// Center, radius and plane normal of the circle through three points.
fn circumcircle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Option<([f64; 3], f64, [f64; 3])> {
    let u = sub(b, a);
    let v = sub(c, a);
    let w = cross(u, v);
    let w2 = dot(w, w);
    if w2 < 1e-18 {
        return None;
    }
    let offset = scale(
        cross(sub(scale(v, dot(u, u)), scale(u, dot(v, v))), w),
        1.0 / (2.0 * w2),
    );
    Some((add(a, offset), norm(offset), normalize(w)))
}

fn mean(pts: &[[f64; 3]]) -> [f64; 3] {
    if pts.is_empty() {
        return [0.0; 3];
    }
    let sum = pts.iter().fold([0.0; 3], |acc, p| add(acc, *p));
    scale(sum, 1.0 / pts.len() as f64)
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn normalize(a: [f64; 3]) -> [f64; 3] {
    let len = norm(a);
    if len > 1e-12 {
        scale(a, 1.0 / len)
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Kernel;
    use approx::assert_relative_eq;

    fn prism(kernel: &mut TruckKernel, profile: Profile) -> KernelSolidHandle {
        let face = kernel
            .make_profile_face(&profile, &Frame::identity())
            .unwrap();
        kernel.extrude_face(face, 4.0).unwrap()
    }

    #[test]
    fn test_introspect_square_prism() {
        let mut kernel = TruckKernel::new();
        let handle = prism(&mut kernel, Profile::new(ClosedCurve::regular_polygon(2.0, 4)));

        assert_eq!(kernel.list_faces(&handle).len(), 6);
        assert_eq!(kernel.list_edges(&handle).len(), 12);
        for face in kernel.list_faces(&handle) {
            assert_eq!(kernel.face_edges(face).len(), 4);
            let sig = kernel.compute_signature(face, TopoKind::Face);
            assert_eq!(sig.surface_type.as_deref(), Some("planar"));
            assert!(sig.normal.is_some());
        }
    }

    #[test]
    fn test_top_face_centroid_and_area() {
        let mut kernel = TruckKernel::new();
        let handle = prism(&mut kernel, Profile::new(ClosedCurve::regular_polygon(2.0, 4)));

        let top = kernel
            .compute_all_signatures(&handle, TopoKind::Face)
            .into_iter()
            .map(|(_, s)| s)
            .find(|s| s.normal.is_some_and(|n| n[2] > 0.999))
            .expect("prism has an upward face");
        let c = top.centroid.unwrap();
        assert_relative_eq!(c[2], 4.0, epsilon = 1e-9);
        assert_relative_eq!(c[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(top.area.unwrap(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_edges_report_radius() {
        let mut kernel = TruckKernel::new();
        let handle = prism(&mut kernel, Profile::new(ClosedCurve::circle(3.0)));
        let radii: Vec<f64> = kernel
            .compute_all_signatures(&handle, TopoKind::Edge)
            .into_iter()
            .filter_map(|(_, s)| s.radius)
            .collect();
        assert!(!radii.is_empty());
        for r in radii {
            assert_relative_eq!(r, 3.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_split_circles_select_as_circles() {
        let mut kernel = TruckKernel::new();
        let handle = prism(&mut kernel, Profile::new(ClosedCurve::circle(3.0)));
        let types: Vec<String> = kernel
            .compute_all_signatures(&handle, TopoKind::Edge)
            .into_iter()
            .filter_map(|(_, s)| s.radius.and(s.surface_type))
            .collect();
        assert!(!types.is_empty());
        assert!(types.iter().all(|t| t == "circle"), "{:?}", types);

        // a rounded corner is still an arc
        let rounded = prism(
            &mut kernel,
            Profile::new(ClosedCurve::rounded_polygon(5.0, 6, 1.0)),
        );
        assert!(kernel
            .compute_all_signatures(&rounded, TopoKind::Edge)
            .iter()
            .any(|(_, s)| s.is_type("arc")));
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        let kernel = TruckKernel::new();
        assert!(kernel.face_edges(KernelId(123)).is_empty());
        assert!(kernel
            .compute_signature(KernelId(5 * ID_STRIDE), TopoKind::Face)
            .surface_type
            .is_none());
    }
}
