//! Wire and face builders on top of truck's vertex/line/arc API.
//!
//! truck has no polygon or rounded-polygon primitives: every profile curve
//! is assembled from vertices, line edges and circular arcs.

use part_types::{ClosedCurve, Frame, Profile};
use std::f64::consts::{PI, TAU};
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Vertex, Wire};
use truck_modeling::{Point3, Rad, Vector3};

fn point(frame: &Frame, p: [f64; 2]) -> Point3 {
    let q = frame.transform_point([p[0], p[1], 0.0]);
    Point3::new(q[0], q[1], q[2])
}

fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// Closed wire of one curve on the frame's XY plane, counter-clockwise
/// seen from the frame's +Z.
pub fn curve_wire(curve: &ClosedCurve, frame: &Frame) -> Wire {
    match curve {
        ClosedCurve::Circle { center, radius } => {
            let start = builder::vertex(point(frame, [center[0] + radius, center[1]]));
            builder::rsweep(
                &start,
                point(frame, *center),
                vector(frame.z_axis()),
                Rad(TAU),
            )
        }
        ClosedCurve::RegularPolygon {
            center,
            circumradius,
            sides,
            corner_radius,
        } if *corner_radius > 0.0 => {
            rounded_polygon_wire(*center, *circumradius, *sides, *corner_radius, frame)
        }
        _ => polyline_wire(&curve.vertices(), frame),
    }
}

fn polyline_wire(points: &[[f64; 2]], frame: &Frame) -> Wire {
    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| builder::vertex(point(frame, *p)))
        .collect();
    let n = vertices.len();
    (0..n)
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
        .collect()
}

/// Each corner is replaced by a tangent arc; arcs and the shortened flats
/// alternate around the loop.
fn rounded_polygon_wire(
    center: [f64; 2],
    circumradius: f64,
    sides: u32,
    corner_radius: f64,
    frame: &Frame,
) -> Wire {
    let n = sides as usize;
    let half = PI / sides as f64;
    let tangent = corner_radius * half.tan();
    let reach = (circumradius * half.cos() - corner_radius) / half.cos();
    let corner = |k: usize| {
        let a = TAU * k as f64 / sides as f64;
        [a.cos(), a.sin()]
    };

    // (arc start, arc end, arc midpoint) per corner
    let mut arcs = Vec::with_capacity(n);
    for k in 0..n {
        let dir = corner(k);
        let v = [
            center[0] + circumradius * dir[0],
            center[1] + circumradius * dir[1],
        ];
        let prev = corner((k + n - 1) % n);
        let next = corner((k + 1) % n);
        let incoming = unit2([dir[0] - prev[0], dir[1] - prev[1]]);
        let outgoing = unit2([next[0] - dir[0], next[1] - dir[1]]);
        let start = [v[0] - incoming[0] * tangent, v[1] - incoming[1] * tangent];
        let end = [v[0] + outgoing[0] * tangent, v[1] + outgoing[1] * tangent];
        let mid = [
            center[0] + (reach + corner_radius) * dir[0],
            center[1] + (reach + corner_radius) * dir[1],
        ];
        arcs.push((
            builder::vertex(point(frame, start)),
            builder::vertex(point(frame, end)),
            point(frame, mid),
        ));
    }

    let mut edges: Vec<Edge> = Vec::with_capacity(2 * n);
    for k in 0..n {
        let (start, end, mid) = &arcs[k];
        edges.push(builder::circle_arc(start, end, *mid));
        edges.push(builder::line(end, &arcs[(k + 1) % n].0));
    }
    Wire::from(edges)
}

fn unit2(v: [f64; 2]) -> [f64; 2] {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    [v[0] / len, v[1] / len]
}

/// Planar face of a profile; holes are attached as reversed inner wires.
pub fn profile_face(profile: &Profile, frame: &Frame) -> Result<Face, String> {
    let mut wires = vec![curve_wire(&profile.boundary, frame)];
    wires.extend(profile.holes.iter().map(|h| curve_wire(h, frame).inverse()));
    builder::try_attach_plane(&wires).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexagon_wire_has_six_edges() {
        let wire = curve_wire(&ClosedCurve::regular_polygon(10.0, 6), &Frame::identity());
        assert_eq!(wire.edge_iter().count(), 6);
        assert!(wire.is_closed());
    }

    #[test]
    fn test_rounded_hexagon_alternates_arcs_and_flats() {
        let wire = curve_wire(
            &ClosedCurve::rounded_polygon(10.0, 6, 2.0),
            &Frame::identity(),
        );
        assert_eq!(wire.edge_iter().count(), 12);
        assert!(wire.is_closed());
    }

    #[test]
    fn test_profile_face_with_hole() {
        let profile = Profile::new(ClosedCurve::regular_polygon(10.0, 6))
            .with_hole(ClosedCurve::circle(4.0));
        let face = profile_face(&profile, &Frame::translation(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(face.boundaries().len(), 2);
        for v in face.vertex_iter() {
            assert!((v.point()[2] - 5.0).abs() < 1e-12);
        }
    }
}
