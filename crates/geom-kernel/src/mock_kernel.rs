//! MockKernel: an analytic stand-in for a B-rep kernel, used by tests.
//!
//! Solids are tracked as faces and edges with closed-form geometry
//! (centroids, normals, areas, loop radii) instead of a real B-rep. Every
//! edge carries the largest blend its adjacent material can take; fillets
//! and chamfers beyond that are rejected the way a real kernel rejects a
//! self-intersecting blend. Used by part-ops and part-stack for testing.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2, TAU};

/// Distance below which two parallel planes count as the same plane.
const PLANE_TOL: f64 = 1e-7;

/// A mock face with known properties.
#[derive(Debug, Clone)]
struct MockFace {
    id: KernelId,
    edges: Vec<KernelId>,
    /// Outward normal; `None` for curved faces.
    normal: Option<[f64; 3]>,
    centroid: [f64; 3],
    area: f64,
    surface_type: String,
}

/// A mock edge with analytic curve data.
#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    curve_type: String,
    /// Midpoint for lines, center for circles and arcs.
    center: [f64; 3],
    /// Line direction, or plane normal of a circle or arc.
    axis: [f64; 3],
    radius: Option<f64>,
    length: f64,
    /// Outward normal of the cap a loop edge lies on; zero for seams.
    cap_normal: [f64; 3],
    /// Largest blend size the adjacent material accepts.
    max_blend: f64,
}

/// A closed boundary loop lying on a planar cap.
#[derive(Debug, Clone)]
struct Rim {
    center: [f64; 3],
    normal: [f64; 3],
    inscribed: f64,
    circumradius: f64,
    /// Outer boundary of its cap (as opposed to a hole).
    outer: bool,
    edges: Vec<KernelId>,
}

/// Cross-sections of a solid swept or turned along one straight axis.
#[derive(Debug, Clone)]
struct AxialSpan {
    origin: [f64; 3],
    axis: [f64; 3],
    /// Every section is a plain disc.
    round: bool,
    /// At least two, ascending in `t`.
    stations: Vec<Station>,
}

#[derive(Debug, Clone, Copy)]
struct Station {
    t: f64,
    inscribed: f64,
    circumradius: f64,
    area: f64,
}

impl AxialSpan {
    fn range(&self) -> (f64, f64) {
        (self.stations[0].t, self.stations[self.stations.len() - 1].t)
    }

    fn position(&self, p: [f64; 3]) -> f64 {
        dot(sub(p, self.origin), self.axis)
    }

    fn point(&self, t: f64) -> [f64; 3] {
        add(self.origin, scale(self.axis, t))
    }

    /// Section at `t`, interpolated between the nearest stations.
    fn at(&self, t: f64) -> Station {
        let s = &self.stations;
        let k = s
            .windows(2)
            .position(|w| t <= w[1].t)
            .unwrap_or(s.len() - 2);
        let (a, b) = (s[k], s[k + 1]);
        let width = b.t - a.t;
        let u = if width > 1e-12 {
            ((t - a.t) / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lerp = |x: f64, y: f64| x + (y - x) * u;
        let circumradius = lerp(a.circumradius, b.circumradius);
        Station {
            t,
            inscribed: lerp(a.inscribed, b.inscribed),
            circumradius,
            area: if self.round {
                PI * circumradius * circumradius
            } else {
                lerp(a.area, b.area)
            },
        }
    }
}

/// A synthetic solid.
#[derive(Debug, Clone, Default)]
struct MockSolid {
    faces: Vec<MockFace>,
    edges: Vec<MockEdge>,
    rims: Vec<Rim>,
    span: Option<AxialSpan>,
}

/// A body face a cutting tool passes through.
struct Pierce {
    face: KernelId,
    /// Where the tool axis crosses the face.
    point: [f64; 3],
    normal: [f64; 3],
    section: Station,
}

/// A planar face awaiting extrude or revolve.
#[derive(Debug, Clone)]
struct ProfileFace {
    profile: Profile,
    frame: Frame,
}

/// One loop of a swept section, used to build side faces.
struct LoopRef<'a> {
    curve: &'a ClosedCurve,
    frame: &'a Frame,
    edges: &'a [MockEdge],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlendKind {
    Fillet,
    Chamfer,
}

impl BlendKind {
    fn error(self, reason: String) -> KernelError {
        match self {
            BlendKind::Fillet => KernelError::FilletFailed { reason },
            BlendKind::Chamfer => KernelError::ChamferFailed { reason },
        }
    }
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    /// Faces created by make_profile_face, consumed by extrude or revolve.
    standalone_faces: HashMap<u64, ProfileFace>,
    blend_limit: Option<f64>,
    fillet_attempts: usize,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
            blend_limit: None,
            fillet_attempts: 0,
        }
    }

    /// Cap every edge's blend allowance at `limit`.
    pub fn with_blend_limit(mut self, limit: f64) -> Self {
        self.blend_limit = Some(limit);
        self
    }

    /// Number of `fillet_edges` calls so far, successful or not.
    pub fn fillet_attempts(&self) -> usize {
        self.fillet_attempts
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn solid(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    /// Copy a solid under fresh ids, as a real kernel returns new topology.
    fn reissue(&mut self, source: &MockSolid) -> MockSolid {
        let mut id_map: HashMap<KernelId, KernelId> = HashMap::new();

        let mut edges = Vec::with_capacity(source.edges.len());
        for e in &source.edges {
            let new_id = self.alloc_id();
            id_map.insert(e.id, new_id);
            edges.push(MockEdge {
                id: new_id,
                ..e.clone()
            });
        }

        let mut faces = Vec::with_capacity(source.faces.len());
        for f in &source.faces {
            faces.push(MockFace {
                id: self.alloc_id(),
                edges: f.edges.iter().filter_map(|e| id_map.get(e).copied()).collect(),
                ..f.clone()
            });
        }

        let rims = source
            .rims
            .iter()
            .map(|r| Rim {
                edges: r.edges.iter().filter_map(|e| id_map.get(e).copied()).collect(),
                ..r.clone()
            })
            .collect();

        MockSolid {
            faces,
            edges,
            rims,
            span: source.span.clone(),
        }
    }

    /// Boundary edges of one closed curve on the frame's XY plane.
    fn loop_edges(
        &mut self,
        curve: &ClosedCurve,
        frame: &Frame,
        cap_normal: [f64; 3],
        outer: bool,
    ) -> (Vec<MockEdge>, Rim) {
        let z = frame.z_axis();
        let c2 = curve.center();
        let center = frame.transform_point([c2[0], c2[1], 0.0]);
        let mut edges = Vec::new();

        match curve {
            ClosedCurve::Circle { radius, .. } => {
                edges.push(MockEdge {
                    id: self.alloc_id(),
                    curve_type: "circle".to_string(),
                    center,
                    axis: z,
                    radius: Some(*radius),
                    length: TAU * radius,
                    cap_normal,
                    max_blend: f64::INFINITY,
                });
            }
            ClosedCurve::RegularPolygon {
                circumradius,
                sides,
                corner_radius,
                ..
            } => {
                let n = *sides as usize;
                let half = PI / *sides as f64;
                let tangent = corner_radius * half.tan();
                let apothem = circumradius * half.cos();
                let verts = curve.vertices();
                for k in 0..n {
                    let a = verts[k];
                    let b = verts[(k + 1) % n];
                    let side = dist2(a, b);
                    let dir = [(b[0] - a[0]) / side, (b[1] - a[1]) / side, 0.0];
                    edges.push(MockEdge {
                        id: self.alloc_id(),
                        curve_type: "line".to_string(),
                        center: frame.transform_point([(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, 0.0]),
                        axis: frame.transform_vector(dir),
                        radius: None,
                        length: side - 2.0 * tangent,
                        cap_normal,
                        max_blend: f64::INFINITY,
                    });
                    if *corner_radius > 0.0 {
                        // arc centered on the bisector through vertex b
                        let reach = (apothem - corner_radius) / half.cos();
                        let out = [(b[0] - c2[0]) / circumradius, (b[1] - c2[1]) / circumradius];
                        let arc_center = [c2[0] + out[0] * reach, c2[1] + out[1] * reach, 0.0];
                        edges.push(MockEdge {
                            id: self.alloc_id(),
                            curve_type: "arc".to_string(),
                            center: frame.transform_point(arc_center),
                            axis: z,
                            radius: Some(*corner_radius),
                            length: corner_radius * 2.0 * half,
                            cap_normal,
                            max_blend: f64::INFINITY,
                        });
                    }
                }
            }
            ClosedCurve::Polyline { points } => {
                let n = points.len();
                for k in 0..n {
                    let a = points[k];
                    let b = points[(k + 1) % n];
                    let side = dist2(a, b);
                    let dir = [(b[0] - a[0]) / side, (b[1] - a[1]) / side, 0.0];
                    edges.push(MockEdge {
                        id: self.alloc_id(),
                        curve_type: "line".to_string(),
                        center: frame.transform_point([(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, 0.0]),
                        axis: frame.transform_vector(dir),
                        radius: None,
                        length: side,
                        cap_normal,
                        max_blend: f64::INFINITY,
                    });
                }
            }
        }

        let rim = Rim {
            center,
            normal: cap_normal,
            inscribed: curve.inscribed_radius(),
            circumradius: curve.circumradius(),
            outer,
            edges: edges.iter().map(|e| e.id).collect(),
        };
        (edges, rim)
    }

    /// Side faces (and seam edges for sharp corners) between two loops of
    /// the same curve family.
    fn side_faces(
        &mut self,
        lower: LoopRef<'_>,
        upper: LoopRef<'_>,
        outer: bool,
    ) -> Result<(Vec<MockFace>, Vec<MockEdge>), KernelError> {
        let mut faces = Vec::new();
        let mut seams = Vec::new();

        match (lower.curve, upper.curve) {
            (ClosedCurve::Circle { radius: r0, .. }, ClosedCurve::Circle { radius: r1, .. }) => {
                let c0 = lower.edges[0].center;
                let c1 = upper.edges[0].center;
                let h = norm(sub(c1, c0));
                let slant = (h * h + (r1 - r0).powi(2)).sqrt();
                let surface_type = if (r0 - r1).abs() < 1e-12 {
                    "cylindrical"
                } else {
                    "conical"
                };
                faces.push(MockFace {
                    id: self.alloc_id(),
                    edges: vec![lower.edges[0].id, upper.edges[0].id],
                    normal: None,
                    centroid: midpoint(c0, c1),
                    area: PI * (r0 + r1) * slant,
                    surface_type: surface_type.to_string(),
                });
            }
            (ClosedCurve::RegularPolygon { .. }, ClosedCurve::RegularPolygon { .. })
            | (ClosedCurve::Polyline { .. }, ClosedCurve::Polyline { .. }) => {
                let v0 = lower.curve.vertices();
                let v1 = upper.curve.vertices();
                let n = v0.len();
                let rounded = lower.edges.len() == 2 * n;
                let stride = if rounded { 2 } else { 1 };
                let winding = signed_area(&v0).signum();
                let orient = if outer { winding } else { -winding };

                let world = |frame: &Frame, p: [f64; 2]| frame.transform_point([p[0], p[1], 0.0]);

                if !rounded {
                    for k in 0..n {
                        let a = world(lower.frame, v0[k]);
                        let b = world(upper.frame, v1[k]);
                        seams.push(MockEdge {
                            id: self.alloc_id(),
                            curve_type: "line".to_string(),
                            center: midpoint(a, b),
                            axis: normalize(sub(b, a)),
                            radius: None,
                            length: norm(sub(b, a)),
                            cap_normal: [0.0; 3],
                            max_blend: seam_blend_limit(lower.curve, k)
                                .min(seam_blend_limit(upper.curve, k)),
                        });
                    }
                }

                for k in 0..n {
                    let j = (k + 1) % n;
                    let a0 = world(lower.frame, v0[k]);
                    let b0 = world(lower.frame, v0[j]);
                    let a1 = world(upper.frame, v1[k]);
                    let b1 = world(upper.frame, v1[j]);
                    let m0 = midpoint(a0, b0);
                    let m1 = midpoint(a1, b1);
                    let rise = sub(m1, m0);
                    let normal = scale(normalize(cross(normalize(sub(b0, a0)), rise)), orient);

                    let lo = &lower.edges[k * stride];
                    let up = &upper.edges[k * stride];
                    let mut edges = vec![lo.id, up.id];
                    if !rounded {
                        edges.push(seams[k].id);
                        edges.push(seams[j].id);
                    }
                    faces.push(MockFace {
                        id: self.alloc_id(),
                        edges,
                        normal: Some(normal),
                        centroid: midpoint(m0, m1),
                        area: 0.5 * (lo.length + up.length) * norm(rise),
                        surface_type: "planar".to_string(),
                    });

                    if rounded {
                        let lo = &lower.edges[k * stride + 1];
                        let up = &upper.edges[k * stride + 1];
                        let same = (lo.radius.unwrap_or(0.0) - up.radius.unwrap_or(0.0)).abs() < 1e-12;
                        faces.push(MockFace {
                            id: self.alloc_id(),
                            edges: vec![lo.id, up.id],
                            normal: None,
                            centroid: midpoint(lo.center, up.center),
                            area: 0.5 * (lo.length + up.length) * norm(sub(up.center, lo.center)),
                            surface_type: if same { "cylindrical" } else { "conical" }.to_string(),
                        });
                    }
                }
            }
            _ => {
                return Err(KernelError::LoftFailed {
                    reason: "sections mix different curve families".to_string(),
                })
            }
        }

        Ok((faces, seams))
    }

    /// Sweep through planar sections; extrusion is the two-section case
    /// with identical profiles.
    fn sweep(&mut self, sections: &[LoftSection]) -> Result<MockSolid, KernelError> {
        if sections.len() < 2 {
            return Err(KernelError::LoftFailed {
                reason: format!("need at least two sections, got {}", sections.len()),
            });
        }
        for s in sections {
            check_profile(&s.profile)?;
        }
        for pair in sections.windows(2) {
            let (p, q) = (&pair[0].profile, &pair[1].profile);
            let compatible = p.holes.len() == q.holes.len()
                && profile_curves(p)
                    .zip(profile_curves(q))
                    .all(|(a, b)| same_family(a, b));
            if !compatible {
                return Err(KernelError::LoftFailed {
                    reason: "consecutive sections have different topology".to_string(),
                });
            }
        }

        let last = sections.len() - 1;
        let height = norm(sub(sections[last].frame.origin(), sections[0].frame.origin()));
        let mut solid = MockSolid::default();

        // loops[section][curve] -> edges
        let mut loops: Vec<Vec<Vec<MockEdge>>> = Vec::with_capacity(sections.len());
        for (i, s) in sections.iter().enumerate() {
            let z = s.frame.z_axis();
            let cap_normal = if i == 0 {
                scale(z, -1.0)
            } else if i == last {
                z
            } else {
                [0.0; 3]
            };
            let limit = 0.5 * s.profile.wall_thickness().min(height).max(0.0);
            let mut per_curve = Vec::new();
            for (j, curve) in profile_curves(&s.profile).enumerate() {
                let (mut edges, rim) = self.loop_edges(curve, &s.frame, cap_normal, j == 0);
                for e in edges.iter_mut() {
                    e.max_blend = limit;
                }
                if i == 0 || i == last {
                    solid.rims.push(rim);
                }
                per_curve.push(edges);
            }
            loops.push(per_curve);
        }

        for (i, sign) in [(0usize, -1.0), (last, 1.0)] {
            let s = &sections[i];
            let c = s.profile.center();
            solid.faces.push(MockFace {
                id: self.alloc_id(),
                edges: loops[i].iter().flatten().map(|e| e.id).collect(),
                normal: Some(scale(s.frame.z_axis(), sign)),
                centroid: s.frame.transform_point([c[0], c[1], 0.0]),
                area: s.profile.area(),
                surface_type: "planar".to_string(),
            });
        }

        for i in 0..last {
            let lower_curves: Vec<&ClosedCurve> = profile_curves(&sections[i].profile).collect();
            let upper_curves: Vec<&ClosedCurve> =
                profile_curves(&sections[i + 1].profile).collect();
            for j in 0..lower_curves.len() {
                let (faces, seams) = self.side_faces(
                    LoopRef {
                        curve: lower_curves[j],
                        frame: &sections[i].frame,
                        edges: &loops[i][j],
                    },
                    LoopRef {
                        curve: upper_curves[j],
                        frame: &sections[i + 1].frame,
                        edges: &loops[i + 1][j],
                    },
                    j == 0,
                )?;
                solid.faces.extend(faces);
                solid.edges.extend(seams);
            }
        }

        solid.edges.extend(loops.into_iter().flatten().flatten());
        solid.span = sweep_span(sections);
        Ok(solid)
    }

    fn revolve(
        &mut self,
        pf: &ProfileFace,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<MockSolid, KernelError> {
        if norm(axis_direction) < 1e-12 {
            return Err(KernelError::Other {
                message: "revolve axis has zero length".to_string(),
            });
        }
        if !angle.is_finite() || angle.abs() < 1e-12 {
            return Err(KernelError::Other {
                message: "revolve angle must be non-zero".to_string(),
            });
        }
        let axis = normalize(axis_direction);
        if dot(axis, pf.frame.z_axis()).abs() > 1e-6 {
            return Err(KernelError::Other {
                message: "revolve axis must lie in the profile plane".to_string(),
            });
        }
        if let Some(path) = lathe_path(pf, axis_origin, axis) {
            if angle.abs() < TAU - 1e-9 {
                return Err(KernelError::NotSupported {
                    operation: "partial revolve of a profile lying on its axis".to_string(),
                });
            }
            return Ok(self.lathe(&path, axis_origin, axis));
        }

        let c2 = pf.profile.center();
        let center = pf.frame.transform_point([c2[0], c2[1], 0.0]);
        let rel = sub(center, axis_origin);
        let radial = sub(rel, scale(axis, dot(rel, axis)));
        let reach = norm(radial);
        let outer_radius = pf.profile.boundary.circumradius();
        if reach <= outer_radius + 1e-9 {
            return Err(KernelError::Other {
                message: "revolve axis crosses the profile".to_string(),
            });
        }

        let sweep = angle.clamp(-TAU, TAU);
        let full = sweep.abs() >= TAU - 1e-9;
        let rotation = Frame::rotation_about(axis_origin, axis, sweep).ok_or(KernelError::Other {
            message: "revolve axis has zero length".to_string(),
        })?;
        let halfway = Frame::rotation_about(axis_origin, axis, sweep / 2.0).ok_or(
            KernelError::Other {
                message: "revolve axis has zero length".to_string(),
            },
        )?;
        let end_frame = rotation.compose(&pf.frame);
        let tangent = scale(normalize(cross(axis, radial)), sweep.signum());
        let start_normal = scale(tangent, -1.0);
        let end_normal = rotation.transform_vector(tangent);

        let inner_arc = sweep.abs() * (reach - outer_radius);
        let limit = 0.5 * pf.profile.wall_thickness().min(inner_arc).max(0.0);

        let mut solid = MockSolid::default();
        let mut start_ids = Vec::new();
        let mut end_ids = Vec::new();

        for (j, curve) in profile_curves(&pf.profile).enumerate() {
            let (mut start, start_rim) = self.loop_edges(curve, &pf.frame, start_normal, j == 0);
            let (mut end, end_rim) = self.loop_edges(curve, &end_frame, end_normal, j == 0);
            for e in start.iter_mut().chain(end.iter_mut()) {
                e.max_blend = limit;
            }

            let cc = curve.center();
            let curve_center = pf.frame.transform_point([cc[0], cc[1], 0.0]);
            let rel = sub(curve_center, axis_origin);
            let curve_reach = norm(sub(rel, scale(axis, dot(rel, axis))));
            let perimeter: f64 = start.iter().map(|e| e.length).sum();
            let surface_type = match curve {
                ClosedCurve::Circle { .. } => "toroidal",
                _ => "revolved",
            };

            let mut face_edges: Vec<KernelId> = Vec::new();
            if !full {
                face_edges.extend(start.iter().map(|e| e.id));
                face_edges.extend(end.iter().map(|e| e.id));
            }
            solid.faces.push(MockFace {
                id: self.alloc_id(),
                edges: face_edges,
                normal: None,
                centroid: halfway.transform_point(curve_center),
                area: perimeter * sweep.abs() * curve_reach,
                surface_type: surface_type.to_string(),
            });

            if !full {
                start_ids.extend(start.iter().map(|e| e.id));
                end_ids.extend(end.iter().map(|e| e.id));
                solid.rims.push(start_rim);
                solid.rims.push(end_rim);
                solid.edges.extend(start);
                solid.edges.extend(end);
            }
        }

        if !full {
            solid.faces.push(MockFace {
                id: self.alloc_id(),
                edges: start_ids,
                normal: Some(start_normal),
                centroid: center,
                area: pf.profile.area(),
                surface_type: "planar".to_string(),
            });
            solid.faces.push(MockFace {
                id: self.alloc_id(),
                edges: end_ids,
                normal: Some(end_normal),
                centroid: rotation.transform_point(center),
                area: pf.profile.area(),
                surface_type: "planar".to_string(),
            });
        }

        Ok(solid)
    }

    /// Full turn of an open `(t, r)` path whose ends lie on the axis. Each
    /// segment becomes a disc, cylinder or cone and each off-axis vertex a
    /// circle edge.
    fn lathe(&mut self, path: &[[f64; 2]], origin: [f64; 3], axis: [f64; 3]) -> MockSolid {
        let n = path.len();
        let on_axis = |p: [f64; 2]| p[1] < 1e-9;
        let at = |t: f64| add(origin, scale(axis, t));
        let winding = signed_area(path).signum();

        // outward normal of each segment that turns into a disc
        let discs: Vec<Option<[f64; 3]>> = path
            .windows(2)
            .map(|w| {
                let (dt, dr) = (w[1][0] - w[0][0], w[1][1] - w[0][1]);
                (dt.abs() < 1e-12).then(|| scale(axis, (winding * dr).signum()))
            })
            .collect();

        let mut solid = MockSolid::default();
        let mut circles: Vec<Option<KernelId>> = vec![None; n];
        for k in 0..n {
            let p = path[k];
            if on_axis(p) {
                continue;
            }
            let prev = if k > 0 { dist2(path[k - 1], p) } else { f64::INFINITY };
            let next = if k + 1 < n { dist2(p, path[k + 1]) } else { f64::INFINITY };
            let cap_normal = k
                .checked_sub(1)
                .and_then(|s| discs[s])
                .or_else(|| discs.get(k).copied().flatten())
                .unwrap_or([0.0; 3]);
            let id = self.alloc_id();
            solid.edges.push(MockEdge {
                id,
                curve_type: "circle".to_string(),
                center: at(p[0]),
                axis,
                radius: Some(p[1]),
                length: TAU * p[1],
                cap_normal,
                max_blend: prev.min(next) / 2.0,
            });
            circles[k] = Some(id);
        }

        for (s, disc) in discs.iter().enumerate() {
            let (a, b) = (path[s], path[s + 1]);
            if on_axis(a) && on_axis(b) {
                continue;
            }
            let (surface_type, area) = match disc {
                Some(normal) => {
                    let (inner, outer) = if a[1] < b[1] { (s, s + 1) } else { (s + 1, s) };
                    let r = path[outer][1];
                    solid.rims.push(Rim {
                        center: at(a[0]),
                        normal: *normal,
                        inscribed: r,
                        circumradius: r,
                        outer: true,
                        edges: circles[outer].into_iter().collect(),
                    });
                    let hole = path[inner][1];
                    if !on_axis(path[inner]) {
                        solid.rims.push(Rim {
                            center: at(a[0]),
                            normal: *normal,
                            inscribed: hole,
                            circumradius: hole,
                            outer: false,
                            edges: circles[inner].into_iter().collect(),
                        });
                    }
                    ("planar", PI * (r * r - hole * hole))
                }
                None if (a[1] - b[1]).abs() < 1e-12 => ("cylindrical", TAU * a[1] * (b[0] - a[0]).abs()),
                None => ("conical", PI * (a[1] + b[1]) * dist2(a, b)),
            };
            solid.faces.push(MockFace {
                id: self.alloc_id(),
                edges: [circles[s], circles[s + 1]].into_iter().flatten().collect(),
                normal: *disc,
                centroid: at((a[0] + b[0]) / 2.0),
                area,
                surface_type: surface_type.to_string(),
            });
        }

        let mut stations: Vec<Station> = path
            .iter()
            .filter(|p| !on_axis(**p))
            .map(|p| Station {
                t: p[0],
                inscribed: p[1],
                circumradius: p[1],
                area: PI * p[1] * p[1],
            })
            .collect();
        stations.sort_by(|a, b| a.t.total_cmp(&b.t));
        // a step in radius keeps the larger section
        stations.dedup_by(|later, kept| {
            let same = (later.t - kept.t).abs() < 1e-12;
            if same && later.circumradius > kept.circumradius {
                *kept = *later;
            }
            same
        });
        if stations.len() >= 2 {
            solid.span = Some(AxialSpan {
                origin,
                axis,
                round: true,
                stations,
            });
        }
        solid
    }

    fn blend(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        size: f64,
        kind: BlendKind,
    ) -> Result<KernelSolidHandle, KernelError> {
        if !(size > 0.0) || !size.is_finite() {
            return Err(kind.error(format!("size must be positive, got {}", size)));
        }
        if edges.is_empty() {
            return Err(kind.error("no edges given".to_string()));
        }
        let mut work = self.solid(solid)?.clone();

        let targets: HashSet<KernelId> = edges.iter().copied().collect();
        for eid in edges {
            let edge = work
                .edges
                .iter()
                .find(|e| e.id == *eid)
                .ok_or_else(|| kind.error(format!("edge {:?} not found in solid", eid)))?;
            let available = edge.max_blend.min(self.blend_limit.unwrap_or(f64::INFINITY));
            if available <= 0.0 || size > available + 1e-9 {
                return Err(kind.error(format!(
                    "size {} exceeds the {:.4} available at edge {:?}",
                    size, available, eid
                )));
            }
        }

        let originals: Vec<MockEdge> = work
            .edges
            .iter()
            .filter(|e| targets.contains(&e.id))
            .cloned()
            .collect();
        work.edges.retain(|e| !targets.contains(&e.id));

        for orig in originals {
            let remaining = (orig.max_blend - size).max(0.0);
            // boundary on the original cap, and one pushed down the side
            let on_cap = MockEdge {
                id: self.alloc_id(),
                max_blend: remaining,
                ..orig.clone()
            };
            let on_side = MockEdge {
                id: self.alloc_id(),
                center: sub(orig.center, scale(orig.cap_normal, size)),
                cap_normal: [0.0; 3],
                max_blend: remaining,
                ..orig.clone()
            };

            for face in work.faces.iter_mut() {
                for e in face.edges.iter_mut() {
                    if *e == orig.id {
                        *e = on_cap.id;
                    }
                }
            }
            for rim in work.rims.iter_mut() {
                for e in rim.edges.iter_mut() {
                    if *e == orig.id {
                        *e = on_cap.id;
                    }
                }
            }

            let curved = orig.radius.is_some();
            let (surface_type, area) = match (kind, curved) {
                (BlendKind::Fillet, true) => ("toroidal", orig.length * size * FRAC_PI_2),
                (BlendKind::Fillet, false) => ("cylindrical", orig.length * size * FRAC_PI_2),
                (BlendKind::Chamfer, true) => ("conical", orig.length * size * SQRT_2),
                (BlendKind::Chamfer, false) => ("planar", orig.length * size * SQRT_2),
            };
            work.faces.push(MockFace {
                id: self.alloc_id(),
                edges: vec![on_cap.id, on_side.id],
                normal: None,
                centroid: sub(orig.center, scale(orig.cap_normal, size / 2.0)),
                area,
                surface_type: surface_type.to_string(),
            });
            work.edges.push(on_cap);
            work.edges.push(on_side);
        }

        let result = self.reissue(&work);
        Ok(self.store(result))
    }

    /// Generate a deterministic mesh: one quad (2 triangles) per face.
    fn tessellate_quads(solid: &MockSolid) -> RenderMesh {
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();
        let mut face_ranges = Vec::new();

        for face in &solid.faces {
            let start_index = indices.len() as u32;
            let base_vertex = (vertices.len() / 3) as u32;

            let c = face.centroid;
            let n = face.normal.unwrap_or([0.0, 0.0, 1.0]);
            let half = face.area.max(0.0).sqrt() / 2.0;
            let (u, v) = tangent_vectors(n);

            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (su, sv) in corners {
                let p = [
                    c[0] + (u[0] * su + v[0] * sv) * half,
                    c[1] + (u[1] * su + v[1] * sv) * half,
                    c[2] + (u[2] * su + v[2] * sv) * half,
                ];
                vertices.extend_from_slice(&[p[0] as f32, p[1] as f32, p[2] as f32]);
                normals.extend_from_slice(&[n[0] as f32, n[1] as f32, n[2] as f32]);
            }

            // Two triangles: 0-1-2 and 0-2-3
            indices.extend_from_slice(&[
                base_vertex,
                base_vertex + 1,
                base_vertex + 2,
                base_vertex,
                base_vertex + 2,
                base_vertex + 3,
            ]);

            face_ranges.push(FaceRange {
                face_id: face.id,
                start_index,
                end_index: indices.len() as u32,
            });
        }

        RenderMesh {
            vertices,
            normals,
            indices,
            face_ranges,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn profile_curves(profile: &Profile) -> impl Iterator<Item = &ClosedCurve> {
    std::iter::once(&profile.boundary).chain(profile.holes.iter())
}

fn same_family(a: &ClosedCurve, b: &ClosedCurve) -> bool {
    match (a, b) {
        (ClosedCurve::Circle { .. }, ClosedCurve::Circle { .. }) => true,
        (
            ClosedCurve::RegularPolygon {
                sides: s0,
                corner_radius: r0,
                ..
            },
            ClosedCurve::RegularPolygon {
                sides: s1,
                corner_radius: r1,
                ..
            },
        ) => s0 == s1 && (*r0 > 0.0) == (*r1 > 0.0),
        (ClosedCurve::Polyline { points: p0 }, ClosedCurve::Polyline { points: p1 }) => {
            p0.len() == p1.len()
        }
        _ => false,
    }
}

/// Largest fillet on the seam at vertex `k`: the tangent points of the
/// blend must stay within half of each adjacent side.
fn seam_blend_limit(curve: &ClosedCurve, k: usize) -> f64 {
    match curve {
        ClosedCurve::RegularPolygon {
            circumradius,
            sides,
            ..
        } => {
            let half = PI / *sides as f64;
            circumradius * half.sin() / half.tan()
        }
        ClosedCurve::Polyline { points } => {
            let n = points.len();
            let prev = dist2(points[(k + n - 1) % n], points[k]);
            let next = dist2(points[k], points[(k + 1) % n]);
            prev.min(next) / 2.0
        }
        ClosedCurve::Circle { .. } => f64::INFINITY,
    }
}

/// The axis a sweep runs along, when every section is square to it and
/// centered on it.
fn sweep_span(sections: &[LoftSection]) -> Option<AxialSpan> {
    let first = sections.first()?;
    let axis = first.frame.z_axis();
    let center = |s: &LoftSection| {
        let c = s.profile.center();
        s.frame.transform_point([c[0], c[1], 0.0])
    };
    let origin = center(first);

    let mut stations: Vec<Station> = Vec::with_capacity(sections.len());
    for s in sections {
        let rel = sub(center(s), origin);
        let t = dot(rel, axis);
        let square = dot(s.frame.z_axis(), axis) > 1.0 - 1e-9;
        let centered = norm(sub(rel, scale(axis, t))) < 1e-9;
        let ascending = stations.last().map_or(true, |p| t > p.t);
        if !(square && centered && ascending) {
            return None;
        }
        stations.push(Station {
            t,
            inscribed: s.profile.boundary.inscribed_radius(),
            circumradius: s.profile.boundary.circumradius(),
            area: s.profile.area(),
        });
    }
    let round = sections.iter().all(|s| {
        s.profile.holes.is_empty() && matches!(s.profile.boundary, ClosedCurve::Circle { .. })
    });
    Some(AxialSpan {
        origin,
        axis,
        round,
        stations,
    })
}

/// The profile as an open `(t, r)` path that starts and ends on the axis,
/// when one of its edges lies on the axis.
fn lathe_path(pf: &ProfileFace, origin: [f64; 3], axis: [f64; 3]) -> Option<Vec<[f64; 2]>> {
    let ClosedCurve::Polyline { points } = &pf.profile.boundary else {
        return None;
    };
    if !pf.profile.holes.is_empty() {
        return None;
    }
    let polar: Vec<[f64; 2]> = points
        .iter()
        .map(|p| {
            let rel = sub(pf.frame.transform_point([p[0], p[1], 0.0]), origin);
            let t = dot(rel, axis);
            [t, norm(sub(rel, scale(axis, t)))]
        })
        .collect();
    let n = polar.len();
    let k = (0..n).find(|&k| polar[k][1] < 1e-9 && polar[(k + 1) % n][1] < 1e-9)?;
    Some((1..=n).map(|i| polar[(k + i) % n]).collect())
}

/// Planar faces of `body` that `tool` runs clean through, crossing the
/// face plane strictly between its two ends.
fn pierced_faces(body: &MockSolid, tool: &MockSolid) -> Vec<Pierce> {
    let Some(span) = &tool.span else {
        return Vec::new();
    };
    let (t0, t1) = span.range();
    body.faces
        .iter()
        .filter_map(|f| {
            let normal = f.normal?;
            if dot(normal, span.axis).abs() < 1.0 - 1e-9 {
                return None;
            }
            let t = span.position(f.centroid);
            if t <= t0 + PLANE_TOL || t >= t1 - PLANE_TOL {
                return None;
            }
            let point = span.point(t);
            // rough containment: the crossing lies on the face's extent
            if norm(sub(point, f.centroid)) > f.area.sqrt() {
                return None;
            }
            // already open there
            let opened = body.rims.iter().any(|r| {
                !r.outer
                    && coplanar(r.center, r.normal, f.centroid, normal, true)
                    && norm(sub(point, r.center)) < r.inscribed
            });
            if opened {
                return None;
            }
            Some(Pierce {
                face: f.id,
                point,
                normal,
                section: span.at(t),
            })
        })
        .collect()
}

fn tighten(limits: &mut HashMap<KernelId, f64>, id: KernelId, limit: f64) {
    let entry = limits.entry(id).or_insert(f64::INFINITY);
    *entry = entry.min(limit);
}

/// Both planes parallel (same or opposite facing) and coincident.
fn coplanar(p0: [f64; 3], n0: [f64; 3], p1: [f64; 3], n1: [f64; 3], same_facing: bool) -> bool {
    let d = dot(n0, n1);
    let aligned = if same_facing {
        d > 1.0 - 1e-9
    } else {
        d < -1.0 + 1e-9
    };
    aligned && dot(sub(p1, p0), n0).abs() < PLANE_TOL
}

fn transformed(source: &MockSolid, placement: &Frame) -> MockSolid {
    MockSolid {
        faces: source
            .faces
            .iter()
            .map(|f| MockFace {
                centroid: placement.transform_point(f.centroid),
                normal: f.normal.map(|n| placement.transform_vector(n)),
                ..f.clone()
            })
            .collect(),
        edges: source
            .edges
            .iter()
            .map(|e| MockEdge {
                center: placement.transform_point(e.center),
                axis: placement.transform_vector(e.axis),
                cap_normal: placement.transform_vector(e.cap_normal),
                ..e.clone()
            })
            .collect(),
        rims: source
            .rims
            .iter()
            .map(|r| Rim {
                center: placement.transform_point(r.center),
                normal: placement.transform_vector(r.normal),
                ..r.clone()
            })
            .collect(),
        span: source.span.as_ref().map(|s| AxialSpan {
            origin: placement.transform_point(s.origin),
            axis: placement.transform_vector(s.axis),
            ..s.clone()
        }),
    }
}

/// Compute two tangent vectors orthogonal to a normal.
fn tangent_vectors(n: [f64; 3]) -> ([f64; 3], [f64; 3]) {
    // Pick a vector not parallel to n
    let up = if n[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let u = normalize(cross(up, n));
    let v = cross(n, u);
    (u, v)
}

fn signed_area(pts: &[[f64; 2]]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i][0] * pts[j][1] - pts[j][0] * pts[i][1];
    }
    area / 2.0
}

fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
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

fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, (a[2] + b[2]) / 2.0]
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

impl Kernel for MockKernel {
    fn make_profile_face(
        &mut self,
        profile: &Profile,
        frame: &Frame,
    ) -> Result<KernelId, KernelError> {
        check_profile(profile)?;
        let face_id = self.alloc_id();
        self.standalone_faces.insert(
            face_id.0,
            ProfileFace {
                profile: profile.clone(),
                frame: *frame,
            },
        );
        Ok(face_id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let pf = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(KernelError::Other {
                message: format!("extrude depth must be positive, got {}", depth),
            });
        }
        let sections = [
            LoftSection {
                profile: pf.profile.clone(),
                frame: pf.frame,
            },
            LoftSection {
                profile: pf.profile,
                frame: pf.frame.offset_along_normal(depth),
            },
        ];
        let solid = self.sweep(&sections)?;
        Ok(self.store(solid))
    }

    fn loft(&mut self, sections: &[LoftSection]) -> Result<KernelSolidHandle, KernelError> {
        let solid = self.sweep(sections)?;
        Ok(self.store(solid))
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let pf = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        let solid = self.revolve(&pf, axis_origin, axis_direction, angle)?;
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?.clone();
        let solid_b = self.solid(b)?.clone();
        let mut out = self.reissue(&solid_a);
        let other = self.reissue(&solid_b);
        out.span = None;

        // Touching caps facing each other merge into the interior.
        let mut removed: HashSet<KernelId> = HashSet::new();
        let mut reduced: HashMap<KernelId, f64> = HashMap::new();
        for fb in &other.faces {
            let Some(nb) = fb.normal else {
                continue;
            };
            let Some(fa) = out.faces.iter_mut().find(|fa| {
                !removed.contains(&fa.id)
                    && fa
                        .normal
                        .is_some_and(|na| coplanar(fa.centroid, na, fb.centroid, nb, false))
            }) else {
                continue;
            };
            let overlap = fa.area.min(fb.area);
            if (fa.area - fb.area).abs() <= 1e-9 * fa.area.max(1.0) {
                removed.insert(fa.id);
                removed.insert(fb.id);
            } else if fa.area > fb.area {
                fa.area -= overlap;
                removed.insert(fb.id);
            } else {
                removed.insert(fa.id);
                reduced.insert(fb.id, overlap);
            }
        }

        out.faces.retain(|f| !removed.contains(&f.id));
        for mut f in other.faces {
            if removed.contains(&f.id) {
                continue;
            }
            if let Some(overlap) = reduced.get(&f.id) {
                f.area -= overlap;
            }
            out.faces.push(f);
        }
        out.edges.extend(other.edges);
        out.rims.extend(other.rims);

        Ok(self.store(out))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?.clone();
        let solid_b = self.solid(b)?.clone();
        let mut out = self.reissue(&solid_a);
        let mut tool = self.reissue(&solid_b);
        let mut limits: HashMap<KernelId, f64> = HashMap::new();

        // A tool running through a face opens a hole in it. Whatever the
        // tool has past the outermost opened face at either end stays
        // outside the body.
        if let Some(span) = tool.span.clone() {
            // (position, circle edge) of the outermost opening per end
            let mut exits: [Option<(f64, Option<KernelId>)>; 2] = [None, None];
            for p in pierced_faces(&out, &tool) {
                let circle = span.round.then(|| {
                    let r = p.section.circumradius;
                    MockEdge {
                        id: self.alloc_id(),
                        curve_type: "circle".to_string(),
                        center: p.point,
                        axis: span.axis,
                        radius: Some(r),
                        length: TAU * r,
                        cap_normal: p.normal,
                        max_blend: f64::INFINITY,
                    }
                });
                let circle_id = circle.as_ref().map(|e| e.id);

                if let Some(face) = out.faces.iter_mut().find(|f| f.id == p.face) {
                    face.area = (face.area - p.section.area).max(0.0);
                    face.edges.extend(circle_id);
                }
                for ra in out
                    .rims
                    .iter()
                    .filter(|ra| ra.outer && coplanar(ra.center, ra.normal, p.point, p.normal, true))
                {
                    let offset = norm(sub(p.point, ra.center));
                    let wall = ra.inscribed - offset - p.section.circumradius;
                    for id in ra.edges.iter().copied().chain(circle_id) {
                        tighten(&mut limits, id, 0.5 * wall.max(0.0));
                    }
                }
                if let Some(e) = circle {
                    out.rims.push(Rim {
                        center: p.point,
                        normal: p.normal,
                        inscribed: p.section.inscribed,
                        circumradius: p.section.circumradius,
                        outer: false,
                        edges: vec![e.id],
                    });
                    out.edges.push(e);
                }

                let (end, further) = if dot(p.normal, span.axis) < 0.0 {
                    (0, exits[0].map_or(true, |(t, _)| p.section.t < t))
                } else {
                    (1, exits[1].map_or(true, |(t, _)| p.section.t > t))
                };
                if further {
                    exits[end] = Some((p.section.t, circle_id));
                }
            }

            // the opening that replaces a trimmed-off loop, if any
            let beyond = |x: [f64; 3]| -> Option<Option<KernelId>> {
                let t = span.position(x);
                match exits {
                    [Some((lo, id)), _] if t < lo - PLANE_TOL => Some(id),
                    [_, Some((hi, id))] if t > hi + PLANE_TOL => Some(id),
                    _ => None,
                }
            };
            let mut replaced: HashMap<KernelId, Option<KernelId>> = HashMap::new();
            tool.edges.retain(|e| {
                let on_cap = norm(e.cap_normal) > 0.5;
                match beyond(e.center).filter(|_| on_cap) {
                    Some(with) => {
                        replaced.insert(e.id, with);
                        false
                    }
                    None => true,
                }
            });
            tool.faces.retain(|f| {
                let cap = f
                    .normal
                    .is_some_and(|n| dot(n, span.axis).abs() > 1.0 - 1e-9);
                !(cap && beyond(f.centroid).is_some())
            });
            tool.rims.retain(|r| beyond(r.center).is_none());
            for f in tool.faces.iter_mut() {
                f.edges = f
                    .edges
                    .iter()
                    .filter_map(|e| replaced.get(e).copied().unwrap_or(Some(*e)))
                    .collect();
            }
        }

        // A tool loop landing on an outer rim opens a hole; the band left
        // between them bounds every blend on both loops.
        for rb in tool.rims.iter().filter(|r| r.outer) {
            for ra in out
                .rims
                .iter()
                .filter(|ra| ra.outer && coplanar(ra.center, ra.normal, rb.center, rb.normal, true))
            {
                let offset = norm(sub(rb.center, ra.center));
                let wall = ra.inscribed - offset - rb.circumradius;
                for id in ra.edges.iter().chain(rb.edges.iter()) {
                    tighten(&mut limits, *id, 0.5 * wall.max(0.0));
                }
            }
        }

        for mut face in tool.faces {
            let target = face.normal.and_then(|n| {
                out.faces.iter_mut().find(|f| {
                    f.normal
                        .is_some_and(|m| coplanar(f.centroid, m, face.centroid, n, true))
                })
            });
            match target {
                Some(f) => {
                    f.area = (f.area - face.area).max(0.0);
                    f.edges.extend(face.edges.iter().copied());
                }
                None => {
                    face.normal = face.normal.map(|n| scale(n, -1.0));
                    out.faces.push(face);
                }
            }
        }

        out.rims.extend(tool.rims.into_iter().map(|r| Rim { outer: false, ..r }));
        out.edges.extend(tool.edges);
        for e in out.edges.iter_mut() {
            if let Some(limit) = limits.get(&e.id) {
                e.max_blend = e.max_blend.min(*limit);
            }
        }

        Ok(self.store(out))
    }

    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.fillet_attempts += 1;
        self.blend(solid, edges, radius, BlendKind::Fillet)
    }

    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.blend(solid, edges, distance, BlendKind::Chamfer)
    }

    fn transform_solid(
        &mut self,
        solid: &KernelSolidHandle,
        placement: &Frame,
    ) -> Result<KernelSolidHandle, KernelError> {
        let moved = transformed(self.solid(solid)?, placement);
        let result = self.reissue(&moved);
        Ok(self.store(result))
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        _tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        Ok(Self::tessellate_quads(self.solid(solid)?))
    }

    fn export_step(
        &mut self,
        solids: &[KernelSolidHandle],
        file_name: &str,
    ) -> Result<String, KernelError> {
        if solids.is_empty() {
            return Err(KernelError::ExportFailed {
                reason: "no solids to export".to_string(),
            });
        }
        let mut out = String::from("ISO-10303-21;\nHEADER;\n");
        out.push_str(&format!("FILE_NAME('{}');\n", file_name));
        out.push_str("ENDSEC;\nDATA;\n");
        for (i, handle) in solids.iter().enumerate() {
            let s = self.solid(handle)?;
            out.push_str(&format!(
                "#{}=MOCK_SOLID({},{});\n",
                i + 1,
                s.faces.len(),
                s.edges.len()
            ));
        }
        out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        Ok(out)
    }
}

impl KernelIntrospect for MockKernel {
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.faces.iter().map(|f| f.id).collect())
            .unwrap_or_default()
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        for solid in self.solids.values() {
            for f in &solid.faces {
                if f.id == face {
                    return f.edges.clone();
                }
            }
        }
        Vec::new()
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        for solid in self.solids.values() {
            match kind {
                TopoKind::Face => {
                    if let Some(f) = solid.faces.iter().find(|f| f.id == entity) {
                        return TopoSignature {
                            surface_type: Some(f.surface_type.clone()),
                            area: Some(f.area),
                            centroid: Some(f.centroid),
                            normal: f.normal,
                            axis: None,
                            radius: None,
                            length: None,
                        };
                    }
                }
                TopoKind::Edge => {
                    if let Some(e) = solid.edges.iter().find(|e| e.id == entity) {
                        return TopoSignature {
                            surface_type: Some(e.curve_type.clone()),
                            area: None,
                            centroid: Some(e.center),
                            normal: None,
                            axis: Some(e.axis),
                            radius: e.radius,
                            length: Some(e.length),
                        };
                    }
                }
            }
        }
        TopoSignature::empty()
    }
}
