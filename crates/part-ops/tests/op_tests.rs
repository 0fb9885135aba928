use std::f64::consts::TAU;

use approx::assert_relative_eq;
use geom_kernel::{ClosedCurve, KernelIntrospect, MockKernel, Profile, TopoKind, TruckKernel};
use part_ops::*;
use part_types::{Axis, FaceName, FaceSelector, Filter, Frame, SideDir, SortKey, TopoQuery};
use proptest::prelude::*;

fn hex_body(kernel: &mut MockKernel, circumradius: f64, height: f64) -> SubPart {
    let profile = Profile::new(ClosedCurve::regular_polygon(circumradius, 6));
    execute_extrude(kernel, &profile, &Frame::identity(), height).unwrap()
}

fn only(part: &SubPart, name: FaceName) -> Frame {
    let frames = part.faces.lookup(name);
    assert_eq!(frames.len(), 1, "expected one {} face", name);
    frames[0]
}

fn assert_point(actual: [f64; 3], expected: [f64; 3]) {
    for k in 0..3 {
        assert_relative_eq!(actual[k], expected[k], epsilon = 1e-9);
    }
}

// ── Face naming and selection ──────────────────────────────────────────────

#[test]
fn extrude_names_caps_and_axis_flats() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 5.0);

    let top = only(&part, FaceName::Top);
    assert_point(top.origin(), [0.0, 0.0, 5.0]);
    assert_point(top.z_axis(), [0.0, 0.0, 1.0]);
    let bottom = only(&part, FaceName::Bottom);
    assert_point(bottom.z_axis(), [0.0, 0.0, -1.0]);

    // first vertex on +X: flats face +-Y, never +-X
    let apothem = 10.5 * 3f64.sqrt() / 2.0;
    let pos_y = only(&part, FaceName::Side { dir: SideDir::PosY });
    assert_point(pos_y.origin(), [0.0, apothem, 2.5]);
    only(&part, FaceName::Side { dir: SideDir::NegY });
    assert!(!part.faces.contains(FaceName::Side { dir: SideDir::PosX }));
}

#[test]
fn named_selection_empty_and_ambiguous() {
    let mut kernel = MockKernel::new();
    let mut part = hex_body(&mut kernel, 10.5, 5.0);

    let missing = FaceSelector::Named {
        name: FaceName::Side { dir: SideDir::PosX },
    };
    assert!(matches!(
        select_face(&kernel, &part, &missing),
        Err(OpError::FaceSelectionEmpty { .. })
    ));

    part.faces.register(FaceName::Top, Frame::translation(0.0, 0.0, 9.0));
    assert!(matches!(
        select_face(&kernel, &part, &FaceSelector::top()),
        Err(OpError::FaceSelectionAmbiguous { count: 2, .. })
    ));
}

#[test]
fn extremal_selection_checks_uniqueness() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 5.0);

    let top = select_face(&kernel, &part, &FaceSelector::max_along(Axis::Z)).unwrap();
    assert_point(top.origin(), [0.0, 0.0, 5.0]);

    // the two flats either side of the +X vertex tie
    assert!(matches!(
        select_face(&kernel, &part, &FaceSelector::max_along(Axis::X)),
        Err(OpError::FaceSelectionAmbiguous { count: 2, .. })
    ));
}

#[test]
fn extremal_selection_without_planar_faces_is_empty() {
    let mut kernel = MockKernel::new();
    let ring = execute_revolve(
        &mut kernel,
        &Profile::new(ClosedCurve::circle(1.0)),
        &Frame::identity(),
        [0.0, -5.0, 0.0],
        [1.0, 0.0, 0.0],
        TAU,
    )
    .unwrap();
    assert!(ring.faces.is_empty());
    assert!(matches!(
        select_face(&kernel, &ring, &FaceSelector::min_along(Axis::Z)),
        Err(OpError::FaceSelectionEmpty { .. })
    ));
}

#[test]
fn revolve_registers_start_and_end_caps() {
    let mut kernel = MockKernel::new();
    let offset = 20.2;
    let angle = 10f64.to_radians();
    let profile = Profile::new(ClosedCurve::rounded_polygon(10.5, 6, 21.0 / 8.0))
        .with_hole(ClosedCurve::circle(3.25));
    let bend = execute_revolve(
        &mut kernel,
        &profile,
        &Frame::identity(),
        [0.0, -offset, 0.0],
        [1.0, 0.0, 0.0],
        angle,
    )
    .unwrap();

    let bottom = only(&bend, FaceName::Bottom);
    assert_point(bottom.origin(), [0.0, 0.0, 0.0]);
    let top = only(&bend, FaceName::Top);
    assert_point(
        top.origin(),
        [0.0, offset * angle.cos() - offset, offset * angle.sin()],
    );
    assert_point(top.z_axis(), [0.0, -angle.sin(), angle.cos()]);
}

#[test]
fn query_picks_topmost_largest_circle() {
    let mut kernel = MockKernel::new();
    let ring = Profile::new(ClosedCurve::circle(4.75)).with_hole(ClosedCurve::circle(3.25));
    let part = execute_extrude(&mut kernel, &ring, &Frame::identity(), 15.5).unwrap();

    let q = TopoQuery::new()
        .filter(Filter::SurfaceType {
            surface_type: "circle".to_string(),
        })
        .sort_by(SortKey::Radius)
        .sort_by(SortKey::Along { axis: Axis::Z })
        .pick(part_types::Pick::Last);
    let ids = query(&kernel, &part.solid, TopoKind::Edge, &q);
    assert_eq!(ids.len(), 1);
    let sig = kernel.compute_signature(ids[0], TopoKind::Edge);
    assert_relative_eq!(sig.radius.unwrap(), 4.75);
    assert_relative_eq!(sig.centroid.unwrap()[2], 15.5);
}

// ── Funnel profiles and the fillet search ──────────────────────────────────

#[test]
fn zero_wall_never_fillets() {
    let mut kernel = MockKernel::new();
    let spec = FunnelSpec {
        lower_radius: 10.0,
        minimum_wall: 0.0,
        ..FunnelSpec::default()
    };
    let funnel = build_funnel(&mut kernel, &spec).unwrap();
    assert!(funnel.fillet.is_none());
    assert_eq!(kernel.fillet_attempts(), 0);
    assert!(funnel.part.diagnostics.is_empty());

    // rim still the sharp outline plus the passage circle
    let (rim, _) =
        extremal_planar_face(&kernel, &funnel.part.solid, Axis::Z, part_types::AxisEnd::Max)
            .unwrap();
    assert_eq!(kernel.face_edges(rim).len(), 13);
}

#[test]
fn hex_rim_search_halves_to_the_band() {
    let mut kernel = MockKernel::new();
    let spec = FunnelSpec {
        upper_radius: 20.0,
        minimum_wall: 1.5,
        ..FunnelSpec::default()
    };
    let funnel = build_funnel(&mut kernel, &spec).unwrap();
    assert_eq!(funnel.profiles.inner_top, ClosedCurve::circle(spec.inner_top_radius()));
    assert_relative_eq!(spec.inner_top_radius(), 15.8205, epsilon = 1e-4);

    let search = funnel.fillet.unwrap();
    assert!(search.succeeded);
    // 1.5 exceeds the half-wall allowance of 0.75, the first halving fits
    assert_eq!(search.attempts, 2);
    assert_relative_eq!(search.radius, 0.75);
    assert_eq!(funnel.part.solid, search.body);
    assert!(funnel.part.diagnostics.is_empty());
}

#[test]
fn cone_rim_uses_quarter_wall() {
    let mut kernel = MockKernel::new();
    let spec = FunnelSpec {
        shape: FunnelShape::Cone,
        minimum_wall: 1.5,
        ..FunnelSpec::default()
    };
    let funnel = build_funnel(&mut kernel, &spec).unwrap();
    let search = funnel.fillet.unwrap();
    assert!(search.succeeded);
    assert_eq!(search.attempts, 1);
    assert_eq!(search.radius, 1.5 / 4.0);
}

#[test]
fn wall_past_the_flats_is_invalid_geometry() {
    let mut kernel = MockKernel::new();
    let spec = FunnelSpec {
        upper_radius: 20.0,
        minimum_wall: 20.0 * 3f64.sqrt() / 2.0,
        ..FunnelSpec::default()
    };
    assert!(matches!(
        build_funnel(&mut kernel, &spec),
        Err(OpError::InvalidProfileGeometry { .. })
    ));
    assert_eq!(kernel.solid_count(), 0);
}

#[test]
fn exhausted_search_keeps_the_sharp_wall() {
    let mut kernel = MockKernel::new().with_blend_limit(0.0);
    let spec = FunnelSpec {
        minimum_wall: 1.5,
        ..FunnelSpec::default()
    };
    let funnel = build_funnel(&mut kernel, &spec).unwrap();
    let search = funnel.fillet.unwrap();
    assert!(!search.succeeded);
    assert_eq!(search.attempts, MAX_FILLET_ATTEMPTS);
    assert_eq!(kernel.fillet_attempts(), MAX_FILLET_ATTEMPTS);
    assert_eq!(
        funnel.part.diagnostics.warnings,
        vec![OpWarning::FilletSearchExhausted {
            start_radius: 1.5,
            attempts: MAX_FILLET_ATTEMPTS
        }]
    );
}

#[test]
fn unsupported_fillet_ends_search_at_once() {
    let mut kernel = TruckKernel::new();
    let square = Profile::new(ClosedCurve::Polyline {
        points: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
    });
    let part = execute_extrude(&mut kernel, &square, &Frame::identity(), 2.0).unwrap();
    let edges = kernel.list_edges(&part.solid);
    let search = find_max_fillet_radius(&mut kernel, &part.solid, &edges, 1.0, 100).unwrap();
    assert!(!search.succeeded);
    assert_eq!(search.attempts, 1);
    assert_eq!(search.body, part.solid);

    let chamfered = execute_chamfer(
        &mut kernel,
        part,
        &TopoQuery::new().filter(Filter::SurfaceType {
            surface_type: "line".to_string(),
        }),
        0.2,
    )
    .unwrap();
    assert!(matches!(
        chamfered.diagnostics.warnings.as_slice(),
        [OpWarning::BlendSkipped { .. }]
    ));
}

#[test]
fn search_rejects_bad_input() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 5.0, 2.0);
    let edges = kernel.list_edges(&part.solid);
    assert!(find_max_fillet_radius(&mut kernel, &part.solid, &edges, 0.0, 10).is_err());
    assert!(find_max_fillet_radius(&mut kernel, &part.solid, &[], 1.0, 10).is_err());
    assert_eq!(kernel.fillet_attempts(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn search_stays_within_cap_and_start(
        limit in 0.0f64..3.0,
        start in 0.05f64..5.0,
        cap in 1usize..120,
    ) {
        let mut kernel = MockKernel::new().with_blend_limit(limit);
        let square = Profile::new(ClosedCurve::Polyline {
            points: vec![[0.0, 0.0], [8.0, 0.0], [8.0, 8.0], [0.0, 8.0]],
        });
        let part = execute_extrude(&mut kernel, &square, &Frame::identity(), 8.0).unwrap();
        let edges = kernel.list_edges(&part.solid);

        let search = find_max_fillet_radius(&mut kernel, &part.solid, &edges, start, cap).unwrap();
        prop_assert!(search.attempts <= cap);
        prop_assert_eq!(kernel.fillet_attempts(), search.attempts);
        if search.succeeded {
            prop_assert!(search.radius > 0.0);
            prop_assert!(search.radius <= start);
            prop_assert!(search.radius <= limit + 1e-9);
        } else {
            prop_assert_eq!(search.attempts, cap);
            prop_assert_eq!(&search.body, &part.solid);
        }
    }
}

// ── Holes, labels, threads ─────────────────────────────────────────────────

#[test]
fn countersink_opens_both_caps() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 6.5);
    let bottom_before = planar_area(&kernel, &part, [0.0, 0.0, -1.0]);
    let faces_before = kernel.list_faces(&part.solid).len();

    let bottom = only(&part, FaceName::Bottom);
    let hole = Countersink {
        radius: 5.05,
        sink_radius: 5.05 + 0.437,
        angle_degrees: 82.0,
        depth: 6.5,
    };
    let drilled = execute_countersink(&mut kernel, part, &bottom, &hole).unwrap();

    let bottom_after = planar_area(&kernel, &drilled, [0.0, 0.0, -1.0]);
    assert_relative_eq!(
        bottom_before - bottom_after,
        std::f64::consts::PI * hole.sink_radius.powi(2),
        epsilon = 1e-9
    );
    // sink cone and bore wall
    assert_eq!(kernel.list_faces(&drilled.solid).len(), faces_before + 2);
    assert!(drilled.faces.contains(FaceName::Top));
}

#[test]
fn countersink_deeper_than_hole_rejected() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 6.5);
    let bottom = only(&part, FaceName::Bottom);
    let hole = Countersink {
        radius: 1.0,
        sink_radius: 5.0,
        angle_degrees: 82.0,
        depth: 2.0,
    };
    assert!(matches!(
        execute_countersink(&mut kernel, part, &bottom, &hole),
        Err(OpError::InvalidParameter { .. })
    ));
}

fn planar_area(kernel: &MockKernel, part: &SubPart, normal: [f64; 3]) -> f64 {
    kernel
        .compute_all_signatures(&part.solid, TopoKind::Face)
        .into_iter()
        .filter(|(_, s)| {
            s.normal.is_some_and(|n| {
                (n[0] - normal[0]).abs() + (n[1] - normal[1]).abs() + (n[2] - normal[2]).abs()
                    < 1e-9
            })
        })
        .filter_map(|(_, s)| s.area)
        .fold(0.0, f64::max)
}

#[test]
fn label_is_cut_into_the_flat() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 6.5);
    let flat = only(&part, FaceName::Side { dir: SideDir::NegY });
    let before = planar_area(&kernel, &part, [0.0, -1.0, 0.0]);

    let outlines = BlockLetters.outlines("R1.0", 3.0).unwrap();
    let cut: f64 = outlines.iter().map(|p| p.area()).sum();
    let labelled = execute_label(&mut kernel, part, &flat, &BlockLetters, "R1.0", 3.0, 0.4).unwrap();

    let after = planar_area(&kernel, &labelled, [0.0, -1.0, 0.0]);
    assert_relative_eq!(before - after, cut, epsilon = 1e-9);
}

#[test]
fn envelope_thread_with_chamfered_end() {
    let mut kernel = MockKernel::new();
    let spec = ThreadSpec::new(ThreadKind::External, 11.5, 1.25, 10.875)
        .with_interference(0.5)
        .with_end_finishes(EndFinish::Square, EndFinish::Chamfer);
    let body = EnvelopeThreads.generate(&mut kernel, &spec).unwrap();

    let sigs = kernel.compute_all_signatures(&body, TopoKind::Face);
    let conical: Vec<_> = sigs.iter().filter(|(_, s)| s.is_type("conical")).collect();
    assert_eq!(conical.len(), 1);
    assert_relative_eq!(
        conical[0].1.centroid.unwrap()[2],
        10.875 - spec.depth() / 4.0,
        epsilon = 1e-9
    );
}

#[test]
fn socket_edges_fillet_through_query() {
    let mut kernel = MockKernel::new();
    let part = hex_body(&mut kernel, 10.5, 20.0);
    let vertical = TopoQuery::new().filter(Filter::ParallelTo {
        direction: [0.0, 0.0, 1.0],
        tolerance: 1e-6,
    });
    let rounded = execute_fillet(&mut kernel, part, &vertical, 3.0).unwrap();
    let blends = kernel
        .compute_all_signatures(&rounded.solid, TopoKind::Face)
        .into_iter()
        .filter(|(_, s)| s.is_type("cylindrical"))
        .count();
    assert_eq!(blends, 6);
    assert!(rounded.diagnostics.is_empty());
}
