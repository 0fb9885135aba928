//! Edge and face selection over kernel signatures.
//!
//! Named faces come from the sub-part's registry. Everything else is
//! picked geometrically, since ids do not survive an operation.

use geom_kernel::{KernelId, KernelIntrospect, KernelSolidHandle};
use part_types::{
    Axis, AxisEnd, FaceSelector, Filter, Frame, Pick, SortKey, TopoKind, TopoQuery, TopoSignature,
};

use crate::types::{OpError, SubPart};

/// Two faces closer than this along the ranking axis tie.
const RANK_TOL: f64 = 1e-6;

/// Evaluate a query against every entity of `kind` in a solid.
pub fn query(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    kind: TopoKind,
    q: &TopoQuery,
) -> Vec<KernelId> {
    let mut matches: Vec<(KernelId, TopoSignature)> = introspect
        .compute_all_signatures(solid, kind)
        .into_iter()
        .filter(|(_, sig)| q.filters.iter().all(|f| passes(f, sig)))
        .collect();

    for key in &q.sort_keys {
        matches.sort_by(|(_, a), (_, b)| sort_value(key, a).total_cmp(&sort_value(key, b)));
    }

    let ids: Vec<KernelId> = matches.into_iter().map(|(id, _)| id).collect();
    match q.pick {
        Pick::All => ids,
        Pick::First => ids.into_iter().take(1).collect(),
        Pick::Last => ids.last().copied().into_iter().collect(),
        Pick::LastN { count } => {
            let skip = ids.len().saturating_sub(count);
            ids.into_iter().skip(skip).collect()
        }
    }
}

fn passes(filter: &Filter, sig: &TopoSignature) -> bool {
    match filter {
        Filter::SurfaceType { surface_type } => sig.is_type(surface_type),
        Filter::ParallelTo {
            direction,
            tolerance,
        } => sig.is_type("line")
            && sig
                .axis
                .is_some_and(|a| 1.0 - cos_between(a, *direction).abs() <= *tolerance),
        Filter::NormalDirection {
            direction,
            tolerance,
        } => sig
            .normal
            .is_some_and(|n| 1.0 - cos_between(n, *direction) <= *tolerance),
        Filter::AxisRange { axis, min, max } => sig.centroid.is_some_and(|c| {
            let v = axis.component(c);
            v >= *min && v <= *max
        }),
    }
}

fn sort_value(key: &SortKey, sig: &TopoSignature) -> f64 {
    match key {
        SortKey::Radius => sig.radius.unwrap_or(f64::NEG_INFINITY),
        SortKey::Area => sig.area.unwrap_or(f64::NEG_INFINITY),
        SortKey::Along { axis } => sig
            .centroid
            .map(|c| axis.component(c))
            .unwrap_or(f64::NEG_INFINITY),
    }
}

fn cos_between(a: [f64; 3], b: [f64; 3]) -> f64 {
    let la = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt();
    let lb = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();
    if la < 1e-12 || lb < 1e-12 {
        return 0.0;
    }
    (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]) / (la * lb)
}

/// The single planar face whose centroid lies furthest towards `end`
/// along `axis`.
pub fn extremal_planar_face(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    axis: Axis,
    end: AxisEnd,
) -> Result<(KernelId, TopoSignature), OpError> {
    let selector = FaceSelector::Extremal { axis, end };
    let sign = match end {
        AxisEnd::Max => 1.0,
        AxisEnd::Min => -1.0,
    };
    let mut ranked: Vec<(KernelId, TopoSignature, f64)> = introspect
        .compute_all_signatures(solid, TopoKind::Face)
        .into_iter()
        .filter(|(_, sig)| sig.is_type("planar") && sig.normal.is_some())
        .filter_map(|(id, sig)| {
            let rank = sig.centroid.map(|c| sign * axis.component(c))?;
            Some((id, sig, rank))
        })
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    let Some(best) = ranked.first().map(|r| r.2) else {
        return Err(OpError::FaceSelectionEmpty {
            selector: selector.to_string(),
        });
    };
    let count = ranked.iter().filter(|r| best - r.2 <= RANK_TOL).count();
    if count > 1 {
        return Err(OpError::FaceSelectionAmbiguous {
            selector: selector.to_string(),
            count,
        });
    }
    let (id, sig, _) = ranked.swap_remove(0);
    Ok((id, sig))
}

/// Frame on a planar face: centroid origin, outward normal as Z.
pub fn face_frame(sig: &TopoSignature) -> Option<Frame> {
    Frame::from_origin_normal(sig.centroid?, sig.normal?)
}

/// Resolve a selector on a sub-part to exactly one face frame, in the
/// sub-part's local coordinates.
pub fn select_face(
    introspect: &dyn KernelIntrospect,
    part: &SubPart,
    selector: &FaceSelector,
) -> Result<Frame, OpError> {
    match selector {
        FaceSelector::Named { name } => {
            let mut frames = part.faces.lookup(*name);
            match frames.len() {
                0 => Err(OpError::FaceSelectionEmpty {
                    selector: selector.to_string(),
                }),
                1 => Ok(frames.remove(0)),
                count => Err(OpError::FaceSelectionAmbiguous {
                    selector: selector.to_string(),
                    count,
                }),
            }
        }
        FaceSelector::Extremal { axis, end } => {
            let (_, sig) = extremal_planar_face(introspect, &part.solid, *axis, *end)?;
            face_frame(&sig).ok_or_else(|| OpError::FaceSelectionEmpty {
                selector: selector.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(surface: &str, centroid: [f64; 3], radius: Option<f64>) -> TopoSignature {
        TopoSignature {
            surface_type: Some(surface.to_string()),
            centroid: Some(centroid),
            radius,
            ..TopoSignature::empty()
        }
    }

    #[test]
    fn filters_match_expected_signatures() {
        let circle = sig("circle", [0.0, 0.0, 5.0], Some(2.0));
        assert!(passes(
            &Filter::SurfaceType {
                surface_type: "circle".to_string()
            },
            &circle
        ));
        assert!(passes(
            &Filter::AxisRange {
                axis: Axis::Z,
                min: 4.9,
                max: 5.1
            },
            &circle
        ));
        assert!(!passes(
            &Filter::AxisRange {
                axis: Axis::Z,
                min: 0.0,
                max: 1.0
            },
            &circle
        ));

        let mut line = sig("line", [0.0; 3], None);
        line.axis = Some([0.0, 0.0, -1.0]);
        let vertical = Filter::ParallelTo {
            direction: [0.0, 0.0, 1.0],
            tolerance: 1e-6,
        };
        assert!(passes(&vertical, &line));
        assert!(!passes(&vertical, &circle));
    }

    /// Edges of an extruded annulus: circles of radius 2 and 5 at z = 0 and 4.
    fn ring_edges(q: &TopoQuery) -> Vec<(f64, f64)> {
        use geom_kernel::{ClosedCurve, Kernel, MockKernel, Profile};

        let mut kernel = MockKernel::new();
        let ring = Profile::new(ClosedCurve::circle(5.0)).with_hole(ClosedCurve::circle(2.0));
        let face = kernel.make_profile_face(&ring, &Frame::identity()).unwrap();
        let solid = kernel.extrude_face(face, 4.0).unwrap();
        query(&kernel, &solid, TopoKind::Edge, q)
            .into_iter()
            .map(|id| {
                let s = kernel.compute_signature(id, TopoKind::Edge);
                (s.radius.unwrap(), s.centroid.unwrap()[2])
            })
            .collect()
    }

    fn circles() -> TopoQuery {
        TopoQuery::new().filter(Filter::SurfaceType {
            surface_type: "circle".to_string(),
        })
    }

    #[test]
    fn later_sort_key_dominates() {
        let by_height = circles()
            .sort_by(SortKey::Radius)
            .sort_by(SortKey::Along { axis: Axis::Z });
        assert_eq!(
            ring_edges(&by_height),
            vec![(2.0, 0.0), (5.0, 0.0), (2.0, 4.0), (5.0, 4.0)]
        );

        let by_radius = circles()
            .sort_by(SortKey::Along { axis: Axis::Z })
            .sort_by(SortKey::Radius);
        assert_eq!(
            ring_edges(&by_radius),
            vec![(2.0, 0.0), (2.0, 4.0), (5.0, 0.0), (5.0, 4.0)]
        );
    }

    #[test]
    fn picks_apply_after_sorting() {
        let sorted = circles()
            .sort_by(SortKey::Radius)
            .sort_by(SortKey::Along { axis: Axis::Z });
        assert_eq!(ring_edges(&sorted.clone().pick(Pick::First)), vec![(2.0, 0.0)]);
        assert_eq!(ring_edges(&sorted.clone().pick(Pick::Last)), vec![(5.0, 4.0)]);
        assert_eq!(
            ring_edges(&sorted.clone().pick(Pick::LastN { count: 2 })),
            vec![(2.0, 4.0), (5.0, 4.0)]
        );
        assert_eq!(ring_edges(&sorted.pick(Pick::LastN { count: 9 })).len(), 4);
    }
}
