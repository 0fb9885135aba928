//! Funnel cross-sections and the lofted funnel body.
//!
//! The outer wall is lofted from a base section to a wider top section and
//! a circular passage lofted the same way is subtracted from it. When a
//! minimum wall is requested the rim edges on the top cap are rounded.

use geom_kernel::{ClosedCurve, LoftSection, Profile};
use part_types::{Axis, AxisEnd, Frame};
use serde::{Deserialize, Serialize};

use crate::boolean::{execute_boolean, BooleanKind, TOOL_OVERSHOOT};
use crate::extrude::execute_loft;
use crate::fillet::{fillet_with_search, FilletSearch, MAX_FILLET_ATTEMPTS};
use crate::kernel_ext::KernelBundle;
use crate::select::extremal_planar_face;
use crate::types::{OpError, SubPart};

/// Outer cross-section family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunnelShape {
    /// Circular outside.
    Cone,
    /// Hexagonal outside with rounded corners.
    Hex,
}

/// Dimensions of one funnel loft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelSpec {
    pub shape: FunnelShape,
    /// Outer size at the base: circle radius, or hexagon circumradius.
    pub lower_radius: f64,
    /// Outer size at the top.
    pub upper_radius: f64,
    /// Passage radius at the base.
    pub inner_radius: f64,
    pub height: f64,
    /// Wall left at the top rim. Zero or less skips the rim fillet.
    pub minimum_wall: f64,
}

impl Default for FunnelSpec {
    fn default() -> Self {
        Self {
            shape: FunnelShape::Hex,
            lower_radius: 10.0,
            upper_radius: 20.0,
            inner_radius: 5.0,
            height: 30.0,
            minimum_wall: 0.0,
        }
    }
}

impl FunnelSpec {
    /// Passage radius at the top: the top wall is `minimum_wall` thick,
    /// measured to the flats for the hexagon.
    pub fn inner_top_radius(&self) -> f64 {
        match self.shape {
            FunnelShape::Cone => self.upper_radius - self.minimum_wall,
            FunnelShape::Hex => self.upper_radius * 3f64.sqrt() / 2.0 - self.minimum_wall,
        }
    }

    fn outer_curve(&self, radius: f64) -> ClosedCurve {
        match self.shape {
            FunnelShape::Cone => ClosedCurve::circle(radius),
            FunnelShape::Hex => ClosedCurve::rounded_polygon(radius, 6, radius / 4.0),
        }
    }
}

/// The four loft sections of a funnel.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelProfiles {
    pub outer_base: ClosedCurve,
    pub outer_top: ClosedCurve,
    pub inner_base: ClosedCurve,
    pub inner_top: ClosedCurve,
}

/// Generate the base and top sections, rejecting geometry no loft can
/// realize.
///
/// The top wall is not checked: a non-positive `minimum_wall` is accepted
/// as given. A passage radius that is not positive, or a base passage that
/// does not fit inside the base outline, is always rejected.
pub fn funnel_profiles(spec: &FunnelSpec) -> Result<FunnelProfiles, OpError> {
    if !(spec.height > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("funnel height must be positive, got {}", spec.height),
        });
    }
    if !(spec.lower_radius > 0.0) || !(spec.upper_radius > 0.0) {
        return Err(OpError::InvalidProfileGeometry {
            reason: format!(
                "outer radii must be positive, got {} and {}",
                spec.lower_radius, spec.upper_radius
            ),
        });
    }
    let inner_top = spec.inner_top_radius();
    if !(spec.inner_radius > 0.0) {
        return Err(OpError::InvalidProfileGeometry {
            reason: format!("inner base radius {} is not positive", spec.inner_radius),
        });
    }
    if !(inner_top > 0.0) {
        return Err(OpError::InvalidProfileGeometry {
            reason: format!(
                "inner top radius {:.4} is not positive (wall {} on upper radius {})",
                inner_top, spec.minimum_wall, spec.upper_radius
            ),
        });
    }

    let profiles = FunnelProfiles {
        outer_base: spec.outer_curve(spec.lower_radius),
        outer_top: spec.outer_curve(spec.upper_radius),
        inner_base: ClosedCurve::circle(spec.inner_radius),
        inner_top: ClosedCurve::circle(inner_top),
    };
    if !Profile::new(profiles.outer_base.clone()).contains(&profiles.inner_base) {
        return Err(OpError::InvalidProfileGeometry {
            reason: format!(
                "inner base radius {} does not fit inside the base outline",
                spec.inner_radius
            ),
        });
    }
    Ok(profiles)
}

/// Passage radii and heights of the cutting loft, carried on past the base
/// and the top along the same taper.
fn passage_sections(spec: &FunnelSpec) -> [(f64, f64); 2] {
    let (base, top) = (spec.inner_radius, spec.inner_top_radius());
    let slope = (top - base) / spec.height;
    let reach = if slope.abs() > 1e-12 {
        TOOL_OVERSHOOT.min(0.5 * base.min(top) / slope.abs())
    } else {
        TOOL_OVERSHOOT
    };
    [
        (base - slope * reach, -reach),
        (top + slope * reach, spec.height + reach),
    ]
}

/// A built funnel and, when a rim fillet was attempted, how it went.
#[derive(Debug, Clone)]
pub struct Funnel {
    pub part: SubPart,
    pub profiles: FunnelProfiles,
    pub fillet: Option<FilletSearch>,
}

/// Loft, hollow out and round the rim of a funnel, in its own frame with
/// the base on the XY plane.
#[tracing::instrument(level = "debug", skip(kb))]
pub fn build_funnel(kb: &mut dyn KernelBundle, spec: &FunnelSpec) -> Result<Funnel, OpError> {
    let profiles = funnel_profiles(spec)?;
    let base = Frame::identity();
    let top = Frame::translation(0.0, 0.0, spec.height);

    let outer = execute_loft(
        kb,
        &[
            LoftSection {
                profile: Profile::new(profiles.outer_base.clone()),
                frame: base,
            },
            LoftSection {
                profile: Profile::new(profiles.outer_top.clone()),
                frame: top,
            },
        ],
    )?;
    let sections: Vec<LoftSection> = passage_sections(spec)
        .into_iter()
        .map(|(radius, z)| LoftSection {
            profile: Profile::new(ClosedCurve::circle(radius)),
            frame: Frame::translation(0.0, 0.0, z),
        })
        .collect();
    let passage = kb.loft(&sections)?;
    let part = execute_boolean(kb, outer, &passage, BooleanKind::Subtract)?;

    if spec.minimum_wall <= 0.0 {
        tracing::debug!("no minimum wall, rim left sharp");
        return Ok(Funnel {
            part,
            profiles,
            fillet: None,
        });
    }

    let (rim_face, _) = extremal_planar_face(kb.as_introspect(), &part.solid, Axis::Z, AxisEnd::Max)?;
    let rim = kb.as_introspect().face_edges(rim_face);
    let (start, attempts) = match spec.shape {
        FunnelShape::Cone => (spec.minimum_wall / 4.0, 1),
        FunnelShape::Hex => (spec.minimum_wall, MAX_FILLET_ATTEMPTS),
    };
    let (part, search) = fillet_with_search(kb, part, &rim, start, attempts)?;
    tracing::debug!(radius = search.radius, attempts = search.attempts, "rim fillet");
    Ok(Funnel {
        part,
        profiles,
        fillet: Some(search),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hex_inner_top_measures_to_the_flats() {
        let spec = FunnelSpec {
            upper_radius: 20.0,
            minimum_wall: 1.5,
            ..FunnelSpec::default()
        };
        assert_relative_eq!(spec.inner_top_radius(), 15.820508, epsilon = 1e-6);
        let cone = FunnelSpec {
            shape: FunnelShape::Cone,
            ..spec
        };
        assert_relative_eq!(cone.inner_top_radius(), 18.5);
    }

    #[test]
    fn hex_corners_round_at_a_quarter_circumradius() {
        let p = funnel_profiles(&FunnelSpec::default()).unwrap();
        assert_eq!(p.outer_top, ClosedCurve::rounded_polygon(20.0, 6, 5.0));
        assert_eq!(p.outer_base, ClosedCurve::rounded_polygon(10.0, 6, 2.5));
    }

    #[test]
    fn thin_top_wall_is_tolerated_without_a_minimum() {
        let spec = FunnelSpec {
            minimum_wall: -3.0,
            ..FunnelSpec::default()
        };
        let p = funnel_profiles(&spec).unwrap();
        // passage wider than the top flats, still accepted
        assert_eq!(p.inner_top, ClosedCurve::circle(20.0 * 3f64.sqrt() / 2.0 + 3.0));
    }

    #[test]
    fn uncontained_base_passage_rejected() {
        let spec = FunnelSpec {
            inner_radius: 9.0,
            ..FunnelSpec::default()
        };
        assert!(matches!(
            funnel_profiles(&spec),
            Err(OpError::InvalidProfileGeometry { .. })
        ));
    }

    #[test]
    fn passage_runs_past_both_caps_on_its_taper() {
        let spec = FunnelSpec::default();
        let [(r0, z0), (r1, z1)] = passage_sections(&spec);
        assert_relative_eq!(z0, -TOOL_OVERSHOOT);
        assert_relative_eq!(z1, spec.height + TOOL_OVERSHOOT);
        // the cut still meets the caps at the profile radii
        let at = |z: f64| r0 + (r1 - r0) * (z - z0) / (z1 - z0);
        assert_relative_eq!(at(0.0), spec.inner_radius, epsilon = 1e-9);
        assert_relative_eq!(at(spec.height), spec.inner_top_radius(), epsilon = 1e-9);
    }
}
