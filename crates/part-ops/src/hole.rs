use geom_kernel::{ClosedCurve, Profile};
use part_types::Frame;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::boolean::{execute_boolean, BooleanKind, TOOL_OVERSHOOT};
use crate::kernel_ext::KernelBundle;
use crate::types::{OpError, SubPart};

/// A counter-sunk hole drilled from a face into the material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countersink {
    pub radius: f64,
    /// Radius of the sink where it meets the face.
    pub sink_radius: f64,
    /// Included angle of the sink cone, in degrees.
    pub angle_degrees: f64,
    /// Total depth from the face. The cutter runs on past it, and out
    /// through the face, by [`TOOL_OVERSHOOT`].
    pub depth: f64,
}

impl Countersink {
    /// Depth at which the sink cone meets the hole wall.
    pub fn sink_depth(&self) -> f64 {
        let half = self.angle_degrees.to_radians() / 2.0;
        (self.sink_radius - self.radius) / half.tan()
    }

    /// Half-section of the cutter as `(radius, depth)` corners, from the
    /// axis outside the face round to the axis past the bottom.
    pub fn section(&self) -> Vec<[f64; 2]> {
        let half = self.angle_degrees.to_radians() / 2.0;
        let o = TOOL_OVERSHOOT;
        vec![
            [0.0, -o],
            [self.sink_radius + o * half.tan(), -o],
            [self.radius, self.sink_depth()],
            [self.radius, self.depth + o],
            [0.0, self.depth + o],
        ]
    }
}

/// Cut a counter-sunk hole into `part` at `face`, a frame whose Z axis is
/// the face's outward normal.
pub fn execute_countersink(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    face: &Frame,
    hole: &Countersink,
) -> Result<SubPart, OpError> {
    if !(hole.radius > 0.0) || hole.sink_radius <= hole.radius {
        return Err(OpError::InvalidParameter {
            reason: format!(
                "countersink needs 0 < radius < sink radius, got {} and {}",
                hole.radius, hole.sink_radius
            ),
        });
    }
    if !(hole.angle_degrees > 0.0 && hole.angle_degrees < 180.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("countersink angle {} out of range", hole.angle_degrees),
        });
    }
    let sink_depth = hole.sink_depth();
    if sink_depth >= hole.depth {
        return Err(OpError::InvalidParameter {
            reason: format!(
                "sink depth {:.4} reaches past the hole depth {}",
                sink_depth, hole.depth
            ),
        });
    }

    // Z into the material
    let inward = face.compose(&Frame::rotation_about([0.0; 3], [1.0, 0.0, 0.0], PI).unwrap_or_default());

    // local Y along the hole, so the section turns about it
    let section_plane = inward.compose(
        &Frame::rotation_about([0.0; 3], [1.0, 0.0, 0.0], FRAC_PI_2).unwrap_or_default(),
    );
    let face = kb.make_profile_face(
        &Profile::new(ClosedCurve::Polyline {
            points: hole.section(),
        }),
        &section_plane,
    )?;
    let tool = kb.revolve_face(face, inward.origin(), inward.z_axis(), TAU)?;

    tracing::debug!(
        radius = hole.radius,
        sink = hole.sink_radius,
        depth = hole.depth,
        "countersink"
    );
    execute_boolean(kb, part, &tool, BooleanKind::Subtract)
}
