//! The internal funnel: a hex socket that screws onto the fitting's shaft,
//! a short bend that tilts the tube path, and the filament funnel on top.

use geom_kernel::{ClosedCurve, Profile};
use part_config::{FunnelStyle, InternalFunnelParams};
use part_ops::{
    build_funnel, execute_chamfer, execute_extrude, execute_fillet, execute_revolve, FunnelShape,
    FunnelSpec, KernelBundle, OpError, SubPart, ThreadKind, ThreadSpec,
};
use part_types::{Axis, FaceSelector, Filter, Frame, Pick, SideDir, SortKey, TopoQuery};

use crate::assembly::assemble;
use crate::build::{label_side, place_thread, BuildOptions, BuildOutput, PartKind};
use crate::error::BuildError;
use crate::stack::{fuse, Stack};

pub const ROOT_LABEL: &str = "Internal Funnel";
pub const BASE_GROUP: &str = "base";
pub const FUNNEL_GROUP: &str = "filament funnel";

const REVISION_SIZE: f64 = 3.0;
const TUBE_LABEL_SIZE: f64 = 2.0;

/// Radius of the socket's thread bore.
pub fn socket_bore_radius(p: &InternalFunnelParams) -> f64 {
    (p.shaft.diameter + p.fitting.tolerance) / 2.0
}

/// Diameters print with at least one decimal, so 3 reads "3.0".
fn decimal(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Hex socket around the thread bore, with rounded vertical edges and
/// its labels.
pub fn socket_base(
    kb: &mut dyn KernelBundle,
    p: &InternalFunnelParams,
    options: &BuildOptions,
) -> Result<SubPart, BuildError> {
    const STEP: &str = "socket base";
    let at = |e| BuildError::at(STEP, e);

    let profile = Profile::new(ClosedCurve::regular_polygon(p.fitting.hex_diameter / 2.0, 6))
        .with_hole(ClosedCurve::circle(socket_bore_radius(p)));
    let mut part = execute_extrude(kb, &profile, &Frame::identity(), p.shaft.length).map_err(at)?;

    if options.chamfer_socket_thread {
        // lowest, then smallest: the bore's bottom rim
        let bore_rim = TopoQuery::new()
            .filter(Filter::SurfaceType {
                surface_type: "circle".to_string(),
            })
            .sort_by(SortKey::Radius)
            .sort_by(SortKey::Along { axis: Axis::Z })
            .pick(Pick::First);
        part = execute_chamfer(kb, part, &bore_rim, p.fitting.pitch / 2.0).map_err(at)?;
    }

    let vertical = TopoQuery::new().filter(Filter::ParallelTo {
        direction: [0.0, 0.0, 1.0],
        tolerance: 1e-6,
    });
    part = execute_fillet(kb, part, &vertical, p.fitting.hex_diameter / 7.0).map_err(at)?;

    let part = label_side(
        kb,
        part,
        SideDir::PosY,
        &p.label.revision,
        REVISION_SIZE,
        p.label.depth,
        options,
        STEP,
    )?;
    let tube_label = format!(
        "ID{}\nOD{}",
        decimal(p.tube.inner_diameter),
        decimal(p.tube.outer_diameter)
    );
    label_side(
        kb,
        part,
        SideDir::NegY,
        &tube_label,
        TUBE_LABEL_SIZE,
        p.label.depth,
        options,
        STEP,
    )
}

/// Rounded hex ring swept `bend.angle` degrees about an X-parallel axis
/// below its centre. The start cap is `Bottom`, the end cap `Top`.
pub fn bend(kb: &mut dyn KernelBundle, p: &InternalFunnelParams) -> Result<SubPart, OpError> {
    let angle = p.bend.angle_degrees;
    if !(angle > 0.0 && angle < 360.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("bend angle must be between 0 and 360 degrees, got {}", angle),
        });
    }
    let hex = p.fitting.hex_diameter;
    let profile = Profile::new(ClosedCurve::rounded_polygon(hex / 2.0, 6, hex / 8.0))
        .with_hole(ClosedCurve::circle(p.tube.bore_radius()));
    execute_revolve(
        kb,
        &profile,
        &Frame::identity(),
        [0.0, -p.bend_axis_offset(), 0.0],
        [1.0, 0.0, 0.0],
        angle.to_radians(),
    )
}

/// Funnel dimensions derived from the fitting.
pub fn funnel_spec(p: &InternalFunnelParams) -> FunnelSpec {
    FunnelSpec {
        shape: match p.funnel.style {
            FunnelStyle::Hex => FunnelShape::Hex,
            FunnelStyle::Cone => FunnelShape::Cone,
        },
        lower_radius: p.funnel_lower_radius(),
        upper_radius: p.funnel_upper_radius(),
        inner_radius: p.tube.passage_radius(),
        height: p.funnel.length,
        minimum_wall: p.funnel.minimum_wall,
    }
}

pub fn socket_thread(p: &InternalFunnelParams) -> ThreadSpec {
    ThreadSpec::new(
        ThreadKind::Internal,
        p.shaft.diameter + p.fitting.tolerance,
        p.fitting.pitch,
        p.shaft.length,
    )
}

pub fn build(
    kb: &mut dyn KernelBundle,
    p: &InternalFunnelParams,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    let spec = funnel_spec(p);

    let mut stack = Stack::start("socket base", socket_base(kb, p, options)?);
    stack.attach(kb, &FaceSelector::top(), "bend", |kb| bend(kb, p))?;
    stack.attach(kb, &FaceSelector::top(), "funnel", |kb| {
        build_funnel(kb, &spec).map(|f| f.part)
    })?;
    let warnings = stack.warnings();

    let (base_steps, funnel_steps) = stack.steps().split_at(2);
    let base = fuse(kb, base_steps, "base")?;
    let mut funnel = Vec::with_capacity(funnel_steps.len());
    for step in funnel_steps {
        funnel.push(step.world_solid(kb)?);
    }
    let thread = place_thread(
        kb,
        options.threads,
        &socket_thread(p),
        &Frame::identity(),
        "socket thread",
    )?;

    let pairs = [(BASE_GROUP, base.solid), (BASE_GROUP, thread)]
        .into_iter()
        .chain(funnel.into_iter().map(|b| (FUNNEL_GROUP, b)))
        .map(|(label, body)| (label.to_string(), body));
    Ok(BuildOutput {
        kind: PartKind::InternalFunnel,
        assembly: assemble(ROOT_LABEL, pairs),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use part_config::ParameterSet;

    #[test]
    fn diameters_keep_one_decimal() {
        assert_eq!(decimal(3.0), "3.0");
        assert_eq!(decimal(6.0), "6.0");
        assert_eq!(decimal(1.75), "1.75");
    }

    #[test]
    fn funnel_follows_the_shaft() {
        let p = InternalFunnelParams::resolve(&ParameterSet::new()).unwrap();
        let spec = funnel_spec(&p);
        assert_eq!(spec.shape, FunnelShape::Hex);
        assert_relative_eq!(spec.lower_radius, 5.75 + 4.5);
        assert_relative_eq!(spec.upper_radius, (5.75 + 4.5) * 1.5);
        assert_relative_eq!(spec.inner_radius, 1.7);
        assert_relative_eq!(spec.minimum_wall, 1.5);
    }
}
