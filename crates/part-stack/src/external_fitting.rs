//! The external fitting: a hex nut threaded onto a connector, with a
//! collar and a threaded shaft that carries the tube.
//!
//! Stack, bottom to top: hex body with its labels, collar, shaft. The
//! fused body is then drilled: the counter-sunk connector bore from the
//! bottom and the tube bore right through. The two threads are generated
//! on their own and placed at fixed heights.

use geom_kernel::{ClosedCurve, Profile};
use part_config::ExternalFittingParams;
use part_ops::{
    execute_boolean, execute_chamfer, execute_countersink, execute_extrude, select_face,
    BooleanKind, Countersink, EndFinish, KernelBundle, OpError, SubPart, ThreadKind, ThreadSpec,
    TOOL_OVERSHOOT,
};
use part_types::{Axis, FaceSelector, Filter, Frame, Pick, SideDir, SortKey, TopoQuery};

use crate::assembly::assemble;
use crate::build::{label_side, place_thread, take_warnings, BuildOptions, BuildOutput, PartKind};
use crate::error::BuildError;
use crate::stack::Stack;

pub const ROOT_LABEL: &str = "External Fitting";
pub const BODY_GROUP: &str = "Outer Fitting";
pub const CONNECTOR_THREAD_GROUP: &str = "connector thread";
pub const SHAFT_THREAD_GROUP: &str = "shaft thread";

/// Included angle of the connector countersink, degrees.
const SINK_ANGLE: f64 = 82.0;
const REVISION_SIZE: f64 = 3.0;
const TUBE_LABEL_SIZE: f64 = 2.0;
/// How far the collar and the shaft reach down into the part below, so
/// that the fuse joins overlapping solids rather than touching ones.
const EMBED: f64 = 1.0;

/// Solid disc of `radius` whose top sits `height` above the local origin.
/// It starts [`EMBED`] below the origin.
pub(crate) fn embedded_disc(
    kb: &mut dyn KernelBundle,
    radius: f64,
    height: f64,
) -> Result<SubPart, OpError> {
    execute_extrude(
        kb,
        &Profile::new(ClosedCurve::circle(radius)),
        &Frame::translation(0.0, 0.0, -EMBED),
        height + EMBED,
    )
}

/// The counter-sunk hole the connector screws into.
pub fn connector_sink(p: &ExternalFittingParams) -> Countersink {
    let radius = p.connector.diameter / 2.0;
    Countersink {
        radius,
        sink_radius: radius + p.connector.pitch / 2.0,
        angle_degrees: SINK_ANGLE,
        depth: p.connector.depth,
    }
}

/// The hex nut with its labels.
pub fn hex_body(
    kb: &mut dyn KernelBundle,
    p: &ExternalFittingParams,
    options: &BuildOptions,
) -> Result<SubPart, BuildError> {
    const STEP: &str = "hex body";
    let at = |e| BuildError::at(STEP, e);

    let hex = Profile::new(ClosedCurve::regular_polygon(p.fitting.diameter / 2.0, 6));
    let body = execute_extrude(kb, &hex, &Frame::identity(), p.connector.depth).map_err(at)?;

    let body = label_side(
        kb,
        body,
        SideDir::NegY,
        &p.label.revision,
        REVISION_SIZE,
        p.label.depth,
        options,
        STEP,
    )?;
    let tube_label = format!("OD\n{}mm", p.tube.outer_diameter.floor());
    label_side(
        kb,
        body,
        SideDir::PosY,
        &tube_label,
        TUBE_LABEL_SIZE,
        p.label.depth,
        options,
        STEP,
    )
}

/// Tube bore along Z from below the base to above `top`.
fn tube_bore(kb: &mut dyn KernelBundle, radius: f64, top: f64) -> Result<SubPart, OpError> {
    execute_extrude(
        kb,
        &Profile::new(ClosedCurve::circle(radius)),
        &Frame::translation(0.0, 0.0, -TOOL_OVERSHOOT),
        top + 2.0 * TOOL_OVERSHOOT,
    )
}

/// Edge query for the outer rim at the top of the shaft.
pub fn shaft_rim() -> TopoQuery {
    TopoQuery::new()
        .filter(Filter::SurfaceType {
            surface_type: "circle".to_string(),
        })
        .sort_by(SortKey::Radius)
        .sort_by(SortKey::Along { axis: Axis::Z })
        .pick(Pick::Last)
}

/// The connector thread, ready to place at `connector.pitch / 2`.
pub fn connector_thread(p: &ExternalFittingParams) -> ThreadSpec {
    ThreadSpec::new(
        ThreadKind::Internal,
        p.connector.diameter,
        p.connector.pitch,
        p.connector.depth - p.connector.pitch / 2.0,
    )
}

/// The shaft thread, ready to place on top of the collar. It stops short
/// of the rim chamfer.
pub fn shaft_thread(p: &ExternalFittingParams) -> ThreadSpec {
    ThreadSpec::new(
        ThreadKind::External,
        p.shaft.diameter,
        p.fitting.pitch,
        p.shaft.length - p.fitting.depth - p.chamfer(),
    )
    .with_interference(p.shaft.interference)
    .with_end_finishes(EndFinish::Square, EndFinish::Chamfer)
}

pub fn build(
    kb: &mut dyn KernelBundle,
    p: &ExternalFittingParams,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    let shaft_radius = p.shaft.diameter / 2.0;

    let hex = hex_body(kb, p, options)?;
    let bottom = select_face(kb.as_introspect(), &hex, &FaceSelector::bottom())
        .map_err(|e| BuildError::at("hex body", e))?;
    let mut stack = Stack::start("hex body", hex);
    stack.attach(kb, &FaceSelector::top(), "collar", |kb| {
        embedded_disc(kb, shaft_radius, p.fitting.depth)
    })?;
    stack.attach(kb, &FaceSelector::top(), "shaft", |kb| {
        embedded_disc(kb, shaft_radius - 1.0, p.shaft.length - p.fitting.depth)
    })?;

    let mut warnings = stack.warnings();
    let body = stack.fuse(kb, "outer fitting")?;
    let body = execute_countersink(kb, body, &bottom, &connector_sink(p))
        .map_err(|e| BuildError::at("connector bore", e))?;
    let top = p.connector.depth + p.shaft.length;
    let bore = tube_bore(kb, p.tube.bore_radius(), top).map_err(|e| BuildError::at("tube bore", e))?;
    let body = execute_boolean(kb, body, &bore.solid, BooleanKind::Subtract)
        .map_err(|e| BuildError::at("tube bore", e))?;
    let mut body = execute_chamfer(kb, body, &shaft_rim(), p.chamfer())
        .map_err(|e| BuildError::at("shaft chamfer", e))?;
    take_warnings("shaft chamfer", &mut body, &mut warnings);

    let connector = place_thread(
        kb,
        options.threads,
        &connector_thread(p),
        &Frame::translation(0.0, 0.0, p.connector.pitch / 2.0),
        "connector thread",
    )?;
    let shaft = place_thread(
        kb,
        options.threads,
        &shaft_thread(p),
        &Frame::translation(0.0, 0.0, p.connector.depth + p.fitting.depth),
        "shaft thread",
    )?;

    let assembly = assemble(
        ROOT_LABEL,
        [
            (BODY_GROUP.to_string(), body.solid),
            (CONNECTOR_THREAD_GROUP.to_string(), connector),
            (SHAFT_THREAD_GROUP.to_string(), shaft),
        ],
    );
    Ok(BuildOutput {
        kind: PartKind::ExternalFitting,
        assembly,
        warnings,
    })
}
