//! Entry point for building a part family from a parameter set.

use std::fmt;
use std::str::FromStr;

use geom_kernel::KernelSolidHandle;
use part_config::{ExternalFittingParams, InternalFunnelParams, ParameterSet};
use part_ops::{
    execute_label, select_face, BlockLetters, EnvelopeThreads, KernelBundle, LabelFont, SubPart,
    ThreadGenerator, ThreadSpec,
};
use part_types::{FaceName, FaceSelector, Frame, SideDir};
use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::error::{BuildError, BuildWarning};
use crate::{external_fitting, internal_funnel};

/// The part families this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    ExternalFitting,
    InternalFunnel,
}

impl PartKind {
    pub const ALL: [PartKind; 2] = [PartKind::ExternalFitting, PartKind::InternalFunnel];

    /// File-name friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            PartKind::ExternalFitting => "external_fitting",
            PartKind::InternalFunnel => "internal_funnel",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "external_fitting" | "external" => Ok(PartKind::ExternalFitting),
            "internal_funnel" | "internal" | "funnel" => Ok(PartKind::InternalFunnel),
            other => Err(format!("unknown part {:?}", other)),
        }
    }
}

/// Collaborators and switches for a build.
#[derive(Clone, Copy)]
pub struct BuildOptions<'a> {
    /// Font for engraved labels. `None` skips labelling.
    pub labels: Option<&'a dyn LabelFont>,
    pub threads: &'a dyn ThreadGenerator,
    /// Chamfer the bottom of the socket's thread bore.
    pub chamfer_socket_thread: bool,
}

impl Default for BuildOptions<'static> {
    fn default() -> Self {
        Self {
            labels: Some(&BlockLetters),
            threads: &EnvelopeThreads,
            chamfer_socket_thread: false,
        }
    }
}

impl<'a> BuildOptions<'a> {
    pub fn without_labels(self) -> Self {
        Self {
            labels: None,
            ..self
        }
    }
}

/// A built part and what the build had to work around.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub kind: PartKind,
    pub assembly: Assembly,
    pub warnings: Vec<BuildWarning>,
}

/// Resolve the parameters for `kind` and build it.
#[tracing::instrument(skip(kb, params, options), fields(part = %kind))]
pub fn build_part(
    kb: &mut dyn KernelBundle,
    kind: PartKind,
    params: &ParameterSet,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    let output = match kind {
        PartKind::ExternalFitting => {
            let p = ExternalFittingParams::resolve(params)?;
            external_fitting::build(kb, &p, options)?
        }
        PartKind::InternalFunnel => {
            let p = InternalFunnelParams::resolve(params)?;
            internal_funnel::build(kb, &p, options)?
        }
    };
    tracing::info!(
        bodies = output.assembly.body_count(),
        warnings = output.warnings.len(),
        "part built"
    );
    Ok(output)
}

/// Engrave `text` on a flat side of `part` when a font is configured.
#[allow(clippy::too_many_arguments)]
pub(crate) fn label_side(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    side: SideDir,
    text: &str,
    size: f64,
    depth: f64,
    options: &BuildOptions,
    step: &str,
) -> Result<SubPart, BuildError> {
    let Some(font) = options.labels else {
        tracing::debug!(step, text, "no label font, label skipped");
        return Ok(part);
    };
    let selector = FaceSelector::Named {
        name: FaceName::Side { dir: side },
    };
    let face = select_face(kb.as_introspect(), &part, &selector)
        .map_err(|e| BuildError::at(step, e))?;
    execute_label(kb, part, &face, font, text, size, depth).map_err(|e| BuildError::at(step, e))
}

/// Generate a thread and move it to `placement`.
pub(crate) fn place_thread(
    kb: &mut dyn KernelBundle,
    threads: &dyn ThreadGenerator,
    spec: &ThreadSpec,
    placement: &Frame,
    step: &str,
) -> Result<KernelSolidHandle, BuildError> {
    let body = threads
        .generate(kb, spec)
        .map_err(|e| BuildError::at(step, e))?;
    if placement.approx_eq(&Frame::identity(), 1e-12) {
        return Ok(body);
    }
    kb.transform_solid(&body, placement)
        .map_err(|e| BuildError::at(step, e.into()))
}

/// Move a sub-part's warnings onto the build's list under `step`.
pub(crate) fn take_warnings(step: &str, part: &mut SubPart, into: &mut Vec<BuildWarning>) {
    into.extend(
        part.diagnostics
            .warnings
            .drain(..)
            .map(|w| BuildWarning::from_op(step, w)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_kinds_parse_from_names() {
        assert_eq!("external-fitting".parse::<PartKind>(), Ok(PartKind::ExternalFitting));
        assert_eq!("Internal_Funnel".parse::<PartKind>(), Ok(PartKind::InternalFunnel));
        assert!("bracket".parse::<PartKind>().is_err());
        for kind in PartKind::ALL {
            assert_eq!(kind.slug().parse::<PartKind>(), Ok(kind));
        }
    }
}
