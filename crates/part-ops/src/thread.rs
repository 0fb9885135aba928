//! Threads as standalone bodies, built along +Z from the origin.

use geom_kernel::{ClosedCurve, KernelError, KernelSolidHandle, Profile, TopoKind};
use part_types::{Axis, Filter, Frame, Pick, SortKey, TopoQuery};
use serde::{Deserialize, Serialize};

use crate::kernel_ext::KernelBundle;
use crate::select;
use crate::types::OpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Right,
    Left,
}

/// Which side of the mating pair the thread is cut on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadKind {
    /// Inside a bore; `diameter` is the bore.
    Internal,
    /// Around a shaft; `diameter` is the major diameter.
    External,
}

/// How a thread end is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndFinish {
    /// Cut off flat.
    Square,
    /// Bevelled so the mating part starts cleanly.
    Chamfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSpec {
    pub diameter: f64,
    pub pitch: f64,
    pub length: f64,
    pub hand: Hand,
    pub kind: ThreadKind,
    /// Radial overlap with the host body so the two fuse.
    pub interference: f64,
    /// Finish at the start (z = 0) and at the far end.
    pub end_finishes: (EndFinish, EndFinish),
}

impl ThreadSpec {
    pub fn new(kind: ThreadKind, diameter: f64, pitch: f64, length: f64) -> Self {
        Self {
            diameter,
            pitch,
            length,
            hand: Hand::Right,
            kind,
            interference: 0.0,
            end_finishes: (EndFinish::Square, EndFinish::Square),
        }
    }

    pub fn with_interference(mut self, interference: f64) -> Self {
        self.interference = interference;
        self
    }

    pub fn with_end_finishes(mut self, start: EndFinish, end: EndFinish) -> Self {
        self.end_finishes = (start, end);
        self
    }

    /// Basic profile depth of a 60 degree thread: 5/8 of the fundamental
    /// triangle height.
    pub fn depth(&self) -> f64 {
        self.pitch * 3f64.sqrt() / 2.0 * 5.0 / 8.0
    }

    /// Inner and outer radius of the band the thread occupies, including
    /// the interference into the host.
    pub fn radial_band(&self) -> (f64, f64) {
        let major = self.diameter / 2.0;
        match self.kind {
            ThreadKind::External => (major - self.depth() - self.interference, major),
            ThreadKind::Internal => (major - self.depth(), major + self.interference),
        }
    }

    fn validate(&self) -> Result<(), OpError> {
        let (inner, outer) = self.radial_band();
        if !(self.pitch > 0.0) || !(self.length > 0.0) || self.interference < 0.0 {
            return Err(OpError::InvalidParameter {
                reason: format!(
                    "thread needs positive pitch and length and non-negative interference, got {:?}",
                    self
                ),
            });
        }
        if !(inner > 0.0) || outer <= inner {
            return Err(OpError::InvalidParameter {
                reason: format!("thread diameter {} too small for pitch {}", self.diameter, self.pitch),
            });
        }
        Ok(())
    }
}

/// Builds a thread body for a spec.
pub trait ThreadGenerator {
    fn generate(&self, kb: &mut dyn KernelBundle, spec: &ThreadSpec)
        -> Result<KernelSolidHandle, OpError>;
}

/// Represents a thread by the annular envelope its flanks sweep. Enough
/// for fit checks and printable as a plain sleeve; the helix is left to
/// dedicated generators.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeThreads;

impl ThreadGenerator for EnvelopeThreads {
    fn generate(
        &self,
        kb: &mut dyn KernelBundle,
        spec: &ThreadSpec,
    ) -> Result<KernelSolidHandle, OpError> {
        spec.validate()?;
        let (inner, outer) = spec.radial_band();
        let band = Profile::new(ClosedCurve::circle(outer)).with_hole(ClosedCurve::circle(inner));
        let face = kb.make_profile_face(&band, &Frame::identity())?;
        let mut body = kb.extrude_face(face, spec.length)?;
        tracing::debug!(
            kind = ?spec.kind,
            hand = ?spec.hand,
            inner,
            outer,
            length = spec.length,
            "thread envelope"
        );

        let bevel = spec.depth() / 2.0;
        let ends = [(spec.end_finishes.0, 0.0), (spec.end_finishes.1, spec.length)];
        for (finish, z) in ends {
            if finish != EndFinish::Chamfer {
                continue;
            }
            // the loop the mating part meets first
            let rim = TopoQuery::new()
                .filter(Filter::SurfaceType {
                    surface_type: "circle".to_string(),
                })
                .filter(Filter::AxisRange {
                    axis: Axis::Z,
                    min: z - 1e-6,
                    max: z + 1e-6,
                })
                .sort_by(SortKey::Radius)
                .pick(match spec.kind {
                    ThreadKind::External => Pick::Last,
                    ThreadKind::Internal => Pick::First,
                });
            let edges = select::query(kb.as_introspect(), &body, TopoKind::Edge, &rim);
            if edges.is_empty() {
                tracing::debug!(z, "no rim edge found, end left square");
                continue;
            }
            match kb.chamfer_edges(&body, &edges, bevel) {
                Ok(b) => body = b,
                Err(KernelError::NotSupported { .. }) => {
                    tracing::debug!(z, "thread end chamfer unsupported, left square");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn band_grows_into_the_host() {
        let ext = ThreadSpec::new(ThreadKind::External, 11.5, 1.25, 10.0).with_interference(0.5);
        let (inner, outer) = ext.radial_band();
        assert_relative_eq!(outer, 5.75);
        assert_relative_eq!(inner, 5.75 - ext.depth() - 0.5);

        let int = ThreadSpec::new(ThreadKind::Internal, 12.0, 1.25, 20.0);
        let (inner, outer) = int.radial_band();
        assert_relative_eq!(outer, 6.0);
        assert_relative_eq!(inner, 6.0 - int.depth());
    }

    #[test]
    fn rejects_degenerate_threads() {
        let tiny = ThreadSpec::new(ThreadKind::External, 0.5, 1.25, 10.0);
        assert!(tiny.validate().is_err());
        let flat = ThreadSpec::new(ThreadKind::External, 10.0, 1.25, 0.0);
        assert!(flat.validate().is_err());
    }
}
