use geom_kernel::{KernelError, KernelSolidHandle};
use part_types::{FaceName, Frame};

/// A solid under construction plus the faces later steps may anchor on.
///
/// Kernel ids are reissued by every operation, so named faces are kept as
/// frames in the sub-part's own coordinates rather than as ids.
#[derive(Debug, Clone)]
pub struct SubPart {
    /// Handle to the solid in the kernel. Runtime-only.
    pub solid: KernelSolidHandle,
    /// Named faces registered by the operation that built the solid.
    pub faces: FaceRegistry,
    /// Non-fatal outcomes accumulated while building.
    pub diagnostics: Diagnostics,
}

impl SubPart {
    pub fn new(solid: KernelSolidHandle, faces: FaceRegistry) -> Self {
        Self {
            solid,
            faces,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Same faces and diagnostics on a new solid.
    pub fn with_solid(self, solid: KernelSolidHandle) -> Self {
        Self { solid, ..self }
    }

    pub fn warn(&mut self, warning: OpWarning) {
        tracing::warn!(%warning, "construction warning");
        self.diagnostics.warnings.push(warning);
    }
}

/// One registered face: a frame whose origin is the face centroid and
/// whose Z axis is the outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedFace {
    pub name: FaceName,
    pub frame: Frame,
}

/// Named faces of a sub-part, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceRegistry {
    entries: Vec<NamedFace>,
}

impl FaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: FaceName, frame: Frame) {
        self.entries.push(NamedFace { name, frame });
    }

    /// Every frame registered under `name`. More than one means the
    /// builder could not tell the faces apart.
    pub fn lookup(&self, name: FaceName) -> Vec<Frame> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.frame)
            .collect()
    }

    pub fn contains(&self, name: FaceName) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<FaceName> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registry as seen after applying `placement` to the solid.
    pub fn placed(&self, placement: &Frame) -> FaceRegistry {
        FaceRegistry {
            entries: self
                .entries
                .iter()
                .map(|e| NamedFace {
                    name: e.name,
                    frame: placement.compose(&e.frame),
                })
                .collect(),
        }
    }
}

/// Non-fatal outcomes of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub warnings: Vec<OpWarning>,
}

impl Diagnostics {
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Something an operation gave up on without failing the build.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpWarning {
    /// No candidate radius was accepted; the wall edges stay sharp.
    #[error("fillet search from {start_radius} gave up after {attempts} attempts")]
    FilletSearchExhausted { start_radius: f64, attempts: usize },

    /// The kernel cannot blend these edges; they stay sharp.
    #[error("{operation} skipped: {reason}")]
    BlendSkipped { operation: String, reason: String },
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("invalid profile geometry: {reason}")]
    InvalidProfileGeometry { reason: String },

    #[error("no face matches {selector}")]
    FaceSelectionEmpty { selector: String },

    #[error("{count} faces match {selector}")]
    FaceSelectionAmbiguous { selector: String, count: usize },
}
