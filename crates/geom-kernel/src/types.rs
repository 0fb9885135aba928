use serde::{Deserialize, Serialize};

// Re-export shared types from part-types
pub use part_types::{ClosedCurve, Frame, Profile, TopoKind, TopoSignature};

/// Opaque handle to a solid in the geometry kernel.
/// Valid only for the kernel instance that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier.
/// Stable within a single kernel session; every operation issues new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelId(pub u64);

/// One cross-section of a loft: a profile placed on a frame.
#[derive(Debug, Clone)]
pub struct LoftSection {
    pub profile: Profile,
    pub frame: Frame,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("loft failed: {reason}")]
    LoftFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("STEP export failed: {reason}")]
    ExportFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

/// Reject profiles no kernel can turn into a face.
pub fn check_profile(profile: &Profile) -> Result<(), KernelError> {
    if profile.boundary.is_degenerate() {
        return Err(KernelError::InvalidProfile {
            reason: format!("degenerate boundary {:?}", profile.boundary),
        });
    }
    for (i, hole) in profile.holes.iter().enumerate() {
        if hole.is_degenerate() {
            return Err(KernelError::InvalidProfile {
                reason: format!("hole {} is degenerate", i),
            });
        }
        if !profile.contains(hole) {
            return Err(KernelError::InvalidProfile {
                reason: format!("hole {} does not fit inside the boundary", i),
            });
        }
    }
    Ok(())
}

/// Tessellated triangle mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals [nx0, ny0, nz0, nx1, ny1, nz1, ...].
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
    /// Mapping from triangle ranges to logical faces.
    pub face_ranges: Vec<FaceRange>,
}

impl RenderMesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            face_ranges: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, offsetting its indices.
    pub fn append(&mut self, other: &RenderMesh) {
        let base_vertex = (self.vertices.len() / 3) as u32;
        let base_index = self.indices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|i| i + base_vertex));
        self.face_ranges
            .extend(other.face_ranges.iter().map(|r| FaceRange {
                face_id: r.face_id,
                start_index: r.start_index + base_index,
                end_index: r.end_index + base_index,
            }));
    }
}

/// Maps a contiguous range of triangles to a logical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRange {
    /// The KernelId of the face this range belongs to.
    pub face_id: KernelId,
    /// Start index in the indices array (inclusive).
    pub start_index: u32,
    /// End index in the indices array (exclusive).
    pub end_index: u32,
}

// KernelId serializes as its bare number
impl Serialize for KernelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(KernelId)
    }
}
