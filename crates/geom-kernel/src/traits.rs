use crate::types::*;

/// Core geometry kernel trait. Provides all shape construction and modification operations.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
pub trait Kernel {
    /// Create a planar face from a profile laid on the frame's XY plane.
    fn make_profile_face(&mut self, profile: &Profile, frame: &Frame)
        -> Result<KernelId, KernelError>;

    /// Extrude a profile face along its frame's +Z by `depth`.
    fn extrude_face(&mut self, face: KernelId, depth: f64)
        -> Result<KernelSolidHandle, KernelError>;

    /// Loft through two or more planar sections, first to last.
    fn loft(&mut self, sections: &[LoftSection]) -> Result<KernelSolidHandle, KernelError>;

    /// Revolve a profile face around an axis by `angle` radians.
    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Fillet (round) the specified edges with the given radius.
    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Chamfer (bevel) the specified edges with the given distance.
    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Copy of a solid with `placement` applied. The input stays valid.
    fn transform_solid(
        &mut self,
        solid: &KernelSolidHandle,
        placement: &Frame,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh.
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError>;

    /// Serialize solids as one STEP (ISO 10303-21) document.
    fn export_step(
        &mut self,
        solids: &[KernelSolidHandle],
        file_name: &str,
    ) -> Result<String, KernelError>;
}

/// Topology introspection trait. Provides read-only queries on kernel geometry.
pub trait KernelIntrospect {
    /// List all faces of a solid.
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// List all edges of a solid.
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// Get the edges bounding a face.
    fn face_edges(&self, face: KernelId) -> Vec<KernelId>;

    /// Compute the geometric signature of a single entity.
    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature;

    /// Compute signatures for all entities of a given kind in a solid.
    fn compute_all_signatures(
        &self,
        solid: &KernelSolidHandle,
        kind: TopoKind,
    ) -> Vec<(KernelId, TopoSignature)> {
        let ids = match kind {
            TopoKind::Face => self.list_faces(solid),
            TopoKind::Edge => self.list_edges(solid),
        };
        ids.into_iter()
            .map(|id| {
                let sig = self.compute_signature(id, kind);
                (id, sig)
            })
            .collect()
    }
}
