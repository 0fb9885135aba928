use serde::{Deserialize, Serialize};

use crate::face::Axis;

/// The kind of topological entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoKind {
    Edge,
    Face,
}

/// Geometric signature of a topological entity.
/// Selection queries rank and filter entities by these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoSignature {
    /// Surface type for faces (planar, cylindrical, conical, toroidal, revolved, nurbs)
    /// or curve type for edges (line, circle, arc).
    pub surface_type: Option<String>,
    /// Surface area (for faces).
    pub area: Option<f64>,
    /// Centroid position [x, y, z]. Circle and arc edges report their center.
    pub centroid: Option<[f64; 3]>,
    /// Outward-pointing normal at centroid (for planar faces).
    pub normal: Option<[f64; 3]>,
    /// Line direction, or the plane normal of a circle or arc.
    pub axis: Option<[f64; 3]>,
    /// Radius of circle and arc edges.
    pub radius: Option<f64>,
    /// Edge length (for edges).
    pub length: Option<f64>,
}

impl TopoSignature {
    pub fn empty() -> Self {
        Self {
            surface_type: None,
            area: None,
            centroid: None,
            normal: None,
            axis: None,
            radius: None,
            length: None,
        }
    }

    pub fn is_type(&self, surface_type: &str) -> bool {
        self.surface_type.as_deref() == Some(surface_type)
    }
}

/// Geometric query for selecting edges or faces, evaluated in order:
/// filters, then each sort key as a stable sort, then the pick.
///
/// Sorting is stable, so the last sort key dominates and earlier keys
/// break its ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoQuery {
    pub filters: Vec<Filter>,
    pub sort_keys: Vec<SortKey>,
    pub pick: Pick,
}

impl TopoQuery {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sort_keys: Vec::new(),
            pick: Pick::All,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_keys.push(key);
        self
    }

    pub fn pick(mut self, pick: Pick) -> Self {
        self.pick = pick;
        self
    }
}

impl Default for TopoQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter predicate for TopoQuery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    /// Entity's surface/curve type must match.
    SurfaceType { surface_type: String },
    /// Line edge parallel to `direction` within `tolerance` (1 - |cos|).
    ParallelTo { direction: [f64; 3], tolerance: f64 },
    /// Face normal within `tolerance` (1 - cos) of `direction`.
    NormalDirection { direction: [f64; 3], tolerance: f64 },
    /// Centroid coordinate along `axis` must lie in [min, max].
    AxisRange { axis: Axis, min: f64, max: f64 },
}

/// Ascending sort key for TopoQuery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SortKey {
    Radius,
    Area,
    Along { axis: Axis },
}

/// Which of the sorted matches a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pick {
    First,
    Last,
    /// The last `count` entries.
    LastN { count: usize },
    All,
}
