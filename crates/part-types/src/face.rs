use serde::{Deserialize, Serialize};
use std::fmt;

/// World or local coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> [f64; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }

    pub fn component(self, v: [f64; 3]) -> f64 {
        match self {
            Axis::X => v[0],
            Axis::Y => v[1],
            Axis::Z => v[2],
        }
    }
}

/// Which end of an axis a selector ranks towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisEnd {
    Min,
    Max,
}

/// Outward direction of a flat side face, in the sub-part's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideDir {
    PosX,
    NegX,
    PosY,
    NegY,
}

impl SideDir {
    pub const ALL: [SideDir; 4] = [SideDir::PosX, SideDir::NegX, SideDir::PosY, SideDir::NegY];

    pub fn direction(self) -> [f64; 3] {
        match self {
            SideDir::PosX => [1.0, 0.0, 0.0],
            SideDir::NegX => [-1.0, 0.0, 0.0],
            SideDir::PosY => [0.0, 1.0, 0.0],
            SideDir::NegY => [0.0, -1.0, 0.0],
        }
    }
}

/// Named face of a sub-part, registered by the operation that built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FaceName {
    /// Terminal face the next sub-part stacks onto.
    Top,
    /// Starting face, coincident with the sub-part's local origin.
    Bottom,
    /// Flat side face facing a local axis direction.
    Side { dir: SideDir },
}

impl fmt::Display for FaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceName::Top => write!(f, "top"),
            FaceName::Bottom => write!(f, "bottom"),
            FaceName::Side { dir } => write!(f, "side {:?}", dir),
        }
    }
}

/// How a stacking step chooses the face to anchor the next sub-part on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FaceSelector {
    /// A face from the sub-part's registry.
    Named { name: FaceName },
    /// The planar face whose centroid projects furthest along `axis`.
    Extremal { axis: Axis, end: AxisEnd },
}

impl FaceSelector {
    pub fn top() -> Self {
        FaceSelector::Named {
            name: FaceName::Top,
        }
    }

    pub fn bottom() -> Self {
        FaceSelector::Named {
            name: FaceName::Bottom,
        }
    }

    pub fn max_along(axis: Axis) -> Self {
        FaceSelector::Extremal {
            axis,
            end: AxisEnd::Max,
        }
    }

    pub fn min_along(axis: Axis) -> Self {
        FaceSelector::Extremal {
            axis,
            end: AxisEnd::Min,
        }
    }
}

impl fmt::Display for FaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceSelector::Named { name } => write!(f, "{} face", name),
            FaceSelector::Extremal { axis, end } => {
                write!(f, "{:?}-most planar face along {:?}", end, axis)
            }
        }
    }
}
