//! Typed parameter structs, resolved once per build with every fallback
//! applied up front.

use crate::error::ConfigError;
use crate::set::ParameterSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cross-section family of the funnel loft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStyle {
    /// Rounded hexagonal exterior, circular bore.
    Hex,
    /// Circular exterior and bore.
    Cone,
}

impl FromStr for FunnelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" | "hexagon" | "hexagonal" => Ok(FunnelStyle::Hex),
            "cone" | "circle" | "circular" | "round" => Ok(FunnelStyle::Cone),
            other => Err(format!("unknown funnel style {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorParams {
    pub depth: f64,
    pub diameter: f64,
    pub pitch: f64,
}

impl ConnectorParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            depth: set.get_f64("connector", "depth")?,
            diameter: set.get_f64("connector", "diameter")?,
            pitch: set.get_f64("connector", "pitch")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaftParams {
    pub length: f64,
    pub diameter: f64,
    pub interference: f64,
}

impl ShaftParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            length: set.get_f64("shaft", "length")?,
            diameter: set.get_f64("shaft", "diameter")?,
            interference: set.get_f64("shaft", "interference")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingParams {
    pub diameter: f64,
    pub depth: f64,
    pub pitch: f64,
    pub tolerance: f64,
    pub hex_diameter: f64,
}

impl FittingParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            diameter: set.get_f64("fitting", "diameter")?,
            depth: set.get_f64("fitting", "depth")?,
            pitch: set.get_f64("fitting", "pitch")?,
            tolerance: set.get_f64("fitting", "tolerance")?,
            hex_diameter: set.get_f64("fitting", "hex_diameter")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeParams {
    pub outer_diameter: f64,
    pub outer_tolerance: f64,
    pub inner_diameter: f64,
    pub inner_tolerance: f64,
}

impl TubeParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            outer_diameter: set.get_f64("tube", "outer_diameter")?,
            outer_tolerance: set.get_f64("tube", "outer_tolerance")?,
            inner_diameter: set.get_f64("tube", "inner_diameter")?,
            inner_tolerance: set.get_f64("tube", "inner_tolerance")?,
        })
    }

    /// Radius of the bore the tube slides through.
    pub fn bore_radius(&self) -> f64 {
        (self.outer_diameter + self.outer_tolerance) / 2.0
    }

    /// Radius of the filament passage matching the tube's inside.
    pub fn passage_radius(&self) -> f64 {
        (self.inner_diameter + self.inner_tolerance) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelParams {
    pub revision: String,
    pub depth: f64,
}

impl LabelParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            revision: set.get_str("general", "revision")?,
            depth: set.get_f64("general", "label_depth")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendParams {
    pub angle_degrees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelParams {
    pub length: f64,
    pub top_scale: f64,
    pub minimum_wall: f64,
    pub style: FunnelStyle,
}

impl FunnelParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        let style = set.get_str("funnel", "style")?;
        let style = style
            .parse::<FunnelStyle>()
            .map_err(|reason| ConfigError::InvalidValue {
                section: "funnel".to_string(),
                key: "style".to_string(),
                reason,
            })?;
        Ok(Self {
            length: set.get_f64("funnel", "length")?,
            top_scale: set.get_f64("funnel", "top_scale")?,
            minimum_wall: set.get_f64("funnel", "minimum_wall")?,
            style,
        })
    }
}

/// Everything the external fitting needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFittingParams {
    pub connector: ConnectorParams,
    pub shaft: ShaftParams,
    pub fitting: FittingParams,
    pub tube: TubeParams,
    pub label: LabelParams,
}

impl ExternalFittingParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            connector: ConnectorParams::resolve(set)?,
            shaft: ShaftParams::resolve(set)?,
            fitting: FittingParams::resolve(set)?,
            tube: TubeParams::resolve(set)?,
            label: LabelParams::resolve(set)?,
        })
    }

    /// Chamfer on the shaft's top outer edge.
    pub fn chamfer(&self) -> f64 {
        (self.shaft.diameter - 2.0 * self.tube.bore_radius()) / 8.0
    }
}

/// Everything the internal funnel needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalFunnelParams {
    pub connector: ConnectorParams,
    pub shaft: ShaftParams,
    pub fitting: FittingParams,
    pub tube: TubeParams,
    pub bend: BendParams,
    pub funnel: FunnelParams,
    pub label: LabelParams,
}

impl InternalFunnelParams {
    pub fn resolve(set: &ParameterSet) -> Result<Self, ConfigError> {
        Ok(Self {
            connector: ConnectorParams::resolve(set)?,
            shaft: ShaftParams::resolve(set)?,
            fitting: FittingParams::resolve(set)?,
            tube: TubeParams::resolve(set)?,
            bend: BendParams {
                angle_degrees: set.get_f64("bend", "angle")?,
            },
            funnel: FunnelParams::resolve(set)?,
            label: LabelParams::resolve(set)?,
        })
    }

    pub fn funnel_lower_radius(&self) -> f64 {
        self.shaft.diameter / 2.0 + self.fitting.depth
    }

    pub fn funnel_upper_radius(&self) -> f64 {
        self.funnel_lower_radius() * self.funnel.top_scale
    }

    /// Distance from the bend profile centre to its revolve axis.
    pub fn bend_axis_offset(&self) -> f64 {
        2.0 * self.connector.diameter
    }
}
