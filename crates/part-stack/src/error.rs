use geom_kernel::KernelError;
use part_config::ConfigError;
use part_ops::{OpError, OpWarning};
use serde::{Deserialize, Serialize};

/// Errors that abort building a part. Each names the construction step it
/// happened in.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("parameter {section}.{key} has no value and no fallback")]
    ParameterMissingWithoutFallback { section: String, key: String },

    #[error("{step}: invalid parameter: {reason}")]
    InvalidParameter { step: String, reason: String },

    #[error("{step}: invalid profile geometry: {reason}")]
    InvalidProfileGeometry { step: String, reason: String },

    #[error("{step}: no face matches {selector}")]
    FaceSelectionEmpty { step: String, selector: String },

    #[error("{step}: {count} faces match {selector}")]
    FaceSelectionAmbiguous {
        step: String,
        selector: String,
        count: usize,
    },

    #[error("{step}: kernel rejected the construction: {source}")]
    KernelConstructionFailure {
        step: String,
        #[source]
        source: KernelError,
    },

    #[error("parameters could not be loaded: {0}")]
    Config(#[source] ConfigError),
}

impl BuildError {
    /// Attribute an operation error to `step`.
    pub fn at(step: &str, err: OpError) -> Self {
        let step = step.to_string();
        match err {
            OpError::Kernel(KernelError::InvalidProfile { reason }) => {
                BuildError::InvalidProfileGeometry { step, reason }
            }
            OpError::Kernel(source) => BuildError::KernelConstructionFailure { step, source },
            OpError::InvalidParameter { reason } => BuildError::InvalidParameter { step, reason },
            OpError::InvalidProfileGeometry { reason } => {
                BuildError::InvalidProfileGeometry { step, reason }
            }
            OpError::FaceSelectionEmpty { selector } => {
                BuildError::FaceSelectionEmpty { step, selector }
            }
            OpError::FaceSelectionAmbiguous { selector, count } => {
                BuildError::FaceSelectionAmbiguous {
                    step,
                    selector,
                    count,
                }
            }
        }
    }

    /// The construction step that failed, if the error came from one.
    pub fn step(&self) -> Option<&str> {
        match self {
            BuildError::InvalidParameter { step, .. }
            | BuildError::InvalidProfileGeometry { step, .. }
            | BuildError::FaceSelectionEmpty { step, .. }
            | BuildError::FaceSelectionAmbiguous { step, .. }
            | BuildError::KernelConstructionFailure { step, .. } => Some(step),
            BuildError::ParameterMissingWithoutFallback { .. } | BuildError::Config(_) => None,
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingWithoutFallback { section, key } => {
                BuildError::ParameterMissingWithoutFallback { section, key }
            }
            ConfigError::InvalidValue {
                section,
                key,
                reason,
            } => BuildError::InvalidParameter {
                step: "parameters".to_string(),
                reason: format!("{}.{}: {}", section, key, reason),
            },
            other => BuildError::Config(other),
        }
    }
}

/// A problem the build worked around. The part is still produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum BuildWarning {
    #[error("{step}: fillet search from {start_radius} gave up after {attempts} attempts, edges left sharp")]
    FilletSearchExhausted {
        step: String,
        start_radius: f64,
        attempts: usize,
    },

    #[error("{step}: {operation} skipped: {reason}")]
    BlendSkipped {
        step: String,
        operation: String,
        reason: String,
    },
}

impl BuildWarning {
    pub fn from_op(step: &str, warning: OpWarning) -> Self {
        let step = step.to_string();
        match warning {
            OpWarning::FilletSearchExhausted {
                start_radius,
                attempts,
            } => BuildWarning::FilletSearchExhausted {
                step,
                start_radius,
                attempts,
            },
            OpWarning::BlendSkipped { operation, reason } => BuildWarning::BlendSkipped {
                step,
                operation,
                reason,
            },
        }
    }

    pub fn step(&self) -> &str {
        match self {
            BuildWarning::FilletSearchExhausted { step, .. } | BuildWarning::BlendSkipped { step, .. } => step,
        }
    }
}
