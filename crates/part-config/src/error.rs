use std::path::PathBuf;

/// Errors from reading or resolving parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("parameter {section}.{key} has no value and no fallback")]
    MissingWithoutFallback { section: String, key: String },

    #[error("parameter {section}.{key} is invalid: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed parameter file: {0}")]
    Parse(#[from] toml::de::Error),
}
