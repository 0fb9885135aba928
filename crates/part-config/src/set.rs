use crate::error::ConfigError;
use crate::fallback::fallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A parameter value: numeric, or text for the few string keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Float(f64),
    Text(String),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Overrides keyed by (section, key). Reads fall back to the documented
/// defaults; no range validation happens here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    values: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ParameterSet {
    /// An empty set: every read resolves to its fallback.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) {
        self.values
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn with(mut self, section: &str, key: &str, value: impl Into<Value>) -> Self {
        self.set(section, key, value);
        self
    }

    /// True when `set` or the loaded file supplied this key.
    pub fn is_overridden(&self, section: &str, key: &str) -> bool {
        self.values
            .get(section)
            .is_some_and(|keys| keys.contains_key(key))
    }

    pub fn get(&self, section: &str, key: &str) -> Result<Value, ConfigError> {
        if let Some(v) = self.values.get(section).and_then(|keys| keys.get(key)) {
            return Ok(v.clone());
        }
        fallback(section, key).ok_or_else(|| ConfigError::MissingWithoutFallback {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Numeric read. Text values are parsed, matching how INI-style
    /// configuration stores everything as strings.
    pub fn get_f64(&self, section: &str, key: &str) -> Result<f64, ConfigError> {
        match self.get(section, key)? {
            Value::Float(v) => Ok(v),
            Value::Text(s) => s.trim().parse::<f64>().map_err(|e| ConfigError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{:?} is not a number: {}", s, e),
            }),
        }
    }

    pub fn get_str(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        Ok(self.get(section, key)?.to_string())
    }

    /// Parse a TOML document whose top-level tables are sections.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let doc: toml::Table = text.parse()?;
        let mut set = ParameterSet::new();
        for (section, entry) in doc {
            let toml::Value::Table(keys) = entry else {
                return Err(ConfigError::InvalidValue {
                    section: section.clone(),
                    key: String::new(),
                    reason: "top-level entries must be tables".to_string(),
                });
            };
            for (key, value) in keys {
                let value = match value {
                    toml::Value::Float(v) => Value::Float(v),
                    toml::Value::Integer(v) => Value::Float(v as f64),
                    toml::Value::String(s) => Value::Text(s),
                    other => {
                        return Err(ConfigError::InvalidValue {
                            section: section.clone(),
                            key,
                            reason: format!("unsupported {} value", other.type_str()),
                        })
                    }
                };
                set.set(&section, &key, value);
            }
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded parameter set");
        Ok(set)
    }
}
