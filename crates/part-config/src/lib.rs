//! Parameter model: a flat (section, key) store with documented fallbacks,
//! resolved once into typed parameter structs per part family.

pub mod error;
pub mod fallback;
pub mod params;
pub mod set;

pub use error::ConfigError;
pub use fallback::{fallback, FALLBACKS};
pub use params::*;
pub use set::{ParameterSet, Value};
