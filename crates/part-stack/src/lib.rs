//! Stacking sub-parts into the two part families and grouping the result
//! into labeled assemblies.

pub mod assembly;
pub mod build;
pub mod error;
pub mod external_fitting;
pub mod internal_funnel;
pub mod stack;

pub use assembly::{assemble, Assembly, AssemblyGroup};
pub use build::{build_part, BuildOptions, BuildOutput, PartKind};
pub use error::{BuildError, BuildWarning};
pub use stack::{attach, fuse, PlacedPart, Stack};
