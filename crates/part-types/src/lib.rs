pub mod face;
pub mod frame;
pub mod profile;
pub mod topo;

pub use face::*;
pub use frame::*;
pub use profile::*;
pub use topo::*;
