//! The geometry kernel boundary: the `Kernel` and `KernelIntrospect`
//! traits, an analytic `MockKernel` for tests, and `TruckKernel` on top of
//! the truck B-rep crates.

pub mod mock_kernel;
pub mod primitives;
pub mod tessellation;
pub mod traits;
pub mod truck_introspect;
pub mod truck_kernel;
pub mod types;

pub use mock_kernel::MockKernel;
pub use traits::{Kernel, KernelIntrospect};
pub use truck_kernel::TruckKernel;
pub use types::*;
