pub mod boolean;
pub mod chamfer;
pub mod extrude;
pub mod fillet;
pub mod funnel;
pub mod hole;
pub mod kernel_ext;
pub mod label;
pub mod revolve;
pub mod select;
pub mod thread;
pub mod types;

pub use boolean::{execute_boolean, subtract_all, BooleanKind, TOOL_OVERSHOOT};
pub use chamfer::execute_chamfer;
pub use extrude::{execute_extrude, execute_loft};
pub use fillet::{
    execute_fillet, fillet_with_search, find_max_fillet_radius, FilletSearch, MAX_FILLET_ATTEMPTS,
};
pub use funnel::{build_funnel, funnel_profiles, Funnel, FunnelProfiles, FunnelShape, FunnelSpec};
pub use hole::{execute_countersink, Countersink};
pub use kernel_ext::KernelBundle;
pub use label::{execute_label, upright, BlockLetters, LabelFont};
pub use revolve::execute_revolve;
pub use select::{extremal_planar_face, face_frame, query, select_face};
pub use thread::{EndFinish, EnvelopeThreads, Hand, ThreadGenerator, ThreadKind, ThreadSpec};
pub use types::*;
