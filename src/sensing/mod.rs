pub mod controller;
pub mod loop_worker;
pub mod probe;

pub use controller::SensingController;
pub use loop_worker::{perform_sample, SamplerContext};
pub use probe::{HyprlandProbe, NullProbe, ProbeError, WindowInfo, WindowProbe};
