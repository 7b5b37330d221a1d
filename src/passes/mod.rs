pub mod copy;
pub mod raytrace;

pub use copy::CopyPass;
pub use raytrace::{HDR_FORMAT, RaytracePass, RaytraceUniform};
