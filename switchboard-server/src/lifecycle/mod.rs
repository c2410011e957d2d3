mod liveness;
mod supervisor;

pub use liveness::*;
pub use supervisor::*;
