//! Vertex-centered finite-volume residuals.
//!
//! [`LocalResidual`] evaluates the discrete balance equations of a single
//! cell on its four sub-control volumes; the assembly functions gather those
//! contributions into one residual row per mesh vertex.

mod assembly;
mod local_residual;

pub use assembly::{assemble_residuals, total_storage};
#[cfg(feature = "parallel")]
pub use assembly::assemble_residuals_parallel;
pub use local_residual::{LocalResidual, ResidualConfig};
