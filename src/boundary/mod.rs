//! Boundary condition handling.
//!
//! Classification of boundary constraints per balance equation and the
//! per-cell collection used by the residual assembly.

mod types;

pub use types::{BoundaryCondition, BoundaryTypes, ElementBoundaryTypes};
