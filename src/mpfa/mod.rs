//! Multi-point flux approximation of Darcy velocities (O-method).
//!
//! Two-point flux approximations evaluate a face flux from the two adjacent
//! cell pressures only, which is consistent only when the permeability
//! tensor is aligned with the grid. The O-method instead builds an
//! interaction region around every mesh vertex, enforces pressure
//! continuity at the edge midpoints and flux continuity across the half
//! edges, and condenses the region into transmissibilities that weight all
//! cell-centre pressures around the vertex. The result stays consistent for
//! full anisotropic tensors and distorted quadrilaterals.
//!
//! # Usage
//!
//! [`MpfaOVelocity`] borrows a mesh and a [`PorousProblem`] and turns a
//! slice of [`CellFlowState`]s (cell pressure and wetting saturation) into
//! a [`VelocityField`]:
//!
//! ```ignore
//! let engine = MpfaOVelocity::new(&mesh, &problem, TwoPhaseFluids::water_lnapl());
//! let field = engine.compute_all(&states)?;
//! let v_east = field.velocity(cell, 1);
//! ```
//!
//! The field keeps the outward-normal projections per face so a transport
//! step can upwind against them without re-deriving geometry.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | `velocity` | Driver, interior interaction regions, shared helpers |
//! | `boundary_region` | Regions truncated by the domain boundary |
//! | `interaction` | Sub-volume geometry and one-sided flux terms |
//! | `transmissibility` | Dense LU solves for the condensation step |
//! | `conservation` | Per-cell mass-balance check on the result |
//!
//! [`PorousProblem`]: crate::problem::PorousProblem

mod boundary_region;
mod conservation;
mod errors;
mod interaction;
mod transmissibility;
mod velocity;

pub use conservation::{ConservationCheckConfig, ConservationDefect};
pub use errors::MpfaError;
pub use velocity::{CellFlowState, MpfaOVelocity, VelocityField};
