//! Flow models and constitutive relations.
//!
//! Provides the physics side of the discretization:
//!
//! ```text
//! d(phi * rho_a * S_a)/dt + div(rho_a * v_a) = q_a
//! v_a = -(kr_a(S) / mu_a) K (grad p_a - rho_a g)
//! ```
//!
//! A model implements [`PorousModel`] over a const equation count, expanding
//! primary variables into secondary quantities and evaluating storage and
//! flux terms. The residual assembly stays model-agnostic.

mod fluid;
mod material_law;
mod model;
mod single_phase;
mod state;
mod two_phase;

pub use fluid::{FluidPhase, TwoPhaseFluids};
pub use material_law::{MaterialLaw, LINEAR_DEFAULT};
pub use model::{FluxContext, PorousModel, PorousModelInfo};
pub use single_phase::SinglePhaseFlow;
pub use state::{PrimaryVariables, VolumeVariables};
pub use two_phase::{SaturationFormulation, TwoPhaseFlow};
