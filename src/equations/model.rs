//! Flow model traits.
//!
//! This module defines the trait interfaces a flow model implements so the
//! vertex-centered residual assembly can stay model-agnostic.

use crate::equations::{MaterialLaw, PrimaryVariables, VolumeVariables};
use crate::mesh::BoxGeometry;
use crate::problem::PermeabilityTensor;

// =============================================================================
// PorousModelInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a flow model.
///
/// This trait is separate from [`PorousModel`] to allow calling info methods
/// without specifying the equation count.
pub trait PorousModelInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Short description of the flow physics being modeled.
    fn description(&self) -> &str;

    /// Number of balance equations in the system.
    fn n_equations(&self) -> usize;

    /// Names of the balance equations (e.g., ["water", "oil"]).
    fn equation_names(&self) -> &[&'static str];
}

// =============================================================================
// PorousModel Trait
// =============================================================================

/// Per-cell context handed to [`PorousModel::compute_flux`].
///
/// Borrows the cell's finite-volume geometry, the secondary variables at its
/// four sub-control volumes, and the cell permeability. Rebuilt for every
/// visited cell, so no stale references can survive a cell change.
pub struct FluxContext<'a, const N: usize> {
    /// Sub-control volume geometry of the visited cell.
    pub geometry: &'a BoxGeometry,
    /// Secondary variables at the four corner sub-volumes, in local order.
    pub vol_vars: &'a [VolumeVariables<N>; 4],
    /// Absolute permeability of the visited cell.
    pub permeability: PermeabilityTensor,
}

/// Core trait for flow models in vertex-centered finite-volume assembly.
///
/// A flow model encapsulates the constitutive part of the discretization:
/// - expansion of primary into secondary variables
/// - the storage (accumulation) term per unit pore volume
/// - the mass flux across one interior sub-control volume face
///
/// The residual assembly in [`crate::residual`] supplies geometry and states;
/// the model supplies physics. Sign convention for fluxes: the face normal
/// points from the face's first sub-volume `i` to its second sub-volume `j`,
/// and the returned flux is counted positive when mass enters `i`.
///
/// # Type Parameters
///
/// * `N` - Number of balance equations (1 for single-phase, 2 for two-phase)
pub trait PorousModel<const N: usize>: PorousModelInfo {
    /// Expand primary variables into the full secondary-variable set.
    ///
    /// # Arguments
    /// * `primary` - Primary unknowns at one vertex
    /// * `porosity` - Matrix porosity at that location
    /// * `material` - Saturation relations of the surrounding matrix
    fn update_volume_vars(
        &self,
        primary: PrimaryVariables<N>,
        porosity: f64,
        material: &MaterialLaw,
    ) -> VolumeVariables<N>;

    /// Mass per bulk volume for each balance equation, phi * rho_alpha * S_alpha.
    ///
    /// The residual multiplies this by sub-volume size and divides the change
    /// over a step by dt.
    fn compute_storage(&self, vol_vars: &VolumeVariables<N>) -> PrimaryVariables<N>;

    /// Mass flux across interior sub-control volume face `face` [kg/s].
    ///
    /// Positive values mean mass flows into the face's first sub-volume.
    fn compute_flux(&self, ctx: &FluxContext<'_, N>, face: usize) -> PrimaryVariables<N>;
}
