//! Per-cell residual evaluation for the vertex-centered scheme.
//!
//! For one cell the discrete balance at corner sub-volume i reads
//!
//! ```text
//! R_i = (storage_i(cur) - storage_i(prev)) * V_i / dt
//!     + sum of outgoing sub-face fluxes
//!     + prescribed boundary fluxes
//!     - q_i * V_i
//! ```
//!
//! Evaluation always starts from a zeroed residual, so repeated calls with
//! the same inputs give identical results. Rows constrained by a Dirichlet
//! condition are overwritten last with the defect between the current and the
//! prescribed primary variable; a converged solve drives that defect to zero
//! exactly like the interior rows.

use crate::boundary::ElementBoundaryTypes;
use crate::equations::{FluxContext, PorousModel, PrimaryVariables, VolumeVariables};
use crate::mesh::BoxGeometry;
use crate::problem::PorousProblem;

/// Configuration for residual evaluation.
///
/// Borrows the model and the problem per call chain; nothing here outlives
/// the assembly that uses it.
pub struct ResidualConfig<'a, M, P> {
    /// The flow model supplying storage and flux terms.
    pub model: &'a M,
    /// The problem supplying spatial parameters, sources and boundary data.
    pub problem: &'a P,
    /// Time step size [s] for the storage term.
    pub dt: f64,
}

impl<'a, M, P> ResidualConfig<'a, M, P> {
    /// Create a configuration with unit time step.
    pub fn new(model: &'a M, problem: &'a P) -> Self {
        Self {
            model,
            problem,
            dt: 1.0,
        }
    }

    /// Set the time step size.
    pub fn with_dt(mut self, dt: f64) -> Self {
        assert!(dt > 0.0, "Time step must be positive, got {}", dt);
        self.dt = dt;
        self
    }
}

/// Residual of one cell, one entry per corner sub-volume.
#[derive(Clone, Debug)]
pub struct LocalResidual<const N: usize> {
    residual: [PrimaryVariables<N>; 4],
}

impl<const N: usize> LocalResidual<N> {
    /// Create a zeroed local residual.
    pub fn new() -> Self {
        Self {
            residual: [PrimaryVariables::zero(); 4],
        }
    }

    /// The per-corner residual of the last evaluation.
    #[inline]
    pub fn residual(&self) -> &[PrimaryVariables<N>; 4] {
        &self.residual
    }

    /// Evaluate the full residual: storage, fluxes, sources and boundary
    /// conditions.
    ///
    /// `prev_vol_vars` and `cur_vol_vars` hold the secondary variables at the
    /// four corners for the previous and current solution.
    pub fn evaluate<M, P>(
        &mut self,
        geometry: &BoxGeometry,
        prev_vol_vars: &[VolumeVariables<N>; 4],
        cur_vol_vars: &[VolumeVariables<N>; 4],
        bc_types: &ElementBoundaryTypes<N>,
        config: &ResidualConfig<'_, M, P>,
    ) where
        M: PorousModel<N>,
        P: PorousProblem<N>,
    {
        debug_assert!(
            prev_vol_vars.iter().all(|vv| vv.is_finite())
                && cur_vol_vars.iter().all(|vv| vv.is_finite()),
            "Volume variables of cell {} contain non-finite values",
            geometry.cell
        );

        self.reset();
        self.add_fluxes(geometry, cur_vol_vars, config);
        self.add_volume_terms(geometry, prev_vol_vars, cur_vol_vars, config);
        self.add_neumann(geometry, bc_types, config);
        self.apply_dirichlet(cur_vol_vars, bc_types);

        debug_assert!(
            self.residual.iter().all(|r| r.is_finite()),
            "Residual of cell {} contains non-finite values",
            geometry.cell
        );
    }

    /// Evaluate only the storage term, storage * V_i per corner.
    ///
    /// Useful for mass-balance diagnostics and for time integrators that
    /// treat accumulation separately.
    pub fn evaluate_storage<M>(
        &mut self,
        geometry: &BoxGeometry,
        vol_vars: &[VolumeVariables<N>; 4],
        model: &M,
    ) where
        M: PorousModel<N>,
    {
        self.reset();
        for (i, scv) in geometry.scvs.iter().enumerate() {
            self.residual[i] = model.compute_storage(&vol_vars[i]) * scv.volume;
        }
    }

    /// Evaluate only the interior flux divergence.
    pub fn evaluate_fluxes<M, P>(
        &mut self,
        geometry: &BoxGeometry,
        cur_vol_vars: &[VolumeVariables<N>; 4],
        config: &ResidualConfig<'_, M, P>,
    ) where
        M: PorousModel<N>,
        P: PorousProblem<N>,
    {
        self.reset();
        self.add_fluxes(geometry, cur_vol_vars, config);
    }

    fn reset(&mut self) {
        self.residual = [PrimaryVariables::zero(); 4];
    }

    /// Sub-face fluxes: each flux leaves one corner and enters its neighbor,
    /// so the four contributions telescope inside the cell.
    fn add_fluxes<M, P>(
        &mut self,
        geometry: &BoxGeometry,
        cur_vol_vars: &[VolumeVariables<N>; 4],
        config: &ResidualConfig<'_, M, P>,
    ) where
        M: PorousModel<N>,
        P: PorousProblem<N>,
    {
        let ctx = FluxContext {
            geometry,
            vol_vars: cur_vol_vars,
            permeability: config.problem.permeability(geometry.cell.as_usize()),
        };

        for (face, scvf) in geometry.scv_faces.iter().enumerate() {
            let flux = config.model.compute_flux(&ctx, face);
            // Flux is positive into scv_i; the residual counts outflow positive.
            self.residual[scvf.scv_i] -= flux;
            self.residual[scvf.scv_j] += flux;
        }
    }

    /// Storage change over the step plus source terms.
    fn add_volume_terms<M, P>(
        &mut self,
        geometry: &BoxGeometry,
        prev_vol_vars: &[VolumeVariables<N>; 4],
        cur_vol_vars: &[VolumeVariables<N>; 4],
        config: &ResidualConfig<'_, M, P>,
    ) where
        M: PorousModel<N>,
        P: PorousProblem<N>,
    {
        let source = config.problem.source(geometry.cell.as_usize());
        let inv_dt = 1.0 / config.dt;

        for (i, scv) in geometry.scvs.iter().enumerate() {
            let storage_change = config.model.compute_storage(&cur_vol_vars[i])
                - config.model.compute_storage(&prev_vol_vars[i]);
            self.residual[i] += storage_change * (scv.volume * inv_dt);
            self.residual[i] -= source * scv.volume;
        }
    }

    /// Prescribed boundary fluxes, positive out of the domain. Applied only
    /// to equations the corner classifies as Neumann.
    fn add_neumann<M, P>(
        &mut self,
        geometry: &BoxGeometry,
        bc_types: &ElementBoundaryTypes<N>,
        config: &ResidualConfig<'_, M, P>,
    ) where
        P: PorousProblem<N>,
    {
        if !bc_types.has_neumann {
            return;
        }

        let cell = geometry.cell.as_usize();
        for bf in &geometry.boundary_faces {
            let values = config.problem.neumann(cell, bf.face);
            for eq in 0..N {
                if bc_types.scv_types[bf.scv].is_neumann(eq) {
                    self.residual[bf.scv][eq] += values[eq] * bf.area;
                }
            }
        }
    }

    /// Replace constrained rows by the defect against the prescribed value.
    fn apply_dirichlet(
        &mut self,
        cur_vol_vars: &[VolumeVariables<N>; 4],
        bc_types: &ElementBoundaryTypes<N>,
    ) {
        if !bc_types.has_dirichlet {
            return;
        }

        for i in 0..4 {
            for eq in 0..N {
                if bc_types.scv_types[i].is_dirichlet(eq) {
                    self.residual[i][eq] =
                        cur_vol_vars[i].primary[eq] - bc_types.dirichlet_values[i][eq];
                }
            }
        }
    }
}

impl<const N: usize> Default for LocalResidual<N> {
    fn default() -> Self {
        Self::new()
    }
}
