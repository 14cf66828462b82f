//! Two-phase immiscible flow model.
//!
//! Two mass balances, one per phase, with wetting pressure and one saturation
//! as primary variables:
//!
//! ```text
//! d(phi * rho_a * S_a)/dt + div(rho_a * v_a) = q_a
//! v_a = -(kr_a / mu_a) K (grad p_a - rho_a g),   a in {w, n}
//! ```
//!
//! The non-wetting pressure follows from capillarity, p_n = p_w + pc(S_w).
//! Phase mobilities at a face are taken fully upwind with respect to that
//! phase's own potential gradient.

use crate::equations::model::{FluxContext, PorousModel, PorousModelInfo};
use crate::equations::{MaterialLaw, PrimaryVariables, TwoPhaseFluids, VolumeVariables};

/// Choice of which saturation is the second primary variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaturationFormulation {
    /// Primary variables are (p_w, S_w).
    Wetting,
    /// Primary variables are (p_w, S_n).
    NonWetting,
}

/// Two-phase flow: wetting and non-wetting mass balances.
#[derive(Clone, Copy, Debug)]
pub struct TwoPhaseFlow {
    /// The wetting/non-wetting fluid pair.
    pub fluids: TwoPhaseFluids,
    /// Which saturation the second primary variable holds.
    pub formulation: SaturationFormulation,
    /// Gravitational acceleration vector [m/s^2].
    pub gravity: [f64; 2],
}

impl TwoPhaseFlow {
    /// Index of the wetting-pressure unknown.
    pub const PRESSURE_IDX: usize = 0;
    /// Index of the saturation unknown.
    pub const SATURATION_IDX: usize = 1;

    /// Create a model with (p_w, S_w) primary variables and no gravity.
    pub fn new(fluids: TwoPhaseFluids) -> Self {
        Self {
            fluids,
            formulation: SaturationFormulation::Wetting,
            gravity: [0.0, 0.0],
        }
    }

    /// Water displacing a light oil, no gravity.
    pub fn water_lnapl() -> Self {
        Self::new(TwoPhaseFluids::water_lnapl())
    }

    /// Unit fluids for both phases, for analytic test cases.
    pub fn unit() -> Self {
        Self::new(TwoPhaseFluids::unit())
    }

    /// Switch the saturation unknown.
    pub fn with_formulation(mut self, formulation: SaturationFormulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// Enable gravity (e.g., `[0.0, -9.81]` for y pointing up).
    pub fn with_gravity(mut self, gravity: [f64; 2]) -> Self {
        self.gravity = gravity;
        self
    }

    /// Wetting saturation implied by the saturation unknown.
    #[inline]
    pub fn wetting_saturation(&self, saturation_primary: f64) -> f64 {
        match self.formulation {
            SaturationFormulation::Wetting => saturation_primary,
            SaturationFormulation::NonWetting => 1.0 - saturation_primary,
        }
    }
}

impl PorousModelInfo for TwoPhaseFlow {
    fn name(&self) -> &'static str {
        "TwoPhaseFlow"
    }

    fn description(&self) -> &str {
        "Immiscible two-phase Darcy flow, wetting pressure / saturation formulation"
    }

    fn n_equations(&self) -> usize {
        2
    }

    fn equation_names(&self) -> &[&'static str] {
        &["wetting", "nonwetting"]
    }
}

impl PorousModel<2> for TwoPhaseFlow {
    fn update_volume_vars(
        &self,
        primary: PrimaryVariables<2>,
        porosity: f64,
        material: &MaterialLaw,
    ) -> VolumeVariables<2> {
        let pressure_w = primary[Self::PRESSURE_IDX];
        let saturation_w = self.wetting_saturation(primary[Self::SATURATION_IDX]);
        let pc = material.capillary_pressure(saturation_w);
        VolumeVariables {
            primary,
            pressure_w,
            pressure_n: pressure_w + pc,
            saturation_w,
            mobility_w: material.krw(saturation_w) / self.fluids.wetting.viscosity,
            mobility_n: material.krn(saturation_w) / self.fluids.nonwetting.viscosity,
            density_w: self.fluids.wetting.density,
            density_n: self.fluids.nonwetting.density,
            porosity,
        }
    }

    fn compute_storage(&self, vol_vars: &VolumeVariables<2>) -> PrimaryVariables<2> {
        let phi = vol_vars.porosity;
        PrimaryVariables::new([
            phi * vol_vars.density_w * vol_vars.saturation_w,
            phi * vol_vars.density_n * vol_vars.saturation_n(),
        ])
    }

    fn compute_flux(&self, ctx: &FluxContext<'_, 2>, face: usize) -> PrimaryVariables<2> {
        let scvf = &ctx.geometry.scv_faces[face];
        let (i, j) = (scvf.scv_i, scvf.scv_j);

        // Per-phase pressure gradients at the integration point.
        let mut grad_pw = [0.0, 0.0];
        let mut grad_pn = [0.0, 0.0];
        for (k, grad) in scvf.shape_grads.iter().enumerate() {
            let vv = &ctx.vol_vars[k];
            grad_pw[0] += vv.pressure_w * grad[0];
            grad_pw[1] += vv.pressure_w * grad[1];
            grad_pn[0] += vv.pressure_n * grad[0];
            grad_pn[1] += vv.pressure_n * grad[1];
        }

        let rho_w = 0.5 * (ctx.vol_vars[i].density_w + ctx.vol_vars[j].density_w);
        let rho_n = 0.5 * (ctx.vol_vars[i].density_n + ctx.vol_vars[j].density_n);

        let grad_psi_w = [
            grad_pw[0] - rho_w * self.gravity[0],
            grad_pw[1] - rho_w * self.gravity[1],
        ];
        let grad_psi_n = [
            grad_pn[0] - rho_n * self.gravity[0],
            grad_pn[1] - rho_n * self.gravity[1],
        ];

        // Normal projections scaled by face area, positive toward sub-volume i.
        let kw = ctx.permeability.apply(grad_psi_w);
        let kn = ctx.permeability.apply(grad_psi_n);
        let f_w = (kw[0] * scvf.unit_normal[0] + kw[1] * scvf.unit_normal[1]) * scvf.area;
        let f_n = (kn[0] * scvf.unit_normal[0] + kn[1] * scvf.unit_normal[1]) * scvf.area;

        // Full upwinding per phase.
        let up_w = if f_w > 0.0 { j } else { i };
        let up_n = if f_n > 0.0 { j } else { i };
        let w_vars = &ctx.vol_vars[up_w];
        let n_vars = &ctx.vol_vars[up_n];

        PrimaryVariables::new([
            w_vars.density_w * w_vars.mobility_w * f_w,
            n_vars.density_n * n_vars.mobility_n * f_n,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BoxGeometry, Mesh2D};
    use crate::problem::PermeabilityTensor;
    use crate::types::CellIndex;

    const TOL: f64 = 1e-12;

    fn setup_geometry() -> BoxGeometry {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        BoxGeometry::new(&mesh, CellIndex::new(0))
    }

    #[test]
    fn test_formulation_switch() {
        let model = TwoPhaseFlow::unit();
        assert_eq!(model.wetting_saturation(0.3), 0.3);

        let model = model.with_formulation(SaturationFormulation::NonWetting);
        assert!((model.wetting_saturation(0.3) - 0.7).abs() < TOL);
    }

    #[test]
    fn test_volume_vars_capillarity() {
        let model = TwoPhaseFlow::water_lnapl();
        let law = MaterialLaw::brooks_corey(1000.0, 2.0);
        let vv = model.update_volume_vars(PrimaryVariables::new([1e5, 0.5]), 0.2, &law);

        assert_eq!(vv.pressure_w, 1e5);
        assert!(
            vv.pressure_n > vv.pressure_w,
            "Capillary pressure must raise the non-wetting pressure"
        );
        assert!((vv.pressure_n - vv.pressure_w - law.capillary_pressure(0.5)).abs() < TOL);
    }

    #[test]
    fn test_storage_splits_pore_volume() {
        let model = TwoPhaseFlow::water_lnapl();
        let law = MaterialLaw::linear();
        let vv = model.update_volume_vars(PrimaryVariables::new([1e5, 0.6]), 0.25, &law);
        let storage = model.compute_storage(&vv);

        // phi * rho_w * S_w and phi * rho_n * S_n
        assert!((storage[0] - 0.25 * 1000.0 * 0.6).abs() < TOL);
        assert!((storage[1] - 0.25 * 800.0 * 0.4).abs() < TOL);
    }

    #[test]
    fn test_uniform_state_zero_flux() {
        let model = TwoPhaseFlow::unit();
        let law = MaterialLaw::linear();
        let geometry = setup_geometry();
        let vv = model.update_volume_vars(PrimaryVariables::new([2.0, 0.5]), 0.2, &law);
        let vol_vars = [vv; 4];
        let ctx = FluxContext {
            geometry: &geometry,
            vol_vars: &vol_vars,
            permeability: PermeabilityTensor::identity(),
        };

        for face in 0..4 {
            let flux = model.compute_flux(&ctx, face);
            assert!(flux[0].abs() < TOL, "Wetting flux must vanish, face {}", face);
            assert!(
                flux[1].abs() < TOL,
                "Non-wetting flux must vanish, face {}",
                face
            );
        }
    }

    #[test]
    fn test_upwind_mobility_selected() {
        // Saturation differs between corners 0 and 1; with p_w = x the wetting
        // flux at face 0 enters sub-volume 0, so the upwind corner is 1.
        let model = TwoPhaseFlow::unit();
        let law = MaterialLaw::linear();
        let geometry = setup_geometry();
        let make = |p: f64, s: f64| model.update_volume_vars(PrimaryVariables::new([p, s]), 0.2, &law);
        let vol_vars = [make(0.0, 0.2), make(1.0, 0.8), make(1.0, 0.8), make(0.0, 0.2)];
        let ctx = FluxContext {
            geometry: &geometry,
            vol_vars: &vol_vars,
            permeability: PermeabilityTensor::identity(),
        };

        let flux = model.compute_flux(&ctx, 0);
        // Projected gradient * area = 0.5; upwind wetting mobility is krw(0.8) = 0.8.
        assert!(
            (flux[0] - 0.8 * 0.5).abs() < 1e-10,
            "Wetting flux must use the upwind mobility, got {}",
            flux[0]
        );
    }
}
