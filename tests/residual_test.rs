//! Integration tests for the vertex-centered residual assembly.
//!
//! These tests verify:
//! - Hydrostatic two-phase equilibrium leaves no residual
//! - Global mass balance: the residual rows sum to storage change plus
//!   boundary fluxes
//! - Dirichlet rows hold the defect between current and prescribed values
//! - Prescribed boundary fluxes enter the balance with the outflow sign

use darcy_rs::{
    assemble_residuals, total_storage, BoundaryTypes, Mesh2D, PermeabilityTensor, PorousProblem,
    PrimaryVariables, ResidualConfig, TwoPhaseFlow,
};

const TOL: f64 = 1e-10;

/// Sealed domain: zero-flux walls everywhere, no sources.
struct SealedProblem;

impl PorousProblem<2> for SealedProblem {
    fn permeability(&self, _cell: usize) -> PermeabilityTensor {
        PermeabilityTensor::identity()
    }

    fn porosity(&self, _cell: usize) -> f64 {
        0.2
    }

    fn boundary_types(&self, _cell: usize, _face: usize) -> BoundaryTypes<2> {
        BoundaryTypes::all_neumann()
    }
}

fn vertex_states(mesh: &Mesh2D, f: impl Fn(f64, f64) -> [f64; 2]) -> Vec<PrimaryVariables<2>> {
    mesh.vertices
        .iter()
        .map(|&(x, y)| PrimaryVariables::new(f(x, y)))
        .collect()
}

/// Sum the residual rows per equation.
fn row_sum(residual: &[PrimaryVariables<2>]) -> [f64; 2] {
    residual
        .iter()
        .fold([0.0, 0.0], |acc, r| [acc[0] + r[0], acc[1] + r[1]])
}

/// Hydrostatic pressure with full wetting saturation balances the gravity
/// term exactly; nothing moves and the residual vanishes.
#[test]
fn test_hydrostatic_equilibrium_is_residual_free() {
    let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3);
    let model = TwoPhaseFlow::unit().with_gravity([0.0, -1.0]);
    let problem = SealedProblem;
    let config = ResidualConfig::new(&model, &problem);

    // grad(p) = rho_w * g, i.e. p = p0 - y at unit density.
    let state = vertex_states(&mesh, |_, y| [2.0 - y, 1.0]);

    let residual = assemble_residuals(&mesh, &config, &state, &state);
    for (v, r) in residual.iter().enumerate() {
        assert!(
            r[0].abs() < TOL && r[1].abs() < TOL,
            "Hydrostatic state must be residual-free, vertex {} got [{}, {}]",
            v,
            r[0],
            r[1]
        );
    }
}

/// In a sealed domain the interior fluxes cancel pairwise, so the residual
/// rows sum to the storage change per time step for each phase.
#[test]
fn test_global_balance_matches_storage_change() {
    let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3);
    let model = TwoPhaseFlow::unit();
    let problem = SealedProblem;
    let dt = 0.5;
    let config = ResidualConfig::new(&model, &problem).with_dt(dt);

    let prev = vertex_states(&mesh, |x, _| [1.0, 0.3 + 0.2 * x]);
    let cur = vertex_states(&mesh, |x, y| [1.0 + 0.1 * x * y, 0.5 + 0.1 * y]);

    let residual = assemble_residuals(&mesh, &config, &prev, &cur);
    let sums = row_sum(&residual);

    let storage_prev = total_storage(&mesh, &config, &prev);
    let storage_cur = total_storage(&mesh, &config, &cur);

    for eq in 0..2 {
        let expected = (storage_cur[eq] - storage_prev[eq]) / dt;
        assert!(
            (sums[eq] - expected).abs() < TOL,
            "Equation {}: residual sum {} does not match storage change {}",
            eq,
            sums[eq],
            expected
        );
    }
}

/// Rows of Dirichlet-constrained vertices carry `current - prescribed`.
#[test]
fn test_dirichlet_rows_hold_defect() {
    struct WestDirichlet;

    impl PorousProblem<2> for WestDirichlet {
        fn permeability(&self, _cell: usize) -> PermeabilityTensor {
            PermeabilityTensor::identity()
        }

        fn porosity(&self, _cell: usize) -> f64 {
            0.2
        }

        fn boundary_types(&self, _cell: usize, face: usize) -> BoundaryTypes<2> {
            if face == 3 {
                BoundaryTypes::all_dirichlet()
            } else {
                BoundaryTypes::all_neumann()
            }
        }

        fn dirichlet(&self, _cell: usize, _face: usize) -> PrimaryVariables<2> {
            PrimaryVariables::new([2.0, 0.3])
        }
    }

    let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
    let model = TwoPhaseFlow::unit();
    let problem = WestDirichlet;
    let config = ResidualConfig::new(&model, &problem);

    let state = vertex_states(&mesh, |_, _| [1.0, 1.0]);
    let residual = assemble_residuals(&mesh, &config, &state, &state);

    for (v, &(x, _)) in mesh.vertices.iter().enumerate() {
        if x.abs() < 1e-12 {
            assert!(
                (residual[v][0] + 1.0).abs() < TOL && (residual[v][1] - 0.7).abs() < TOL,
                "Vertex {} must hold the Dirichlet defect, got [{}, {}]",
                v,
                residual[v][0],
                residual[v][1]
            );
        }
    }
}

/// A prescribed inflow shows up in the global balance with negative sign.
#[test]
fn test_neumann_inflow_enters_balance() {
    struct WestInflow;

    impl PorousProblem<2> for WestInflow {
        fn permeability(&self, _cell: usize) -> PermeabilityTensor {
            PermeabilityTensor::identity()
        }

        fn porosity(&self, _cell: usize) -> f64 {
            0.2
        }

        fn boundary_types(&self, _cell: usize, _face: usize) -> BoundaryTypes<2> {
            BoundaryTypes::all_neumann()
        }

        fn neumann(&self, _cell: usize, face: usize) -> PrimaryVariables<2> {
            // Wetting mass flux into the domain through the west side.
            if face == 3 {
                PrimaryVariables::new([-1.0, 0.0])
            } else {
                PrimaryVariables::zero()
            }
        }
    }

    let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
    let model = TwoPhaseFlow::unit();
    let problem = WestInflow;
    let config = ResidualConfig::new(&model, &problem);

    let state = vertex_states(&mesh, |_, _| [1.0, 1.0]);
    let residual = assemble_residuals(&mesh, &config, &state, &state);
    let sums = row_sum(&residual);

    // Inflow of 1 kg/(m^2 s) over a side of length 1.
    assert!(
        (sums[0] + 1.0).abs() < TOL,
        "Wetting balance must see the inflow, got {}",
        sums[0]
    );
    assert!(
        sums[1].abs() < TOL,
        "Non-wetting balance must stay untouched, got {}",
        sums[1]
    );
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_assembly_matches_sequential() {
    use darcy_rs::assemble_residuals_parallel;

    let mesh = Mesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 4, 3);
    let model = TwoPhaseFlow::unit().with_gravity([0.0, -1.0]);
    let problem = SealedProblem;
    let config = ResidualConfig::new(&model, &problem).with_dt(0.25);

    let prev = vertex_states(&mesh, |x, y| [x + y, 0.4]);
    let cur = vertex_states(&mesh, |x, y| [x * y + 1.0, 0.4 + 0.1 * x]);

    let sequential = assemble_residuals(&mesh, &config, &prev, &cur);
    let parallel = assemble_residuals_parallel(&mesh, &config, &prev, &cur);

    for (s, p) in sequential.iter().zip(parallel.iter()) {
        assert_eq!(s.to_array(), p.to_array());
    }
}
