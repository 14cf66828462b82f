//! Global residual assembly over all cells.
//!
//! The global residual has one row per mesh vertex. Each cell contributes to
//! the rows of its four corners; interior sub-face fluxes cancel between the
//! two corners they couple, so summing cell contributions yields a
//! conservative vertex-centered discretization. Dirichlet rows are
//! overwritten once after accumulation.

use crate::boundary::{BoundaryTypes, ElementBoundaryTypes};
use crate::equations::{PorousModel, PrimaryVariables, VolumeVariables};
use crate::mesh::{BoxGeometry, Mesh2D};
use crate::problem::PorousProblem;
use crate::types::{CellIndex, VertexIndex};

use super::local_residual::{LocalResidual, ResidualConfig};

/// Assemble the global residual, one entry per vertex.
///
/// `prev_state` and `cur_state` hold the primary variables per vertex at the
/// previous and current solution. Rows of vertices with a Dirichlet
/// constraint contain the defect `current - prescribed` for the constrained
/// equations.
pub fn assemble_residuals<M, P, const N: usize>(
    mesh: &Mesh2D,
    config: &ResidualConfig<'_, M, P>,
    prev_state: &[PrimaryVariables<N>],
    cur_state: &[PrimaryVariables<N>],
) -> Vec<PrimaryVariables<N>>
where
    M: PorousModel<N>,
    P: PorousProblem<N>,
{
    check_state_lengths(mesh, prev_state, cur_state);

    let mut global = vec![PrimaryVariables::zero(); mesh.n_vertices];
    let mut dirichlet_mask = vec![BoundaryTypes::<N>::interior(); mesh.n_vertices];
    let mut dirichlet_values = vec![PrimaryVariables::zero(); mesh.n_vertices];

    for cell in CellIndex::iter(mesh.n_cells) {
        let (vertices, residual, bc) = evaluate_cell(mesh, config, prev_state, cur_state, cell);
        scatter(
            &mut global,
            &mut dirichlet_mask,
            &mut dirichlet_values,
            &vertices,
            &residual,
            &bc,
        );
    }

    overwrite_dirichlet_rows(&mut global, &dirichlet_mask, &dirichlet_values, cur_state);
    global
}

/// Parallel variant of [`assemble_residuals`].
///
/// Cell contributions are evaluated in parallel and scattered sequentially,
/// so the result is bit-identical to the sequential assembly.
#[cfg(feature = "parallel")]
pub fn assemble_residuals_parallel<M, P, const N: usize>(
    mesh: &Mesh2D,
    config: &ResidualConfig<'_, M, P>,
    prev_state: &[PrimaryVariables<N>],
    cur_state: &[PrimaryVariables<N>],
) -> Vec<PrimaryVariables<N>>
where
    M: PorousModel<N> + Sync,
    P: PorousProblem<N> + Sync,
{
    use rayon::prelude::*;

    check_state_lengths(mesh, prev_state, cur_state);

    let contributions: Vec<_> = (0..mesh.n_cells)
        .into_par_iter()
        .map(|k| evaluate_cell(mesh, config, prev_state, cur_state, CellIndex::new(k)))
        .collect();

    let mut global = vec![PrimaryVariables::zero(); mesh.n_vertices];
    let mut dirichlet_mask = vec![BoundaryTypes::<N>::interior(); mesh.n_vertices];
    let mut dirichlet_values = vec![PrimaryVariables::zero(); mesh.n_vertices];

    for (vertices, residual, bc) in &contributions {
        scatter(
            &mut global,
            &mut dirichlet_mask,
            &mut dirichlet_values,
            vertices,
            residual,
            bc,
        );
    }

    overwrite_dirichlet_rows(&mut global, &dirichlet_mask, &dirichlet_values, cur_state);
    global
}

/// Total stored mass per equation, summed over all sub-volumes.
///
/// The difference of this quantity between two states equals the accumulated
/// boundary and source fluxes, which makes it the natural mass-balance
/// diagnostic for transient runs.
pub fn total_storage<M, P, const N: usize>(
    mesh: &Mesh2D,
    config: &ResidualConfig<'_, M, P>,
    state: &[PrimaryVariables<N>],
) -> PrimaryVariables<N>
where
    M: PorousModel<N>,
    P: PorousProblem<N>,
{
    assert_eq!(
        state.len(),
        mesh.n_vertices,
        "State must hold one entry per vertex"
    );

    let mut total = PrimaryVariables::zero();
    let mut local = LocalResidual::new();

    for cell in CellIndex::iter(mesh.n_cells) {
        let geometry = BoxGeometry::new(mesh, cell);
        let vol_vars = expand_state(config, mesh, cell, state);
        local.evaluate_storage(&geometry, &vol_vars, config.model);
        for r in local.residual() {
            total += *r;
        }
    }
    total
}

fn check_state_lengths<const N: usize>(
    mesh: &Mesh2D,
    prev_state: &[PrimaryVariables<N>],
    cur_state: &[PrimaryVariables<N>],
) {
    assert_eq!(
        prev_state.len(),
        mesh.n_vertices,
        "Previous state must hold one entry per vertex"
    );
    assert_eq!(
        cur_state.len(),
        mesh.n_vertices,
        "Current state must hold one entry per vertex"
    );
}

/// Expand the per-vertex primary variables of one cell's corners.
fn expand_state<M, P, const N: usize>(
    config: &ResidualConfig<'_, M, P>,
    mesh: &Mesh2D,
    cell: CellIndex,
    state: &[PrimaryVariables<N>],
) -> [VolumeVariables<N>; 4]
where
    M: PorousModel<N>,
    P: PorousProblem<N>,
{
    let k = cell.as_usize();
    let vertices = mesh.cell_vertex_indices(k);
    let porosity = config.problem.porosity(k);
    let law = config.problem.material_law(k);
    std::array::from_fn(|i| {
        config
            .model
            .update_volume_vars(state[vertices[i]], porosity, &law)
    })
}

/// Evaluate one cell: corner vertices, local residual, boundary info.
fn evaluate_cell<M, P, const N: usize>(
    mesh: &Mesh2D,
    config: &ResidualConfig<'_, M, P>,
    prev_state: &[PrimaryVariables<N>],
    cur_state: &[PrimaryVariables<N>],
    cell: CellIndex,
) -> ([usize; 4], [PrimaryVariables<N>; 4], ElementBoundaryTypes<N>)
where
    M: PorousModel<N>,
    P: PorousProblem<N>,
{
    let geometry = BoxGeometry::new(mesh, cell);
    let prev_vol_vars = expand_state(config, mesh, cell, prev_state);
    let cur_vol_vars = expand_state(config, mesh, cell, cur_state);
    let bc = ElementBoundaryTypes::from_problem(config.problem, mesh, cell);

    let mut local = LocalResidual::new();
    local.evaluate(&geometry, &prev_vol_vars, &cur_vol_vars, &bc, config);

    (mesh.cell_vertex_indices(cell.as_usize()), *local.residual(), bc)
}

/// Add one cell's contribution to the global rows and record Dirichlet
/// constraints for the final overwrite.
fn scatter<const N: usize>(
    global: &mut [PrimaryVariables<N>],
    dirichlet_mask: &mut [BoundaryTypes<N>],
    dirichlet_values: &mut [PrimaryVariables<N>],
    vertices: &[usize; 4],
    residual: &[PrimaryVariables<N>; 4],
    bc: &ElementBoundaryTypes<N>,
) {
    for i in 0..4 {
        let v = vertices[i];
        global[v] += residual[i];
        for eq in 0..N {
            if bc.scv_types[i].is_dirichlet(eq) {
                dirichlet_mask[v].set_dirichlet(eq);
                dirichlet_values[v][eq] = bc.dirichlet_values[i][eq];
            }
        }
    }
}

/// Replace accumulated rows of constrained vertices by the Dirichlet defect.
fn overwrite_dirichlet_rows<const N: usize>(
    global: &mut [PrimaryVariables<N>],
    dirichlet_mask: &[BoundaryTypes<N>],
    dirichlet_values: &[PrimaryVariables<N>],
    cur_state: &[PrimaryVariables<N>],
) {
    for v in VertexIndex::iter(global.len()) {
        for eq in 0..N {
            if dirichlet_mask[v].is_dirichlet(eq) {
                global[v][eq] = cur_state[v][eq] - dirichlet_values[v][eq];
            }
        }
    }
}
