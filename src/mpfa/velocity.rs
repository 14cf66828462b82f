//! Cell-centred velocity reconstruction with the MPFA O-method.
//!
//! For every mesh vertex, the cells meeting there form an interaction
//! region. Imposing pressure continuity at the edge midpoints and flux
//! continuity across the half edges yields a small linear system whose
//! solution expresses the half-edge fluxes as a weighted sum of the
//! cell-centre pressures, `T u`. Walking the four corner-adjacent face
//! pairs of a cell and accumulating the half-edge fluxes reconstructs the
//! normal face velocities of that cell, matching the flux a full
//! permeability tensor induces, which a two-point approximation gets wrong
//! on anisotropic or non-grid-aligned problems.
//!
//! Interior regions couple four cells. At the domain boundary the region
//! truncates to one or two cells and the prescribed boundary data enters
//! the system inhomogeneity; those variants live in `boundary_region`.

use std::sync::atomic::AtomicBool;

use crate::equations::{SaturationFormulation, TwoPhaseFlow, TwoPhaseFluids};
use crate::mesh::{CellFace, Mesh2D};
use crate::problem::PorousProblem;
use crate::types::{CellIndex, EdgeIndex};

use super::conservation::{
    check_cell_balance, warn_once_if_unbalanced, ConservationCheckConfig, ConservationDefect,
};
use super::errors::MpfaError;
use super::interaction::{diff, dot, rotate_cw, scale, FluxFace, SubVolume};
use super::transmissibility::{mat_add, mat_mul, mat_vec, solve_matrix};

pub(super) const PRESSURE_IDX: usize = TwoPhaseFlow::PRESSURE_IDX;
pub(super) const SATURATION_IDX: usize = TwoPhaseFlow::SATURATION_IDX;

/// Cell-centred unknowns the reconstruction works from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFlowState {
    /// Cell pressure [Pa].
    pub pressure: f64,
    /// Wetting saturation [-], regardless of which saturation a transport
    /// step evolves as its unknown.
    pub saturation_w: f64,
}

impl CellFlowState {
    pub fn new(pressure: f64, saturation_w: f64) -> Self {
        Self {
            pressure,
            saturation_w,
        }
    }
}

/// Face velocities of every cell, with the normal projections kept as
/// upwind indicators for a transport step.
#[derive(Clone, Debug)]
pub struct VelocityField {
    /// Total Darcy velocity per cell and face [m/s].
    data: Vec<[[f64; 2]; 4]>,
    /// Velocity projected onto the outward face normal.
    potential: Vec<[f64; 4]>,
}

impl VelocityField {
    /// Zero field over `n_cells` cells.
    pub fn new(n_cells: usize) -> Self {
        Self {
            data: vec![[[0.0; 2]; 4]; n_cells],
            potential: vec![[0.0; 4]; n_cells],
        }
    }

    pub fn n_cells(&self) -> usize {
        self.data.len()
    }

    /// Total velocity at one face of a cell.
    #[inline]
    pub fn velocity(&self, cell: CellIndex, face: usize) -> [f64; 2] {
        self.data[cell][face]
    }

    /// Velocity projected onto the outward face normal [m/s].
    ///
    /// Both phases share this indicator: the reconstruction yields the total
    /// velocity, and buoyant or capillary splitting is left to the transport
    /// step that consumes it.
    #[inline]
    pub fn potential(&self, cell: CellIndex, face: usize) -> f64 {
        self.potential[cell][face]
    }

    /// Outward volumetric flux through a face, `v . n * length` [m^2/s].
    pub fn normal_flux(&self, mesh: &Mesh2D, cell: CellIndex, face: usize) -> f64 {
        let k = cell.as_usize();
        let n = mesh.outward_unit_normal(k, face);
        dot(self.data[cell][face], n) * mesh.face_length(k, face)
    }

    pub(super) fn add(&mut self, cell: usize, face: usize, contribution: [f64; 2]) {
        self.data[cell][face][0] += contribution[0];
        self.data[cell][face][1] += contribution[1];
    }

    fn reset_cell(&mut self, cell: usize) {
        self.data[cell] = [[0.0; 2]; 4];
        self.potential[cell] = [0.0; 4];
    }
}

/// Geometry of one corner-adjacent face pair of the visited cell.
///
/// Pair `l` couples faces `l` and `(l+1)%4`, which meet at local corner
/// `(l+1)%4`.
pub(super) struct PairContext {
    pub(super) cell1: usize,
    pub(super) face_a: usize,
    pub(super) face_b: usize,
    /// Global index of the shared corner vertex.
    pub(super) corner: usize,
    /// Centroid of the visited cell.
    pub(super) x1: [f64; 2],
    /// Pressure of the visited cell.
    pub(super) p1: f64,
    pub(super) fa: FluxFace,
    pub(super) fb: FluxFace,
}

/// MPFA O-method velocity engine for one mesh/problem pair.
pub struct MpfaOVelocity<'a, P> {
    pub(super) mesh: &'a Mesh2D,
    pub(super) problem: &'a P,
    pub(super) fluids: TwoPhaseFluids,
    pub(super) formulation: SaturationFormulation,
    pub(super) check: ConservationCheckConfig,
    warned: AtomicBool,
}

impl<'a, P: PorousProblem<2>> MpfaOVelocity<'a, P> {
    /// Create an engine with wetting-saturation boundary data and the
    /// default conservation check.
    pub fn new(mesh: &'a Mesh2D, problem: &'a P, fluids: TwoPhaseFluids) -> Self {
        Self {
            mesh,
            problem,
            fluids,
            formulation: SaturationFormulation::Wetting,
            check: ConservationCheckConfig::default(),
            warned: AtomicBool::new(false),
        }
    }

    /// Interpret Dirichlet saturation values as the given formulation.
    pub fn with_formulation(mut self, formulation: SaturationFormulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// Override the conservation check tolerances.
    pub fn with_check_config(mut self, check: ConservationCheckConfig) -> Self {
        self.check = check;
        self
    }

    /// Reconstruct the face velocities of every cell.
    pub fn compute_all(&self, states: &[CellFlowState]) -> Result<VelocityField, MpfaError> {
        assert_eq!(
            states.len(),
            self.mesh.n_cells,
            "Flow state count {} does not match cell count {}",
            states.len(),
            self.mesh.n_cells
        );

        let mut field = VelocityField::new(self.mesh.n_cells);
        for cell in CellIndex::iter(self.mesh.n_cells) {
            self.compute_velocities(&mut field, states, cell)?;
        }
        Ok(field)
    }

    /// Reconstruct the face velocities of one cell.
    ///
    /// The cell's velocity slots are reset on entry, so recomputing after a
    /// state update is safe. Each of the four corner-adjacent face pairs
    /// contributes the two half-edge fluxes of its interaction region; the
    /// two visits an interior face receives sum to the full face velocity.
    pub fn compute_velocities(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        cell: CellIndex,
    ) -> Result<(), MpfaError> {
        let k1 = cell.as_usize();
        field.reset_cell(k1);

        for pair in 0..4 {
            self.corner_pair(field, states, k1, pair)?;
        }

        for face in 0..4 {
            let normal = self.mesh.outward_unit_normal(k1, face);
            field.potential[k1][face] = dot(field.data[k1][face], normal);
        }

        let face_fluxes: [f64; 4] =
            std::array::from_fn(|face| field.normal_flux(self.mesh, cell, face));
        warn_once_if_unbalanced(
            &self.warned,
            cell,
            face_fluxes,
            self.source_volume(k1),
            &self.check,
        );

        Ok(())
    }

    /// Re-check the discrete mass balance of a computed field.
    ///
    /// Returns the cells whose relative defect exceeds the configured
    /// tolerance; an empty result means the field is locally conservative.
    pub fn conservation_defects(&self, field: &VelocityField) -> Vec<ConservationDefect> {
        CellIndex::iter(self.mesh.n_cells)
            .filter_map(|cell| {
                let face_fluxes: [f64; 4] =
                    std::array::from_fn(|face| field.normal_flux(self.mesh, cell, face));
                let defect = check_cell_balance(
                    cell,
                    face_fluxes,
                    self.source_volume(cell.as_usize()),
                    &self.check,
                );
                defect.exceeds.then_some(defect)
            })
            .collect()
    }

    /// Assemble one corner pair and scatter its half-edge fluxes.
    fn corner_pair(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        k1: usize,
        pair: usize,
    ) -> Result<(), MpfaError> {
        let face_a = pair;
        let face_b = (pair + 1) % 4;
        let corner = self.mesh.cell_vertex_indices(k1)[face_b];

        let ctx = PairContext {
            cell1: k1,
            face_a,
            face_b,
            corner,
            x1: self.mesh.cell_centroid(k1),
            p1: states[k1].pressure,
            fa: FluxFace::of(self.mesh, k1, face_a),
            fb: FluxFace::of(self.mesh, k1, face_b),
        };

        match (
            self.mesh.neighbor(k1, face_a),
            self.mesh.neighbor(k1, face_b),
        ) {
            (Some(nb_a), Some(nb_b)) => self.interior_region(field, states, &ctx, nb_a, nb_b),
            (Some(nb_a), None) => self.half_boundary_region(field, states, &ctx, nb_a),
            (None, _) => self.full_boundary_region(field, states, &ctx),
        }
    }

    /// Four-cell interaction region around an interior corner.
    ///
    /// Cells 2 and 3 lie across the two faces of the pair; cell 4 is the
    /// diagonal cell reached from either of them across their other corner
    /// face. The region solves `T = C A^{-1} B + F` with one pressure
    /// continuity row per edge midpoint and one flux continuity row per
    /// half edge; rows 0 and 2 of `T u` are the half-edge fluxes through
    /// the pair's faces.
    fn interior_region(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        ctx: &PairContext,
        nb_a: CellFace,
        nb_b: CellFace,
    ) -> Result<(), MpfaError> {
        let (k2, k3) = (nb_a.cell, nb_b.cell);

        let face24 = self
            .mesh
            .other_face_at_vertex(k2, ctx.corner, nb_a.face)
            .ok_or_else(|| self.unsupported(ctx.cell1))?;
        let face34 = self
            .mesh
            .other_face_at_vertex(k3, ctx.corner, nb_b.face)
            .ok_or_else(|| self.unsupported(ctx.cell1))?;

        // Both corner walks must meet in the same diagonal cell; hanging
        // nodes or three-cell corners have no O-method stencil.
        let nb24 = self
            .mesh
            .neighbor(k2, face24)
            .ok_or_else(|| self.unsupported(ctx.cell1))?;
        let nb34 = self
            .mesh
            .neighbor(k3, face34)
            .ok_or_else(|| self.unsupported(ctx.cell1))?;
        if nb24.cell != nb34.cell {
            return Err(self.unsupported(ctx.cell1));
        }
        let k4 = nb24.cell;

        let f24 = FluxFace::of(self.mesh, k2, face24);
        let f34 = FluxFace::of(self.mesh, k3, face34);

        let x2 = self.mesh.cell_centroid(k2);
        let x3 = self.mesh.cell_centroid(k3);
        let x4 = self.mesh.cell_centroid(k4);

        // Half-edge integration normals: n1 and n3 point out of cell 1,
        // n4 out of cell 2, n2 out of cell 3.
        let n1 = ctx.fa.half_normal;
        let n3 = ctx.fb.half_normal;
        let n4 = f24.half_normal;
        let n2 = f34.half_normal;

        let sv1 = SubVolume::new(
            self.total_mobility(ctx.cell1, states),
            &self.problem.permeability(ctx.cell1),
            rotate_cw(diff(ctx.fb.midpoint, ctx.x1)),
            rotate_cw(diff(ctx.x1, ctx.fa.midpoint)),
        );
        let sv2 = SubVolume::new(
            self.total_mobility(k2, states),
            &self.problem.permeability(k2),
            rotate_cw(diff(f24.midpoint, x2)),
            rotate_cw(diff(ctx.fa.midpoint, x2)),
        );
        let sv3 = SubVolume::new(
            self.total_mobility(k3, states),
            &self.problem.permeability(k3),
            rotate_cw(diff(x3, ctx.fb.midpoint)),
            rotate_cw(diff(x3, f34.midpoint)),
        );
        let sv4 = SubVolume::new(
            self.total_mobility(k4, states),
            &self.problem.permeability(k4),
            rotate_cw(diff(x4, f24.midpoint)),
            rotate_cw(diff(f34.midpoint, x4)),
        );

        let g111 = sv1.g_a(n1);
        let g121 = sv1.g_b(n1);
        let g211 = sv1.g_a(n3);
        let g221 = sv1.g_b(n3);
        let g112 = sv2.g_a(n1);
        let g122 = sv2.g_b(n1);
        let g212 = sv2.g_a(n4);
        let g222 = sv2.g_b(n4);
        let g113 = sv3.g_a(n2);
        let g123 = sv3.g_b(n2);
        let g213 = sv3.g_a(n3);
        let g223 = sv3.g_b(n3);
        let g114 = sv4.g_a(n2);
        let g124 = sv4.g_b(n2);
        let g214 = sv4.g_a(n4);
        let g224 = sv4.g_b(n4);

        let mut c = [[0.0; 4]; 4];
        c[0][0] = -g111;
        c[0][2] = -g121;
        c[1][1] = g114;
        c[1][3] = g124;
        c[2][1] = -g213;
        c[2][2] = g223;
        c[3][0] = g212;
        c[3][3] = -g222;

        let mut f = [[0.0; 4]; 4];
        f[0][0] = g111 + g121;
        f[1][3] = -g114 - g124;
        f[2][2] = g213 - g223;
        f[3][1] = -g212 + g222;

        let mut a = [[0.0; 4]; 4];
        a[0][0] = g111 + g112;
        a[0][2] = g121;
        a[0][3] = -g122;
        a[1][1] = g114 + g113;
        a[1][2] = -g123;
        a[1][3] = g124;
        a[2][0] = g211;
        a[2][1] = -g213;
        a[2][2] = g223 + g221;
        a[3][0] = -g212;
        a[3][1] = g214;
        a[3][3] = g222 + g224;

        let mut b = [[0.0; 4]; 4];
        b[0][0] = g111 + g121;
        b[0][1] = g112 - g122;
        b[1][2] = g113 - g123;
        b[1][3] = g114 + g124;
        b[2][0] = g211 + g221;
        b[2][2] = -g213 + g223;
        b[3][1] = -g212 + g222;
        b[3][3] = g214 + g224;

        let t = mat_add(&mat_mul(&c, &solve_matrix(a, b)), &f);

        let u = [
            ctx.p1,
            states[k2].pressure,
            states[k3].pressure,
            states[k4].pressure,
        ];
        let tu = mat_vec(&t, &u);

        field.add(
            ctx.cell1,
            ctx.face_a,
            scale(ctx.fa.unit_normal, tu[0] / ctx.fa.length),
        );
        field.add(
            ctx.cell1,
            ctx.face_b,
            scale(ctx.fb.unit_normal, tu[2] / ctx.fb.length),
        );

        Ok(())
    }

    // ===== Shared pieces of the boundary regions =====

    /// Total mobility of a cell at its current saturation.
    pub(super) fn total_mobility(&self, cell: usize, states: &[CellFlowState]) -> f64 {
        self.mobility_at(cell, states[cell].saturation_w)
    }

    /// Mobility entering a pressure-Dirichlet sub-face. When the edge also
    /// prescribes the saturation, the mobility is evaluated at that value
    /// with the visited cell's material law; otherwise the owning cell keeps
    /// its own mobility.
    pub(super) fn dirichlet_mobility(
        &self,
        cell1: usize,
        owner: usize,
        face: usize,
        states: &[CellFlowState],
    ) -> f64 {
        let bc = self.problem.boundary_types(owner, face);
        if bc.is_dirichlet(SATURATION_IDX) {
            let values = self.problem.dirichlet(owner, face);
            let sat_w = match self.formulation {
                SaturationFormulation::Wetting => values[SATURATION_IDX],
                SaturationFormulation::NonWetting => 1.0 - values[SATURATION_IDX],
            };
            self.mobility_at(cell1, sat_w)
        } else {
            self.total_mobility(owner, states)
        }
    }

    fn mobility_at(&self, law_cell: usize, saturation_w: f64) -> f64 {
        let law = self.problem.material_law(law_cell);
        law.krw(saturation_w) / self.fluids.wetting.viscosity
            + law.krn(saturation_w) / self.fluids.nonwetting.viscosity
    }

    /// Prescribed pressure on a Dirichlet edge.
    pub(super) fn dirichlet_pressure(&self, cell: usize, face: usize) -> f64 {
        self.problem.dirichlet(cell, face)[PRESSURE_IDX]
    }

    /// Prescribed outward volumetric flux density on a Neumann edge [m/s].
    /// The per-phase mass fluxes convert with the constant phase densities.
    pub(super) fn volumetric_neumann(&self, cell: usize, face: usize) -> f64 {
        let q = self.problem.neumann(cell, face);
        q[0] / self.fluids.wetting.density + q[1] / self.fluids.nonwetting.density
    }

    /// Volumetric source of a cell integrated over its volume [m^2/s].
    fn source_volume(&self, cell: usize) -> f64 {
        let q = self.problem.source(cell);
        let volumetric = q[0] / self.fluids.wetting.density + q[1] / self.fluids.nonwetting.density;
        volumetric * self.mesh.cell_volume(cell)
    }

    pub(super) fn unsupported(&self, cell: usize) -> MpfaError {
        MpfaError::UnsupportedTopology {
            cell: CellIndex::new(cell),
        }
    }

    /// Error for a boundary edge that fixes neither pressure nor flux.
    pub(super) fn unclassified(&self, cell: usize, face: usize) -> MpfaError {
        MpfaError::UnclassifiedBoundary {
            cell: CellIndex::new(cell),
            edge: EdgeIndex::new(self.mesh.cell_edges[cell][face]),
        }
    }
}
