//! Truncated interaction regions along the domain boundary.
//!
//! At a boundary corner the four-cell stencil collapses to one or two
//! cells. Prescribed pressures remove unknowns from the continuity system
//! and enter its inhomogeneity; prescribed fluxes replace flux-continuity
//! rows. Two shapes occur while walking a cell's corner pairs:
//!
//! - the pair's second face lies on the boundary but the first is interior,
//!   leaving a two-cell region with two boundary edges
//!   ([`MpfaOVelocity::half_boundary_region`]);
//! - the pair's first face lies on the boundary, so the visited cell itself
//!   touches the boundary corner ([`MpfaOVelocity::full_boundary_region`]),
//!   with the second face either on the boundary as well or interior
//!   towards one further cell.
//!
//! Every sub-case reduces to a small closed-form or LU-solved system; the
//! resulting half-edge fluxes accumulate into the visited cell's faces
//! exactly like in the interior case.

use crate::mesh::CellFace;
use crate::problem::PorousProblem;

use super::errors::MpfaError;
use super::interaction::{diff, rotate_cw, scale, FluxFace, SubVolume};
use super::transmissibility::{mat_add, mat_mul, mat_vec, solve_pair};
use super::velocity::{CellFlowState, MpfaOVelocity, PairContext, VelocityField, PRESSURE_IDX};

impl<'a, P: PorousProblem<2>> MpfaOVelocity<'a, P> {
    /// Two-cell region: `face_a` interior towards cell 2, `face_b` on the
    /// boundary. Cell 2's other corner face must be on the boundary too.
    ///
    /// The four combinations of pressure/flux data on the two boundary
    /// edges each yield their own reduced continuity system; only the
    /// Dirichlet variants pin the `face_b` half-edge flux, the flux
    /// variants leave `face_b` to its prescribed value (written by the
    /// pair that leads with it).
    pub(super) fn half_boundary_region(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        ctx: &PairContext,
        nb_a: CellFace,
    ) -> Result<(), MpfaError> {
        let k1 = ctx.cell1;
        let k2 = nb_a.cell;

        let face24 = self
            .mesh
            .other_face_at_vertex(k2, ctx.corner, nb_a.face)
            .ok_or_else(|| self.unsupported(k1))?;
        if self.mesh.neighbor(k2, face24).is_some() {
            // More than two cells around a boundary corner.
            return Err(self.unsupported(k1));
        }

        let bc_b = self.problem.boundary_types(k1, ctx.face_b);
        if !bc_b.is_dirichlet(PRESSURE_IDX) && !bc_b.is_neumann(PRESSURE_IDX) {
            return Err(self.unclassified(k1, ctx.face_b));
        }
        let bc_24 = self.problem.boundary_types(k2, face24);
        if !bc_24.is_dirichlet(PRESSURE_IDX) && !bc_24.is_neumann(PRESSURE_IDX) {
            return Err(self.unclassified(k2, face24));
        }

        let f24 = FluxFace::of(self.mesh, k2, face24);
        let x2 = self.mesh.cell_centroid(k2);
        let p2 = states[k2].pressure;

        let n1 = ctx.fa.half_normal;
        let n3 = ctx.fb.half_normal;
        let n4 = f24.half_normal;

        let nu11 = rotate_cw(diff(ctx.fb.midpoint, ctx.x1));
        let nu21 = rotate_cw(diff(ctx.x1, ctx.fa.midpoint));
        let nu12 = rotate_cw(diff(f24.midpoint, x2));
        let nu22 = rotate_cw(diff(ctx.fa.midpoint, x2));

        let perm1 = self.problem.permeability(k1);
        let perm2 = self.problem.permeability(k2);

        match (
            bc_b.is_dirichlet(PRESSURE_IDX),
            bc_24.is_dirichlet(PRESSURE_IDX),
        ) {
            // Prescribed fluxes on both boundary edges: three pressure
            // continuity unknowns remain.
            (false, false) => {
                let sv1 = SubVolume::new(self.total_mobility(k1, states), &perm1, nu11, nu21);
                let sv2 = SubVolume::new(self.total_mobility(k2, states), &perm2, nu12, nu22);
                let g111 = sv1.g_a(n1);
                let g121 = sv1.g_b(n1);
                let g211 = sv1.g_a(n3);
                let g221 = sv1.g_b(n3);
                let g112 = sv2.g_a(n1);
                let g122 = sv2.g_b(n1);
                let g212 = sv2.g_a(n4);
                let g222 = sv2.g_b(n4);

                let j3 = self.volumetric_neumann(k1, ctx.face_b);
                let j4 = self.volumetric_neumann(k2, face24);

                let a = [
                    [g111 + g112, g121, -g122],
                    [g211, g221, 0.0],
                    [-g212, 0.0, g222],
                ];
                let b = [
                    [g111 + g121, g112 - g122],
                    [g211 + g221, 0.0],
                    [0.0, g222 - g212],
                ];
                let r1 = [0.0, -j3 * ctx.fb.length / 2.0, -j4 * f24.length / 2.0];

                let (t, r) = solve_pair(a, b, r1);

                let f1 = (g111 + g121 - g111 * t[0][0] - g121 * t[1][0]) * ctx.p1
                    - (g111 * t[0][1] + g121 * t[1][1]) * p2
                    - (g111 * r[0] + g121 * r[1]);

                field.add(
                    k1,
                    ctx.face_a,
                    scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                );
            }

            // Flux on `face_b`, pressure on the far edge.
            (false, true) => {
                let sv1 = SubVolume::new(self.total_mobility(k1, states), &perm1, nu11, nu21);
                let sv2 = SubVolume::new(
                    self.dirichlet_mobility(k1, k2, face24, states),
                    &perm2,
                    nu12,
                    nu22,
                );
                let g111 = sv1.g_a(n1);
                let g121 = sv1.g_b(n1);
                let g211 = sv1.g_a(n3);
                let g221 = sv1.g_b(n3);
                let g112 = sv2.g_a(n1);
                let g122 = sv2.g_b(n1);

                let j3 = self.volumetric_neumann(k1, ctx.face_b);
                let g4 = self.dirichlet_pressure(k2, face24);

                let a = [[g111 + g112, g121], [g211, g221]];
                let b = [[g111 + g121, g112 - g122], [g211 + g221, 0.0]];
                let r1 = [g122 * g4, -j3 * ctx.fb.length / 2.0];

                let (t, r) = solve_pair(a, b, r1);

                let f1 = (g111 + g121 - g111 * t[0][0] - g121 * t[1][0]) * ctx.p1
                    - (g111 * t[0][1] + g121 * t[1][1]) * p2
                    - (g111 * r[0] + g121 * r[1]);

                field.add(
                    k1,
                    ctx.face_a,
                    scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                );
            }

            // Pressure on `face_b`, flux on the far edge.
            (true, false) => {
                let sv1 = SubVolume::new(
                    self.dirichlet_mobility(k1, k1, ctx.face_b, states),
                    &perm1,
                    nu11,
                    nu21,
                );
                let sv2 = SubVolume::new(self.total_mobility(k2, states), &perm2, nu12, nu22);
                let g111 = sv1.g_a(n1);
                let g121 = sv1.g_b(n1);
                let g211 = sv1.g_a(n3);
                let g221 = sv1.g_b(n3);
                let g112 = sv2.g_a(n1);
                let g122 = sv2.g_b(n1);
                let g212 = sv2.g_a(n4);
                let g222 = sv2.g_b(n4);

                let g3 = self.dirichlet_pressure(k1, ctx.face_b);
                let j4 = self.volumetric_neumann(k2, face24);

                let a = [[g111 + g112, -g122], [-g212, g222]];
                let b = [[g111 + g121, g112 - g122], [0.0, g222 - g212]];
                let r1 = [-g121 * g3, -j4 * f24.length / 2.0];

                let (t, r) = solve_pair(a, b, r1);

                let f1 = (g111 + g121 - g111 * t[0][0]) * ctx.p1 - g111 * t[0][1] * p2
                    - g121 * g3
                    - g111 * r[0];
                let f3 = (g211 + g221 - g211 * t[0][0]) * ctx.p1 - g211 * t[0][1] * p2
                    - g221 * g3
                    - g211 * r[0];

                field.add(
                    k1,
                    ctx.face_a,
                    scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                );
                field.add(
                    k1,
                    ctx.face_b,
                    scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
                );
            }

            // Pressures on both boundary edges: the continuity system has a
            // single unknown and a closed form.
            (true, true) => {
                let sv1 = SubVolume::new(
                    self.dirichlet_mobility(k1, k1, ctx.face_b, states),
                    &perm1,
                    nu11,
                    nu21,
                );
                let sv2 = SubVolume::new(
                    self.dirichlet_mobility(k1, k2, face24, states),
                    &perm2,
                    nu12,
                    nu22,
                );
                let g111 = sv1.g_a(n1);
                let g121 = sv1.g_b(n1);
                let g211 = sv1.g_a(n3);
                let g221 = sv1.g_b(n3);
                let g112 = sv2.g_a(n1);
                let g122 = sv2.g_b(n1);

                let g3 = self.dirichlet_pressure(k1, ctx.face_b);
                let g4 = self.dirichlet_pressure(k2, face24);

                let coe = g111 + g112;

                let t00 = g112 * (g111 + g121) / coe;
                let t01 = -g111 * (g112 - g122) / coe;
                let t10 = g221 + g211 * (g112 - g121) / coe;
                let t11 = -g211 * (g112 - g122) / coe;
                let r0 = -(g4 * g122 * g111 + g3 * g112 * g121) / coe;
                let r1 = -g221 * g3 + (g3 * g211 * g121 - g4 * g211 * g122) / coe;

                let f1 = t00 * ctx.p1 + t01 * p2 + r0;
                let f3 = t10 * ctx.p1 + t11 * p2 + r1;

                field.add(
                    k1,
                    ctx.face_a,
                    scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                );
                field.add(
                    k1,
                    ctx.face_b,
                    scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
                );
            }
        }

        Ok(())
    }

    /// Region whose leading face lies on the boundary.
    pub(super) fn full_boundary_region(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        ctx: &PairContext,
    ) -> Result<(), MpfaError> {
        let bc_a = self.problem.boundary_types(ctx.cell1, ctx.face_a);
        if bc_a.is_neumann(PRESSURE_IDX) {
            self.flux_boundary_pair(field, states, ctx)
        } else if bc_a.is_dirichlet(PRESSURE_IDX) {
            self.pressure_boundary_pair(field, states, ctx)
        } else {
            Err(self.unclassified(ctx.cell1, ctx.face_a))
        }
    }

    /// Leading face carries a prescribed flux.
    ///
    /// The face leads exactly one pair per cell, so the full prescribed
    /// flux is written here once. What remains is the half-edge flux
    /// through `face_b`, which only a prescribed pressure somewhere in the
    /// region can pin down.
    fn flux_boundary_pair(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        ctx: &PairContext,
    ) -> Result<(), MpfaError> {
        let k1 = ctx.cell1;
        let j1 = self.volumetric_neumann(k1, ctx.face_a);
        field.add(k1, ctx.face_a, scale(ctx.fa.unit_normal, j1));

        let n1 = ctx.fa.half_normal;
        let n3 = ctx.fb.half_normal;
        let nu11 = rotate_cw(diff(ctx.fb.midpoint, ctx.x1));
        let nu21 = rotate_cw(diff(ctx.x1, ctx.fa.midpoint));
        let perm1 = self.problem.permeability(k1);

        let nb_b = match self.mesh.neighbor(k1, ctx.face_b) {
            Some(nb) => nb,
            None => {
                // Domain corner: both faces on the boundary.
                let bc_b = self.problem.boundary_types(k1, ctx.face_b);
                if bc_b.is_dirichlet(PRESSURE_IDX) {
                    let sv1 = SubVolume::new(
                        self.dirichlet_mobility(k1, k1, ctx.face_b, states),
                        &perm1,
                        nu11,
                        nu21,
                    );
                    let g111 = sv1.g_a(n1);
                    let g121 = sv1.g_b(n1);
                    let g211 = sv1.g_a(n3);
                    let g221 = sv1.g_b(n3);
                    let g3 = self.dirichlet_pressure(k1, ctx.face_b);

                    let f3 = (g221 - g211 * g121 / g111) * (ctx.p1 - g3)
                        + g211 * j1 * ctx.fa.length / (2.0 * g111);
                    field.add(
                        k1,
                        ctx.face_b,
                        scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
                    );
                } else if !bc_b.is_neumann(PRESSURE_IDX) {
                    return Err(self.unclassified(k1, ctx.face_b));
                }
                // Two prescribed fluxes: `face_b` receives its own when it
                // leads the next pair.
                return Ok(());
            }
        };

        // `face_b` interior towards cell 3, whose other corner face must
        // close the region on the boundary.
        let k3 = nb_b.cell;
        let face34 = self
            .mesh
            .other_face_at_vertex(k3, ctx.corner, nb_b.face)
            .ok_or_else(|| self.unsupported(k1))?;
        if self.mesh.neighbor(k3, face34).is_some() {
            return Err(self.unsupported(k1));
        }
        let bc_34 = self.problem.boundary_types(k3, face34);

        let f34 = FluxFace::of(self.mesh, k3, face34);
        let x3 = self.mesh.cell_centroid(k3);
        let p3 = states[k3].pressure;
        let n2 = f34.half_normal;

        let nu13 = rotate_cw(diff(x3, ctx.fb.midpoint));
        let nu23 = rotate_cw(diff(x3, f34.midpoint));
        let perm3 = self.problem.permeability(k3);

        if bc_34.is_neumann(PRESSURE_IDX) {
            // Fluxes on both boundary edges; three midpoint pressures stay
            // unknown and only the 1-3 half edge needs flux continuity.
            let sv1 = SubVolume::new(self.total_mobility(k1, states), &perm1, nu11, nu21);
            let sv3 = SubVolume::new(self.total_mobility(k3, states), &perm3, nu13, nu23);
            let g111 = sv1.g_a(n1);
            let g121 = sv1.g_b(n1);
            let g211 = sv1.g_a(n3);
            let g221 = sv1.g_b(n3);
            let g113 = sv3.g_a(n2);
            let g123 = sv3.g_b(n2);
            let g213 = sv3.g_a(n3);
            let g223 = sv3.g_b(n3);

            let j2 = self.volumetric_neumann(k3, face34);

            let mut c = [[0.0; 3]; 3];
            c[0][0] = -g111;
            c[0][2] = -g121;
            c[1][1] = -g113;
            c[1][2] = g123;
            c[2][1] = -g213;
            c[2][2] = g223;

            let mut f = [[0.0; 2]; 3];
            f[0][0] = g111 + g121;
            f[1][1] = g113 - g123;
            f[2][1] = g213 - g223;

            let mut a = [[0.0; 3]; 3];
            a[0][0] = g111;
            a[0][2] = g121;
            a[1][1] = g113;
            a[1][2] = -g123;
            a[2][0] = g211;
            a[2][1] = -g213;
            a[2][2] = g223 + g221;

            let mut b = [[0.0; 2]; 3];
            b[0][0] = g111 + g121;
            b[1][1] = g113 - g123;
            b[2][0] = g211 + g221;
            b[2][1] = g223 - g213;

            let r1 = [-j1 * ctx.fa.length / 2.0, -j2 * f34.length / 2.0, 0.0];

            let (ainv_b, ainv_r) = solve_pair(a, b, r1);
            let t = mat_add(&mat_mul(&c, &ainv_b), &f);
            let r = mat_vec(&c, &ainv_r);

            let f3 = t[2][0] * ctx.p1 + t[2][1] * p3 + r[2];
            field.add(
                k1,
                ctx.face_b,
                scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
            );
            Ok(())
        } else if bc_34.is_dirichlet(PRESSURE_IDX) {
            let sv1 = SubVolume::new(self.total_mobility(k1, states), &perm1, nu11, nu21);
            let sv3 = SubVolume::new(
                self.dirichlet_mobility(k1, k3, face34, states),
                &perm3,
                nu13,
                nu23,
            );
            let g111 = sv1.g_a(n1);
            let g121 = sv1.g_b(n1);
            let g211 = sv1.g_a(n3);
            let g221 = sv1.g_b(n3);
            let g213 = sv3.g_a(n3);
            let g223 = sv3.g_b(n3);

            let g2 = self.dirichlet_pressure(k3, face34);

            let c = [[-g111, -g121], [0.0, g223]];
            let f = [[g111 + g121, 0.0], [0.0, g213 - g223]];
            let a = [[g111, g121], [g211, g223 + g221]];
            let b = [[g111 + g121, 0.0], [g211 + g221, g223 - g213]];
            let r1 = [0.0, -g213 * g2];
            let r2 = [-j1 * ctx.fa.length / 2.0, g213 * g2];

            let (ainv_b, ainv_r2) = solve_pair(a, b, r2);
            let t = mat_add(&mat_mul(&c, &ainv_b), &f);
            let cr = mat_vec(&c, &ainv_r2);
            let r = [cr[0] + r1[0], cr[1] + r1[1]];

            let f3 = t[1][0] * ctx.p1 + t[1][1] * p3 + r[1];
            field.add(
                k1,
                ctx.face_b,
                scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
            );
            Ok(())
        } else {
            Err(self.unclassified(k3, face34))
        }
    }

    /// Leading face carries a prescribed pressure.
    ///
    /// Both half-edge fluxes of the pair are recoverable here; the
    /// flux-typed sub-cases still leave `face_b` to its own pair.
    fn pressure_boundary_pair(
        &self,
        field: &mut VelocityField,
        states: &[CellFlowState],
        ctx: &PairContext,
    ) -> Result<(), MpfaError> {
        let k1 = ctx.cell1;
        let g1 = self.dirichlet_pressure(k1, ctx.face_a);

        let n1 = ctx.fa.half_normal;
        let n3 = ctx.fb.half_normal;
        let nu11 = rotate_cw(diff(ctx.fb.midpoint, ctx.x1));
        let nu21 = rotate_cw(diff(ctx.x1, ctx.fa.midpoint));
        let perm1 = self.problem.permeability(k1);

        let nb_b = match self.mesh.neighbor(k1, ctx.face_b) {
            Some(nb) => nb,
            None => {
                let bc_b = self.problem.boundary_types(k1, ctx.face_b);
                if bc_b.is_dirichlet(PRESSURE_IDX) {
                    // Two prescribed pressures pin the corner outright; the
                    // second edge's data decides the mobility.
                    let sv1 = SubVolume::new(
                        self.dirichlet_mobility(k1, k1, ctx.face_b, states),
                        &perm1,
                        nu11,
                        nu21,
                    );
                    let g111 = sv1.g_a(n1);
                    let g121 = sv1.g_b(n1);
                    let g211 = sv1.g_a(n3);
                    let g221 = sv1.g_b(n3);
                    let g3 = self.dirichlet_pressure(k1, ctx.face_b);

                    let f1 = (g111 + g121) * ctx.p1 - (g111 * g1 + g121 * g3);
                    let f3 = (g211 + g221) * ctx.p1 - (g211 * g1 + g221 * g3);

                    field.add(
                        k1,
                        ctx.face_a,
                        scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                    );
                    field.add(
                        k1,
                        ctx.face_b,
                        scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
                    );
                } else if bc_b.is_neumann(PRESSURE_IDX) {
                    let j3 = self.volumetric_neumann(k1, ctx.face_b);
                    let sv1 = SubVolume::new(
                        self.dirichlet_mobility(k1, k1, ctx.face_a, states),
                        &perm1,
                        nu11,
                        nu21,
                    );
                    let g111 = sv1.g_a(n1);
                    let g121 = sv1.g_b(n1);
                    let g211 = sv1.g_a(n3);
                    let g221 = sv1.g_b(n3);

                    let t = g111 - g211 * g121 / g221;
                    let r = -t * g1 + g121 * j3 * ctx.fb.length / (2.0 * g221);

                    let f1 = t * ctx.p1 + r;
                    field.add(
                        k1,
                        ctx.face_a,
                        scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
                    );
                } else {
                    return Err(self.unclassified(k1, ctx.face_b));
                }
                return Ok(());
            }
        };

        let k3 = nb_b.cell;
        let face34 = self
            .mesh
            .other_face_at_vertex(k3, ctx.corner, nb_b.face)
            .ok_or_else(|| self.unsupported(k1))?;
        if self.mesh.neighbor(k3, face34).is_some() {
            return Err(self.unsupported(k1));
        }
        let bc_34 = self.problem.boundary_types(k3, face34);

        let f34 = FluxFace::of(self.mesh, k3, face34);
        let x3 = self.mesh.cell_centroid(k3);
        let p3 = states[k3].pressure;
        let n2 = f34.half_normal;

        let nu13 = rotate_cw(diff(x3, ctx.fb.midpoint));
        let nu23 = rotate_cw(diff(x3, f34.midpoint));
        let perm3 = self.problem.permeability(k3);

        let sv1 = SubVolume::new(
            self.dirichlet_mobility(k1, k1, ctx.face_a, states),
            &perm1,
            nu11,
            nu21,
        );
        let g111 = sv1.g_a(n1);
        let g121 = sv1.g_b(n1);
        let g211 = sv1.g_a(n3);
        let g221 = sv1.g_b(n3);

        if bc_34.is_dirichlet(PRESSURE_IDX) {
            let sv3 = SubVolume::new(
                self.dirichlet_mobility(k1, k3, face34, states),
                &perm3,
                nu13,
                nu23,
            );
            let g213 = sv3.g_a(n3);
            let g223 = sv3.g_b(n3);

            let g2 = self.dirichlet_pressure(k3, face34);

            // One interior midpoint pressure; closed form of its
            // continuity condition.
            let coe = g221 + g223;
            let t00 = g111 + g121 * (g223 - g211) / coe;
            let t01 = -g121 * (g223 - g213) / coe;
            let t10 = g223 * (g211 + g221) / coe;
            let t11 = -g221 * (g223 - g213) / coe;
            let r0 = -g111 * g1 + (g1 * g121 * g211 - g2 * g213 * g121) / coe;
            let r1 = -(g1 * g211 * g223 + g2 * g221 * g213) / coe;

            let f1 = t00 * ctx.p1 + t01 * p3 + r0;
            let f3 = t10 * ctx.p1 + t11 * p3 + r1;

            field.add(
                k1,
                ctx.face_a,
                scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
            );
            field.add(
                k1,
                ctx.face_b,
                scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
            );
            Ok(())
        } else if bc_34.is_neumann(PRESSURE_IDX) {
            let sv3 = SubVolume::new(self.total_mobility(k3, states), &perm3, nu13, nu23);
            let g113 = sv3.g_a(n2);
            let g123 = sv3.g_b(n2);
            let g213 = sv3.g_a(n3);
            let g223 = sv3.g_b(n3);

            let j2 = self.volumetric_neumann(k3, face34);

            let a = [[g113, -g123], [-g213, g221 + g223]];
            let b = [[0.0, g113 - g123], [g211 + g221, g223 - g213]];
            let r1 = [-j2 * f34.length / 2.0, -g211 * g1];

            let (t, r) = solve_pair(a, b, r1);

            let f1 = (g111 + g121 - g121 * t[1][0]) * ctx.p1
                - g121 * t[1][1] * p3
                - (g111 * g1 + g121 * r[1]);
            let f3 = (g211 + g221 - g221 * t[1][0]) * ctx.p1
                - g221 * t[1][1] * p3
                - (g211 * g1 + g221 * r[1]);

            field.add(
                k1,
                ctx.face_a,
                scale(ctx.fa.unit_normal, f1 / ctx.fa.length),
            );
            field.add(
                k1,
                ctx.face_b,
                scale(ctx.fb.unit_normal, f3 / ctx.fb.length),
            );
            Ok(())
        } else {
            Err(self.unclassified(k3, face34))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryTypes;
    use crate::equations::{PrimaryVariables, TwoPhaseFluids};
    use crate::mesh::Mesh2D;
    use crate::mpfa::conservation::ConservationCheckConfig;
    use crate::problem::PermeabilityTensor;
    use crate::types::CellIndex;

    const TOL: f64 = 1e-10;

    /// Dirichlet pressure p = x everywhere, saturation pinned to 1.
    struct LinearDirichletProblem {
        mesh: Mesh2D,
    }

    impl PorousProblem<2> for LinearDirichletProblem {
        fn permeability(&self, _cell: usize) -> PermeabilityTensor {
            PermeabilityTensor::identity()
        }

        fn porosity(&self, _cell: usize) -> f64 {
            0.2
        }

        fn boundary_types(&self, _cell: usize, _face: usize) -> BoundaryTypes<2> {
            BoundaryTypes::all_dirichlet()
        }

        fn dirichlet(&self, cell: usize, face: usize) -> PrimaryVariables<2> {
            let m = self.mesh.face_midpoint(cell, face);
            PrimaryVariables::new([m[0], 1.0])
        }
    }

    /// Sealed everywhere except a unit outflow on the east face.
    struct EastOutflowProblem;

    impl PorousProblem<2> for EastOutflowProblem {
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
            if face == 1 {
                PrimaryVariables::new([1.0, 0.0])
            } else {
                PrimaryVariables::zero()
            }
        }
    }

    /// Dirichlet p = x on the vertical sides, sealed horizontal sides.
    struct SealedChannelProblem {
        mesh: Mesh2D,
    }

    impl PorousProblem<2> for SealedChannelProblem {
        fn permeability(&self, _cell: usize) -> PermeabilityTensor {
            PermeabilityTensor::identity()
        }

        fn porosity(&self, _cell: usize) -> f64 {
            0.2
        }

        fn boundary_types(&self, _cell: usize, face: usize) -> BoundaryTypes<2> {
            // Faces 0 and 2 are the horizontal sides on a structured grid.
            if face == 0 || face == 2 {
                BoundaryTypes::all_neumann()
            } else {
                BoundaryTypes::all_dirichlet()
            }
        }

        fn dirichlet(&self, cell: usize, face: usize) -> PrimaryVariables<2> {
            let m = self.mesh.face_midpoint(cell, face);
            PrimaryVariables::new([m[0], 1.0])
        }
    }

    fn states_linear_x(mesh: &Mesh2D) -> Vec<CellFlowState> {
        (0..mesh.n_cells)
            .map(|k| CellFlowState::new(mesh.cell_centroid(k)[0], 1.0))
            .collect()
    }

    fn assert_uniform_x_flow(mesh: &Mesh2D, field: &VelocityField) {
        for k in 0..mesh.n_cells {
            let cell = CellIndex::new(k);
            // Vertical faces carry v = (-1, 0), horizontal faces nothing.
            for (face, expected) in [[0.0, 0.0], [-1.0, 0.0], [0.0, 0.0], [-1.0, 0.0]]
                .iter()
                .enumerate()
            {
                let v = field.velocity(cell, face);
                assert!(
                    (v[0] - expected[0]).abs() < TOL && (v[1] - expected[1]).abs() < TOL,
                    "Cell {} face {}: expected {:?}, got {:?}",
                    k,
                    face,
                    expected,
                    v
                );
            }
        }
    }

    #[test]
    fn test_single_cell_dirichlet_uniform_flow() {
        // One cell, all four pairs take the pressure-pressure corner path.
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        let problem = LinearDirichletProblem { mesh: mesh.clone() };
        let engine = MpfaOVelocity::new(&mesh, &problem, TwoPhaseFluids::unit());

        let field = engine.compute_all(&states_linear_x(&mesh)).unwrap();
        assert_uniform_x_flow(&mesh, &field);
        assert!(engine.conservation_defects(&field).is_empty());
    }

    #[test]
    fn test_single_cell_neumann_prescribed_flux() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        let engine = MpfaOVelocity::new(&mesh, &EastOutflowProblem, TwoPhaseFluids::unit())
            .with_check_config(ConservationCheckConfig {
                // The synthetic state is not a flow solution; keep the
                // imbalance warning out of the test output.
                relative_tolerance: f64::INFINITY,
            });

        let states = vec![CellFlowState::new(0.0, 1.0)];
        let field = engine.compute_all(&states).unwrap();

        let cell = CellIndex::new(0);
        assert!((field.normal_flux(&mesh, cell, 1) - 1.0).abs() < TOL);
        for face in [0, 2, 3] {
            let v = field.velocity(cell, face);
            assert!(
                v[0].abs() < TOL && v[1].abs() < TOL,
                "Sealed face {} must stay at zero, got {:?}",
                face,
                v
            );
        }
    }

    #[test]
    fn test_single_cell_mixed_corners() {
        // Sealed top and bottom, prescribed pressures left and right:
        // every pair mixes a flux edge with a pressure edge.
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        let problem = SealedChannelProblem { mesh: mesh.clone() };
        let engine = MpfaOVelocity::new(&mesh, &problem, TwoPhaseFluids::unit());

        let field = engine.compute_all(&states_linear_x(&mesh)).unwrap();
        assert_uniform_x_flow(&mesh, &field);
        assert!(engine.conservation_defects(&field).is_empty());
    }

    #[test]
    fn test_two_cell_dirichlet_uniform_flow() {
        // Two cells exercise the interior-facing boundary regions on both
        // sides of the shared edge.
        let mesh = Mesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1);
        let problem = LinearDirichletProblem { mesh: mesh.clone() };
        let engine = MpfaOVelocity::new(&mesh, &problem, TwoPhaseFluids::unit());

        let field = engine.compute_all(&states_linear_x(&mesh)).unwrap();
        assert_uniform_x_flow(&mesh, &field);
        assert!(engine.conservation_defects(&field).is_empty());
    }

    #[test]
    fn test_two_cell_sealed_channel_flow() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1);
        let problem = SealedChannelProblem { mesh: mesh.clone() };
        let engine = MpfaOVelocity::new(&mesh, &problem, TwoPhaseFluids::unit());

        let field = engine.compute_all(&states_linear_x(&mesh)).unwrap();
        assert_uniform_x_flow(&mesh, &field);
        assert!(engine.conservation_defects(&field).is_empty());
    }

    #[test]
    fn test_unclassified_boundary_is_reported() {
        struct InteriorTypedProblem;

        impl PorousProblem<2> for InteriorTypedProblem {
            fn permeability(&self, _cell: usize) -> PermeabilityTensor {
                PermeabilityTensor::identity()
            }

            fn porosity(&self, _cell: usize) -> f64 {
                0.2
            }

            fn boundary_types(&self, _cell: usize, _face: usize) -> BoundaryTypes<2> {
                BoundaryTypes::interior()
            }
        }

        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        let engine = MpfaOVelocity::new(&mesh, &InteriorTypedProblem, TwoPhaseFluids::unit());

        let err = engine
            .compute_all(&[CellFlowState::new(0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, MpfaError::UnclassifiedBoundary { .. }));
    }
}
