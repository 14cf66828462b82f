//! Geometric building blocks of an O-method interaction region.
//!
//! Around each mesh vertex, the method couples the cells touching that
//! vertex through half-edge fluxes. Each participating cell contributes a
//! dual basis spanned by two `nu` vectors (rotated connection vectors from
//! the cell centre to the two half-edge midpoints), and each half edge
//! contributes an integration normal scaled with half the edge length.

use crate::mesh::Mesh2D;
use crate::problem::PermeabilityTensor;

/// Rotate a vector a quarter turn clockwise: `(x, y) -> (y, -x)`.
#[inline(always)]
pub(crate) fn rotate_cw(v: [f64; 2]) -> [f64; 2] {
    [v[1], -v[0]]
}

#[inline(always)]
pub(crate) fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline(always)]
pub(crate) fn diff(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline(always)]
pub(crate) fn scale(v: [f64; 2], s: f64) -> [f64; 2] {
    [v[0] * s, v[1] * s]
}

/// Quantities of one cell face entering the interaction-region assembly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FluxFace {
    /// Edge midpoint.
    pub midpoint: [f64; 2],
    /// Full edge length.
    pub length: f64,
    /// Outward unit normal of the owning cell.
    pub unit_normal: [f64; 2],
    /// Unit normal scaled with half the edge length. Transmissibility
    /// entries built from this normal carry the sub-face area.
    pub half_normal: [f64; 2],
}

impl FluxFace {
    pub fn of(mesh: &Mesh2D, cell: usize, face: usize) -> Self {
        let length = mesh.face_length(cell, face);
        let unit_normal = mesh.outward_unit_normal(cell, face);
        Self {
            midpoint: mesh.face_midpoint(cell, face),
            length,
            unit_normal,
            half_normal: [unit_normal[0] * length / 2.0, unit_normal[1] * length / 2.0],
        }
    }
}

/// One cell's transmissibility ingredients.
///
/// Entries follow `g = lambda * (n . K nu) / det`, where `n` is a half-edge
/// integration normal, `nu` one of the two dual basis vectors and `det` the
/// parallelogram area spanned by the basis. [`Self::g_a`] evaluates against
/// the first basis vector, [`Self::g_b`] against the second.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SubVolume {
    k_nu_a: [f64; 2],
    k_nu_b: [f64; 2],
    mobility_over_det: f64,
}

impl SubVolume {
    pub fn new(
        mobility: f64,
        permeability: &PermeabilityTensor,
        nu_a: [f64; 2],
        nu_b: [f64; 2],
    ) -> Self {
        let det = dot(nu_a, rotate_cw(nu_b)).abs();
        debug_assert!(det > 0.0, "Degenerate dual basis in interaction region");
        Self {
            k_nu_a: permeability.apply(nu_a),
            k_nu_b: permeability.apply(nu_b),
            mobility_over_det: mobility / det,
        }
    }

    #[inline]
    pub fn g_a(&self, normal: [f64; 2]) -> f64 {
        self.mobility_over_det * dot(normal, self.k_nu_a)
    }

    #[inline]
    pub fn g_b(&self, normal: [f64; 2]) -> f64 {
        self.mobility_over_det * dot(normal, self.k_nu_b)
    }
}
