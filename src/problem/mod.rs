//! Problem definition: spatial parameters, sources and boundary data.
//!
//! A [`PorousProblem`] supplies everything that varies over the domain while
//! the discretization itself stays generic: permeability, porosity, the
//! material law, source terms and boundary conditions. Implementations are
//! plain structs; the assembly borrows the problem per call and never stores
//! it.

use crate::boundary::BoundaryTypes;
use crate::equations::{MaterialLaw, PrimaryVariables};

/// Absolute permeability as a full 2x2 tensor [m^2].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PermeabilityTensor {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
}

impl PermeabilityTensor {
    /// Unit tensor.
    pub fn identity() -> Self {
        Self::isotropic(1.0)
    }

    /// Isotropic permeability k * I.
    pub fn isotropic(k: f64) -> Self {
        Self {
            xx: k,
            xy: 0.0,
            yx: 0.0,
            yy: k,
        }
    }

    /// Diagonal anisotropic permeability.
    pub fn diagonal(kx: f64, ky: f64) -> Self {
        Self {
            xx: kx,
            xy: 0.0,
            yx: 0.0,
            yy: ky,
        }
    }

    /// Full tensor. Physical permeabilities are symmetric positive definite,
    /// but this is not enforced here.
    pub fn full(xx: f64, xy: f64, yx: f64, yy: f64) -> Self {
        Self { xx, xy, yx, yy }
    }

    /// Matrix-vector product K * v.
    #[inline(always)]
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        [
            self.xx * v[0] + self.xy * v[1],
            self.yx * v[0] + self.yy * v[1],
        ]
    }

    /// Check symmetry within a tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (self.xy - self.yx).abs() <= tol
    }
}

/// Spatially varying data of one flow problem.
///
/// `N` is the number of balance equations; it must match the flow model the
/// problem is used with. Only `permeability`, `porosity` and `boundary_types`
/// are required; sources and boundary values default to zero and the material
/// law defaults to the linear one.
///
/// `boundary_types` is only consulted for boundary faces; `dirichlet` and
/// `neumann` only for faces the types classify accordingly.
pub trait PorousProblem<const N: usize> {
    /// Absolute permeability of a cell.
    fn permeability(&self, cell: usize) -> PermeabilityTensor;

    /// Porosity of a cell.
    fn porosity(&self, cell: usize) -> f64;

    /// Material law of a cell.
    fn material_law(&self, _cell: usize) -> MaterialLaw {
        MaterialLaw::linear()
    }

    /// Per-equation classification of a boundary face.
    fn boundary_types(&self, cell: usize, face: usize) -> BoundaryTypes<N>;

    /// Prescribed primary variables on a Dirichlet face.
    fn dirichlet(&self, _cell: usize, _face: usize) -> PrimaryVariables<N> {
        PrimaryVariables::zero()
    }

    /// Prescribed mass flux density on a Neumann face [kg/(m^2 s)],
    /// positive out of the domain.
    fn neumann(&self, _cell: usize, _face: usize) -> PrimaryVariables<N> {
        PrimaryVariables::zero()
    }

    /// Mass source density in a cell [kg/(m^3 s)], positive for injection.
    fn source(&self, _cell: usize) -> PrimaryVariables<N> {
        PrimaryVariables::zero()
    }
}
