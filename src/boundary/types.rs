//! Per-equation boundary classification.
//!
//! Boundary conditions are set per balance equation, so one vertex can hold a
//! Dirichlet pressure next to a Neumann saturation flux. The per-cell
//! [`ElementBoundaryTypes`] collects the classification for all four corners
//! of a visited cell, merging the two boundary faces that meet at a corner
//! with Dirichlet taking priority.

use crate::equations::PrimaryVariables;
use crate::mesh::Mesh2D;
use crate::problem::PorousProblem;
use crate::types::CellIndex;

/// Boundary constraint for one equation at one location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// No boundary constraint; the balance equation holds unchanged.
    #[default]
    Interior,
    /// The primary variable is prescribed.
    Dirichlet,
    /// A boundary flux is prescribed.
    Neumann,
}

/// Per-equation boundary constraints at one location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryTypes<const N: usize> {
    conditions: [BoundaryCondition; N],
}

impl<const N: usize> BoundaryTypes<N> {
    /// No constraints for any equation.
    pub fn interior() -> Self {
        Self {
            conditions: [BoundaryCondition::Interior; N],
        }
    }

    /// Dirichlet for every equation.
    pub fn all_dirichlet() -> Self {
        Self {
            conditions: [BoundaryCondition::Dirichlet; N],
        }
    }

    /// Neumann for every equation.
    pub fn all_neumann() -> Self {
        Self {
            conditions: [BoundaryCondition::Neumann; N],
        }
    }

    /// Set equation `eq` to Dirichlet.
    pub fn set_dirichlet(&mut self, eq: usize) {
        self.conditions[eq] = BoundaryCondition::Dirichlet;
    }

    /// Set equation `eq` to Neumann.
    pub fn set_neumann(&mut self, eq: usize) {
        self.conditions[eq] = BoundaryCondition::Neumann;
    }

    /// Constraint for equation `eq`.
    #[inline]
    pub fn condition(&self, eq: usize) -> BoundaryCondition {
        self.conditions[eq]
    }

    /// Check if equation `eq` is Dirichlet.
    #[inline]
    pub fn is_dirichlet(&self, eq: usize) -> bool {
        self.conditions[eq] == BoundaryCondition::Dirichlet
    }

    /// Check if equation `eq` is Neumann.
    #[inline]
    pub fn is_neumann(&self, eq: usize) -> bool {
        self.conditions[eq] == BoundaryCondition::Neumann
    }

    /// Check if any equation is Dirichlet.
    pub fn has_dirichlet(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| *c == BoundaryCondition::Dirichlet)
    }

    /// Check if any equation is Neumann.
    pub fn has_neumann(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| *c == BoundaryCondition::Neumann)
    }

    /// Merge another classification into this one. Dirichlet beats Neumann,
    /// both beat Interior.
    fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.conditions.iter_mut().zip(other.conditions.iter()) {
            *mine = match (*mine, *theirs) {
                (BoundaryCondition::Dirichlet, _) | (_, BoundaryCondition::Dirichlet) => {
                    BoundaryCondition::Dirichlet
                }
                (BoundaryCondition::Neumann, _) | (_, BoundaryCondition::Neumann) => {
                    BoundaryCondition::Neumann
                }
                _ => BoundaryCondition::Interior,
            };
        }
    }
}

impl<const N: usize> Default for BoundaryTypes<N> {
    fn default() -> Self {
        Self::interior()
    }
}

/// Boundary classification of one cell's four corner sub-volumes, plus the
/// Dirichlet values where any apply.
#[derive(Clone, Copy, Debug)]
pub struct ElementBoundaryTypes<const N: usize> {
    /// Merged classification per corner sub-volume.
    pub scv_types: [BoundaryTypes<N>; 4],
    /// Prescribed primary variables per corner. Only meaningful where the
    /// corner has a Dirichlet constraint.
    pub dirichlet_values: [PrimaryVariables<N>; 4],
    /// True if any corner has a Dirichlet constraint.
    pub has_dirichlet: bool,
    /// True if any corner has a Neumann constraint.
    pub has_neumann: bool,
}

impl<const N: usize> ElementBoundaryTypes<N> {
    /// All corners unconstrained.
    pub fn interior() -> Self {
        Self {
            scv_types: [BoundaryTypes::interior(); 4],
            dirichlet_values: [PrimaryVariables::zero(); 4],
            has_dirichlet: false,
            has_neumann: false,
        }
    }

    /// Collect the boundary classification of one cell from the problem.
    ///
    /// Corner `i` touches local faces `(i+3)%4` and `i`; the classifications
    /// of boundary faces among them merge with Dirichlet priority. When both
    /// faces prescribe Dirichlet values, face `i` (the one leaving the
    /// corner) wins.
    pub fn from_problem<P: PorousProblem<N>>(problem: &P, mesh: &Mesh2D, cell: CellIndex) -> Self {
        let k = cell.as_usize();
        let mut result = Self::interior();

        for i in 0..4 {
            for face in [(i + 3) % 4, i] {
                if !mesh.is_boundary_face(k, face) {
                    continue;
                }
                let face_types = problem.boundary_types(k, face);
                result.scv_types[i].merge(&face_types);
                if face_types.has_dirichlet() {
                    result.dirichlet_values[i] = problem.dirichlet(k, face);
                }
            }
            result.has_dirichlet |= result.scv_types[i].has_dirichlet();
            result.has_neumann |= result.scv_types[i].has_neumann();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BoundaryTag;
    use crate::problem::PermeabilityTensor;

    struct TaggedProblem;

    impl PorousProblem<2> for TaggedProblem {
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

    struct WestDirichletProblem {
        mesh: Mesh2D,
    }

    impl PorousProblem<2> for WestDirichletProblem {
        fn permeability(&self, _cell: usize) -> PermeabilityTensor {
            PermeabilityTensor::identity()
        }

        fn porosity(&self, _cell: usize) -> f64 {
            0.2
        }

        fn boundary_types(&self, cell: usize, face: usize) -> BoundaryTypes<2> {
            match self.mesh.boundary_tag(cell, face) {
                Some(BoundaryTag::Dirichlet) => BoundaryTypes::all_dirichlet(),
                _ => BoundaryTypes::all_neumann(),
            }
        }

        fn dirichlet(&self, _cell: usize, _face: usize) -> PrimaryVariables<2> {
            PrimaryVariables::new([2e5, 1.0])
        }
    }

    #[test]
    fn test_merge_priority() {
        let mut a = BoundaryTypes::<2>::interior();
        a.set_neumann(0);

        let mut b = BoundaryTypes::<2>::interior();
        b.set_dirichlet(0);
        b.set_neumann(1);

        a.merge(&b);
        assert!(a.is_dirichlet(0), "Dirichlet must win over Neumann");
        assert!(a.is_neumann(1), "Neumann must win over Interior");
    }

    #[test]
    fn test_interior_cell_is_unconstrained() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3);
        let ebt = ElementBoundaryTypes::from_problem(&TaggedProblem, &mesh, CellIndex::new(4));

        assert!(!ebt.has_dirichlet);
        assert!(!ebt.has_neumann);
        for i in 0..4 {
            assert_eq!(ebt.scv_types[i], BoundaryTypes::interior());
        }
    }

    #[test]
    fn test_corner_merges_two_faces() {
        // West side Dirichlet, everything else Neumann.
        let mesh = Mesh2D::uniform_rectangle_with_sides(
            0.0,
            1.0,
            0.0,
            1.0,
            2,
            1,
            [
                BoundaryTag::Neumann,   // south
                BoundaryTag::Neumann,   // east
                BoundaryTag::Neumann,   // north
                BoundaryTag::Dirichlet, // west
            ],
        );
        let problem = WestDirichletProblem { mesh: mesh.clone() };
        let ebt = ElementBoundaryTypes::from_problem(&problem, &mesh, CellIndex::new(0));

        // Corner 0 touches the south (Neumann) and west (Dirichlet) faces.
        assert!(ebt.scv_types[0].is_dirichlet(0));
        assert!(ebt.scv_types[0].is_dirichlet(1));
        assert_eq!(ebt.dirichlet_values[0].to_array(), [2e5, 1.0]);

        // Corner 1 touches the south face only (east face of cell 0 is interior).
        assert!(ebt.scv_types[1].is_neumann(0));
        assert!(!ebt.scv_types[1].has_dirichlet());

        assert!(ebt.has_dirichlet);
        assert!(ebt.has_neumann);
    }
}
