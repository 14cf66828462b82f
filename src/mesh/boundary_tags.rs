//! Boundary tags for 2D mesh edges.
//!
//! Each boundary edge carries a tag the problem definition can match on when
//! classifying boundary conditions.

/// Tag identifying the type of a boundary edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryTag {
    /// Impermeable boundary (zero prescribed flux)
    Wall,

    /// Dirichlet boundary (prescribed primary variables)
    Dirichlet,

    /// Neumann boundary (prescribed mass flux)
    Neumann,

    /// Custom tag for user-defined boundary handling
    Custom(u32),
}

impl BoundaryTag {
    /// Check if this is an impermeable wall.
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryTag::Wall)
    }

    /// Check if this prescribes primary variables.
    pub fn is_dirichlet(&self) -> bool {
        matches!(self, BoundaryTag::Dirichlet)
    }

    /// Check if this prescribes a flux. Walls count as zero-flux Neumann.
    pub fn is_neumann(&self) -> bool {
        matches!(self, BoundaryTag::Neumann | BoundaryTag::Wall)
    }
}

impl Default for BoundaryTag {
    fn default() -> Self {
        BoundaryTag::Wall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_tag_equality() {
        assert_eq!(BoundaryTag::Wall, BoundaryTag::Wall);
        assert_ne!(BoundaryTag::Wall, BoundaryTag::Dirichlet);
        assert_eq!(BoundaryTag::Custom(1), BoundaryTag::Custom(1));
        assert_ne!(BoundaryTag::Custom(1), BoundaryTag::Custom(2));
    }

    #[test]
    fn test_is_wall() {
        assert!(BoundaryTag::Wall.is_wall());
        assert!(!BoundaryTag::Dirichlet.is_wall());
        assert!(!BoundaryTag::Custom(0).is_wall());
    }

    #[test]
    fn test_wall_is_zero_flux_neumann() {
        assert!(BoundaryTag::Wall.is_neumann());
        assert!(BoundaryTag::Neumann.is_neumann());
        assert!(!BoundaryTag::Dirichlet.is_neumann());
    }
}
