//! Error types for the multi-point flux approximation.

use thiserror::Error;

use crate::types::{CellIndex, EdgeIndex};

/// Errors raised while assembling interaction regions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MpfaError {
    /// The cells around a mesh vertex do not form the two- or four-cell
    /// pattern the O-method stencil requires (hanging nodes, degenerate
    /// corners of non-convex domains).
    #[error("cell {cell} touches a corner whose cell pattern is not supported by the O-method")]
    UnsupportedTopology {
        /// Cell from whose corner walk the region was built.
        cell: CellIndex,
    },

    /// A boundary edge carries neither a Dirichlet nor a Neumann condition
    /// for the pressure equation.
    #[error("boundary edge {edge} of cell {cell} has no pressure boundary condition")]
    UnclassifiedBoundary {
        /// Cell owning the offending edge.
        cell: CellIndex,
        /// The offending boundary edge.
        edge: EdgeIndex,
    },
}
