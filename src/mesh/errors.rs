//! Error types for mesh construction.

use thiserror::Error;

/// Errors that can occur when building a mesh from raw connectivity.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A cell references a vertex index outside the vertex list.
    #[error("Cell {cell} references vertex {vertex}, but only {n_vertices} vertices exist")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        n_vertices: usize,
    },

    /// A cell repeats a vertex, collapsing the quadrilateral.
    #[error("Cell {cell} is degenerate: vertex {vertex} appears twice")]
    DegenerateCell { cell: usize, vertex: usize },

    /// An edge is shared by more than two cells.
    #[error("Edge ({v0}, {v1}) is shared by more than two cells, mesh is non-conforming")]
    NonConformingEdge { v0: usize, v1: usize },

    /// A cell has non-positive signed area (wrong winding or zero volume).
    #[error("Cell {cell} has non-positive area {area}, vertices must wind counter-clockwise")]
    NonPositiveArea { cell: usize, area: f64 },
}
