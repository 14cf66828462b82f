//! Mesh representation.
//!
//! Provides mesh data structures for finite-volume discretizations:
//! - 2D mesh of quadrilateral cells with edge-based connectivity
//! - Boundary edge tagging
//! - Per-cell sub-control volume geometry for the vertex-centered scheme

mod boundary_tags;
mod box_geometry;
mod errors;
mod mesh2d;

pub use boundary_tags::BoundaryTag;
pub use box_geometry::{BoundarySubFace, BoxGeometry, SubControlVolume, SubControlVolumeFace};
pub use errors::MeshError;
pub use mesh2d::{CellFace, Edge, Mesh2D};
