//! # darcy-rs
//!
//! A finite-volume library for multiphase flow in porous media.
//!
//! This crate provides the core building blocks for vertex-centered
//! finite-volume (box) discretizations of Darcy flow:
//! - Quadrilateral mesh with edge connectivity and boundary tagging
//! - Sub-control volume geometry for the box scheme
//! - Two-phase and single-phase flow models with constitutive relations
//! - Per-equation boundary condition classification
//! - Local residual evaluation and global residual assembly
//! - MPFA O-method velocity reconstruction for full permeability tensors
//! - Strongly-typed mesh entity indices

pub mod boundary;
pub mod equations;
pub mod mesh;
pub mod mpfa;
pub mod problem;
pub mod residual;
pub mod types;

// Re-export main types for convenience
// Mesh and geometry
pub use mesh::{BoundaryTag, BoxGeometry, CellFace, Mesh2D, MeshError};
pub use types::{CellIndex, EdgeIndex, VertexIndex};

// Physics
pub use equations::{
    FluidPhase, MaterialLaw, PorousModel, PorousModelInfo, PrimaryVariables,
    SaturationFormulation, SinglePhaseFlow, TwoPhaseFlow, TwoPhaseFluids, VolumeVariables,
};
pub use problem::{PermeabilityTensor, PorousProblem};

// Boundary conditions
pub use boundary::{BoundaryCondition, BoundaryTypes, ElementBoundaryTypes};

// Residual assembly
pub use residual::{assemble_residuals, total_storage, LocalResidual, ResidualConfig};

#[cfg(feature = "parallel")]
pub use residual::assemble_residuals_parallel;

// MPFA velocity reconstruction
pub use mpfa::{
    CellFlowState, ConservationCheckConfig, ConservationDefect, MpfaError, MpfaOVelocity,
    VelocityField,
};
