//! Strongly-typed domain types for safer APIs.
//!
//! This module provides newtypes to make APIs self-documenting and
//! prevent parameter mix-ups.
//!
//! # Design Philosophy
//!
//! - **Newtypes prevent mix-ups**: `CellIndex(3)` vs `VertexIndex(3)` are distinct types
//! - **Zero-cost abstractions**: All newtypes are `#[repr(transparent)]`
//!
//! # Example
//!
//! ```
//! use darcy_rs::types::{CellIndex, VertexIndex};
//!
//! let cell = CellIndex::new(7);
//! let vertex = VertexIndex::new(7);
//!
//! // Distinct types: a cell index never silently stands in for a vertex index.
//! assert_eq!(cell.get(), vertex.get());
//! ```

mod indices;

pub use indices::{CellIndex, EdgeIndex, VertexIndex};
