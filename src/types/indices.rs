//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up different kinds of mesh indices
//! (cell vs edge vs vertex).

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Convert to usize.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        // Allow using as array index
        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Cell index in a mesh.
    ///
    /// Identifies one quadrilateral control volume.
    ///
    /// # Example
    ///
    /// ```
    /// use darcy_rs::types::CellIndex;
    ///
    /// let cell = CellIndex::new(42);
    /// assert_eq!(cell.get(), 42);
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Edge index in a mesh.
    ///
    /// Identifies one cell face (interior or boundary).
    ///
    /// # Example
    ///
    /// ```
    /// use darcy_rs::types::EdgeIndex;
    ///
    /// let edge = EdgeIndex::new(10);
    /// assert_eq!(edge.get(), 10);
    /// ```
    EdgeIndex,
    "E"
);

define_index!(
    /// Vertex index in a mesh.
    ///
    /// Identifies one mesh corner point. In the vertex-centered scheme
    /// each vertex carries one set of primary variables.
    ///
    /// # Example
    ///
    /// ```
    /// use darcy_rs::types::VertexIndex;
    ///
    /// let vertex = VertexIndex::new(3);
    /// assert_eq!(vertex.get(), 3);
    /// ```
    VertexIndex,
    "V"
);

// =============================================================================
// Iterator support
// =============================================================================

impl CellIndex {
    /// Create an iterator over [0, n) cell indices.
    ///
    /// # Example
    ///
    /// ```
    /// use darcy_rs::types::CellIndex;
    ///
    /// let indices: Vec<_> = CellIndex::iter(5).collect();
    /// assert_eq!(indices.len(), 5);
    /// assert_eq!(indices[0].get(), 0);
    /// assert_eq!(indices[4].get(), 4);
    /// ```
    pub fn iter(n: usize) -> impl Iterator<Item = CellIndex> + ExactSizeIterator {
        (0..n).map(CellIndex)
    }
}

impl VertexIndex {
    /// Create an iterator over [0, n) vertex indices.
    pub fn iter(n: usize) -> impl Iterator<Item = VertexIndex> + ExactSizeIterator {
        (0..n).map(VertexIndex)
    }
}

// =============================================================================
// Tests
// =============================================================================
